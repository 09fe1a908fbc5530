#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime statistics and safety assessment types.
//!
//! Upstream crime APIs report either raw incidents or pre-aggregated counts
//! for a trailing window. Both end up as [`CrimeStatistics`], which the
//! scorer turns into a bounded [`SafetyAssessment`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default trailing window for crime statistics, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 365;

/// Top-level crime category groupings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeCategory {
    /// Crimes against persons (homicide, assault, robbery, sexual assault)
    Violent,
    /// Crimes against property (burglary, theft, arson, vandalism)
    Property,
    /// Drug and narcotics offenses
    DrugNarcotics,
    /// Public order and quality-of-life offenses
    PublicOrder,
    /// Fraud, forgery, embezzlement, identity theft
    FraudFinancial,
    /// Offenses not fitting other categories
    Other,
}

impl CrimeCategory {
    #[must_use]
    pub const fn is_violent(self) -> bool {
        matches!(self, Self::Violent)
    }
}

/// A single reported incident from the crime API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeIncident {
    /// Date the incident occurred.
    pub occurred_on: NaiveDate,
    /// Top-level category.
    pub category: CrimeCategory,
}

/// Incident statistics for the area around an address over a trailing
/// window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeStatistics {
    /// Total incidents in the window.
    pub incidents: u32,
    /// Violent incidents in the window. Absent means zero.
    #[serde(default)]
    pub violent_incidents: Option<u32>,
    /// Percentage change against the preceding window of equal length.
    #[serde(default)]
    pub trend_percent: Option<f64>,
    /// Window length in days.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

const fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

impl CrimeStatistics {
    #[must_use]
    pub const fn new(incidents: u32, violent_incidents: Option<u32>, trend_percent: Option<f64>) -> Self {
        Self {
            incidents,
            violent_incidents,
            trend_percent,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

/// Qualitative risk band for a safety score.
///
/// Bands partition `0..=100`; see the scorer's policy for the cut points.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyLevel {
    HighRisk,
    ModerateRisk,
    VerySafe,
}

impl SafetyLevel {
    /// Display label for the dashboard.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighRisk => "High Risk",
            Self::ModerateRisk => "Moderate Risk",
            Self::VerySafe => "Very Safe",
        }
    }
}

/// Bounded safety characterization derived from [`CrimeStatistics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAssessment {
    /// Score from 0 (least safe) to 100 (safest).
    pub score: u8,
    /// Risk band the score falls into.
    pub level: SafetyLevel,
    /// Total incidents the score was derived from.
    pub incidents: u32,
    /// Violent incidents, present only when non-zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violent_incidents: Option<u32>,
    /// Trend passed through from the input, not part of the score.
    pub trend_percent: Option<f64>,
    /// Window length in days.
    pub window_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_defaults_when_fields_are_missing() {
        let stats: CrimeStatistics = serde_json::from_str(r#"{"incidents": 12}"#).unwrap();
        assert_eq!(stats, CrimeStatistics::new(12, None, None));
        assert_eq!(stats.window_days, DEFAULT_WINDOW_DAYS);
    }

    #[test]
    fn levels_are_ordered_worst_to_best() {
        assert!(SafetyLevel::HighRisk < SafetyLevel::ModerateRisk);
        assert!(SafetyLevel::ModerateRisk < SafetyLevel::VerySafe);
        assert_eq!(SafetyLevel::VerySafe.label(), "Very Safe");
        assert_eq!(SafetyLevel::VerySafe.to_string(), "VERY_SAFE");
    }

    #[test]
    fn incident_parses_category() {
        let incident: CrimeIncident =
            serde_json::from_str(r#"{"occurredOn": "2026-03-14", "category": "VIOLENT"}"#)
                .unwrap();
        assert!(incident.category.is_violent());
        assert!(!CrimeCategory::Property.is_violent());
    }
}
