#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime safety scoring.
//!
//! Converts [`CrimeStatistics`] into a [`SafetyAssessment`]: a score from
//! 0 to 100 and a qualitative [`SafetyLevel`]. Scoring is a pure function of
//! the statistics and the [`SafetyPolicy`].
//!
//! The penalty is `scale * sqrt(load)` where the load weights violent
//! incidents more heavily: `load = incidents * (1 + weight * violent_share)`,
//! which is `incidents + weight * violent`. Counts are scaled to the
//! reference window of [`DEFAULT_WINDOW_DAYS`] days first, so the load is a
//! density and a shorter window with the same counts never scores higher.
//! The square root keeps the curve concave, and the load is non-decreasing
//! in both counts, so neither more incidents nor more violent incidents can
//! raise a score.

pub mod stats;

use area_report_crime_models::{
    CrimeStatistics, DEFAULT_WINDOW_DAYS, SafetyAssessment, SafetyLevel,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use stats::tally_incidents;

/// Multiplier applied to the square root of the incident load.
pub const DEFAULT_PENALTY_SCALE: f64 = 4.0;
/// Extra load contributed by each violent incident.
pub const DEFAULT_VIOLENT_WEIGHT: f64 = 3.0;
/// Lowest score in the [`SafetyLevel::VerySafe`] band.
pub const DEFAULT_VERY_SAFE_MIN: u8 = 60;
/// Lowest score in the [`SafetyLevel::ModerateRisk`] band.
pub const DEFAULT_MODERATE_MIN: u8 = 30;

/// Errors from safety policy validation.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A policy value is out of range.
    #[error("Invalid safety policy: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
}

/// Scoring constants and band cut points.
///
/// A score equal to a cut point belongs to the band above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyPolicy {
    pub penalty_scale: f64,
    pub violent_weight: f64,
    pub very_safe_min: u8,
    pub moderate_min: u8,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            penalty_scale: DEFAULT_PENALTY_SCALE,
            violent_weight: DEFAULT_VIOLENT_WEIGHT,
            very_safe_min: DEFAULT_VERY_SAFE_MIN,
            moderate_min: DEFAULT_MODERATE_MIN,
        }
    }
}

impl SafetyPolicy {
    /// Checks that the bands partition `0..=100` and the curve is monotone.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let invalid = |message: String| Err(PolicyError::Invalid { message });

        if !self.penalty_scale.is_finite() || self.penalty_scale < 0.0 {
            return invalid(format!(
                "penalty_scale must be finite and >= 0, got {}",
                self.penalty_scale
            ));
        }
        if !self.violent_weight.is_finite() || self.violent_weight < 0.0 {
            return invalid(format!(
                "violent_weight must be finite and >= 0, got {}",
                self.violent_weight
            ));
        }
        if self.moderate_min == 0
            || self.moderate_min >= self.very_safe_min
            || self.very_safe_min > 100
        {
            return invalid(format!(
                "bands must satisfy 0 < moderate_min < very_safe_min <= 100, got {} and {}",
                self.moderate_min, self.very_safe_min
            ));
        }

        Ok(())
    }

    /// Maps a score to its band.
    #[must_use]
    pub const fn level_for(&self, score: u8) -> SafetyLevel {
        if score >= self.very_safe_min {
            SafetyLevel::VerySafe
        } else if score >= self.moderate_min {
            SafetyLevel::ModerateRisk
        } else {
            SafetyLevel::HighRisk
        }
    }
}

/// Deterministic crime safety scorer.
#[derive(Debug, Clone, Default)]
pub struct CrimeSafetyScorer {
    policy: SafetyPolicy,
}

impl CrimeSafetyScorer {
    #[must_use]
    pub const fn new(policy: SafetyPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &SafetyPolicy {
        &self.policy
    }

    /// Scores a set of statistics.
    ///
    /// A missing violent count is treated as zero. A violent count larger
    /// than the total is clamped to the total.
    #[must_use]
    pub fn score(&self, stats: &CrimeStatistics) -> SafetyAssessment {
        let reported_violent = stats.violent_incidents.unwrap_or(0);
        if reported_violent > stats.incidents {
            log::warn!(
                "Violent incident count {reported_violent} exceeds total {}; clamping",
                stats.incidents
            );
        }
        let violent = reported_violent.min(stats.incidents);

        let raw_load = f64::from(stats.incidents) + self.policy.violent_weight * f64::from(violent);
        // Scale to a density over the reference window.
        let load = raw_load * f64::from(DEFAULT_WINDOW_DAYS) / f64::from(stats.window_days.max(1));
        let penalty = self.policy.penalty_scale * load.sqrt();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let score = (100.0 - penalty).round().clamp(0.0, 100.0) as u8;

        SafetyAssessment {
            score,
            level: self.policy.level_for(score),
            incidents: stats.incidents,
            violent_incidents: (violent > 0).then_some(violent),
            trend_percent: stats.trend_percent,
            window_days: stats.window_days,
        }
    }
}
