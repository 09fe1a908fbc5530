#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parcel and neighborhood zoning result types.
//!
//! A [`Parcel`] is a single addressable land unit whose jurisdiction has
//! already been resolved. The aggregator compares a target parcel against
//! its neighbors and produces a [`NearbyZoningResult`].

use std::collections::BTreeSet;

use area_report_geography_models::{Jurisdiction, Point};
use area_report_zoning_models::{LandUseCategory, ZoningEntry};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A land parcel with its resolved jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    /// Address or parcel identifier.
    pub id: String,
    pub location: Point,
    /// Zoning code as reported by the parcel API.
    pub zoning_code: String,
    /// Zoning already resolved by the parcel API. County parcels arrive this
    /// way; town parcels are resolved against the static tables instead.
    #[serde(default)]
    pub zoning_entry: Option<ZoningEntry>,
    /// Jurisdiction the parcel's location falls in.
    pub jurisdiction: Jurisdiction,
}

/// Land-use signal raised by the neighborhood aggregation.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConcernFlag {
    /// A nearby parcel permits industrial uses.
    IndustrialNearby,
    /// A nearby parcel is commercially zoned.
    CommercialNearby,
    /// A nearby parcel is mixed-use (only raised without commercial).
    MixedUseNearby,
    /// A nearby parcel permits high-traffic uses (drive-throughs, fuel).
    HighTrafficNearby,
}

impl ConcernFlag {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::IndustrialNearby,
            Self::CommercialNearby,
            Self::MixedUseNearby,
            Self::HighTrafficNearby,
        ]
    }
}

/// Zoning diversity classification of a neighborhood.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiversityLabel {
    Uniform,
    Mixed,
    Transitional,
    /// No nearby parcel could be resolved.
    InsufficientData,
}

impl DiversityLabel {
    /// Display label for the dashboard.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uniform => "Uniform (low diversity)",
            Self::Mixed => "Mixed (moderate diversity)",
            Self::Transitional => "Transitional (high diversity)",
            Self::InsufficientData => "insufficient data",
        }
    }
}

/// A nearby parcel with whatever zoning could be resolved for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyParcel {
    pub id: String,
    pub jurisdiction: Jurisdiction,
    /// Normalized zoning code.
    pub zoning_code: String,
    /// Resolved district, if catalogued.
    pub zoning: Option<ZoningEntry>,
    /// Category from the resolved district, or guessed from the raw code.
    pub category: Option<LandUseCategory>,
}

/// Neighborhood zoning comparison for a target parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyZoningResult {
    /// Normalized zoning code of the target parcel.
    pub target_code: String,
    /// Resolved district of the target parcel, if catalogued.
    pub target_zoning: Option<ZoningEntry>,
    /// Category the comparison was made against.
    pub target_category: Option<LandUseCategory>,
    pub nearby: Vec<NearbyParcel>,
    /// Nearby parcels with a resolved district (the ratio's denominator).
    pub resolvable_count: usize,
    /// Resolved nearby parcels whose category differs from the target's.
    pub differing_count: usize,
    /// `differing_count / resolvable_count`, or 0 without data.
    pub diversity_ratio: f64,
    pub diversity_label: DiversityLabel,
    pub concern_flags: BTreeSet<ConcernFlag>,
    /// Number of flags classified as concerns by the concern policy.
    pub concerns: usize,
    pub has_commercial: bool,
    pub has_industrial: bool,
    pub has_mixed_use: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_serialize_as_snake_case() {
        let json = serde_json::to_string(&ConcernFlag::IndustrialNearby).unwrap();
        assert_eq!(json, r#""industrial_nearby""#);
        assert_eq!(ConcernFlag::MixedUseNearby.to_string(), "mixed_use_nearby");
    }

    #[test]
    fn all_flags_are_distinct_and_parse() {
        let all = ConcernFlag::all();
        let unique: BTreeSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
        for flag in all {
            assert_eq!(flag.to_string().parse::<ConcernFlag>().unwrap(), *flag);
        }
    }

    #[test]
    fn diversity_labels() {
        assert_eq!(DiversityLabel::Uniform.label(), "Uniform (low diversity)");
        assert_eq!(DiversityLabel::Mixed.label(), "Mixed (moderate diversity)");
        assert_eq!(
            DiversityLabel::Transitional.label(),
            "Transitional (high diversity)"
        );
        assert_eq!(DiversityLabel::InsufficientData.label(), "insufficient data");
    }
}
