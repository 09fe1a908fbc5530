#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zoning table schema and land-use category types.
//!
//! Each incorporated town publishes its own zoning ordinance. The tables
//! are stored as TOML (one file per town) and deserialize into
//! [`ZoningTableSource`]. Every district carries a [`LandUseCategory`] so
//! that districts from different ordinances can be compared.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Broad land-use category of a zoning district.
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
pub enum LandUseCategory {
    /// Single-family, townhouse, and multifamily districts
    Residential,
    /// Retail, office, and general business districts
    Commercial,
    /// Light and general industrial, employment, and warehouse districts
    Industrial,
    /// Districts that explicitly combine residential and commercial uses
    MixedUse,
    /// Agricultural and rural preservation districts
    Agricultural,
    /// Government, school, and public-facility districts
    Institutional,
    /// Overlays, open space, and anything else
    Other,
}

impl LandUseCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Residential,
            Self::Commercial,
            Self::Industrial,
            Self::MixedUse,
            Self::Agricultural,
            Self::Institutional,
            Self::Other,
        ]
    }
}

/// One district of a zoning ordinance.
///
/// Serializes as camelCase; the snake_case keys used by the TOML tables
/// are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoningEntry {
    /// District code as published (e.g. "R-1", "B-2").
    pub code: String,
    /// Human-readable district name.
    pub description: String,
    /// Land-use category used for neighborhood comparisons.
    pub category: LandUseCategory,
    /// Minimum lot size as published (e.g. "20,000 sq ft"), if the
    /// ordinance sets one.
    #[serde(default, alias = "min_lot_size", skip_serializing_if = "Option::is_none")]
    pub min_lot_size: Option<String>,
    /// Uses permitted by right, in ordinance order.
    #[serde(default, alias = "permitted_uses")]
    pub permitted_uses: Vec<String>,
}

/// A jurisdiction's zoning table as written in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoningTableSource {
    /// Town name, matching the boundary data.
    pub jurisdiction: String,
    /// Districts in ordinance order.
    #[serde(default)]
    pub zones: Vec<ZoningEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_string_roundtrip() {
        for category in LandUseCategory::all() {
            let parsed = LandUseCategory::from_str(category.as_ref()).unwrap();
            assert_eq!(parsed, *category);
        }
        assert_eq!(LandUseCategory::MixedUse.to_string(), "mixed_use");
    }

    #[test]
    fn parses_table_source() {
        let source: ZoningTableSource = toml::de::from_str(
            r#"
            jurisdiction = "Testville"

            [[zones]]
            code = "R-1"
            description = "Single-Family Residential"
            category = "residential"
            min_lot_size = "20,000 sq ft"
            permitted_uses = ["Single-family detached dwelling"]

            [[zones]]
            code = "MX"
            description = "Mixed Use"
            category = "mixed_use"
            "#,
        )
        .unwrap();

        assert_eq!(source.jurisdiction, "Testville");
        assert_eq!(source.zones.len(), 2);
        assert_eq!(source.zones[0].min_lot_size.as_deref(), Some("20,000 sq ft"));
        assert_eq!(source.zones[1].category, LandUseCategory::MixedUse);
        assert!(source.zones[1].permitted_uses.is_empty());
        assert!(source.zones[1].min_lot_size.is_none());
    }
}
