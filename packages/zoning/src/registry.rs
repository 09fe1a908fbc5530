//! Compile-time registry of incorporated-town zoning tables.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a town requires creating a TOML file in `tables/` and adding a
//! corresponding entry here. Unincorporated county zoning comes from the
//! live parcel API and has no table.

use area_report_zoning_models::ZoningTableSource;

/// Number of incorporated towns with a static table. Enforced by a test.
#[cfg(test)]
const EXPECTED_TABLE_COUNT: usize = 7;

/// Embedded TOML zoning tables.
const TABLE_TOMLS: &[(&str, &str)] = &[
    ("leesburg", include_str!("../tables/leesburg.toml")),
    ("purcellville", include_str!("../tables/purcellville.toml")),
    ("hamilton", include_str!("../tables/hamilton.toml")),
    ("hillsboro", include_str!("../tables/hillsboro.toml")),
    ("lovettsville", include_str!("../tables/lovettsville.toml")),
    ("middleburg", include_str!("../tables/middleburg.toml")),
    ("round_hill", include_str!("../tables/round_hill.toml")),
];

/// Returns all embedded zoning table sources.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_table_sources() -> Vec<ZoningTableSource> {
    TABLE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse zoning table '{name}': {e}"))
        })
        .collect()
}
