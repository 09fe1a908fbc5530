#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zoning code resolution for incorporated towns.
//!
//! Each incorporated town has a static zoning table, embedded at compile
//! time from `tables/` following the same registry pattern as the town
//! boundaries. A [`ZoningCodeResolver`] maps a `(jurisdiction, code)` pair
//! to its [`ZoningEntry`]. Unincorporated county zoning is resolved
//! upstream by the live parcel API and never goes through a static table.

pub mod classify;
pub mod registry;

use std::collections::BTreeMap;

use area_report_geography_models::Jurisdiction;
use area_report_zoning_models::{ZoningEntry, ZoningTableSource};
use thiserror::Error;

pub use classify::{classify_raw_code, is_high_traffic_use, is_industrial_use};

/// Errors that can occur while loading or querying zoning tables.
#[derive(Debug, Error)]
pub enum ZoningError {
    /// The jurisdiction's table has no entry for the code.
    #[error("Zoning code {code:?} is not catalogued for {jurisdiction}")]
    UnknownZoningCode {
        /// Jurisdiction that was searched.
        jurisdiction: String,
        /// Normalized code that was looked up.
        code: String,
    },

    /// A table lists the same code twice.
    #[error("Duplicate zoning code {code:?} in the {jurisdiction} table")]
    DuplicateCode {
        /// Table containing the duplicate.
        jurisdiction: String,
        /// Normalized duplicate code.
        code: String,
    },

    /// Two tables claim the same jurisdiction.
    #[error("Duplicate zoning table for {jurisdiction}")]
    DuplicateJurisdiction {
        /// The repeated jurisdiction name.
        jurisdiction: String,
    },

    /// A zoning table file could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Normalizes a zoning code for lookup: trimmed and uppercased.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// A single jurisdiction's zoning table, keyed by normalized code.
#[derive(Debug, Clone)]
pub struct ZoningTable {
    jurisdiction: String,
    entries: BTreeMap<String, ZoningEntry>,
}

impl ZoningTable {
    /// Builds a table from its TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`ZoningError::DuplicateCode`] if two districts normalize to
    /// the same code.
    pub fn from_source(source: ZoningTableSource) -> Result<Self, ZoningError> {
        let mut entries = BTreeMap::new();

        for zone in source.zones {
            let key = normalize_code(&zone.code);
            if entries.contains_key(&key) {
                return Err(ZoningError::DuplicateCode {
                    jurisdiction: source.jurisdiction,
                    code: key,
                });
            }
            entries.insert(key, zone);
        }

        Ok(Self {
            jurisdiction: source.jurisdiction,
            entries,
        })
    }

    /// Parses and builds a table from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or contains duplicate codes.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ZoningError> {
        let source: ZoningTableSource = toml::de::from_str(toml_str)?;
        Self::from_source(source)
    }

    /// Looks up a code (normalized before lookup).
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&ZoningEntry> {
        self.entries.get(&normalize_code(code))
    }

    #[must_use]
    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    /// Entries ordered by normalized code.
    pub fn entries(&self) -> impl Iterator<Item = &ZoningEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves zoning codes against per-town tables.
///
/// Tables are immutable after construction; the resolver can be shared
/// freely between threads.
#[derive(Debug, Clone)]
pub struct ZoningCodeResolver {
    tables: BTreeMap<String, ZoningTable>,
}

impl ZoningCodeResolver {
    /// Builds a resolver from already-validated tables.
    ///
    /// # Errors
    ///
    /// Returns [`ZoningError::DuplicateJurisdiction`] if two tables share a
    /// jurisdiction name.
    pub fn new(tables: Vec<ZoningTable>) -> Result<Self, ZoningError> {
        let mut by_name = BTreeMap::new();

        for table in tables {
            if by_name.contains_key(&table.jurisdiction) {
                return Err(ZoningError::DuplicateJurisdiction {
                    jurisdiction: table.jurisdiction,
                });
            }
            by_name.insert(table.jurisdiction.clone(), table);
        }

        log::info!(
            "Loaded {} zoning tables ({} codes)",
            by_name.len(),
            by_name.values().map(ZoningTable::len).sum::<usize>()
        );

        Ok(Self { tables: by_name })
    }

    /// Builds a resolver from raw table sources.
    ///
    /// # Errors
    ///
    /// Returns an error if any table has duplicate codes or two tables share
    /// a jurisdiction.
    pub fn from_sources(sources: Vec<ZoningTableSource>) -> Result<Self, ZoningError> {
        let tables = sources
            .into_iter()
            .map(ZoningTable::from_source)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tables)
    }

    /// Loads the embedded tables for every incorporated town.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded tables are inconsistent.
    pub fn embedded() -> Result<Self, ZoningError> {
        Self::from_sources(registry::all_table_sources())
    }

    /// Resolves `code` within `jurisdiction`'s table.
    ///
    /// # Errors
    ///
    /// Returns [`ZoningError::UnknownZoningCode`] if the table has no entry
    /// for the normalized code, or if the jurisdiction has no static table
    /// (always the case for [`Jurisdiction::County`]).
    pub fn resolve(
        &self,
        jurisdiction: &Jurisdiction,
        code: &str,
    ) -> Result<&ZoningEntry, ZoningError> {
        let unknown = || ZoningError::UnknownZoningCode {
            jurisdiction: jurisdiction.name().to_string(),
            code: normalize_code(code),
        };

        let Jurisdiction::Town { name } = jurisdiction else {
            return Err(unknown());
        };

        self.tables
            .get(name)
            .and_then(|table| table.get(code))
            .ok_or_else(unknown)
    }

    /// Returns the table for a town, if one is loaded.
    #[must_use]
    pub fn table(&self, town: &str) -> Option<&ZoningTable> {
        self.tables.get(town)
    }

    /// All loaded tables, ordered by jurisdiction name.
    pub fn tables(&self) -> impl Iterator<Item = &ZoningTable> {
        self.tables.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_report_zoning_models::LandUseCategory;

    fn entry(code: &str, category: LandUseCategory) -> ZoningEntry {
        ZoningEntry {
            code: code.to_string(),
            description: format!("{code} district"),
            category,
            min_lot_size: None,
            permitted_uses: vec!["Use".to_string()],
        }
    }

    fn source(jurisdiction: &str, zones: Vec<ZoningEntry>) -> ZoningTableSource {
        ZoningTableSource {
            jurisdiction: jurisdiction.to_string(),
            zones,
        }
    }

    #[test]
    fn resolves_exact_stored_entry() {
        let resolver = ZoningCodeResolver::embedded().unwrap();
        let town = Jurisdiction::town("Leesburg");

        for stored in resolver.table("Leesburg").unwrap().entries() {
            let resolved = resolver.resolve(&town, &stored.code).unwrap();
            assert_eq!(resolved, stored);
        }
    }

    #[test]
    fn normalizes_before_lookup() {
        let resolver = ZoningCodeResolver::embedded().unwrap();
        let town = Jurisdiction::town("Leesburg");

        let entry = resolver.resolve(&town, "  r-1 ").unwrap();
        assert_eq!(entry.code, "R-1");
        assert_eq!(entry.category, LandUseCategory::Residential);
        assert_eq!(entry.min_lot_size.as_deref(), Some("20,000 sq ft"));
    }

    #[test]
    fn absent_code_is_unknown() {
        let resolver = ZoningCodeResolver::embedded().unwrap();
        let err = resolver
            .resolve(&Jurisdiction::town("Hamilton"), "b-9")
            .unwrap_err();
        match err {
            ZoningError::UnknownZoningCode { jurisdiction, code } => {
                assert_eq!(jurisdiction, "Hamilton");
                assert_eq!(code, "B-9");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn county_and_unknown_towns_have_no_table() {
        let resolver = ZoningCodeResolver::embedded().unwrap();
        assert!(matches!(
            resolver.resolve(&Jurisdiction::County, "R-1"),
            Err(ZoningError::UnknownZoningCode { .. })
        ));
        assert!(matches!(
            resolver.resolve(&Jurisdiction::town("Ashburn"), "R-1"),
            Err(ZoningError::UnknownZoningCode { .. })
        ));
    }

    #[test]
    fn same_code_differs_by_jurisdiction() {
        let resolver = ZoningCodeResolver::embedded().unwrap();
        let lovettsville = resolver
            .resolve(&Jurisdiction::town("Lovettsville"), "TC")
            .unwrap();
        let round_hill = resolver
            .resolve(&Jurisdiction::town("Round Hill"), "TC")
            .unwrap();
        assert_eq!(lovettsville.category, LandUseCategory::MixedUse);
        assert_eq!(round_hill.category, LandUseCategory::Commercial);
    }

    #[test]
    fn rejects_duplicate_codes() {
        let result = ZoningTable::from_source(source(
            "Dupes",
            vec![
                entry("R-1", LandUseCategory::Residential),
                entry(" r-1", LandUseCategory::Residential),
            ],
        ));
        assert!(matches!(result, Err(ZoningError::DuplicateCode { .. })));
    }

    #[test]
    fn rejects_duplicate_jurisdictions() {
        let result = ZoningCodeResolver::from_sources(vec![
            source("Twin", vec![entry("R-1", LandUseCategory::Residential)]),
            source("Twin", vec![entry("C-1", LandUseCategory::Commercial)]),
        ]);
        assert!(matches!(
            result,
            Err(ZoningError::DuplicateJurisdiction { .. })
        ));
    }

    #[test]
    fn parses_table_from_toml() {
        let table = ZoningTable::from_toml_str(
            r#"
            jurisdiction = "Testville"

            [[zones]]
            code = "i-2"
            description = "Heavy Industrial"
            category = "industrial"
            permitted_uses = ["Manufacturing"]
            "#,
        )
        .unwrap();
        assert_eq!(table.jurisdiction(), "Testville");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("I-2").unwrap().description, "Heavy Industrial");
    }
}
