#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood zoning aggregation.
//!
//! Compares a target parcel's zoning against the parcels around it to
//! classify how uniform the neighborhood is and to flag nearby land uses a
//! buyer would want to know about. Partial data degrades the result rather
//! than failing it: uncatalogued codes fall back to their raw shape.

pub mod concerns;

use std::collections::BTreeSet;

use area_report_neighborhood_models::{
    ConcernFlag, DiversityLabel, NearbyParcel, NearbyZoningResult, Parcel,
};
use area_report_zoning::{
    ZoningCodeResolver, classify_raw_code, is_high_traffic_use, is_industrial_use, normalize_code,
};
use area_report_zoning_models::{LandUseCategory, ZoningEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ratios strictly below this are uniform.
pub const UNIFORM_MAX_EXCLUSIVE: f64 = 0.03;
/// Ratios up to and including this (and at least the uniform cutoff) are
/// mixed; anything above is transitional.
pub const MIXED_MAX_INCLUSIVE: f64 = 0.06;

/// Errors from diversity policy validation.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A policy value is out of range.
    #[error("Invalid diversity policy: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
}

/// Diversity label cut points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityPolicy {
    pub uniform_max_exclusive: f64,
    pub mixed_max_inclusive: f64,
}

impl Default for DiversityPolicy {
    fn default() -> Self {
        Self {
            uniform_max_exclusive: UNIFORM_MAX_EXCLUSIVE,
            mixed_max_inclusive: MIXED_MAX_INCLUSIVE,
        }
    }
}

impl DiversityPolicy {
    /// Checks `0 <= uniform cutoff <= mixed cutoff <= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Invalid`] if the cut points are out of order
    /// or outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let (low, high) = (self.uniform_max_exclusive, self.mixed_max_inclusive);
        if !(low.is_finite() && high.is_finite() && 0.0 <= low && low <= high && high <= 1.0) {
            return Err(PolicyError::Invalid {
                message: format!(
                    "cut points must satisfy 0 <= uniform ({low}) <= mixed ({high}) <= 1"
                ),
            });
        }
        Ok(())
    }

    /// Labels a ratio. Only meaningful when at least one nearby parcel was
    /// resolvable.
    #[must_use]
    pub fn label_for(&self, ratio: f64) -> DiversityLabel {
        if ratio < self.uniform_max_exclusive {
            DiversityLabel::Uniform
        } else if ratio <= self.mixed_max_inclusive {
            DiversityLabel::Mixed
        } else {
            DiversityLabel::Transitional
        }
    }
}

/// Presence of land-use signals across the nearby parcels.
#[derive(Debug, Default)]
struct Signals {
    commercial: bool,
    industrial: bool,
    mixed_use: bool,
    high_traffic: bool,
}

impl Signals {
    fn observe_category(&mut self, category: Option<LandUseCategory>) {
        match category {
            Some(LandUseCategory::Commercial) => self.commercial = true,
            Some(LandUseCategory::Industrial) => self.industrial = true,
            Some(LandUseCategory::MixedUse) => self.mixed_use = true,
            _ => {}
        }
    }

    fn observe_uses(&mut self, entry: &ZoningEntry) {
        for permitted_use in &entry.permitted_uses {
            self.industrial |= is_industrial_use(permitted_use);
            self.high_traffic |= is_high_traffic_use(permitted_use);
        }
    }

    fn flags(&self) -> BTreeSet<ConcernFlag> {
        let mut flags = BTreeSet::new();
        if self.industrial {
            flags.insert(ConcernFlag::IndustrialNearby);
        }
        if self.commercial {
            flags.insert(ConcernFlag::CommercialNearby);
        } else if self.mixed_use {
            flags.insert(ConcernFlag::MixedUseNearby);
        }
        if self.high_traffic {
            flags.insert(ConcernFlag::HighTrafficNearby);
        }
        flags
    }
}

/// Aggregates nearby parcel zoning around a target parcel.
pub struct NeighborhoodAggregator<'a> {
    resolver: &'a ZoningCodeResolver,
    policy: DiversityPolicy,
}

impl<'a> NeighborhoodAggregator<'a> {
    #[must_use]
    pub const fn new(resolver: &'a ZoningCodeResolver, policy: DiversityPolicy) -> Self {
        Self { resolver, policy }
    }

    /// Resolves a parcel's zoning district.
    ///
    /// Town parcels are looked up in the static tables first; anything the
    /// tables do not know (including every county parcel) falls back to the
    /// entry pre-resolved by the parcel API, if there is one.
    #[must_use]
    pub fn resolve_zoning(&self, parcel: &Parcel) -> Option<ZoningEntry> {
        match self
            .resolver
            .resolve(&parcel.jurisdiction, &parcel.zoning_code)
        {
            Ok(entry) => Some(entry.clone()),
            Err(e) => {
                if parcel.zoning_entry.is_none() {
                    log::debug!("Parcel {}: {e}", parcel.id);
                }
                parcel.zoning_entry.clone()
            }
        }
    }

    /// Compares `target` against `nearby`.
    ///
    /// Never fails: an unresolvable target is compared by the category its
    /// raw code suggests (or, failing that, by raw code), and unresolvable
    /// nearby parcels are left out of the ratio but still contribute
    /// commercial, industrial, and mixed-use signals from their raw code.
    #[must_use]
    pub fn aggregate(&self, target: &Parcel, nearby: &[Parcel]) -> NearbyZoningResult {
        let target_code = normalize_code(&target.zoning_code);
        let target_zoning = self.resolve_zoning(target);
        let target_category = target_zoning
            .as_ref()
            .map(|entry| entry.category)
            .or_else(|| classify_raw_code(&target_code));

        if target_zoning.is_none() {
            log::warn!(
                "Target parcel {} zoning {target_code:?} is not catalogued; comparing by {}",
                target.id,
                target_category.map_or("raw code", |_| "raw code category")
            );
        }

        let mut signals = Signals::default();
        let mut resolvable_count = 0usize;
        let mut differing_count = 0usize;
        let mut parcels = Vec::with_capacity(nearby.len());

        for parcel in nearby {
            let zoning_code = normalize_code(&parcel.zoning_code);
            let zoning = self.resolve_zoning(parcel);
            let category = zoning
                .as_ref()
                .map(|entry| entry.category)
                .or_else(|| classify_raw_code(&zoning_code));

            if let Some(entry) = &zoning {
                resolvable_count += 1;
                let differs = target_category.map_or_else(
                    || zoning_code != target_code,
                    |target_category| entry.category != target_category,
                );
                if differs {
                    differing_count += 1;
                }
                signals.observe_uses(entry);
            }
            signals.observe_category(category);

            parcels.push(NearbyParcel {
                id: parcel.id.clone(),
                jurisdiction: parcel.jurisdiction.clone(),
                zoning_code,
                zoning,
                category,
            });
        }

        let (diversity_ratio, diversity_label) = if resolvable_count == 0 {
            (0.0, DiversityLabel::InsufficientData)
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = differing_count as f64 / resolvable_count as f64;
            (ratio, self.policy.label_for(ratio))
        };

        let concern_flags = signals.flags();
        let concerns = concerns::count_concerns(&concern_flags);

        log::debug!(
            "Neighborhood of {}: {differing_count}/{resolvable_count} differing ({}), flags {concern_flags:?}",
            target.id,
            diversity_label.label()
        );

        NearbyZoningResult {
            target_code,
            target_zoning,
            target_category,
            nearby: parcels,
            resolvable_count,
            differing_count,
            diversity_ratio,
            diversity_label,
            concern_flags,
            concerns,
            has_commercial: signals.commercial,
            has_industrial: signals.industrial,
            has_mixed_use: signals.mixed_use,
        }
    }
}
