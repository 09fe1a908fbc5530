#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Area report builder.
//!
//! Ties the jurisdiction index, zoning resolver, neighborhood aggregator,
//! and safety scorer together into one [`AreaReport`] per address.
//!
//! Reference data ([`ReferenceData`]) is loaded once at startup and shared
//! read-only behind an [`Arc`]; each [`AreaReportBuilder::build`] call is
//! independent and synchronous. Only an address that cannot be placed
//! inside the county fails a build. Every other gap (an upstream source
//! that failed, an uncatalogued zoning code) produces an explicitly absent
//! or degraded section.

pub mod config;

use std::sync::Arc;

use area_report_crime::CrimeSafetyScorer;
use area_report_geography_models::Point;
use area_report_neighborhood::{DiversityPolicy, NeighborhoodAggregator};
use area_report_neighborhood_models::{NearbyZoningResult, Parcel};
use area_report_report_models::{
    AreaQuery, AreaReport, ParcelRecord, Section, UpstreamData, UpstreamSource, ZoningRecord,
    ZoningResolution, ZoningSummary,
};
use area_report_spatial::{GeoBoundaryIndex, SpatialError};
use area_report_zoning::{ZoningCodeResolver, ZoningError, classify_raw_code, normalize_code};
use thiserror::Error;

pub use config::EngineConfig;

/// Errors that can occur while loading reference data or building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The address has no usable coordinate in the county.
    #[error("Invalid coordinate for {address:?}: {}", describe_location(*.location))]
    InvalidCoordinate {
        /// Address as queried.
        address: String,
        /// The rejected coordinate, or `None` if geocoding failed.
        location: Option<Point>,
    },

    /// Boundary data failed to load.
    #[error("Spatial error: {0}")]
    Spatial(#[from] SpatialError),

    /// Zoning tables failed to load.
    #[error("Zoning error: {0}")]
    Zoning(#[from] ZoningError),

    /// Safety policy is invalid.
    #[error("Configuration error: {0}")]
    SafetyPolicy(#[from] area_report_crime::PolicyError),

    /// Diversity policy is invalid.
    #[error("Configuration error: {0}")]
    DiversityPolicy(#[from] area_report_neighborhood::PolicyError),

    /// A file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn describe_location(location: Option<Point>) -> String {
    location.map_or_else(
        || "address could not be geocoded".to_string(),
        |point| format!("{point} is outside the county"),
    )
}

/// Read-only reference data shared by every build.
pub struct ReferenceData {
    pub boundaries: GeoBoundaryIndex,
    pub zoning: ZoningCodeResolver,
}

impl ReferenceData {
    /// Loads the bundled Loudoun County boundaries and zoning tables.
    ///
    /// # Errors
    ///
    /// Returns an error if any embedded data fails to load.
    pub fn embedded() -> Result<Self, ReportError> {
        Ok(Self {
            boundaries: GeoBoundaryIndex::embedded()?,
            zoning: ZoningCodeResolver::embedded()?,
        })
    }
}

/// Builds [`AreaReport`]s against shared reference data.
pub struct AreaReportBuilder {
    reference: Arc<ReferenceData>,
    scorer: CrimeSafetyScorer,
    diversity: DiversityPolicy,
}

impl AreaReportBuilder {
    /// Creates a builder after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(reference: Arc<ReferenceData>, config: EngineConfig) -> Result<Self, ReportError> {
        config.validate()?;
        Ok(Self {
            reference,
            scorer: CrimeSafetyScorer::new(config.safety),
            diversity: config.diversity,
        })
    }

    #[must_use]
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Builds the report for one address.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidCoordinate`] if the query has no
    /// location or the location is outside the county. No other condition
    /// fails a build.
    pub fn build(
        &self,
        query: &AreaQuery,
        upstream: &UpstreamData,
    ) -> Result<AreaReport, ReportError> {
        let invalid = |location: Option<Point>| ReportError::InvalidCoordinate {
            address: query.address.clone(),
            location,
        };

        let location = query.location.ok_or_else(|| invalid(None))?;
        let jurisdiction = self
            .reference
            .boundaries
            .resolve_jurisdiction(location)
            .map_err(|e| {
                log::debug!("Rejecting {:?}: {e}", query.address);
                invalid(Some(location))
            })?;

        log::debug!("Building report for {:?} in {jurisdiction}", query.address);

        let aggregator = NeighborhoodAggregator::new(&self.reference.zoning, self.diversity.clone());

        let target = upstream.parcel_zoning.as_ref().map(|record| Parcel {
            id: query.address.clone(),
            location,
            zoning_code: record.code.clone(),
            zoning_entry: record.entry.clone(),
            jurisdiction: jurisdiction.clone(),
        });

        let zoning = match &target {
            Ok(parcel) => Section::Present(summarize_zoning(&aggregator, parcel)),
            Err(e) => Section::Absent((*e).into()),
        };

        let schools = match &upstream.schools {
            Ok(assignment) if assignment.schools.is_empty() => Section::absent(
                UpstreamSource::Schools,
                "no assigned schools returned".to_string(),
            ),
            Ok(assignment) => Section::Present(assignment.clone()),
            Err(e) => Section::Absent(e.into()),
        };

        let safety = match &upstream.crime {
            Ok(stats) => Section::Present(self.scorer.score(stats)),
            Err(e) => Section::Absent(e.into()),
        };

        let neighborhood = match (&target, &upstream.nearby_parcels) {
            (_, Err(e)) => Section::Absent(e.into()),
            (Err(_), Ok(_)) => Section::absent(
                UpstreamSource::ParcelZoning,
                "subject parcel zoning is required for the neighborhood comparison".to_string(),
            ),
            (Ok(target), Ok(records)) => self.neighborhood(&aggregator, target, records),
        };

        for (name, present) in [
            ("zoning", zoning.is_present()),
            ("schools", schools.is_present()),
            ("safety", safety.is_present()),
            ("neighborhood", neighborhood.is_present()),
        ] {
            if !present {
                log::info!("Report for {:?}: {name} section absent", query.address);
            }
        }

        Ok(AreaReport {
            address: query.address.clone(),
            location,
            jurisdiction,
            zoning,
            schools,
            safety,
            neighborhood,
        })
    }

    fn neighborhood(
        &self,
        aggregator: &NeighborhoodAggregator<'_>,
        target: &Parcel,
        records: &[ParcelRecord],
    ) -> Section<NearbyZoningResult> {
        let nearby: Vec<Parcel> = records
            .iter()
            .filter_map(|record| self.locate_parcel(record))
            .collect();

        if nearby.is_empty() {
            let reason = if records.is_empty() {
                "no nearby parcels returned"
            } else {
                "all nearby parcels were outside the county"
            };
            return Section::absent(UpstreamSource::NearbyParcels, reason.to_string());
        }

        Section::Present(aggregator.aggregate(target, &nearby))
    }

    /// Resolves a nearby parcel's jurisdiction. Parcels outside the county
    /// are dropped.
    fn locate_parcel(&self, record: &ParcelRecord) -> Option<Parcel> {
        let ParcelRecord {
            id,
            location,
            zoning: ZoningRecord { code, entry },
        } = record;

        match self.reference.boundaries.resolve_jurisdiction(*location) {
            Ok(jurisdiction) => Some(Parcel {
                id: id.clone(),
                location: *location,
                zoning_code: code.clone(),
                zoning_entry: entry.clone(),
                jurisdiction,
            }),
            Err(e) => {
                log::warn!("Dropping nearby parcel {id}: {e}");
                None
            }
        }
    }
}

fn summarize_zoning(aggregator: &NeighborhoodAggregator<'_>, parcel: &Parcel) -> ZoningSummary {
    let code = normalize_code(&parcel.zoning_code);
    let resolution = aggregator.resolve_zoning(parcel).map_or_else(
        || {
            log::warn!(
                "Zoning code {code:?} is not catalogued for {}",
                parcel.jurisdiction
            );
            ZoningResolution::Uncatalogued {
                category_hint: classify_raw_code(&code),
            }
        },
        |entry| ZoningResolution::Catalogued { entry },
    );

    ZoningSummary {
        code,
        jurisdiction: parcel.jurisdiction.clone(),
        resolution,
    }
}

#[cfg(test)]
mod tests {
    use area_report_crime_models::{CrimeStatistics, SafetyLevel};
    use area_report_geography_models::Jurisdiction;
    use area_report_neighborhood_models::{ConcernFlag, DiversityLabel};
    use area_report_report_models::{
        AssignedSchool, SchoolAssignment, SchoolLevel, UpstreamDataUnavailable,
    };
    use area_report_zoning_models::LandUseCategory;

    use super::*;

    const LEESBURG: Point = Point {
        latitude: 39.1157,
        longitude: -77.5636,
    };
    const ASHBURN: Point = Point {
        latitude: 39.0437,
        longitude: -77.4875,
    };

    fn builder() -> AreaReportBuilder {
        let reference = Arc::new(ReferenceData::embedded().unwrap());
        AreaReportBuilder::new(reference, EngineConfig::default()).unwrap()
    }

    fn query(location: Option<Point>) -> AreaQuery {
        AreaQuery {
            address: "25 W Market St, Leesburg, VA".to_string(),
            location,
        }
    }

    fn zoning(code: &str) -> ZoningRecord {
        ZoningRecord {
            code: code.to_string(),
            entry: None,
        }
    }

    fn nearby(codes: &[&str]) -> Vec<ParcelRecord> {
        codes
            .iter()
            .enumerate()
            .map(|(i, code)| ParcelRecord {
                id: format!("parcel-{i}"),
                location: LEESBURG,
                zoning: zoning(code),
            })
            .collect()
    }

    fn upstream() -> UpstreamData {
        UpstreamData {
            schools: Ok(SchoolAssignment {
                schools: vec![AssignedSchool {
                    level: SchoolLevel::High,
                    name: "Loudoun County High School".to_string(),
                    address: None,
                    distance_miles: Some(0.8),
                }],
            }),
            crime: Ok(CrimeStatistics::new(45, Some(0), Some(-15.2))),
            parcel_zoning: Ok(zoning("r-1")),
            nearby_parcels: Ok(nearby(&["R-1", "R-1", "R-2", "I-1"])),
        }
    }

    #[test]
    fn builds_full_report_for_town_address() {
        let report = builder().build(&query(Some(LEESBURG)), &upstream()).unwrap();

        assert_eq!(report.jurisdiction, Jurisdiction::town("Leesburg"));

        let zoning = report.zoning.present().unwrap();
        assert_eq!(zoning.code, "R-1");
        assert_eq!(zoning.description(), "Single-Family Residential");

        let safety = report.safety.present().unwrap();
        assert_eq!(safety.score, 73);
        assert_eq!(safety.level, SafetyLevel::VerySafe);

        let neighborhood = report.neighborhood.present().unwrap();
        assert_eq!(neighborhood.resolvable_count, 4);
        assert_eq!(neighborhood.differing_count, 1);
        assert_eq!(neighborhood.diversity_label, DiversityLabel::Transitional);
        assert!(neighborhood.concern_flags.contains(&ConcernFlag::IndustrialNearby));
        assert!(neighborhood.has_industrial);

        assert!(report.schools.is_present());
    }

    #[test]
    fn crime_failure_leaves_only_safety_absent() {
        let mut data = upstream();
        data.crime = Err(UpstreamDataUnavailable::new(
            UpstreamSource::Crime,
            "HTTP 503",
        ));

        let report = builder().build(&query(Some(LEESBURG)), &data).unwrap();

        let Section::Absent(absence) = &report.safety else {
            panic!("safety should be absent");
        };
        assert_eq!(absence.source, UpstreamSource::Crime);
        assert_eq!(absence.reason, "HTTP 503");
        assert!(report.zoning.is_present());
        assert!(report.schools.is_present());
        assert!(report.neighborhood.is_present());
    }

    #[test]
    fn zero_incidents_is_present_not_absent() {
        let mut data = upstream();
        data.crime = Ok(CrimeStatistics::new(0, None, None));

        let report = builder().build(&query(Some(LEESBURG)), &data).unwrap();

        let safety = report.safety.present().unwrap();
        assert_eq!(safety.score, 100);
        assert_eq!(safety.level, SafetyLevel::VerySafe);
    }

    #[test]
    fn empty_upstream_lists_are_absent() {
        let mut data = upstream();
        data.schools = Ok(SchoolAssignment { schools: vec![] });
        data.nearby_parcels = Ok(vec![]);

        let report = builder().build(&query(Some(LEESBURG)), &data).unwrap();

        assert!(report.schools.is_absent());
        let Section::Absent(absence) = &report.neighborhood else {
            panic!("neighborhood should be absent");
        };
        assert_eq!(absence.source, UpstreamSource::NearbyParcels);
        assert_eq!(absence.reason, "no nearby parcels returned");
    }

    #[test]
    fn all_nearby_parcels_outside_county_is_absent() {
        let mut data = upstream();
        data.nearby_parcels = Ok(vec![ParcelRecord {
            id: "dc".to_string(),
            location: Point::new(38.9072, -77.0369),
            zoning: zoning("R-1"),
        }]);

        let report = builder().build(&query(Some(LEESBURG)), &data).unwrap();

        let Section::Absent(absence) = &report.neighborhood else {
            panic!("neighborhood should be absent");
        };
        assert_eq!(absence.source, UpstreamSource::NearbyParcels);
        assert_eq!(absence.reason, "all nearby parcels were outside the county");
    }

    #[test]
    fn neighborhood_needs_subject_zoning() {
        let mut data = upstream();
        data.parcel_zoning = Err(UpstreamDataUnavailable::new(
            UpstreamSource::ParcelZoning,
            "timeout",
        ));

        let report = builder().build(&query(Some(LEESBURG)), &data).unwrap();

        assert!(report.zoning.is_absent());
        let Section::Absent(absence) = &report.neighborhood else {
            panic!("neighborhood should be absent");
        };
        assert_eq!(absence.source, UpstreamSource::ParcelZoning);
    }

    #[test]
    fn out_of_county_nearby_parcels_are_dropped() {
        let mut records = nearby(&["R-1", "R-2"]);
        records.push(ParcelRecord {
            id: "dc".to_string(),
            location: Point::new(38.9072, -77.0369),
            zoning: zoning("I-1"),
        });
        let mut data = upstream();
        data.nearby_parcels = Ok(records);

        let report = builder().build(&query(Some(LEESBURG)), &data).unwrap();

        let neighborhood = report.neighborhood.present().unwrap();
        assert_eq!(neighborhood.nearby.len(), 2);
        assert_eq!(neighborhood.diversity_label, DiversityLabel::Uniform);
        assert!(!neighborhood.has_industrial);
    }

    #[test]
    fn missing_or_outside_location_is_invalid_coordinate() {
        let builder = builder();

        assert!(matches!(
            builder.build(&query(None), &upstream()),
            Err(ReportError::InvalidCoordinate { location: None, .. })
        ));

        let washington = Point::new(38.9072, -77.0369);
        assert!(matches!(
            builder.build(&query(Some(washington)), &upstream()),
            Err(ReportError::InvalidCoordinate {
                location: Some(_),
                ..
            })
        ));
    }

    #[test]
    fn uncatalogued_code_degrades_zoning_section() {
        let mut data = upstream();
        data.parcel_zoning = Ok(zoning("C-9"));

        let report = builder().build(&query(Some(LEESBURG)), &data).unwrap();

        let zoning = report.zoning.present().unwrap();
        assert_eq!(zoning.description(), "zoning code not catalogued");
        assert_eq!(
            zoning.resolution,
            ZoningResolution::Uncatalogued {
                category_hint: Some(LandUseCategory::Commercial),
            }
        );
    }

    #[test]
    fn county_address_uses_pre_resolved_entry() {
        let mut data = upstream();
        data.parcel_zoning = Ok(ZoningRecord {
            code: "R-1".to_string(),
            entry: Some(area_report_zoning_models::ZoningEntry {
                code: "R-1".to_string(),
                description: "Single Family Residential".to_string(),
                category: LandUseCategory::Residential,
                min_lot_size: Some("40,000 sq ft".to_string()),
                permitted_uses: vec!["Single-family detached dwelling".to_string()],
            }),
        });

        let report = builder().build(&query(Some(ASHBURN)), &data).unwrap();

        assert_eq!(report.jurisdiction, Jurisdiction::County);
        let zoning = report.zoning.present().unwrap();
        assert_eq!(zoning.description(), "Single Family Residential");
    }

    #[test]
    fn report_json_marks_every_section() {
        let mut data = upstream();
        data.crime = Err(UpstreamDataUnavailable::new(UpstreamSource::Crime, "timeout"));

        let report = builder().build(&query(Some(LEESBURG)), &data).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["jurisdiction"]["type"], "town");
        assert_eq!(json["jurisdiction"]["name"], "Leesburg");
        assert_eq!(json["zoning"]["status"], "present");
        assert_eq!(json["schools"]["status"], "present");
        assert_eq!(json["neighborhood"]["status"], "present");
        assert_eq!(json["safety"]["status"], "absent");
        assert_eq!(json["safety"]["data"]["source"], "crime");
    }

    #[test]
    fn builds_are_idempotent() {
        let builder = builder();
        let data = upstream();
        let first = builder.build(&query(Some(LEESBURG)), &data).unwrap();
        let second = builder.build(&query(Some(LEESBURG)), &data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_builds_share_reference_data() {
        let builder = builder();
        let data = upstream();
        let expected = builder.build(&query(Some(LEESBURG)), &data).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| builder.build(&query(Some(LEESBURG)), &data).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn rejects_invalid_config() {
        let reference = Arc::new(ReferenceData::embedded().unwrap());
        let mut config = EngineConfig::default();
        config.safety.moderate_min = 95;
        assert!(matches!(
            AreaReportBuilder::new(reference, config),
            Err(ReportError::SafetyPolicy(_))
        ));
    }
}
