//! JSON request files for the `report` command.
//!
//! A request carries the address, its geocoded location, and whatever the
//! upstream APIs returned. Any source that is missing from the file, or
//! listed under `unavailable`, is treated as an upstream failure.
//!
//! ```json
//! {
//!   "address": "25 W Market St, Leesburg, VA",
//!   "location": { "latitude": 39.1157, "longitude": -77.5636 },
//!   "parcelZoning": { "code": "R-1" },
//!   "crime": { "incidents": 45, "violentIncidents": 0, "trendPercent": -15.2 },
//!   "unavailable": { "schools": "HTTP 503" }
//! }
//! ```

use std::collections::BTreeMap;

use area_report_crime::tally_incidents;
use area_report_crime_models::{CrimeIncident, CrimeStatistics, DEFAULT_WINDOW_DAYS};
use area_report_geography_models::Point;
use area_report_report_models::{
    AreaQuery, ParcelRecord, SchoolAssignment, UpstreamData, UpstreamDataUnavailable,
    UpstreamSource, ZoningRecord,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// Crime data as either pre-computed statistics or raw incidents.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CrimeInput {
    Incidents {
        #[serde(rename = "asOf")]
        as_of: NaiveDate,
        #[serde(rename = "windowDays", default = "default_window_days")]
        window_days: u32,
        incidents: Vec<CrimeIncident>,
    },
    Statistics(CrimeStatistics),
}

const fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

impl CrimeInput {
    #[must_use]
    pub fn into_statistics(self) -> CrimeStatistics {
        match self {
            Self::Statistics(stats) => stats,
            Self::Incidents {
                as_of,
                window_days,
                incidents,
            } => tally_incidents(&incidents, as_of, window_days),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub address: String,
    #[serde(default)]
    pub location: Option<Point>,
    #[serde(default)]
    pub schools: Option<SchoolAssignment>,
    #[serde(default)]
    pub crime: Option<CrimeInput>,
    #[serde(default)]
    pub parcel_zoning: Option<ZoningRecord>,
    #[serde(default)]
    pub nearby_parcels: Option<Vec<ParcelRecord>>,
    /// Sources that failed upstream, with the failure message.
    #[serde(default)]
    pub unavailable: BTreeMap<UpstreamSource, String>,
}

impl ReportRequest {
    /// Splits the request into the query and the upstream outcomes.
    #[must_use]
    pub fn into_parts(self) -> (AreaQuery, UpstreamData) {
        let Self {
            address,
            location,
            schools,
            crime,
            parcel_zoning,
            nearby_parcels,
            unavailable,
        } = self;

        let upstream = UpstreamData {
            schools: outcome(&unavailable, UpstreamSource::Schools, schools),
            crime: outcome(
                &unavailable,
                UpstreamSource::Crime,
                crime.map(CrimeInput::into_statistics),
            ),
            parcel_zoning: outcome(&unavailable, UpstreamSource::ParcelZoning, parcel_zoning),
            nearby_parcels: outcome(&unavailable, UpstreamSource::NearbyParcels, nearby_parcels),
        };

        (AreaQuery { address, location }, upstream)
    }
}

fn outcome<T>(
    unavailable: &BTreeMap<UpstreamSource, String>,
    source: UpstreamSource,
    value: Option<T>,
) -> Result<T, UpstreamDataUnavailable> {
    if let Some(message) = unavailable.get(&source) {
        return Err(UpstreamDataUnavailable::new(source, message.clone()));
    }
    value.ok_or_else(|| UpstreamDataUnavailable::new(source, "not provided"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sources_are_unavailable() {
        let request: ReportRequest = serde_json::from_str(
            r#"{
                "address": "25 W Market St, Leesburg, VA",
                "location": { "latitude": 39.1157, "longitude": -77.5636 },
                "parcelZoning": { "code": "R-1" },
                "unavailable": { "schools": "HTTP 503" }
            }"#,
        )
        .unwrap();

        let (query, upstream) = request.into_parts();

        assert_eq!(query.location, Some(Point::new(39.1157, -77.5636)));
        assert_eq!(upstream.parcel_zoning.unwrap().code, "R-1");
        assert_eq!(upstream.schools.unwrap_err().message, "HTTP 503");
        assert_eq!(upstream.crime.unwrap_err().source, UpstreamSource::Crime);
        assert_eq!(upstream.nearby_parcels.unwrap_err().message, "not provided");
    }

    #[test]
    fn crime_statistics_pass_through() {
        let input: CrimeInput = serde_json::from_str(
            r#"{ "incidents": 120, "violentIncidents": 15, "trendPercent": 8.3 }"#,
        )
        .unwrap();

        let stats = input.into_statistics();
        assert_eq!(stats.incidents, 120);
        assert_eq!(stats.violent_incidents, Some(15));
        assert_eq!(stats.window_days, DEFAULT_WINDOW_DAYS);
    }

    #[test]
    fn raw_incidents_are_tallied() {
        let input: CrimeInput = serde_json::from_str(
            r#"{
                "asOf": "2024-06-30",
                "windowDays": 30,
                "incidents": [
                    { "occurredOn": "2024-06-29", "category": "VIOLENT" },
                    { "occurredOn": "2024-06-10", "category": "PROPERTY" },
                    { "occurredOn": "2024-05-20", "category": "PROPERTY" }
                ]
            }"#,
        )
        .unwrap();

        let stats = input.into_statistics();
        assert_eq!(stats.incidents, 2);
        assert_eq!(stats.violent_incidents, Some(1));
        assert_eq!(stats.window_days, 30);
        assert_eq!(stats.trend_percent, Some(100.0));
    }
}
