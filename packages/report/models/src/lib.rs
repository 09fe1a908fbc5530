#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Area report types.
//!
//! An [`AreaReport`] is built once per address from an [`AreaQuery`] and
//! the already-fetched [`UpstreamData`]. Every optional sub-report is a
//! [`Section`], which is either present or explicitly absent with the
//! upstream source that caused the gap, so consumers never have to guess
//! whether a zero means "safe" or "unknown".

use area_report_crime_models::{CrimeStatistics, SafetyAssessment};
use area_report_geography_models::{Jurisdiction, Point};
use area_report_neighborhood_models::NearbyZoningResult;
use area_report_zoning_models::{LandUseCategory, ZoningEntry};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// An external data source the report depends on.
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
pub enum UpstreamSource {
    /// School assignment lookup.
    Schools,
    /// Crime incident statistics.
    Crime,
    /// Zoning record for the subject parcel.
    ParcelZoning,
    /// Zoning records for surrounding parcels.
    NearbyParcels,
}

/// A named upstream source failed or returned nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamDataUnavailable {
    pub source: UpstreamSource,
    pub message: String,
}

impl UpstreamDataUnavailable {
    #[must_use]
    pub fn new(source: UpstreamSource, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for UpstreamDataUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} data unavailable: {}", self.source, self.message)
    }
}

impl std::error::Error for UpstreamDataUnavailable {}

/// The address being reported on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaQuery {
    /// Street address as entered.
    pub address: String,
    /// Geocoded location; `None` when the address could not be geocoded.
    #[serde(default)]
    pub location: Option<Point>,
}

/// A zoning record as returned by the parcel API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoningRecord {
    /// Raw zoning code.
    pub code: String,
    /// District details when the API already resolved them (county parcels).
    #[serde(default)]
    pub entry: Option<ZoningEntry>,
}

/// A nearby parcel as returned by the parcel API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelRecord {
    /// Address or parcel identifier.
    pub id: String,
    pub location: Point,
    pub zoning: ZoningRecord,
}

/// School level.
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
pub enum SchoolLevel {
    Elementary,
    Middle,
    High,
}

/// One assigned school, passed through from the school lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedSchool {
    pub level: SchoolLevel,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

/// Attendance-zone school assignment for an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolAssignment {
    pub schools: Vec<AssignedSchool>,
}

impl SchoolAssignment {
    /// The assigned school at a level, if any.
    #[must_use]
    pub fn at_level(&self, level: SchoolLevel) -> Option<&AssignedSchool> {
        self.schools.iter().find(|school| school.level == level)
    }
}

/// Everything fetched from upstream APIs for one query.
///
/// Each field is the outcome of one fetch. The builder turns failures into
/// absent sections instead of failing the report.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamData {
    pub schools: Result<SchoolAssignment, UpstreamDataUnavailable>,
    pub crime: Result<CrimeStatistics, UpstreamDataUnavailable>,
    pub parcel_zoning: Result<ZoningRecord, UpstreamDataUnavailable>,
    pub nearby_parcels: Result<Vec<ParcelRecord>, UpstreamDataUnavailable>,
}

impl UpstreamData {
    /// Upstream data where every source is unavailable.
    #[must_use]
    pub fn unavailable(message: &str) -> Self {
        Self {
            schools: Err(UpstreamDataUnavailable::new(UpstreamSource::Schools, message)),
            crime: Err(UpstreamDataUnavailable::new(UpstreamSource::Crime, message)),
            parcel_zoning: Err(UpstreamDataUnavailable::new(
                UpstreamSource::ParcelZoning,
                message,
            )),
            nearby_parcels: Err(UpstreamDataUnavailable::new(
                UpstreamSource::NearbyParcels,
                message,
            )),
        }
    }
}

/// Why a section is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    /// Source that failed, returned nothing, or was a prerequisite.
    pub source: UpstreamSource,
    pub reason: String,
}

impl From<&UpstreamDataUnavailable> for Absence {
    fn from(value: &UpstreamDataUnavailable) -> Self {
        Self {
            source: value.source,
            reason: value.message.clone(),
        }
    }
}

/// An optional sub-report: explicitly present or explicitly absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "camelCase")]
pub enum Section<T> {
    Present(T),
    Absent(Absence),
}

impl<T> Section<T> {
    #[must_use]
    pub const fn absent(source: UpstreamSource, reason: String) -> Self {
        Self::Absent(Absence { source, reason })
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent(_))
    }

    /// The section's value, if present.
    #[must_use]
    pub const fn present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent(_) => None,
        }
    }
}

/// How the subject parcel's zoning code resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ZoningResolution {
    /// Found in the jurisdiction's table (or resolved by the parcel API).
    Catalogued {
        entry: ZoningEntry,
    },
    /// Not catalogued; only the raw code is known.
    Uncatalogued {
        /// Category suggested by the shape of the code, if any.
        category_hint: Option<LandUseCategory>,
    },
}

/// Zoning of the subject parcel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoningSummary {
    /// Normalized zoning code.
    pub code: String,
    pub jurisdiction: Jurisdiction,
    pub resolution: ZoningResolution,
}

impl ZoningSummary {
    /// Description for display, degrading to a fixed message for
    /// uncatalogued codes.
    #[must_use]
    pub fn description(&self) -> &str {
        match &self.resolution {
            ZoningResolution::Catalogued { entry } => &entry.description,
            ZoningResolution::Uncatalogued { .. } => "zoning code not catalogued",
        }
    }
}

/// Consolidated area report for one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaReport {
    pub address: String,
    pub location: Point,
    pub jurisdiction: Jurisdiction,
    pub zoning: Section<ZoningSummary>,
    pub schools: Section<SchoolAssignment>,
    pub safety: Section<SafetyAssessment>,
    pub neighborhood: Section<NearbyZoningResult>,
}
