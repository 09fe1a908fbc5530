#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate, jurisdiction, and town boundary types.
//!
//! These types describe *where* an address is: a WGS84 coordinate, the
//! plausible bounding box of the county being served, and the legal
//! jurisdiction (an incorporated town or the unincorporated county) whose
//! zoning ordinance applies at that coordinate.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate.
///
/// Stored as `(latitude, longitude)`. Note that `GeoJSON` and most
/// geometry libraries order coordinates as `(x = longitude, y = latitude)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Point {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// The legal authority whose zoning ordinance applies to a location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Jurisdiction {
    /// An incorporated town with its own boundary and zoning table.
    Town {
        /// Town name as it appears in the boundary data (e.g. "Leesburg").
        name: String,
    },
    /// Unincorporated county land.
    County,
}

impl Jurisdiction {
    /// Display name used for the unincorporated county.
    pub const COUNTY_NAME: &'static str = "County";

    #[must_use]
    pub fn town(name: impl Into<String>) -> Self {
        Self::Town { name: name.into() }
    }

    /// Returns the town name, or `"County"` for unincorporated land.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Town { name } => name,
            Self::County => Self::COUNTY_NAME,
        }
    }

    #[must_use]
    pub const fn is_county(&self) -> bool {
        matches!(self, Self::County)
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Plausible bounding box for coordinates inside the served county.
///
/// Coordinates outside this box are rejected before any polygon test.
/// Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyBounds {
    /// Human-readable county name (e.g. "Loudoun County").
    pub name: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl CountyBounds {
    /// Whether the point lies within the (inclusive) bounding box.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.is_finite()
            && (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lon..=self.max_lon).contains(&point.longitude)
    }

    /// Whether the box is non-degenerate and made of finite values.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lat < self.max_lat
            && self.min_lon < self.max_lon
    }
}

/// A single incorporated town's boundary as an ordered ring of points.
///
/// The ring may or may not repeat its first point at the end; consumers
/// close it either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownBoundary {
    /// Town name.
    pub name: String,
    /// Boundary ring.
    pub ring: Vec<Point>,
}

impl TownBoundary {
    #[must_use]
    pub fn new(name: impl Into<String>, ring: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            ring,
        }
    }
}
