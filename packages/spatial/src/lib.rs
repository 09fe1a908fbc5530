#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory town boundary index for jurisdiction lookups.
//!
//! Loads incorporated-town polygons once at startup, builds an R-tree over
//! their envelopes, and answers "which town's zoning applies here?" with a
//! closed-boundary point-in-polygon test. Points outside every town fall
//! back to the unincorporated county.
//!
//! The bundled Loudoun County outlines in `data/` are simplified polygons
//! that approximate each town's extent.

use std::collections::BTreeSet;

use area_report_geography_models::{CountyBounds, Jurisdiction, Point, TownBoundary};
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon, Relate};
use geojson::GeoJson;
use rstar::{AABB, Envelope, RTree, RTreeObject};
use thiserror::Error;

const EMBEDDED_COUNTY: &str = include_str!("../data/county.toml");
const EMBEDDED_TOWNS: &str = include_str!("../data/towns.geojson");

/// Errors that can occur while loading or querying town boundaries.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The coordinate is non-finite or outside the county's bounding box.
    #[error("Invalid coordinate {point}: outside the plausible bounds of {county}")]
    InvalidCoordinate {
        /// The rejected coordinate.
        point: Point,
        /// Name of the county whose bounds were checked.
        county: String,
    },

    /// Boundary `GeoJSON` could not be parsed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// County bounds TOML could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Boundary data is structurally unusable.
    #[error("Invalid boundary: {message}")]
    InvalidBoundary {
        /// Description of what went wrong.
        message: String,
    },
}

/// Two town polygons whose interiors overlap.
///
/// Valid boundary data is disjoint, so this indicates a data problem. It is
/// logged rather than treated as fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataIntegrityWarning {
    /// Town listed earlier in the tie-break order.
    pub first: String,
    /// Town listed later in the tie-break order.
    pub second: String,
}

impl std::fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "town boundaries overlap: {} and {}",
            self.first, self.second
        )
    }
}

/// A town polygon stored in the R-tree with its tie-break rank.
struct TownEntry {
    name: String,
    /// Position in the load order; lower wins when polygons overlap.
    rank: usize,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl TownEntry {
    /// Position of `coord` relative to the town, testing each part on its
    /// own. `MultiPolygon::coordinate_position` counts boundary hits across
    /// parts modulo 2, which puts a vertex shared by two parts outside.
    fn position(&self, coord: &Coord<f64>) -> CoordPos {
        let mut position = CoordPos::Outside;
        for part in &self.polygon.0 {
            match part.coordinate_position(coord) {
                CoordPos::Inside => return CoordPos::Inside,
                CoordPos::OnBoundary => position = CoordPos::OnBoundary,
                CoordPos::Outside => {}
            }
        }
        position
    }
}

impl RTreeObject for TownEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Town boundary index for a single county.
///
/// Constructed once and shared read-only across all requests.
pub struct GeoBoundaryIndex {
    county: CountyBounds,
    towns: RTree<TownEntry>,
    /// Town names in tie-break order.
    order: Vec<String>,
}

impl GeoBoundaryIndex {
    /// Builds an index from explicit town rings. The order of `towns` is the
    /// tie-break order used when a point falls inside several polygons.
    ///
    /// # Errors
    ///
    /// Returns an error if the county bounds are degenerate, a ring has
    /// fewer than three points, or two towns share a name.
    pub fn new(county: CountyBounds, towns: Vec<TownBoundary>) -> Result<Self, SpatialError> {
        let polygons = towns
            .into_iter()
            .map(|town| {
                let polygon = ring_to_polygon(&town)?;
                Ok((town.name, MultiPolygon(vec![polygon])))
            })
            .collect::<Result<Vec<_>, SpatialError>>()?;

        Self::from_polygons(county, polygons)
    }

    /// Builds an index from a `GeoJSON` `FeatureCollection` whose features
    /// carry a `name` property and a `Polygon` or `MultiPolygon` geometry.
    ///
    /// Features without a name or with another geometry type are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid `GeoJSON`, is not a
    /// `FeatureCollection`, or if the resulting index is invalid.
    pub fn from_geojson(county: CountyBounds, geojson_str: &str) -> Result<Self, SpatialError> {
        let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
            return Err(SpatialError::InvalidBoundary {
                message: "expected a GeoJSON FeatureCollection".to_string(),
            });
        };

        let mut polygons = Vec::with_capacity(collection.features.len());

        for feature in collection.features {
            let Some(name) = feature
                .property("name")
                .and_then(|value| value.as_str())
                .map(str::to_string)
            else {
                log::warn!("Skipping boundary feature without a name property");
                continue;
            };

            let Some(multi_polygon) = feature.geometry.and_then(geometry_to_multipolygon) else {
                log::warn!("Skipping boundary for {name}: missing or non-polygon geometry");
                continue;
            };

            polygons.push((name, multi_polygon));
        }

        Self::from_polygons(county, polygons)
    }

    /// Loads the bundled Loudoun County bounds and town outlines.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded data fails to parse.
    pub fn embedded() -> Result<Self, SpatialError> {
        let county = parse_county_bounds(EMBEDDED_COUNTY)?;
        Self::from_geojson(county, EMBEDDED_TOWNS)
    }

    fn from_polygons(
        county: CountyBounds,
        polygons: Vec<(String, MultiPolygon<f64>)>,
    ) -> Result<Self, SpatialError> {
        if !county.is_valid() {
            return Err(SpatialError::InvalidBoundary {
                message: format!("degenerate bounds for {}", county.name),
            });
        }

        let mut seen = BTreeSet::new();
        let mut order = Vec::with_capacity(polygons.len());
        let mut entries = Vec::with_capacity(polygons.len());

        for (rank, (name, polygon)) in polygons.into_iter().enumerate() {
            if !seen.insert(name.clone()) {
                return Err(SpatialError::InvalidBoundary {
                    message: format!("duplicate town name {name}"),
                });
            }
            let Some(envelope) = compute_envelope(&polygon) else {
                return Err(SpatialError::InvalidBoundary {
                    message: format!("empty geometry for {name}"),
                });
            };
            order.push(name.clone());
            entries.push(TownEntry {
                name,
                rank,
                envelope,
                polygon,
            });
        }

        log::info!(
            "Loaded {} town boundaries for {}",
            entries.len(),
            county.name
        );

        Ok(Self {
            county,
            towns: RTree::bulk_load(entries),
            order,
        })
    }

    /// Resolves the jurisdiction whose zoning applies at `point`.
    ///
    /// Points on a town's boundary count as inside that town. When a point
    /// falls inside more than one town (boundaries included, as long as it
    /// is strictly inside at least one), a data-integrity warning is logged
    /// and the town listed first in the load order wins. Points outside
    /// every town resolve to [`Jurisdiction::County`].
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidCoordinate`] if the point is not finite
    /// or lies outside the county's bounding box.
    pub fn resolve_jurisdiction(&self, point: Point) -> Result<Jurisdiction, SpatialError> {
        if !self.county.contains(point) {
            return Err(SpatialError::InvalidCoordinate {
                point,
                county: self.county.name.clone(),
            });
        }

        let matches = self.town_hits(point);
        if is_overlap(&matches) {
            let names: Vec<&str> = matches.iter().map(|(e, _)| e.name.as_str()).collect();
            log::warn!(
                "Data integrity: {point} lies inside overlapping towns {names:?}; using {}",
                names[0]
            );
        }

        Ok(matches.first().map_or(Jurisdiction::County, |(entry, _)| {
            Jurisdiction::town(entry.name.clone())
        }))
    }

    /// Every town containing `point` (boundary included), in load order.
    fn town_hits(&self, point: Point) -> Vec<(&TownEntry, CoordPos)> {
        let coord = geo::coord! { x: point.longitude, y: point.latitude };
        let query_env = AABB::from_point([point.longitude, point.latitude]);

        let mut hits: Vec<(&TownEntry, CoordPos)> = self
            .towns
            .locate_in_envelope_intersecting(&query_env)
            .filter_map(|entry| match entry.position(&coord) {
                CoordPos::Outside => None,
                position => Some((entry, position)),
            })
            .collect();
        hits.sort_by_key(|(entry, _)| entry.rank);
        hits
    }

    /// Finds every pair of towns whose interiors overlap.
    ///
    /// Towns that only share an edge are not reported.
    #[must_use]
    pub fn check_integrity(&self) -> Vec<DataIntegrityWarning> {
        let mut entries: Vec<&TownEntry> = self.towns.iter().collect();
        entries.sort_by_key(|entry| entry.rank);

        let mut warnings = Vec::new();
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if a.envelope.intersects(&b.envelope) {
                    let matrix = a.polygon.relate(&b.polygon);
                    if matrix.is_intersects() && !matrix.is_touches() {
                        warnings.push(DataIntegrityWarning {
                            first: a.name.clone(),
                            second: b.name.clone(),
                        });
                    }
                }
            }
        }

        for warning in &warnings {
            log::warn!("Data integrity: {warning}");
        }

        warnings
    }

    /// Town names in tie-break order.
    #[must_use]
    pub fn towns(&self) -> &[String] {
        &self.order
    }

    /// The county's plausible bounding box.
    #[must_use]
    pub const fn county(&self) -> &CountyBounds {
        &self.county
    }
}

/// Parses county bounds from TOML.
///
/// # Errors
///
/// Returns an error if the TOML is malformed.
pub fn parse_county_bounds(toml_str: &str) -> Result<CountyBounds, SpatialError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Two or more towns contain the point and it is strictly inside at least
/// one of them. Towns that merely share an edge do not count.
fn is_overlap(hits: &[(&TownEntry, CoordPos)]) -> bool {
    hits.len() > 1 && hits.iter().any(|(_, position)| *position == CoordPos::Inside)
}

fn ring_to_polygon(town: &TownBoundary) -> Result<Polygon<f64>, SpatialError> {
    let distinct: BTreeSet<(u64, u64)> = town
        .ring
        .iter()
        .map(|p| (p.latitude.to_bits(), p.longitude.to_bits()))
        .collect();
    if distinct.len() < 3 || town.ring.iter().any(|p| !p.is_finite()) {
        return Err(SpatialError::InvalidBoundary {
            message: format!("ring for {} needs at least three finite points", town.name),
        });
    }

    let exterior: LineString<f64> = town
        .ring
        .iter()
        .map(|p| (p.longitude, p.latitude))
        .collect::<Vec<_>>()
        .into();

    // Polygon::new closes the ring if the first point is not repeated.
    Ok(Polygon::new(exterior, vec![]))
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn geometry_to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}
