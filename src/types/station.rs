//! Defines the station-level data structures: the coordinate pair, a station's full
//! monthly temperature record, and the lightweight point stored in the spatial index.
//! Also includes the implementations needed for indexing with the `rstar` crate.

use crate::types::series::MonthlySeries;
use crate::types::unit::TemperatureUnit;
use rstar::{PointDistance, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude in decimal degrees.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use baseline_estimator::LatLon;
///
/// let blue_hill = LatLon(42.2125, -71.1147);
/// assert_eq!(blue_hill.0, 42.2125); // Latitude
/// assert_eq!(blue_hill.1, -71.1147); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(self) -> f64 {
        self.0
    }

    pub fn longitude(self) -> f64 {
        self.1
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }

    /// Position on the unit sphere, `[x, y, z]`.
    ///
    /// Straight-line (chord) distance between two of these points grows
    /// monotonically with great-circle distance, which is what makes them a
    /// valid key for an R-tree radius prefilter.
    pub(crate) fn unit_vector(self) -> [f64; 3] {
        let (lat, lon) = (self.0.to_radians(), self.1.to_radians());
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }
}

/// A single station's record as held in the catalog.
///
/// Immutable once loaded; the only transformation applied is unit conversion,
/// which produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSeries {
    /// The archive station code (e.g., "744920").
    pub id: String,
    /// Human readable station name, empty if the archive has none.
    pub name: String,
    /// Station coordinate, the mean over all archive rows for the station.
    pub location: LatLon,
    /// Monthly mean temperatures.
    pub series: MonthlySeries,
}

impl StationSeries {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: LatLon, series: MonthlySeries) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            series,
        }
    }

    pub(crate) fn convert(&self, from: TemperatureUnit, to: TemperatureUnit) -> StationSeries {
        StationSeries {
            series: self.series.convert(from, to),
            ..self.clone()
        }
    }
}

/// The entry the spatial index stores for each station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationPoint {
    pub id: String,
    pub location: LatLon,
    position: [f64; 3],
}

impl StationPoint {
    pub fn new(id: impl Into<String>, location: LatLon) -> Self {
        Self {
            id: id.into(),
            location,
            position: location.unit_vector(),
        }
    }
}

// --- R-Tree Implementations ---

/// A station is a degenerate (single point) envelope on the unit sphere.
impl RTreeObject for StationPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Squared chord distance between the station and a unit-sphere query point.
impl PointDistance for StationPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}
