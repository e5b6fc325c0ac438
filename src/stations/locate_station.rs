use crate::stations::catalog::StationCatalog;
use crate::types::station::{LatLon, StationPoint};
use haversine::{distance, Location as HaversineLocation, Units};
use ordered_float::OrderedFloat;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// Chord prefilter tolerance on the unit sphere; the haversine check is authoritative.
const CHORD_SLACK: f64 = 1e-9;

/// Great-circle (haversine) distance in kilometres.
pub fn distance_km(a: LatLon, b: LatLon) -> f64 {
    // Canonical endpoint order keeps the result bit-for-bit symmetric.
    let (from, to) = if (a.0, a.1) <= (b.0, b.1) { (a, b) } else { (b, a) };
    distance(
        HaversineLocation {
            latitude: from.0,
            longitude: from.1,
        },
        HaversineLocation {
            latitude: to.0,
            longitude: to.1,
        },
        Units::Kilometers,
    )
}

/// One station found by a radius query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbour {
    pub station_id: String,
    pub distance_km: f64,
}

/// Stations strictly closer than `radius_km` to `origin`, nearest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourSet {
    pub origin: LatLon,
    pub radius_km: f64,
    neighbours: Vec<Neighbour>,
}

impl NeighbourSet {
    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Neighbour> {
        self.neighbours.iter()
    }

    pub fn contains(&self, station_id: &str) -> bool {
        self.neighbours.iter().any(|n| n.station_id == station_id)
    }

    /// Counts per distance bin of width `bin_width_km`, as `(lower_edge_km, count)`.
    ///
    /// Bins run from zero up to the bin holding the farthest neighbour; empty
    /// bins in between are kept.
    pub fn distance_histogram(&self, bin_width_km: f64) -> Vec<(f64, usize)> {
        if bin_width_km <= 0.0 || self.neighbours.is_empty() {
            return Vec::new();
        }
        let bin_of = |d: f64| (d / bin_width_km).floor() as usize;
        let bins = self
            .neighbours
            .iter()
            .map(|n| bin_of(n.distance_km))
            .max()
            .map_or(0, |b| b + 1);
        let mut counts = vec![0usize; bins];
        for n in &self.neighbours {
            counts[bin_of(n.distance_km)] += 1;
        }
        counts
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i as f64 * bin_width_km, c))
            .collect()
    }
}

/// Spatial index over station coordinates.
///
/// Stations are stored as points on the unit sphere, so a great-circle radius
/// maps exactly onto a chord-length ball the R-tree can answer.
#[derive(Debug, Clone)]
pub struct StationLocator {
    rtree: RTree<StationPoint>,
}

impl StationLocator {
    pub fn new(points: Vec<StationPoint>) -> Self {
        Self {
            rtree: RTree::bulk_load(points),
        }
    }

    pub fn from_catalog(catalog: &StationCatalog) -> Self {
        Self::new(
            catalog
                .iter()
                .map(|station| StationPoint::new(station.id.clone(), station.location))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    /// All stations with `distance < radius_km` from `origin`, nearest first
    /// (ties broken by station id). `exclude` drops one station id, normally the
    /// target itself.
    pub fn within_radius(&self, origin: LatLon, radius_km: f64, exclude: Option<&str>) -> NeighbourSet {
        let mut found: Vec<(OrderedFloat<f64>, &StationPoint)> = Vec::new();
        if radius_km > 0.0 && origin.is_finite() {
            let max_chord = chord_length(radius_km);
            found = self
                .rtree
                .locate_within_distance(origin.unit_vector(), max_chord * max_chord)
                .filter(|point| exclude != Some(point.id.as_str()))
                .map(|point| (OrderedFloat(distance_km(origin, point.location)), point))
                .filter(|(d, _)| d.into_inner() < radius_km)
                .collect();
        }
        found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));

        NeighbourSet {
            origin,
            radius_km,
            neighbours: found
                .into_iter()
                .map(|(d, point)| Neighbour {
                    station_id: point.id.clone(),
                    distance_km: d.into_inner(),
                })
                .collect(),
        }
    }
}

/// Unit-sphere chord subtending a great-circle arc of `arc_km`.
fn chord_length(arc_km: f64) -> f64 {
    let half_angle = (arc_km / EARTH_RADIUS_KM / 2.0).min(FRAC_PI_2);
    2.0 * half_angle.sin() + CHORD_SLACK
}
