//! Great-circle distance and the distance-based ranking used by office search.

use std::cmp::Ordering;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate only when both components are present.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self { lat, lng }),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Haversine distance in miles.
pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Distance between two optional points; undefined if either is missing.
pub fn distance_between(a: Option<Coordinate>, b: Option<Coordinate>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(haversine_miles(a, b)),
        _ => None,
    }
}

/// Anything that may sit at a point on the map.
pub trait Located {
    fn coordinate(&self) -> Option<Coordinate>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub distance: Option<f64>,
}

/// Attaches distances from `origin` and, when an origin is given, filters by
/// `radius` and orders nearest first. Without an origin the input order is
/// kept and no distances are attached.
pub fn rank_by_distance<T: Located>(
    items: Vec<T>,
    origin: Option<Coordinate>,
    radius: Option<f64>,
) -> Vec<Ranked<T>> {
    let ranked: Vec<Ranked<T>> = items
        .into_iter()
        .map(|item| {
            let distance = distance_between(origin, item.coordinate());
            Ranked { item, distance }
        })
        .collect();

    if origin.is_none() {
        return ranked;
    }
    order_by_distance(ranked, radius)
}

/// Drops entries whose defined distance exceeds `radius` (entries without a
/// distance always stay), then sorts defined distances ascending ahead of
/// undefined ones. The sort is stable.
pub fn order_by_distance<T>(mut ranked: Vec<Ranked<T>>, radius: Option<f64>) -> Vec<Ranked<T>> {
    if let Some(radius) = radius {
        ranked.retain(|r| r.distance.map_or(true, |d| d <= radius));
    }
    ranked.sort_by(|a, b| compare_distance(a.distance, b.distance));
    ranked
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
