use haversine::{Location as HaversineLocation, Units, distance};

use crate::model::Coordinate;

/// Places closer than this are flagged as near the user.
pub const NEAR_THRESHOLD_KM: f64 = 100.0;

/// Great-circle distance in kilometres (haversine, R = 6371 km).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let from = HaversineLocation { latitude: a.latitude, longitude: a.longitude };
    let to = HaversineLocation { latitude: b.latitude, longitude: b.longitude };
    distance(from, to, Units::Kilometers)
}

pub fn is_near(distance_km: f64) -> bool {
    distance_km < NEAR_THRESHOLD_KM
}
