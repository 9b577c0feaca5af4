//! Name/coordinate resolution on top of a [`Geocoder`].
//!
//! Every function here returns `None` for "not found"; transport and parse
//! failures are logged and folded into `None` so callers can fall back.

use tracing::debug;

use crate::{
    geo::distance_km,
    model::{Coordinate, GeocodedPlace},
    provider::Geocoder,
};

/// How many same-name candidates are considered when disambiguating.
pub const CANDIDATE_LIMIT: u8 = 5;

pub async fn geocode(geocoder: &dyn Geocoder, name: &str) -> Option<GeocodedPlace> {
    match geocoder.search(name, 1).await {
        Ok(places) => places.into_iter().next(),
        Err(e) => {
            debug!("Geocoding '{}' failed: {:#}", name, e);
            None
        }
    }
}

pub async fn reverse_geocode(geocoder: &dyn Geocoder, at: Coordinate) -> Option<GeocodedPlace> {
    match geocoder.reverse(at, 1).await {
        Ok(places) => places.into_iter().next(),
        Err(e) => {
            debug!("Reverse geocoding {:?} failed: {:#}", at, e);
            None
        }
    }
}

/// Among places sharing `name`, pick the one closest to `user`; without a
/// user position the provider's first candidate wins.
pub async fn find_closest_match(
    geocoder: &dyn Geocoder,
    name: &str,
    user: Option<Coordinate>,
) -> Option<GeocodedPlace> {
    let candidates = match geocoder.search(name, CANDIDATE_LIMIT).await {
        Ok(places) => places,
        Err(e) => {
            debug!("Candidate search for '{}' failed: {:#}", name, e);
            return None;
        }
    };

    let chosen = closest_to(candidates, user);
    if let Some(place) = &chosen {
        debug!("Closest match for '{}': {}", name, place.display_name());
    }
    chosen
}

fn closest_to(candidates: Vec<GeocodedPlace>, user: Option<Coordinate>) -> Option<GeocodedPlace> {
    match user {
        Some(user) => candidates.into_iter().min_by(|a, b| {
            distance_km(user, a.coordinate).total_cmp(&distance_km(user, b.coordinate))
        }),
        None => candidates.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, country: &str, latitude: f64, longitude: f64) -> GeocodedPlace {
        GeocodedPlace {
            name: name.into(),
            country: country.into(),
            region: None,
            coordinate: Coordinate { latitude, longitude },
        }
    }

    fn hyderabads() -> Vec<GeocodedPlace> {
        vec![place("Hyderabad", "IN", 17.38, 78.48), place("Hyderabad", "PK", 25.39, 68.37)]
    }

    #[test]
    fn picks_nearest_candidate_to_user() {
        let karachi = Coordinate { latitude: 24.86, longitude: 67.01 };
        let chosen = closest_to(hyderabads(), Some(karachi)).expect("should pick one");
        assert_eq!(chosen.country, "PK");
    }

    #[test]
    fn first_candidate_without_user_position() {
        let chosen = closest_to(hyderabads(), None).expect("should pick one");
        assert_eq!(chosen.country, "IN");
    }

    #[test]
    fn no_candidates_is_not_found() {
        assert!(closest_to(Vec::new(), None).is_none());
    }
}
