//! Geographic point type and the pure distance annotator.
//!
//! Coordinates travel through the system as decimal strings (the storage
//! layer keeps them alongside a PostGIS geography column). Distance computed
//! here is informational — it annotates candidates and matches for display
//! and sort order. The authoritative nearest-neighbor ordering lives in the
//! database spatial index, not in this module.

use serde::{Deserialize, Serialize};

use super::errors::{AppError, AppResult};

/// A geographic point carried as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: String,
    pub lng: String,
}

impl GeoPoint {
    pub fn new(lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lng: lng.into(),
        }
    }

    /// Parse to `(lat, lng)` in degrees.
    pub fn coords(&self) -> AppResult<(f64, f64)> {
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|_| AppError::validation_field("latitude must be a decimal number", "lat"))?;
        let lng: f64 = self
            .lng
            .parse()
            .map_err(|_| AppError::validation_field("longitude must be a decimal number", "lng"))?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::validation_field("latitude out of range", "lat"));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::validation_field("longitude out of range", "lng"));
        }
        Ok((lat, lng))
    }

    /// Great-circle distance to another point, in kilometers.
    ///
    /// Pure function; neither point is mutated.
    pub fn distance_km(&self, other: &GeoPoint) -> AppResult<f64> {
        let (lat1, lng1) = self.coords()?;
        let (lat2, lng2) = other.coords()?;
        Ok(haversine_km(lat1, lng1, lat2, lng2))
    }
}

/// Calculate distance between two coordinates in kilometers.
///
/// Uses the Haversine formula for accuracy on Earth's surface.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // Minneapolis to St. Paul (≈16 km)
        let distance = haversine_km(44.98, -93.27, 44.95, -93.09);
        assert!(distance > 15.0 && distance < 17.0);

        // Same location
        let distance = haversine_km(44.98, -93.27, 44.98, -93.27);
        assert!(distance < 0.1);
    }

    #[test]
    fn test_point_distance_does_not_mutate() {
        let a = GeoPoint::new("1.0", "1.0");
        let b = GeoPoint::new("10.0", "10.0");
        let d1 = a.distance_km(&b).unwrap();
        let d2 = a.distance_km(&b).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(a, GeoPoint::new("1.0", "1.0"));
        assert!(d1 > 0.0);
    }

    #[test]
    fn test_closer_point_has_smaller_distance() {
        let requester = GeoPoint::new("1.0", "1.0");
        let near = GeoPoint::new("1.0", "1.0");
        let far = GeoPoint::new("10.0", "10.0");
        let d_near = requester.distance_km(&near).unwrap();
        let d_far = requester.distance_km(&far).unwrap();
        assert!(d_near < d_far);
        assert_eq!(d_near, 0.0);
    }

    #[test]
    fn test_malformed_coordinates_rejected() {
        let bad = GeoPoint::new("not-a-number", "1.0");
        assert!(matches!(
            bad.coords(),
            Err(AppError::Validation { .. })
        ));

        let out_of_range = GeoPoint::new("95.0", "1.0");
        assert!(out_of_range.coords().is_err());
    }
}
