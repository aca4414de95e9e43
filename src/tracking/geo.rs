// ABOUTME: Location fix type and haversine great-circle distance in meters
// ABOUTME: Used by the walking tracker to accumulate significant movement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::tracking::EARTH_RADIUS_METERS;
use serde::{Deserialize, Serialize};

/// A latitude/longitude fix in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, degrees
    pub latitude: f64,
    /// Longitude, degrees
    pub longitude: f64,
}

impl GeoPoint {
    /// New fix
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Coordinates are finite and inside the valid ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in meters
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_METERS * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(48.8566, 2.3522);
        assert!(p.distance_to(&p).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        // ~111.2 km per degree on the mean sphere
        let d = a.distance_to(&b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
        assert!((b.distance_to(&a) - d).abs() < 1e-6);
    }

    #[test]
    fn test_validity() {
        assert!(GeoPoint::new(45.0, -122.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }
}
