//! Geographic utilities shared by every pipeline stage.
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees),
//! the standard used by GPS receivers and mapping services.

use geo::{Distance, Haversine, Point};

use crate::GeoPoint;

/// Calculate the great-circle distance between two GPS points using the
/// Haversine formula.
///
/// Returns the distance in meters along the Earth's surface.
///
/// # Example
///
/// ```rust
/// use field_trace::{geo_utils, GeoPoint};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total length of a path in meters, summed over consecutive point pairs.
///
/// Empty or single-point paths return 0.0.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);
        let distance = haversine_distance(&london, &paris);
        assert!((distance - 343_560.0).abs() < 1000.0);
    }

    #[test]
    fn test_haversine_zero_for_identical_points() {
        let p = GeoPoint::new(6.14264, 80.10011);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_path_length_degenerate_inputs() {
        assert_eq!(path_length(&[]), 0.0);
        assert_eq!(path_length(&[GeoPoint::new(0.0, 0.0)]), 0.0);
    }

    #[test]
    fn test_path_length_sums_segments() {
        let points = vec![
            GeoPoint::new(6.14264, 80.10011),
            GeoPoint::new(6.14364, 80.10011),
            GeoPoint::new(6.14464, 80.10011),
        ];
        let total = path_length(&points);
        let first = haversine_distance(&points[0], &points[1]);
        let second = haversine_distance(&points[1], &points[2]);
        assert!((total - (first + second)).abs() < 1e-9);
    }
}
