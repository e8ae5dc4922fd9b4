//! Distance-based decimation of GPS tracks.
//!
//! A single greedy left-to-right pass: a point is retained only when it has
//! moved at least `min_move_m` from the last *retained* point. The output is
//! an in-order subsequence of the input starting at the first point, with a
//! guaranteed minimum spacing between consecutive retained points.

use crate::geo_utils::haversine_distance;
use crate::GeoPoint;

/// Decimate `points` so consecutive retained points are at least
/// `min_move_m` meters apart.
///
/// The first point is always retained. Empty input yields empty output.
///
/// # Example
///
/// ```rust
/// use field_trace::{simplify_by_distance, GeoPoint};
///
/// let trace = vec![
///     GeoPoint::new(6.14264, 80.10011),
///     GeoPoint::new(6.14265, 80.10011), // ~1m of jitter
///     GeoPoint::new(6.14300, 80.10011), // ~40m of travel
/// ];
///
/// let kept = simplify_by_distance(&trace, 10.0);
/// assert_eq!(kept.len(), 2);
/// assert_eq!(kept[0], trace[0]);
/// ```
pub fn simplify_by_distance(points: &[GeoPoint], min_move_m: f64) -> Vec<GeoPoint> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(points.len());
    let mut anchor = first;
    kept.push(first);

    for point in &points[1..] {
        if haversine_distance(&anchor, point) >= min_move_m {
            kept.push(*point);
            anchor = *point;
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jittery_track() -> Vec<GeoPoint> {
        // ~111m per 0.001 degree of latitude
        vec![
            GeoPoint::new(6.14000, 80.10000),
            GeoPoint::new(6.14002, 80.10000), // ~2m, jitter
            GeoPoint::new(6.14010, 80.10000), // ~11m from first
            GeoPoint::new(6.14011, 80.10000), // ~1m, jitter
            GeoPoint::new(6.14030, 80.10000), // ~22m
        ]
    }

    #[test]
    fn test_empty_input() {
        assert!(simplify_by_distance(&[], 10.0).is_empty());
    }

    #[test]
    fn test_first_point_always_retained() {
        let points = jittery_track();
        let kept = simplify_by_distance(&points, 10.0);
        assert_eq!(kept[0], points[0]);
    }

    #[test]
    fn test_minimum_spacing_guaranteed() {
        let points = jittery_track();
        let kept = simplify_by_distance(&points, 10.0);
        for pair in kept.windows(2) {
            assert!(haversine_distance(&pair[0], &pair[1]) >= 10.0);
        }
    }

    #[test]
    fn test_output_is_ordered_subsequence() {
        let points = jittery_track();
        let kept = simplify_by_distance(&points, 10.0);

        let mut cursor = 0;
        for k in &kept {
            let found = points[cursor..].iter().position(|p| p == k);
            assert!(found.is_some(), "output point not found in input order");
            cursor += found.unwrap() + 1;
        }
    }

    #[test]
    fn test_idempotent() {
        let points = jittery_track();
        let once = simplify_by_distance(&points, 10.0);
        let twice = simplify_by_distance(&once, 10.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_all_points_within_threshold_collapse_to_first() {
        let points = vec![
            GeoPoint::new(6.14000, 80.10000),
            GeoPoint::new(6.14001, 80.10000),
            GeoPoint::new(6.14002, 80.10000),
        ];
        let kept = simplify_by_distance(&points, 50.0);
        assert_eq!(kept, vec![points[0]]);
    }
}
