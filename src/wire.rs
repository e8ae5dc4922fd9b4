//! Serde adapters for the compact array-based wire format.
//!
//! Rendering and persistence collaborators consume coordinates as
//! `[lat, lon]` pairs and trajectory samples as `[lat, lon, timestamp]`
//! rows rather than keyed objects. These modules plug into `#[serde(with)]`
//! on the result types in the crate root.

use chrono::{DateTime, Utc};

use crate::{GeoPoint, TimedPoint};

/// `GeoPoint` as a `[lat, lon]` pair.
pub(crate) mod coord_pair {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::GeoPoint;

    pub fn serialize<S: Serializer>(point: &GeoPoint, serializer: S) -> Result<S::Ok, S::Error> {
        [point.latitude, point.longitude].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GeoPoint, D::Error> {
        let [latitude, longitude] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(GeoPoint::new(latitude, longitude))
    }
}

/// `Vec<GeoPoint>` as `[[lat, lon], ...]`.
pub(crate) mod coord_pairs {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::GeoPoint;

    pub fn serialize<S: Serializer>(points: &[GeoPoint], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(points.iter().map(|p| [p.latitude, p.longitude]))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<GeoPoint>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ok(pairs
            .into_iter()
            .map(|[latitude, longitude]| GeoPoint::new(latitude, longitude))
            .collect())
    }
}

/// `Vec<TimedPoint>` as `[[lat, lon, timestamp], ...]`.
pub(crate) mod timed_rows {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{DateTime, TimedPoint, Utc};

    pub fn serialize<S: Serializer>(
        points: &[TimedPoint],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            points
                .iter()
                .map(|t| (t.point.latitude, t.point.longitude, t.timestamp)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<TimedPoint>, D::Error> {
        let rows = Vec::<(f64, f64, DateTime<Utc>)>::deserialize(deserializer)?;
        Ok(rows
            .into_iter()
            .map(|(latitude, longitude, timestamp)| TimedPoint::new(latitude, longitude, timestamp))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use crate::{GeoPoint, ProcessingResult, TimedPoint, VisitEvent};

    use super::*;

    #[test]
    fn test_result_wire_shape() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let result = ProcessingResult {
            total_distance_km: 12.345,
            visits: vec![VisitEvent {
                shop: "Hikkaduwa FC".to_string(),
                location: GeoPoint::new(6.14264, 80.10011),
                check_in: t0,
                check_out: t0 + chrono::Duration::minutes(6),
                duration_min: 6.0,
            }],
            route_coords: vec![GeoPoint::new(6.1, 80.1), GeoPoint::new(6.2, 80.2)],
            snapped_path: vec![GeoPoint::new(6.1, 80.1)],
            time_points: vec![TimedPoint::new(6.1, 80.1, t0)],
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "total_distance_km": 12.345,
                "shop_visits": [{
                    "shop": "Hikkaduwa FC",
                    "location": [6.14264, 80.10011],
                    "check_in": "2024-01-15T10:30:00Z",
                    "check_out": "2024-01-15T10:36:00Z",
                    "duration_min": 6.0
                }],
                "route_coords": [[6.1, 80.1], [6.2, 80.2]],
                "snapped_path": [[6.1, 80.1]],
                "time_points": [[6.1, 80.1, "2024-01-15T10:30:00Z"]]
            })
        );
    }

    #[test]
    fn test_result_round_trips() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let result = ProcessingResult {
            total_distance_km: 3.0,
            visits: vec![],
            route_coords: vec![GeoPoint::new(6.1, 80.1)],
            snapped_path: vec![],
            time_points: vec![TimedPoint::new(6.1, 80.1, t0)],
        };

        let body = serde_json::to_string(&result).unwrap();
        let restored: ProcessingResult = serde_json::from_str(&body).unwrap();
        assert_eq!(restored, result);
    }
}
