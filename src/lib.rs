//! # Field Trace
//!
//! GPS trace processing for field teams.
//!
//! This library turns a noisy, irregularly-sampled GPS trace into:
//! - a simplified, road-aligned route with a total travelled distance
//! - a timeline of visits to configured shops (circular geofences)
//!
//! External road-snap and routing services are abstracted behind the
//! [`SnapService`](snap::SnapService) and [`RoutingService`](route::RoutingService)
//! traits, with a production client in [`http`] and deterministic fakes in the
//! test suites. Service failures are absorbed per batch/segment; a single bad
//! call never aborts a processing run.
//!
//! ## Quick Start
//!
//! ```rust
//! use field_trace::{simplify_by_distance, GeoPoint};
//!
//! let trace = vec![
//!     GeoPoint::new(6.14264, 80.10011),
//!     GeoPoint::new(6.14265, 80.10012), // ~2m away, decimated
//!     GeoPoint::new(6.14300, 80.10050),
//! ];
//!
//! let kept = simplify_by_distance(&trace, 10.0);
//! assert_eq!(kept.len(), 2);
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{PipelineError, ServiceError, StoreError};

// Geographic utilities (haversine distance, path length)
pub mod geo_utils;

// Distance-based track decimation
pub mod simplify;
pub use simplify::simplify_by_distance;

// Road snapping against an external snap-to-roads service
pub mod snap;
pub use snap::{snap_to_roads, SnapService, SnappedPoint};

// Route distance aggregation with routing-service fallback
pub mod route;
pub use route::{aggregate_route, RouteLegs, RoutedPath, RoutingService};

// Geofence visit detection and merging
pub mod visits;
pub use visits::{detect_visits, merge_close_visits};

// End-to-end orchestration
pub mod pipeline;
pub use pipeline::{filter_rows, TracePipeline, TraceRow};

// Networked service clients (Google Roads / Directions)
pub mod http;
pub use http::MapsClient;

// Keyed on-disk result store
pub mod store;
pub use store::ResultStore;

// Serde adapters for the array-based wire format
pub(crate) mod wire;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude (WGS84 degrees).
///
/// # Example
/// ```
/// use field_trace::GeoPoint;
/// let point = GeoPoint::new(6.14264, 80.10011);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A timestamped trajectory sample that survived input filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub point: GeoPoint,
    pub timestamp: DateTime<Utc>,
}

impl TimedPoint {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            point: GeoPoint::new(latitude, longitude),
            timestamp,
        }
    }
}

/// A shop / point of interest with a circular geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Display name, unique within a configuration.
    pub name: String,
    /// Geofence center.
    pub center: GeoPoint,
    /// Geofence radius in meters.
    pub radius_m: f64,
}

impl Site {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, radius_m: f64) -> Self {
        Self {
            name: name.into(),
            center: GeoPoint::new(latitude, longitude),
            radius_m,
        }
    }
}

/// One detected dwell interval at a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitEvent {
    /// Name of the visited site.
    pub shop: String,
    /// Site center, for map markers.
    #[serde(with = "wire::coord_pair")]
    pub location: GeoPoint,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    /// Dwell time in minutes, rounded to 2 decimals.
    pub duration_min: f64,
}

/// Complete output of one processing run.
///
/// Serializes to the compact wire format consumed by the rendering and
/// persistence collaborators: coordinates as `[lat, lon]` pairs and trajectory
/// samples as `[lat, lon, timestamp]` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Total travelled distance in kilometers, rounded to 3 decimals.
    pub total_distance_km: f64,
    /// Merged visit timeline, site-major order.
    #[serde(rename = "shop_visits")]
    pub visits: Vec<VisitEvent>,
    /// Renderable route polyline.
    #[serde(with = "wire::coord_pairs")]
    pub route_coords: Vec<GeoPoint>,
    /// Road-snapped points that passed deviation validation.
    #[serde(with = "wire::coord_pairs")]
    pub snapped_path: Vec<GeoPoint>,
    /// Filtered trajectory used for visit detection.
    #[serde(with = "wire::timed_rows")]
    pub time_points: Vec<TimedPoint>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for [`snap_to_roads`].
#[derive(Debug, Clone)]
pub struct SnapConfig {
    /// Maximum points per service call. Default: 100 (service limit).
    pub max_batch: usize,

    /// Maximum accepted deviation between a point and its snapped location.
    /// Points snapped further than this vanish from the path. Default: 15.0 m
    pub max_deviation_m: f64,

    /// Pause after each service call to respect rate limits. Default: 100 ms
    pub pause: Duration,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            max_batch: 100,
            max_deviation_m: 15.0,
            pause: Duration::from_millis(100),
        }
    }
}

/// Configuration for [`aggregate_route`].
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Consecutive points at most this far apart contribute their direct
    /// geodesic distance; longer hops are resolved by the routing service.
    /// Default: 200.0 m
    pub max_direct_m: f64,

    /// Pause after each routing-service call. Default: 100 ms
    pub pause: Duration,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            max_direct_m: 200.0,
            pause: Duration::from_millis(100),
        }
    }
}

/// Configuration for visit detection and merging.
#[derive(Debug, Clone)]
pub struct VisitConfig {
    /// Dwells shorter than this are discarded. Default: 1.0 min
    pub min_duration_min: f64,

    /// Adjacent same-site visits separated by at most this gap are merged.
    /// Default: 5.0 min
    pub merge_gap_min: f64,
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            min_duration_min: 1.0,
            merge_gap_min: 5.0,
        }
    }
}

/// Top-level configuration for [`TracePipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Rows with a reported fix accuracy worse than this are dropped before
    /// processing. Default: 25.0 m
    pub max_accuracy_m: f64,

    /// Minimum movement between retained points during simplification.
    /// Default: 10.0 m
    pub min_move_m: f64,

    pub snap: SnapConfig,
    pub route: RouteConfig,
    pub visits: VisitConfig,
}

impl PipelineConfig {
    /// Production defaults.
    pub fn new() -> Self {
        Self {
            max_accuracy_m: 25.0,
            min_move_m: 10.0,
            snap: SnapConfig::default(),
            route: RouteConfig::default(),
            visits: VisitConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(6.14264, 80.10011).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::new();
        assert_eq!(config.max_accuracy_m, 25.0);
        assert_eq!(config.min_move_m, 10.0);
        assert_eq!(config.snap.max_batch, 100);
        assert_eq!(config.snap.max_deviation_m, 15.0);
        assert_eq!(config.route.max_direct_m, 200.0);
        assert_eq!(config.visits.min_duration_min, 1.0);
        assert_eq!(config.visits.merge_gap_min, 5.0);
    }

    #[test]
    fn test_visit_event_serializes_iso_timestamps() {
        let visit = VisitEvent {
            shop: "Hikkaduwa FC".to_string(),
            location: GeoPoint::new(6.14264, 80.10011),
            check_in: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2024, 1, 15, 10, 36, 0).unwrap(),
            duration_min: 6.0,
        };

        let json = serde_json::to_value(&visit).unwrap();
        assert_eq!(json["shop"], "Hikkaduwa FC");
        assert_eq!(json["location"][0], 6.14264);
        assert_eq!(json["location"][1], 80.10011);
        assert_eq!(json["check_in"], "2024-01-15T10:30:00Z");
        assert_eq!(json["duration_min"], 6.0);
    }
}
