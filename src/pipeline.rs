//! End-to-end orchestration of the trace-to-insight pipeline.
//!
//! One processing run is a single sequential future:
//! filter → simplify → snap → aggregate for the route and distance, plus
//! detect → merge over the filtered (unsimplified) trajectory for the visit
//! timeline. External-service failures are absorbed inside the stages; the
//! only terminal failure is a trajectory with no usable rows.

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error::PipelineError;
use crate::route::{aggregate_route, RoutingService};
use crate::simplify::simplify_by_distance;
use crate::snap::{snap_to_roads, SnapService};
use crate::visits::{detect_visits, merge_close_visits};
use crate::{GeoPoint, PipelineConfig, ProcessingResult, Site, TimedPoint};

/// One raw row from the inbound trajectory source (file/DB loader).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported fix accuracy in meters, lower is better.
    pub accuracy: f64,
    /// Parsed sample time; `None` when the source value was unparseable.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Drop rows with poor accuracy, missing timestamps, or out-of-range
/// coordinates, preserving input order.
pub fn filter_rows(rows: &[TraceRow], max_accuracy_m: f64) -> Vec<TimedPoint> {
    rows.iter()
        .filter_map(|row| {
            let timestamp = row.timestamp?;
            let point = GeoPoint::new(row.latitude, row.longitude);
            if !point.is_valid() || !row.accuracy.is_finite() || row.accuracy > max_accuracy_m {
                return None;
            }
            Some(TimedPoint { point, timestamp })
        })
        .collect()
}

/// Orchestrates one processing run over pluggable external services.
pub struct TracePipeline<S, R> {
    snap: S,
    routing: R,
    config: PipelineConfig,
}

impl<S: SnapService, R: RoutingService> TracePipeline<S, R> {
    pub fn new(snap: S, routing: R, config: PipelineConfig) -> Self {
        Self {
            snap,
            routing,
            config,
        }
    }

    /// Process a collected trace against the configured sites.
    ///
    /// Fails only when no row survives the accuracy/time filter. Empty
    /// downstream stages (nothing snappable, trajectory too short) produce a
    /// result with empty route fields instead of an error.
    pub async fn process(
        &self,
        rows: &[TraceRow],
        sites: &[Site],
    ) -> Result<ProcessingResult, PipelineError> {
        let trajectory = filter_rows(rows, self.config.max_accuracy_m);
        if trajectory.is_empty() {
            return Err(PipelineError::NoValidData);
        }
        info!(
            "[TracePipeline] {} of {} rows survived filtering",
            trajectory.len(),
            rows.len()
        );

        let raw_points: Vec<GeoPoint> = trajectory.iter().map(|t| t.point).collect();
        let moved = simplify_by_distance(&raw_points, self.config.min_move_m);
        debug!("[TracePipeline] simplified {} -> {} points", raw_points.len(), moved.len());

        let snapped_path = snap_to_roads(&self.snap, &moved, &self.config.snap).await;
        debug!("[TracePipeline] {} points snapped to roads", snapped_path.len());

        let routed = aggregate_route(&self.routing, &snapped_path, &self.config.route).await;
        debug!("[TracePipeline] total distance {:.3} km", routed.total_km);

        // Visits come from the filtered, unsimplified trajectory.
        let visits = detect_visits(&trajectory, sites, self.config.visits.min_duration_min);
        let visits = merge_close_visits(&visits, self.config.visits.merge_gap_min);
        info!("[TracePipeline] {} visits after merging", visits.len());

        Ok(ProcessingResult {
            total_distance_km: round3(routed.total_km),
            visits,
            route_coords: routed.coords,
            snapped_path,
            time_points: trajectory,
        })
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
