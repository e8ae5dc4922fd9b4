//! Geofence-based visit detection and same-site merging.
//!
//! Detection runs over the full filtered trajectory (never the simplified or
//! snapped path, which would lose dwell resolution). Each site is evaluated
//! independently with its own entry/exit state machine, so overlapping
//! geofences may legitimately produce overlapping visits to different sites.
//!
//! The merge pass walks the visit list in the order the detector produced it
//! (site-major, each site's events chronological) and only compares against
//! the immediately preceding accepted visit. Two same-site visits separated
//! by another site's visit in that ordering therefore never merge, even when
//! they are chronologically adjacent.

use chrono::{DateTime, Utc};
use log::debug;

use crate::geo_utils::haversine_distance;
use crate::{Site, TimedPoint, VisitEvent};

/// Detect dwell intervals at each site's geofence.
///
/// Output order is site-major: all of the first site's visits (chronological),
/// then the second site's, and so on. A visit still open when the trajectory
/// ends is not emitted. Visits shorter than `min_duration_min` are discarded.
pub fn detect_visits(
    trajectory: &[TimedPoint],
    sites: &[Site],
    min_duration_min: f64,
) -> Vec<VisitEvent> {
    let mut visits = Vec::new();

    for site in sites {
        let mut check_in: Option<DateTime<Utc>> = None;

        for (i, sample) in trajectory.iter().enumerate() {
            let inside = haversine_distance(&sample.point, &site.center) <= site.radius_m;

            if inside {
                if check_in.is_none() {
                    check_in = Some(sample.timestamp);
                }
            } else if let Some(entered) = check_in.take() {
                // Exit: the dwell ends at the last point still inside.
                let left = trajectory[i - 1].timestamp;
                let duration = minutes_between(entered, left);
                if duration >= min_duration_min {
                    visits.push(VisitEvent {
                        shop: site.name.clone(),
                        location: site.center,
                        check_in: entered,
                        check_out: left,
                        duration_min: round2(duration),
                    });
                } else {
                    debug!(
                        "discarding {:.2}min dwell at {} (below {:.1}min)",
                        duration, site.name, min_duration_min
                    );
                }
            }
        }
    }

    visits
}

/// Merge adjacent same-site visits separated by at most `gap_threshold_min`.
///
/// Operates on the list in detector order; each visit is compared only to the
/// immediately preceding accepted visit. Merging extends the previous visit's
/// check-out and recomputes its duration.
pub fn merge_close_visits(visits: &[VisitEvent], gap_threshold_min: f64) -> Vec<VisitEvent> {
    let mut merged: Vec<VisitEvent> = Vec::new();

    for visit in visits {
        match merged.last_mut() {
            Some(last)
                if last.shop == visit.shop
                    && minutes_between(last.check_out, visit.check_in) <= gap_threshold_min =>
            {
                last.check_out = visit.check_out;
                last.duration_min = round2(minutes_between(last.check_in, last.check_out));
            }
            _ => merged.push(visit.clone()),
        }
    }

    merged
}

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
