//! Road snapping against an external snap-to-roads service.
//!
//! Points are sent in order-preserving batches; each returned match is
//! validated against a maximum deviation from its source point before it is
//! accepted. A failed batch is logged and skipped, never aborting the batches
//! after it.

use async_trait::async_trait;
use log::{debug, warn};

use crate::error::ServiceError;
use crate::geo_utils::haversine_distance;
use crate::{GeoPoint, SnapConfig};

/// One confidently-snapped point returned by a [`SnapService`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnappedPoint {
    /// Index of the source point within the requested batch.
    pub index: usize,
    /// Snapped location on the road network.
    pub location: GeoPoint,
}

/// External snap-to-roads capability.
///
/// The service receives an ordered batch of points and returns snapped
/// locations for the subset it is confident about; omitted indices mean
/// "no confident snap for that point". [`MapsClient`](crate::http::MapsClient)
/// is the production implementation.
#[async_trait]
pub trait SnapService: Send + Sync {
    async fn snap_batch(&self, batch: &[GeoPoint]) -> Result<Vec<SnappedPoint>, ServiceError>;
}

/// Snap `points` to the road network, keeping only matches that deviate at
/// most `config.max_deviation_m` from their source point.
///
/// Batches of at most `config.max_batch` points are processed strictly in
/// input order and the accepted matches concatenated in that order. Rejected
/// and unmatched points vanish from the output; they are not replaced by
/// their raw originals. The result may be empty when nothing in the
/// trajectory is confidently snappable.
pub async fn snap_to_roads<S: SnapService>(
    service: &S,
    points: &[GeoPoint],
    config: &SnapConfig,
) -> Vec<GeoPoint> {
    let mut snapped = Vec::new();

    for (batch_no, batch) in points.chunks(config.max_batch.max(1)).enumerate() {
        match service.snap_batch(batch).await {
            Ok(matches) => {
                for m in matches {
                    let Some(original) = batch.get(m.index) else {
                        warn!(
                            "snap batch {}: returned index {} out of range, ignoring",
                            batch_no, m.index
                        );
                        continue;
                    };

                    let deviation = haversine_distance(original, &m.location);
                    if deviation <= config.max_deviation_m {
                        snapped.push(m.location);
                    } else {
                        debug!(
                            "snap batch {}: dropping point {} ({:.1}m from source)",
                            batch_no, m.index, deviation
                        );
                    }
                }
            }
            Err(e) => warn!("snap batch {} failed: {}", batch_no, e),
        }

        tokio::time::sleep(config.pause).await;
    }

    snapped
}
