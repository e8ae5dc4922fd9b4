//! Route distance aggregation with a routing-service fallback for long hops.
//!
//! The path is walked pairwise in order. Short hops contribute their direct
//! geodesic distance; hops longer than the configured threshold are resolved
//! by the external routing service, which reports per-leg distances and an
//! encoded polyline for rendering. Any service or decode failure falls back
//! to the direct distance for that pair only.

use async_trait::async_trait;
use log::warn;

use crate::error::ServiceError;
use crate::geo_utils::haversine_distance;
use crate::{GeoPoint, RouteConfig};

/// Response from the routing capability for one origin/destination pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLegs {
    /// Per-leg distances in meters.
    pub leg_distances_m: Vec<f64>,
    /// Encoded polyline (precision 5) covering the whole pair.
    pub polyline: String,
}

/// External routing capability.
///
/// [`MapsClient`](crate::http::MapsClient) is the production implementation.
#[async_trait]
pub trait RoutingService: Send + Sync {
    async fn route(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
    ) -> Result<RouteLegs, ServiceError>;
}

/// Aggregated route: total distance plus a renderable coordinate path.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    /// Total distance in kilometers.
    pub total_km: f64,
    /// Ordered coordinates for rendering, without duplicate consecutive
    /// points on the direct-distance path.
    pub coords: Vec<GeoPoint>,
}

/// Walk `path` pairwise, accumulating the travelled distance and a
/// renderable coordinate sequence.
///
/// Pairs at most `config.max_direct_m` apart contribute their geodesic
/// distance; longer pairs are resolved by `service`. A pair whose service
/// call or polyline decode fails contributes its geodesic distance and raw
/// endpoints instead; no pair is ever skipped. Paths shorter than two points
/// return a zero total and the input unchanged.
pub async fn aggregate_route<R: RoutingService>(
    service: &R,
    path: &[GeoPoint],
    config: &RouteConfig,
) -> RoutedPath {
    if path.len() < 2 {
        return RoutedPath {
            total_km: 0.0,
            coords: path.to_vec(),
        };
    }

    let mut total_km = 0.0;
    let mut coords: Vec<GeoPoint> = Vec::new();

    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let direct_m = haversine_distance(&from, &to);

        if direct_m <= config.max_direct_m {
            total_km += direct_m / 1000.0;
            push_deduped(&mut coords, from);
            coords.push(to);
            continue;
        }

        match routed_pair(service, &from, &to).await {
            Ok((km, decoded)) => {
                total_km += km;
                coords.extend(decoded);
            }
            Err(e) => {
                warn!(
                    "routing {:.5},{:.5} -> {:.5},{:.5} failed ({}), using direct distance",
                    from.latitude, from.longitude, to.latitude, to.longitude, e
                );
                total_km += direct_m / 1000.0;
                push_deduped(&mut coords, from);
                coords.push(to);
            }
        }

        tokio::time::sleep(config.pause).await;
    }

    RoutedPath { total_km, coords }
}

async fn routed_pair<R: RoutingService>(
    service: &R,
    from: &GeoPoint,
    to: &GeoPoint,
) -> Result<(f64, Vec<GeoPoint>), ServiceError> {
    let legs = service.route(from, to).await?;
    let decoded = decode_polyline(&legs.polyline)?;
    let km = legs.leg_distances_m.iter().sum::<f64>() / 1000.0;
    Ok((km, decoded))
}

fn decode_polyline(encoded: &str) -> Result<Vec<GeoPoint>, ServiceError> {
    let line = polyline::decode_polyline(encoded, 5)
        .map_err(|e| ServiceError::Decode(e.to_string()))?;
    Ok(line.coords().map(|c| GeoPoint::new(c.y, c.x)).collect())
}

fn push_deduped(coords: &mut Vec<GeoPoint>, point: GeoPoint) {
    if coords.last() != Some(&point) {
        coords.push(point);
    }
}
