//! Networked road-snap and routing clients.
//!
//! [`MapsClient`] implements both capability traits against the Google Roads
//! (snap-to-roads) and Directions APIs with a shared connection pool and a
//! bounded per-request timeout. Timeouts surface as transport errors and take
//! the same per-batch/per-segment fallback path as any other service failure.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::route::{RouteLegs, RoutingService};
use crate::snap::{SnapService, SnappedPoint};
use crate::GeoPoint;

const ROADS_URL: &str = "https://roads.googleapis.com/v1/snapToRoads";
const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Maps client covering both external capabilities.
pub struct MapsClient {
    client: Client,
    api_key: String,
}

impl MapsClient {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }
}

// ============================================================================
// Roads API (snap-to-roads)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapResponse {
    #[serde(default)]
    snapped_points: Vec<SnapMatch>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapMatch {
    location: SnapLocation,
    /// Absent when the service interpolated the point itself.
    original_index: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SnapLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl SnapService for MapsClient {
    async fn snap_batch(&self, batch: &[GeoPoint]) -> Result<Vec<SnappedPoint>, ServiceError> {
        let path = batch
            .iter()
            .map(|p| format!("{},{}", p.latitude, p.longitude))
            .collect::<Vec<_>>()
            .join("|");

        debug!("[MapsClient] snapping batch of {} points", batch.len());

        let response = self
            .client
            .get(ROADS_URL)
            .query(&[
                ("path", path.as_str()),
                ("interpolate", "false"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Http(status.as_u16()));
        }

        let data: SnapResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        if let Some(error) = data.error {
            return Err(ServiceError::Rejected {
                status: error.status.unwrap_or_default(),
                message: error.message.unwrap_or_default(),
            });
        }

        Ok(data
            .snapped_points
            .into_iter()
            .filter_map(|m| {
                let index = m.original_index? as usize;
                Some(SnappedPoint {
                    index,
                    location: GeoPoint::new(m.location.latitude, m.location.longitude),
                })
            })
            .collect())
    }
}

// ============================================================================
// Directions API (routing)
// ============================================================================

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
    overview_polyline: OverviewPolyline,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: LegDistance,
}

#[derive(Debug, Deserialize)]
struct LegDistance {
    /// Meters.
    value: f64,
}

#[derive(Debug, Deserialize)]
struct OverviewPolyline {
    points: String,
}

#[async_trait]
impl RoutingService for MapsClient {
    async fn route(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
    ) -> Result<RouteLegs, ServiceError> {
        debug!(
            "[MapsClient] routing {:.5},{:.5} -> {:.5},{:.5}",
            origin.latitude, origin.longitude, destination.latitude, destination.longitude
        );

        let response = self
            .client
            .get(DIRECTIONS_URL)
            .query(&[
                ("origin", format!("{},{}", origin.latitude, origin.longitude)),
                (
                    "destination",
                    format!("{},{}", destination.latitude, destination.longitude),
                ),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Http(status.as_u16()));
        }

        let data: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        if data.status != "OK" {
            return Err(ServiceError::Rejected {
                status: data.status,
                message: data.error_message.unwrap_or_default(),
            });
        }

        let route = data
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Decode("response contained no routes".to_string()))?;

        Ok(RouteLegs {
            leg_distances_m: route.legs.iter().map(|l| l.distance.value).collect(),
            polyline: route.overview_polyline.points,
        })
    }
}
