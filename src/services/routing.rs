use std::time::Duration;

use async_trait::async_trait;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Coordinates;
use crate::{config::RoutingSettings, error::RouteFetchError, GenericError};

/// A driving route as reported by the routing service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub path: Vec<Coordinates>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

#[async_trait]
pub trait RoutingClient: Send + Sync {
    async fn route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<RouteResult, RouteFetchError>;
}

pub struct OpenRouteService {
    client: reqwest::Client,
    base_url: String,
    profile: String,
    api_key: String,
}

impl OpenRouteService {
    pub fn new(settings: &RoutingSettings) -> Result<Self, GenericError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(OpenRouteService {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            profile: settings.profile.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl RoutingClient for OpenRouteService {
    async fn route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<RouteResult, RouteFetchError> {
        let url = format!("{}/v2/directions/{}/geojson", self.base_url, self.profile);
        let body = json!({ "coordinates": [origin.lng_lat(), destination.lng_lat()] });

        trace!("Requesting route {} -> {}.", origin, destination);
        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouteFetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        let route = parse_directions(&raw)?;
        trace!(
            "Received route with {} points, {} m.",
            route.path.len(),
            route.distance_meters
        );
        Ok(route)
    }
}

#[derive(Deserialize)]
struct DirectionsResponse {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Geometry,
    properties: Properties,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct Properties {
    summary: Summary,
}

// The provider leaves both fields out of the summary for a zero-length route.
#[derive(Deserialize)]
struct Summary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

/// Parses a GeoJSON directions payload into a [`RouteResult`].
pub fn parse_directions(raw: &str) -> Result<RouteResult, RouteFetchError> {
    let response: DirectionsResponse =
        serde_json::from_str(raw).map_err(|why| RouteFetchError::Schema(why.to_string()))?;
    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or_else(|| RouteFetchError::Schema("no route features".to_string()))?;

    let summary = feature.properties.summary;
    for (name, value) in [("distance", summary.distance), ("duration", summary.duration)] {
        if !value.is_finite() || value < 0.0 {
            return Err(RouteFetchError::Schema(format!("summary {} is {}", name, value)));
        }
    }

    let path = feature
        .geometry
        .coordinates
        .iter()
        .map(|position| match position.as_slice() {
            [lng, lat, ..] => Coordinates::new(*lat, *lng)
                .map_err(|why| RouteFetchError::Schema(why.to_string())),
            _ => Err(RouteFetchError::Schema(format!(
                "position has {} values",
                position.len()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if path.is_empty() {
        return Err(RouteFetchError::Schema("route path is empty".to_string()));
    }

    Ok(RouteResult {
        path,
        distance_meters: summary.distance,
        duration_seconds: summary.duration,
    })
}
