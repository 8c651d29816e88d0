use super::Coordinates;

use crate::{config::Settings, DeliveryBotError, GenericError};

use async_trait::async_trait;
use google_maps::GoogleMapsClient;
use log::*;
use rust_decimal::prelude::ToPrimitive;

#[async_trait]
pub trait GeocodingService: Send + Sync {
    fn new(settings: &Settings) -> Result<Self, GenericError>
    where
        Self: Sized;
    async fn geocode(&self, address: &str) -> Result<Coordinates, GenericError>;
}

pub struct GoogleMapsService {
    client: GoogleMapsClient,
}

#[async_trait]
impl GeocodingService for GoogleMapsService {
    fn new(settings: &Settings) -> Result<Self, GenericError> {
        let token = settings
            .google_maps_token
            .as_deref()
            .ok_or(DeliveryBotError::MissingConfig("GOOGLE_MAPS_TOKEN"))?;
        Ok(GoogleMapsService {
            client: GoogleMapsClient::try_new(token)?,
        })
    }

    async fn geocode(&self, address: &str) -> Result<Coordinates, GenericError> {
        let response = self
            .client
            .geocoding()
            .with_address(address)
            .execute()
            .await?;
        let location = &response
            .results
            .first()
            .ok_or(DeliveryBotError::LocationNotFound())?
            .geometry
            .location;
        trace!("Received coordinates from Google Maps geocoding API.");
        let lat = location.lat.to_f64().ok_or(DeliveryBotError::LocationNotFound())?;
        let lng = location.lng.to_f64().ok_or(DeliveryBotError::LocationNotFound())?;
        Ok(Coordinates::new(lat, lng)?)
    }
}
