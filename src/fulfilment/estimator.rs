use std::sync::Arc;

use log::*;

use super::{
    facility::{Facility, FacilityRegistry},
    fee::FeePolicy,
    quote::{DeliveryQuote, Estimate},
};
use crate::{
    config::RetryPolicy,
    error::RouteFetchError,
    services::{
        routing::{RouteResult, RoutingClient},
        Coordinates,
    },
    DeliveryBotError,
};

/// Turns a delivery point into a priced route from the nearest facility.
pub struct DeliveryEstimator {
    facilities: FacilityRegistry,
    fee_policy: FeePolicy,
    routing: Arc<dyn RoutingClient>,
    retry: RetryPolicy,
}

impl DeliveryEstimator {
    pub fn new(
        facilities: FacilityRegistry,
        fee_policy: FeePolicy,
        routing: Arc<dyn RoutingClient>,
        retry: RetryPolicy,
    ) -> Self {
        DeliveryEstimator {
            facilities,
            fee_policy,
            routing,
            retry,
        }
    }

    pub fn facilities(&self) -> &FacilityRegistry {
        &self.facilities
    }

    pub fn fee_policy(&self) -> &FeePolicy {
        &self.fee_policy
    }

    pub fn nearest_facility(&self, point: &Coordinates) -> Result<&Facility, DeliveryBotError> {
        Ok(self.facilities.nearest(point)?.0)
    }

    pub async fn estimate(&self, point: &Coordinates) -> Result<Estimate, DeliveryBotError> {
        let (facility, straight_line_km) = self.facilities.nearest(point)?;
        debug!(
            "Nearest facility to {} is {} ({:.2} km straight line).",
            point, facility.name, straight_line_km
        );

        let route = self.fetch_route(&facility.location, point).await?;
        let quote = DeliveryQuote::from_route(facility, &route, &self.fee_policy)?;
        Ok(Estimate { quote, route })
    }

    async fn fetch_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<RouteResult, RouteFetchError> {
        let mut attempt = 0;
        loop {
            match self.routing.route(origin, destination).await {
                Ok(route) => return Ok(route),
                Err(why) if why.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let backoff = self.retry.backoff * attempt;
                    warn!("Routing attempt {} failed: {}. Retrying in {:?}.", attempt, why, backoff);
                    tokio::time::sleep(backoff).await;
                }
                Err(why) => {
                    warn!("Routing failed: {}", why);
                    return Err(why);
                }
            }
        }
    }
}
