use std::{fmt, str::FromStr};

use rust_decimal::{prelude::FromPrimitive, Decimal, RoundingStrategy};
use serde::Serialize;

use super::{facility::Facility, fee::FeePolicy};
use crate::{error::RouteFetchError, services::routing::RouteResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryQuote {
    pub facility: Facility,
    /// Kilometres, two decimal places.
    pub distance_km: Decimal,
    pub eta_minutes: u32,
    pub fee: Decimal,
}

/// A quote together with the route it was priced on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub quote: DeliveryQuote,
    pub route: RouteResult,
}

impl DeliveryQuote {
    pub fn from_route(
        facility: &Facility,
        route: &RouteResult,
        policy: &FeePolicy,
    ) -> Result<Self, RouteFetchError> {
        let metres = Decimal::from_f64(route.distance_meters)
            .ok_or_else(|| {
                RouteFetchError::Schema(format!("distance {} is not representable", route.distance_meters))
            })?
            .round_dp(3);
        let kilometres = metres / Decimal::ONE_THOUSAND;

        let fee = policy.fee(kilometres).ok_or_else(|| {
            RouteFetchError::Schema(format!("distance {} prices out of range", route.distance_meters))
        })?;

        let mut distance_km =
            kilometres.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        distance_km.rescale(2);

        Ok(DeliveryQuote {
            facility: facility.clone(),
            distance_km,
            eta_minutes: (route.duration_seconds / 60.0).ceil() as u32,
            fee,
        })
    }

    pub fn display(&self, currency_symbol: &str) -> QuoteDisplay {
        QuoteDisplay {
            facility_name: self.facility.name.clone(),
            distance_km: self.distance_km.to_string(),
            eta_minutes: self.eta_minutes.to_string(),
            fee: self.fee.normalize().to_string(),
            currency_symbol: currency_symbol.to_string(),
        }
    }
}

/// The text labels shown to the user for a quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDisplay {
    pub facility_name: String,
    pub distance_km: String,
    pub eta_minutes: String,
    pub fee: String,
    pub currency_symbol: String,
}

impl QuoteDisplay {
    /// Reads the numeric labels back as `(distance_km, eta_minutes, fee)`.
    pub fn parse_numbers(&self) -> Result<(Decimal, u32, Decimal), rust_decimal::Error> {
        let distance = Decimal::from_str(&self.distance_km)?;
        let eta = self
            .eta_minutes
            .parse()
            .map_err(|_| rust_decimal::Error::ConversionTo(self.eta_minutes.clone()))?;
        let fee = Decimal::from_str(&self.fee)?;
        Ok((distance, eta, fee))
    }
}

impl fmt::Display for QuoteDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**Nearest warehouse:** {}", self.facility_name)?;
        writeln!(f, "**Distance:** {} km", self.distance_km)?;
        writeln!(f, "**ETA:** {} minutes", self.eta_minutes)?;
        write!(f, "**Delivery charges:** {}{}", self.currency_symbol, self.fee)
    }
}
