//! Typed settings read from the process environment (and `.env` through `dotenv`).

use std::{str::FromStr, time::Duration};

use log::LevelFilter;
use rust_decimal::Decimal;

use crate::{
    fulfilment::{
        facility::{default_facilities, Facility},
        fee::FeePolicy,
    },
    DeliveryBotError,
};

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub command_prefix: String,
    pub log_level: LevelFilter,
    pub routing: RoutingSettings,
    pub retry: RetryPolicy,
    pub fee: FeePolicy,
    pub currency_symbol: String,
    pub facilities: Vec<Facility>,
    pub tracker_tick: Duration,
    pub google_maps_token: Option<String>,
    pub generative: Option<GenerativeSettings>,
}

#[derive(Debug, Clone)]
pub struct RoutingSettings {
    pub api_key: String,
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct GenerativeSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Bounded retry for transient routing failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, DeliveryBotError> {
        Settings::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, DeliveryBotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(DeliveryBotError::MissingConfig(key));

        let facilities = match var("DELIVERY_FACILITIES") {
            Some(raw) => serde_json::from_str::<Vec<Facility>>(&raw).map_err(|why| {
                DeliveryBotError::InvalidConfig {
                    key: "DELIVERY_FACILITIES",
                    reason: why.to_string(),
                }
            })?,
            None => default_facilities(),
        };
        if facilities.is_empty() {
            return Err(DeliveryBotError::NoFacilityAvailable);
        }

        let fee = FeePolicy::new(
            parse_or(&var, "DELIVERY_BASE_FEE", Decimal::new(30, 0))?,
            parse_or(&var, "DELIVERY_FREE_KM", Decimal::new(5, 0))?,
            parse_or(&var, "DELIVERY_PER_KM_RATE", Decimal::new(5, 0))?,
        )?;

        let generative = match var("GEMINI_API_KEY") {
            Some(api_key) => Some(GenerativeSettings {
                api_key,
                base_url: var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
                model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string()),
                timeout_secs: parse_or(&var, "GEMINI_TIMEOUT_SECS", 30)?,
            }),
            None => None,
        };

        Ok(Settings {
            discord_token: required("DISCORD_TOKEN")?,
            command_prefix: var("COMMAND_PREFIX").unwrap_or_else(|| "!deliver".to_string()),
            log_level: parse_or(&var, "LOG_LEVEL", LevelFilter::Info)?,
            routing: RoutingSettings {
                api_key: required("ORS_API_KEY")?,
                base_url: var("ORS_BASE_URL")
                    .unwrap_or_else(|| "https://api.openrouteservice.org".to_string()),
                profile: var("ORS_PROFILE").unwrap_or_else(|| "driving-car".to_string()),
                timeout_secs: parse_or(&var, "ROUTING_TIMEOUT_SECS", 10)?,
            },
            retry: RetryPolicy {
                max_retries: parse_or(&var, "ROUTING_MAX_RETRIES", 1)?,
                backoff: Duration::from_millis(parse_or(&var, "ROUTING_BACKOFF_MS", 500)?),
            },
            fee,
            currency_symbol: var("CURRENCY_SYMBOL").unwrap_or_else(|| "₹".to_string()),
            facilities,
            tracker_tick: Duration::from_millis(parse_or(&var, "TRACKER_TICK_MS", 150)?),
            google_maps_token: var("GOOGLE_MAPS_TOKEN"),
            generative,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, DeliveryBotError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|why: T::Err| DeliveryBotError::InvalidConfig {
                key,
                reason: why.to_string(),
            }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, DeliveryBotError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("DISCORD_TOKEN", "discord"), ("ORS_API_KEY", "ors")];

    #[test]
    fn defaults_follow_the_observed_business_values() {
        let settings = settings(&REQUIRED).unwrap();
        assert_eq!(settings.fee.base_fee(), Decimal::new(30, 0));
        assert_eq!(settings.fee.free_threshold_km(), Decimal::new(5, 0));
        assert_eq!(settings.fee.per_km_rate(), Decimal::new(5, 0));
        assert_eq!(settings.facilities.len(), 2);
        assert_eq!(settings.tracker_tick, Duration::from_millis(150));
        assert_eq!(settings.retry, RetryPolicy::default());
        assert_eq!(settings.routing.profile, "driving-car");
        assert_eq!(settings.log_level, LevelFilter::Info);
        assert!(settings.generative.is_none());
    }

    #[test]
    fn missing_routing_key_is_reported() {
        let error = settings(&[("DISCORD_TOKEN", "discord")]).unwrap_err();
        assert!(matches!(error, DeliveryBotError::MissingConfig("ORS_API_KEY")));
    }

    #[test]
    fn fee_and_facilities_are_configurable() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DELIVERY_BASE_FEE", "49.5"));
        pairs.push(("DELIVERY_PER_KM_RATE", "7"));
        pairs.push((
            "DELIVERY_FACILITIES",
            r#"[{"id": 9, "name": "Mumbai Central", "location": {"lat": 19.0176, "lng": 72.8561}}]"#,
        ));
        let settings = settings(&pairs).unwrap();
        assert_eq!(settings.fee.base_fee(), Decimal::new(495, 1));
        assert_eq!(settings.fee.per_km_rate(), Decimal::new(7, 0));
        assert_eq!(settings.facilities[0].name, "Mumbai Central");
    }

    #[test]
    fn empty_facility_list_is_fatal() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DELIVERY_FACILITIES", "[]"));
        assert!(matches!(settings(&pairs), Err(DeliveryBotError::NoFacilityAvailable)));
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("TRACKER_TICK_MS", "fast"));
        assert!(matches!(
            settings(&pairs),
            Err(DeliveryBotError::InvalidConfig { key: "TRACKER_TICK_MS", .. })
        ));
    }

    #[test]
    fn gemini_is_enabled_by_its_key() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GEMINI_API_KEY", "gemini"));
        let generative = settings(&pairs).unwrap().generative.unwrap();
        assert_eq!(generative.model, "gemini-1.5-flash");
        assert_eq!(generative.timeout_secs, 30);
    }

    #[test]
    fn gemini_timeout_is_configurable() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GEMINI_API_KEY", "gemini"));
        pairs.push(("GEMINI_TIMEOUT_SECS", "5"));
        assert_eq!(settings(&pairs).unwrap().generative.unwrap().timeout_secs, 5);

        pairs.pop();
        pairs.push(("GEMINI_TIMEOUT_SECS", "soon"));
        assert!(matches!(
            settings(&pairs),
            Err(DeliveryBotError::InvalidConfig { key: "GEMINI_TIMEOUT_SECS", .. })
        ));
    }
}
