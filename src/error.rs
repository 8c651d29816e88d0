use thiserror::Error;

pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DeliveryBotError {
    #[error("Coordinates ({lat}, {lng}) must be finite and within [-90, 90] x [-180, 180].")]
    InvalidCoordinate { lat: f64, lng: f64 },
    #[error("No fulfilment facility is configured.")]
    NoFacilityAvailable,
    #[error("Unable to compute delivery estimate, please retry. ({0})")]
    RouteUnavailable(#[from] RouteFetchError),
    #[error("Cannot {action} while the delivery session is {state}.")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("Location not found.")]
    LocationNotFound(),
    #[error("Configuration value {0} is not set.")]
    MissingConfig(&'static str),
    #[error("Configuration value {key} is invalid: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
}

/// Failure of a single call to the routing service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteFetchError {
    #[error("routing request failed: {0}")]
    Transport(String),
    #[error("routing service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("routing response is malformed: {0}")]
    Schema(String),
}

impl RouteFetchError {
    /// Transport failures, rate limiting and server errors are worth one more try.
    pub fn is_transient(&self) -> bool {
        match self {
            RouteFetchError::Transport(_) => true,
            RouteFetchError::Status { status, .. } => *status == 429 || *status >= 500,
            RouteFetchError::Schema(_) => false,
        }
    }
}

impl From<reqwest::Error> for RouteFetchError {
    fn from(why: reqwest::Error) -> Self {
        RouteFetchError::Transport(why.to_string())
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation response has no text")]
    EmptyResponse,
}
