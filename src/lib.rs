pub mod assistant;
pub mod config;
pub mod error;
pub mod fulfilment;
pub mod services;

pub use error::{DeliveryBotError, GenericError};
