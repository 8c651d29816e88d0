//! Nearest-facility selection, delivery pricing and the per-user quote session.

pub mod estimator;
pub mod facility;
pub mod fee;
pub mod quote;
pub mod registry;
pub mod session;
pub mod tracker;

pub use estimator::DeliveryEstimator;
pub use facility::{Facility, FacilityId, FacilityRegistry};
pub use fee::FeePolicy;
pub use quote::{DeliveryQuote, Estimate, QuoteDisplay};
pub use registry::{DeliveryRegistry, UserDelivery};
pub use session::{DeliverySession, Generation, QuoteTicket, Resolution, SessionState};
pub use tracker::RouteTracker;
