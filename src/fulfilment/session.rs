use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use log::*;

use super::quote::Estimate;
use crate::{services::Coordinates, DeliveryBotError};

/// Tags a request with the session generation it was issued under.
#[derive(Debug, Clone)]
pub struct Generation {
    counter: Arc<AtomicU64>,
    value: u64,
}

impl Generation {
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.value
    }

    fn issued_by(&self, counter: &Arc<AtomicU64>) -> bool {
        Arc::ptr_eq(&self.counter, counter)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    PointSelected(Coordinates),
    AwaitingConfirmation(Coordinates),
    RouteRequested(Coordinates),
    RouteReady(Box<Estimate>),
    RouteFailed { point: Coordinates, reason: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::PointSelected(_) => "point-selected",
            SessionState::AwaitingConfirmation(_) => "awaiting-confirmation",
            SessionState::RouteRequested(_) => "route-requested",
            SessionState::RouteReady(_) => "route-ready",
            SessionState::RouteFailed { .. } => "route-failed",
        }
    }
}

/// Handed out by [`DeliverySession::confirm`]; carries the point to quote.
#[derive(Debug, Clone)]
pub struct QuoteTicket {
    pub point: Coordinates,
    pub generation: Generation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Ready(Box<Estimate>),
    Failed(String),
    /// A newer request superseded this one; its result was dropped.
    Stale,
}

/// One user's delivery-point selection and its current quote slot.
#[derive(Debug)]
pub struct DeliverySession {
    state: SessionState,
    generation: Arc<AtomicU64>,
}

impl Default for DeliverySession {
    fn default() -> Self {
        DeliverySession {
            state: SessionState::Idle,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl DeliverySession {
    pub fn new() -> Self {
        DeliverySession::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_generation(&self) -> Generation {
        Generation {
            counter: self.generation.clone(),
            value: self.generation.load(Ordering::SeqCst),
        }
    }

    pub fn current_estimate(&self) -> Option<&Estimate> {
        match &self.state {
            SessionState::RouteReady(estimate) => Some(estimate.as_ref()),
            _ => None,
        }
    }

    /// Replaces any previous point and invalidates an in-flight request.
    pub fn select(&mut self, point: Coordinates) {
        self.advance();
        self.state = SessionState::PointSelected(point);
    }

    pub fn request_confirmation(&mut self) -> Result<Coordinates, DeliveryBotError> {
        match self.state {
            SessionState::PointSelected(point) => {
                self.state = SessionState::AwaitingConfirmation(point);
                Ok(point)
            }
            _ => Err(self.invalid("ask for confirmation")),
        }
    }

    /// Confirms the pending point, or retries a failed one.
    pub fn confirm(&mut self) -> Result<QuoteTicket, DeliveryBotError> {
        let point = match &self.state {
            SessionState::AwaitingConfirmation(point) => *point,
            SessionState::RouteFailed { point, .. } => *point,
            _ => return Err(self.invalid("confirm")),
        };
        let generation = self.advance();
        self.state = SessionState::RouteRequested(point);
        Ok(QuoteTicket { point, generation })
    }

    pub fn resolve(
        &mut self,
        ticket: &QuoteTicket,
        result: Result<Estimate, DeliveryBotError>,
    ) -> Resolution {
        if !ticket.generation.issued_by(&self.generation) {
            warn!("Dropping response for a ticket issued by another session.");
            return Resolution::Stale;
        }
        if !ticket.generation.is_current() {
            debug!(
                "Dropping response for generation {} (now {}).",
                ticket.generation.value(),
                self.generation.load(Ordering::SeqCst)
            );
            return Resolution::Stale;
        }
        if !matches!(self.state, SessionState::RouteRequested(_)) {
            return Resolution::Stale;
        }

        match result {
            Ok(estimate) => {
                let estimate = Box::new(estimate);
                self.state = SessionState::RouteReady(estimate.clone());
                Resolution::Ready(estimate)
            }
            Err(why) => {
                let reason = why.to_string();
                self.state = SessionState::RouteFailed {
                    point: ticket.point,
                    reason: reason.clone(),
                };
                Resolution::Failed(reason)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.advance();
        self.state = SessionState::Idle;
    }

    fn advance(&mut self) -> Generation {
        let value = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Generation {
            counter: self.generation.clone(),
            value,
        }
    }

    fn invalid(&self, action: &'static str) -> DeliveryBotError {
        DeliveryBotError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}
