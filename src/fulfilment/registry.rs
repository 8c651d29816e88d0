use std::{collections::HashMap, hash::Hash, sync::Arc};

use log::*;
use tokio::sync::Mutex;

use super::{session::SessionState, DeliverySession, RouteTracker};

/// One user's delivery session and the marker walking its current route.
#[derive(Default)]
pub struct UserDelivery {
    pub session: DeliverySession,
    pub tracker: Option<RouteTracker>,
}

impl UserDelivery {
    fn is_idle(&self) -> bool {
        self.tracker.is_none() && matches!(self.session.state(), SessionState::Idle)
    }
}

/// Per-user deliveries, created on first use and evicted once idle.
pub struct DeliveryRegistry<K> {
    deliveries: Mutex<HashMap<K, Arc<Mutex<UserDelivery>>>>,
}

impl<K> Default for DeliveryRegistry<K> {
    fn default() -> Self {
        DeliveryRegistry {
            deliveries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> DeliveryRegistry<K> {
    pub fn new() -> Self {
        DeliveryRegistry::default()
    }

    pub async fn delivery(&self, user: &K) -> Arc<Mutex<UserDelivery>> {
        let mut deliveries = self.deliveries.lock().await;
        deliveries.entry(user.clone()).or_default().clone()
    }

    /// Drops the user's entry if it is idle and nobody else holds it.
    /// Returns whether an entry was removed.
    pub async fn release(&self, user: &K) -> bool {
        let mut deliveries = self.deliveries.lock().await;
        let idle = match deliveries.get(user) {
            // The map lock stops new handles from being taken while we look.
            Some(delivery) if Arc::strong_count(delivery) == 1 => match delivery.try_lock() {
                Ok(delivery) => delivery.is_idle(),
                Err(_) => false,
            },
            _ => false,
        };
        if idle {
            deliveries.remove(user);
            trace!("Released an idle delivery session.");
        }
        idle
    }

    pub async fn len(&self) -> usize {
        self.deliveries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
