use std::time::Duration;

use log::*;
use tokio::{sync::watch, task::JoinHandle};

use super::session::Generation;

/// Walks a marker along a route path, one point per tick.
///
/// The walk ends at the last point, as soon as the request generation it was
/// started for is superseded, or when the tracker is dropped.
pub struct RouteTracker {
    position: watch::Receiver<usize>,
    handle: JoinHandle<()>,
    len: usize,
}

impl RouteTracker {
    pub fn start(len: usize, tick: Duration, generation: Generation) -> Self {
        let (sender, position) = watch::channel(0);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await;
            let mut index = 0;
            loop {
                interval.tick().await;
                if !generation.is_current() {
                    debug!("Tracker for generation {} superseded.", generation.value());
                    break;
                }
                index += 1;
                if index >= len || sender.send(index).is_err() {
                    break;
                }
            }
        });
        RouteTracker {
            position,
            handle,
            len,
        }
    }

    pub fn position(&self) -> usize {
        *self.position.borrow()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn finished(&mut self) {
        let _ = (&mut self.handle).await;
    }
}

impl Drop for RouteTracker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fulfilment::session::DeliverySession, services::Coordinates};

    const TICK: Duration = Duration::from_millis(150);

    fn confirmed_session() -> (DeliverySession, Generation) {
        let mut session = DeliverySession::new();
        session.select(Coordinates::new(28.6, 77.2).unwrap());
        session.request_confirmation().unwrap();
        let ticket = session.confirm().unwrap();
        (session, ticket.generation)
    }

    #[tokio::test(start_paused = true)]
    async fn walks_to_the_last_point() {
        let (_session, generation) = confirmed_session();
        let mut tracker = RouteTracker::start(4, TICK, generation);
        assert_eq!(tracker.position(), 0);

        tokio::time::sleep(TICK + Duration::from_millis(10)).await;
        assert_eq!(tracker.position(), 1);

        tracker.finished().await;
        assert_eq!(tracker.position(), 3);
        assert!(tracker.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_superseded() {
        let (mut session, generation) = confirmed_session();
        let mut tracker = RouteTracker::start(100, TICK, generation);
        session.cancel();
        tracker.finished().await;
        assert_eq!(tracker.position(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_path_finishes_immediately() {
        let (_session, generation) = confirmed_session();
        let mut tracker = RouteTracker::start(0, TICK, generation);
        tracker.finished().await;
        assert!(tracker.is_empty());
        assert_eq!(tracker.position(), 0);
    }
}
