//! Overlapping quote requests from one session: only the newest may land.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use delivery_bot::{
    config::RetryPolicy,
    error::RouteFetchError,
    fulfilment::{
        facility::default_facilities, DeliveryEstimator, DeliverySession, FacilityRegistry,
        FeePolicy, Resolution, RouteTracker,
    },
    services::{
        routing::{RouteResult, RoutingClient},
        Coordinates,
    },
};
use tokio::sync::Mutex;

/// Answers each destination after its own delay.
struct SlowRouting {
    plans: Vec<(Coordinates, Duration, Result<f64, RouteFetchError>)>,
}

#[async_trait]
impl RoutingClient for SlowRouting {
    async fn route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<RouteResult, RouteFetchError> {
        let (_, delay, outcome) = self
            .plans
            .iter()
            .find(|(point, _, _)| point == destination)
            .ok_or_else(|| RouteFetchError::Schema("unplanned destination".into()))?;
        tokio::time::sleep(*delay).await;
        let distance_meters = outcome.clone()?;
        Ok(RouteResult {
            path: vec![*origin, *destination],
            distance_meters,
            duration_seconds: distance_meters / 10.0,
        })
    }
}

fn first_point() -> Coordinates {
    Coordinates::new(28.6139, 77.2090).unwrap()
}

fn second_point() -> Coordinates {
    Coordinates::new(28.4700, 77.0300).unwrap()
}

fn estimator(plans: Vec<(Coordinates, Duration, Result<f64, RouteFetchError>)>) -> Arc<DeliveryEstimator> {
    Arc::new(DeliveryEstimator::new(
        FacilityRegistry::new(default_facilities()),
        FeePolicy::default(),
        Arc::new(SlowRouting { plans }),
        RetryPolicy {
            max_retries: 0,
            backoff: Duration::ZERO,
        },
    ))
}

async fn request(
    session: Arc<Mutex<DeliverySession>>,
    estimator: Arc<DeliveryEstimator>,
    point: Coordinates,
) -> Resolution {
    let ticket = {
        let mut session = session.lock().await;
        session.select(point);
        session.request_confirmation().unwrap();
        session.confirm().unwrap()
    };
    let result = estimator.estimate(&ticket.point).await;
    session.lock().await.resolve(&ticket, result)
}

#[tokio::test(start_paused = true)]
async fn late_first_response_does_not_replace_the_second() {
    let estimator = estimator(vec![
        (first_point(), Duration::from_millis(800), Ok(21_000.0)),
        (second_point(), Duration::from_millis(100), Ok(4_000.0)),
    ]);
    let session = Arc::new(Mutex::new(DeliverySession::new()));

    let (first, second) = tokio::join!(
        request(session.clone(), estimator.clone(), first_point()),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            request(session.clone(), estimator.clone(), second_point()).await
        }
    );

    assert_eq!(first, Resolution::Stale);
    assert!(matches!(second, Resolution::Ready(_)));
    let session = session.lock().await;
    let estimate = session.current_estimate().unwrap();
    assert_eq!(estimate.route.distance_meters, 4_000.0);
    assert_eq!(estimate.route.path[1], second_point());
}

#[tokio::test(start_paused = true)]
async fn stale_failure_does_not_mask_a_fresh_quote() {
    let estimator = estimator(vec![
        (
            first_point(),
            Duration::from_millis(800),
            Err(RouteFetchError::Status {
                status: 500,
                body: "internal error".into(),
            }),
        ),
        (second_point(), Duration::from_millis(100), Ok(4_000.0)),
    ]);
    let session = Arc::new(Mutex::new(DeliverySession::new()));

    let (first, second) = tokio::join!(
        request(session.clone(), estimator.clone(), first_point()),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            request(session.clone(), estimator.clone(), second_point()).await
        }
    );

    assert_eq!(first, Resolution::Stale);
    assert!(matches!(second, Resolution::Ready(_)));
    assert_eq!(session.lock().await.state().name(), "route-ready");
}

#[tokio::test(start_paused = true)]
async fn tracker_of_a_superseded_route_stops() {
    let estimator = estimator(vec![
        (first_point(), Duration::from_millis(10), Ok(21_000.0)),
        (second_point(), Duration::from_millis(10), Ok(4_000.0)),
    ]);
    let session = Arc::new(Mutex::new(DeliverySession::new()));

    let generation = {
        let resolution = request(session.clone(), estimator.clone(), first_point()).await;
        assert!(matches!(resolution, Resolution::Ready(_)));
        session.lock().await.current_generation()
    };
    let mut tracker = RouteTracker::start(50, Duration::from_millis(150), generation);

    tokio::time::sleep(Duration::from_millis(320)).await;
    let reached = tracker.position();
    assert_eq!(reached, 2);

    session.lock().await.select(second_point());
    tracker.finished().await;
    assert!(tracker.position() <= reached + 1);
    assert!(tracker.position() < 49);
}
