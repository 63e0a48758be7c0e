//! Cache behavior of the reconciliation engine, driven through fake sources:
//!
//! - two `get_data()` calls inside the TTL issue exactly one upstream pair
//! - a call after TTL expiry issues a new pair
//! - concurrent misses collapse into a single in-flight reconciliation

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use express_lane_monitor::cache::StatusCache;
use express_lane_monitor::engine::ReconcileEngine;
use express_lane_monitor::sources::{
    ClosureSource, DirectionReading, TravelSnapshot, TravelSource,
};
use express_lane_monitor::status::{Direction, ExpressStatus, TrafficLevel};

struct CountingClosure {
    calls: Arc<AtomicUsize>,
    result: Option<ExpressStatus>,
}

#[async_trait]
impl ClosureSource for CountingClosure {
    async fn poll(&self) -> Option<ExpressStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }

    fn name(&self) -> &'static str {
        "incident-fake"
    }
}

struct CountingTravel {
    calls: Arc<AtomicUsize>,
    snapshot: Option<TravelSnapshot>,
}

#[async_trait]
impl TravelSource for CountingTravel {
    async fn poll(&self) -> Option<TravelSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.snapshot.clone()
    }

    fn name(&self) -> &'static str {
        "travel-fake"
    }
}

fn reading(level: TrafficLevel) -> DirectionReading {
    DirectionReading {
        level,
        travel_time: Some(12),
        average_travel_time: Some(11),
        speed: Some(48),
        local_speed: None,
    }
}

/// Inbound flowing, outbound idle: resolves to Inbound without a hint.
fn inbound_snapshot() -> TravelSnapshot {
    TravelSnapshot {
        inbound: Some(reading(TrafficLevel::Light)),
        outbound: Some(reading(TrafficLevel::Unknown)),
    }
}

fn counting_engine(ttl: Duration) -> (ReconcileEngine, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let closure_calls = Arc::new(AtomicUsize::new(0));
    let travel_calls = Arc::new(AtomicUsize::new(0));
    let engine = ReconcileEngine::new(
        Arc::new(CountingClosure {
            calls: closure_calls.clone(),
            result: Some(ExpressStatus::direction_only(Direction::Inbound)),
        }),
        Arc::new(CountingTravel {
            calls: travel_calls.clone(),
            snapshot: Some(inbound_snapshot()),
        }),
        StatusCache::new(),
        ttl,
    );
    (engine, closure_calls, travel_calls)
}

#[tokio::test]
async fn calls_inside_ttl_share_one_fetch_pair() {
    let (engine, closure_calls, travel_calls) = counting_engine(Duration::from_secs(300));

    let first = engine.get_data().await;
    let second = engine.get_data().await;

    assert_eq!(first, second);
    assert_eq!(closure_calls.load(Ordering::SeqCst), 1);
    assert_eq!(travel_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_ttl_triggers_a_new_fetch_pair() {
    const TTL: Duration = Duration::from_millis(50);
    let (engine, closure_calls, travel_calls) = counting_engine(TTL);

    engine.get_data().await;
    engine.get_data().await;
    assert_eq!(closure_calls.load(Ordering::SeqCst), 1);

    // Wait well over the TTL to avoid boundary flakes.
    sleep(TTL * 5).await;

    engine.get_data().await;
    assert_eq!(closure_calls.load(Ordering::SeqCst), 2);
    assert_eq!(travel_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_misses_collapse_into_one_reconciliation() {
    let (engine, closure_calls, travel_calls) = counting_engine(Duration::from_secs(300));

    let (a, b) = tokio::join!(engine.get_data(), engine.get_data());

    assert_eq!(a, b);
    assert_eq!(closure_calls.load(Ordering::SeqCst), 1);
    assert_eq!(travel_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_reconciliation_is_cached_like_any_other() {
    // Both sources down: the Unknown fallback is still stored and served
    // from the cache until the TTL expires.
    let closure_calls = Arc::new(AtomicUsize::new(0));
    let travel_calls = Arc::new(AtomicUsize::new(0));
    let engine = ReconcileEngine::new(
        Arc::new(CountingClosure {
            calls: closure_calls.clone(),
            result: None,
        }),
        Arc::new(CountingTravel {
            calls: travel_calls.clone(),
            snapshot: None,
        }),
        StatusCache::new(),
        Duration::from_secs(300),
    );

    assert_eq!(engine.get_data().await, ExpressStatus::unknown());
    assert_eq!(engine.get_data().await, ExpressStatus::unknown());
    assert_eq!(closure_calls.load(Ordering::SeqCst), 1);
    assert_eq!(travel_calls.load(Ordering::SeqCst), 1);
}
