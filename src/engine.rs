//! # Reconciliation Engine
//! Merges the incident feed's direction-only view with the travel-time
//! feed's full payload into one normalized record, under a single-slot TTL
//! cache. The merge itself is a pure, ordered rule list so the priority
//! policy stays independently testable.
//!
//! Policy: when both sources agree on a direction, the travel-time record
//! wins (richer payload). When they disagree, the incident feed wins on
//! direction because it reads authoritative closure messages; the
//! travel-time payload is carried along when usable. With one source down,
//! the other stands alone; with both down, the record is Unknown.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::cache::StatusCache;
use crate::config::CorridorConfig;
use crate::fetch::FetchClient;
use crate::sources::incident::IncidentFeed;
use crate::sources::travel_time::{self, TravelTimeFeed};
use crate::sources::{ClosureSource, TravelSource};
use crate::status::{Direction, ExpressStatus};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("reconcile_runs_total", "Fresh reconciliation cycles.");
        describe_counter!("status_cache_hits_total", "Requests served from the cache.");
        describe_counter!(
            "status_cache_misses_total",
            "Requests that triggered a reconciliation."
        );
        describe_gauge!(
            "status_last_refresh_ts",
            "Unix ts of the last successful reconciliation."
        );
    });
}

/// Merge the two source results. Ordered rules:
/// 1. both usable and agreeing → travel-time record verbatim;
/// 2. incident direction usable → its direction, with the travel-time
///    payload carried when that record is usable and the incident direction
///    is an actual flow direction (a Closed override stays bare so closed
///    records never carry congestion data);
/// 3. travel-time record alone;
/// 4. Unknown.
pub fn merge(closure: Option<ExpressStatus>, travel: Option<ExpressStatus>) -> ExpressStatus {
    match (closure, travel) {
        (Some(a), Some(b)) if a.is_usable() && b.is_usable() && a.direction == b.direction => b,
        (Some(a), travel) if a.is_usable() => match travel {
            Some(b)
                if b.is_usable()
                    && matches!(a.direction, Direction::Inbound | Direction::Outbound) =>
            {
                ExpressStatus {
                    direction: a.direction,
                    ..b
                }
            }
            _ => a,
        },
        (_, Some(b)) => b,
        (_, None) => ExpressStatus::unknown(),
    }
}

pub struct ReconcileEngine {
    closures: Arc<dyn ClosureSource>,
    travel: Arc<dyn TravelSource>,
    cache: StatusCache,
    ttl: Duration,
}

impl ReconcileEngine {
    pub fn new(
        closures: Arc<dyn ClosureSource>,
        travel: Arc<dyn TravelSource>,
        cache: StatusCache,
        ttl: Duration,
    ) -> Self {
        Self {
            closures,
            travel,
            cache,
            ttl,
        }
    }

    /// Wire the real upstream adapters from corridor configuration.
    pub fn from_config(cfg: &CorridorConfig) -> Self {
        let client = FetchClient::new(cfg.fetch_timeout());
        Self::new(
            Arc::new(IncidentFeed::new(client.clone(), cfg.incident.clone())),
            Arc::new(TravelTimeFeed::new(client, cfg.travel_time.clone())),
            StatusCache::new(),
            cfg.cache_ttl(),
        )
    }

    /// The engine's public contract: always a record, never a failure.
    /// Worst case is `{direction: Unknown}`.
    ///
    /// Serves from the cache inside the TTL. On miss the cache lock is held
    /// across the refresh, so concurrent misses racing past an expired TTL
    /// collapse into a single in-flight reconciliation.
    pub async fn get_data(&self) -> ExpressStatus {
        ensure_metrics_described();

        let mut slot = self.cache.lock().await;
        if let Some(cached) = slot.fresh(self.ttl) {
            counter!("status_cache_hits_total").increment(1);
            return cached.clone();
        }
        counter!("status_cache_misses_total").increment(1);

        let status = self.refresh().await;
        slot.store(status.clone());
        status
    }

    /// One reconciliation cycle: both upstream fetches run concurrently,
    /// then the incident direction is applied as the hint for resolving the
    /// travel-time snapshot. Adapter failures arrive here as `None` and
    /// never propagate further.
    async fn refresh(&self) -> ExpressStatus {
        counter!("reconcile_runs_total").increment(1);

        let (closure, snapshot) = tokio::join!(self.closures.poll(), self.travel.poll());
        if closure.is_none() {
            tracing::warn!(source = self.closures.name(), "source unavailable");
        }
        if snapshot.is_none() {
            tracing::warn!(source = self.travel.name(), "source unavailable");
        }

        let hint = closure.as_ref().map(|s| s.direction);
        let travel = travel_time::resolve(snapshot.as_ref(), hint);
        let merged = merge(closure, travel);

        gauge!("status_last_refresh_ts").set(chrono::Utc::now().timestamp() as f64);
        tracing::info!(direction = %merged.direction, "reconciled corridor status");
        merged
    }
}
