// src/fetch.rs
//
// Bounded-timeout JSON fetch over reqwest. Either upstream may be slow,
// down, or serving garbage at any time; every failure mode collapses to
// `None` so the reconciliation engine degrades instead of erroring.

use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;

/// Per-request upstream timeout when none is configured.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 3_000;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "upstream_fetch_errors_total",
            "Upstream fetch failures (timeout, non-2xx, decode)."
        );
        describe_histogram!("upstream_fetch_ms", "Upstream fetch latency in milliseconds.");
    });
}

#[derive(Clone)]
pub struct FetchClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl FetchClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// GET `url` and decode the JSON body.
    ///
    /// Timeout, connect error, non-2xx status, and body/decode errors all
    /// return `None`. Callers must treat `None` strictly as "source
    /// unavailable", never as a direction state. The timeout also aborts the
    /// in-flight request, so a hung upstream cannot block past the bound.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        ensure_metrics_described();
        let t0 = Instant::now();
        let result = self.request(url).await;
        histogram!("upstream_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        match result {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(error = ?e, url, "upstream fetch failed");
                counter!("upstream_fetch_errors_total").increment(1);
                None
            }
        }
    }

    async fn request<T: DeserializeOwned>(&self, url: &str) -> reqwest::Result<T> {
        self.client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS))
    }
}
