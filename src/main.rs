//! Express-Lane Status Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the reconciliation engine, routes,
//! and the Prometheus exporter.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use express_lane_monitor::api::{self, AppState};
use express_lane_monitor::config::CorridorConfig;
use express_lane_monitor::engine::ReconcileEngine;
use express_lane_monitor::metrics::Metrics;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - CORRIDOR_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("CORRIDOR_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("express_lane_monitor=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This enables
    // CORRIDOR_CONFIG_PATH / CORRIDOR_CACHE_TTL_SECS from .env.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let cfg = CorridorConfig::load().expect("Failed to load corridor config");
    let metrics = Metrics::init(cfg.cache_ttl_secs);

    let engine = ReconcileEngine::from_config(&cfg);
    let state = AppState::new(engine);
    let router = api::create_router(state).merge(metrics.router());

    Ok(router.into())
}
