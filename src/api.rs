// src/api.rs
//
// Query interface: the merged record over HTTP. The engine never fails, so
// the data endpoint has no error branch; the Cache-Control header lets
// intermediate caches serve slightly stale data while revalidating.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::engine::ReconcileEngine;
use crate::status::ExpressStatus;

const CACHE_CONTROL_VALUE: &str = "public, max-age=60, stale-while-revalidate=240";

#[derive(Clone)]
pub struct AppState {
    engine: Arc<ReconcileEngine>,
}

impl AppState {
    pub fn new(engine: ReconcileEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/data", get(get_data))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn get_data(
    State(state): State<AppState>,
) -> ([(header::HeaderName, &'static str); 1], Json<ExpressStatus>) {
    let status = state.engine.get_data().await;
    (
        [(header::CACHE_CONTROL, CACHE_CONTROL_VALUE)],
        Json(status),
    )
}
