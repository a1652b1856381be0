// src/api.rs
//! HTTP surface: the chat endpoint, an upcoming-events listing, health, and the
//! static chat page.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::debug;
use crate::engine::{ChatEngine, ChatReply};
use crate::metrics::{self, Metrics};
use crate::store::Event;

pub const STATIC_DIR: &str = "static";
pub const MAX_UPCOMING_LIMIT: usize = 50;

/// Shared, read-only app state. Cloned per request (cheap `Arc` bump).
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
}

impl AppState {
    pub fn new(engine: ChatEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Core routes without the env-gated debug/metrics extras.
pub fn router(state: AppState) -> Router {
    base_routes()
        .fallback_service(ServeDir::new(STATIC_DIR))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Full router: core routes plus `/debug/stats` (DEBUG_ROUTES=1) and `/metrics` (METRICS_ENABLED=1).
pub fn create_router(state: AppState) -> anyhow::Result<Router> {
    let mut r = base_routes();
    if debug::debug_routes_enabled() {
        r = r.merge(debug::router());
    }
    if metrics::metrics_enabled() {
        r = r.merge(Metrics::init()?.router());
    }
    Ok(r
        .fallback_service(ServeDir::new(STATIC_DIR))
        .layer(CorsLayer::very_permissive())
        .with_state(state))
}

fn base_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/chat", post(chat))
        .route("/events/upcoming", get(upcoming))
}

#[derive(Debug, Default, Deserialize)]
struct ChatReq {
    #[serde(default)]
    message: String,
}

/// Malformed bodies are answered like an empty question, never with a raw error.
async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatReq>, JsonRejection>,
) -> Json<ChatReply> {
    let message = match body {
        Ok(Json(req)) => req.message,
        Err(e) => {
            tracing::debug!(error = %e, "unreadable chat body; treating as empty question");
            String::new()
        }
    };

    let started = Instant::now();
    let reply = state.engine.answer(&message);
    let elapsed = started.elapsed();

    debug::record_answer(&reply);
    debug::record_latency(elapsed.as_millis());
    metrics::record_answer(&reply, elapsed.as_secs_f64() * 1000.0);

    Json(reply)
}

#[derive(Debug, Deserialize)]
struct UpcomingQuery {
    limit: Option<usize>,
}

async fn upcoming(
    State(state): State<AppState>,
    Query(q): Query<UpcomingQuery>,
) -> Json<Vec<Event>> {
    let limit = q
        .limit
        .unwrap_or(state.engine.fallback_limit())
        .min(MAX_UPCOMING_LIMIT);
    let today = Local::now().date_naive();
    let events = state
        .engine
        .upcoming_on(today, limit)
        .into_iter()
        .cloned()
        .collect();
    Json(events)
}
