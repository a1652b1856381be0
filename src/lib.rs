// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod canonical;
pub mod config;
pub mod debug;
pub mod engine;
pub mod intent;
pub mod metrics;
pub mod normalize;
pub mod reply;
pub mod retrieval;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::engine::{ChatEngine, ChatReply, QueryContext, ReplyKind};
pub use crate::intent::Intent;
pub use crate::store::{Event, EventStore};

use tracing::info;

/// Build the full application router from env/config.
///
/// Loads `config/bot.toml` (or `$BOT_CONFIG_PATH`) and the knowledge base
/// (`data/events.json` or `$EVENTS_PATH`). A missing, unreadable or empty
/// knowledge base is an error: the service must not start with zero events.
pub async fn app() -> anyhow::Result<axum::Router> {
    let engine = ChatEngine::from_env()?;
    info!(events = engine.store().len(), "chat engine ready");
    api::create_router(AppState::new(engine))
}
