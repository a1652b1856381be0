//! Campus Event Bot — Binary Entrypoint
//! Boots the Axum HTTP server: loads config and the event knowledge base once,
//! then serves `/chat` until terminated.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - CHAT_DEV_LOG=1
fn enable_dev_tracing() {
    if !campus_event_bot::debug::dev_logging_enabled() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chat=info,campus_event_bot=info,warn"));

    // Shuttle may already have installed a subscriber; keep theirs in that case.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    // Startup failures (missing/empty knowledge base, bad config) abort here.
    let router = campus_event_bot::app().await?;

    Ok(router.into())
}
