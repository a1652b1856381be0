// src/debug.rs
//! Dev diagnostics: anonymized per-question logging and in-memory request stats
//! served on `/debug/stats` (mounted only when `DEBUG_ROUTES=1`).

use axum::{routing::get, Json, Router};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use tracing::info;

use crate::engine::{ChatReply, ReplyKind};

const LAT_CAP: usize = 200;
const SLOW_REQ_MS: u128 = 250;

pub const ENV_DEV_LOG: &str = "CHAT_DEV_LOG";
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

#[derive(Default, Clone, Serialize)]
pub struct Stats {
    pub total_requests: u64,
    pub no_match: u64,
    pub by_intent: BTreeMap<String, u64>,
    pub by_kind: BTreeMap<String, u64>,
    pub last_slow_ms: Option<u128>,
    pub rolling_avg_ms: Option<f64>,
}

static STATS: Lazy<Mutex<Stats>> = Lazy::new(|| Mutex::new(Stats::default()));
static LAT_MS: Lazy<Mutex<VecDeque<u128>>> =
    Lazy::new(|| Mutex::new(VecDeque::with_capacity(LAT_CAP)));

/// Dev env: debug build OR SHUTTLE_ENV in {local, development, dev}.
pub fn is_dev_env() -> bool {
    cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        )
}

// Dev logging gate: CHAT_DEV_LOG=1 AND dev env
pub fn dev_logging_enabled() -> bool {
    std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1") && is_dev_env()
}

pub fn debug_routes_enabled() -> bool {
    std::env::var(ENV_DEBUG_ROUTES).ok().as_deref() == Some("1")
}

/// Short stable id for a question: first 6 bytes of SHA-256, hex.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Never logs raw text. Only hashed id + intent/kind/score and referenced titles.
pub(crate) fn dev_log_answer(question: &str, reply: &ChatReply) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(question);
    let events: Vec<&str> = reply.events.iter().take(5).map(String::as_str).collect();
    info!(
        target: "chat",
        %id,
        intent = %reply.intent,
        kind = ?reply.kind,
        score = ?reply.score,
        events = ?events
    );
}

/// Count one answered question. Poisoned locks skip the update.
pub fn record_answer(reply: &ChatReply) {
    let Ok(mut s) = STATS.lock() else {
        return;
    };
    s.total_requests += 1;
    if reply.kind == ReplyKind::Fallback {
        s.no_match += 1;
    }
    *s.by_intent.entry(reply.intent.to_string()).or_insert(0) += 1;
    let kind = serde_json::to_value(reply.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", reply.kind));
    *s.by_kind.entry(kind).or_insert(0) += 1;
}

pub fn record_latency(lat_ms: u128) {
    let Ok(mut q) = LAT_MS.lock() else {
        return;
    };
    if q.len() >= LAT_CAP {
        q.pop_front();
    }
    q.push_back(lat_ms);
    let sum: u128 = q.iter().copied().sum();
    let avg = sum as f64 / q.len() as f64;
    drop(q);

    if let Ok(mut s) = STATS.lock() {
        s.rolling_avg_ms = Some(avg);
        if lat_ms > SLOW_REQ_MS {
            s.last_slow_ms = Some(lat_ms);
        }
    }
}

pub fn snapshot() -> Stats {
    STATS.lock().map(|s| s.clone()).unwrap_or_default()
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/debug/stats", get(stats))
}

async fn stats() -> Json<Stats> {
    Json(snapshot())
}
