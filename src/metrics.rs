// src/metrics.rs
//! Prometheus exposition for chat traffic (mounted when `METRICS_ENABLED=1`).

use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::engine::{ChatReply, ReplyKind};

pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";

/// One global recorder per process; later `init` calls reuse it.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub fn metrics_enabled() -> bool {
    std::env::var(ENV_METRICS_ENABLED).ok().as_deref() == Some("1")
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once) and describe the chat series.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
                describe_counter!("chat_requests_total", "Questions answered.");
                describe_counter!("chat_intent_total", "Questions answered, by detected intent.");
                describe_counter!("chat_no_match_total", "Questions with no confident event match.");
                describe_histogram!("chat_answer_ms", "Time to answer one question in milliseconds.");
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// No-op when no recorder is installed.
pub fn record_answer(reply: &ChatReply, elapsed_ms: f64) {
    counter!("chat_requests_total").increment(1);
    counter!("chat_intent_total", "intent" => reply.intent.as_str()).increment(1);
    if reply.kind == ReplyKind::Fallback {
        counter!("chat_no_match_total").increment(1);
    }
    histogram!("chat_answer_ms").record(elapsed_ms);
}
