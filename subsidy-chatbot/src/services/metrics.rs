//! Metrics collection and Prometheus export.
//!
//! HTTP-level metrics come from the shared middleware; this module adds the
//! chat and LLM series and renders everything for `/metrics`.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call from several places at
/// once; only the first call builds and installs a recorder.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        if let Err(e) = metrics::set_global_recorder(recorder) {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
        }

        handle
    });
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Record a handled chat request by outcome
/// (`answered`, `missing_message`, `unreadable_body`, `no_credential`,
/// `llm_error`).
pub fn record_chat_request(outcome: &'static str) {
    counter!("chat_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_provider_latency(provider: &'static str, model: &str, duration_secs: f64) {
    histogram!(
        "llm_request_duration_seconds",
        "provider" => provider,
        "model" => model.to_string()
    )
    .record(duration_secs);
}

pub fn record_provider_error(provider: &'static str, error_type: &'static str) {
    counter!(
        "llm_errors_total",
        "provider" => provider,
        "error_type" => error_type
    )
    .increment(1);
}

pub fn record_tokens(model: &str, input_tokens: i32, output_tokens: i32) {
    counter!("llm_tokens_total", "model" => model.to_string(), "direction" => "input")
        .increment(input_tokens.max(0) as u64);
    counter!("llm_tokens_total", "model" => model.to_string(), "direction" => "output")
        .increment(output_tokens.max(0) as u64);
}
