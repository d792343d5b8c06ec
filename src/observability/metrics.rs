//! Metrics collection and exposition.
//!
//! # Metrics
//! - `camphaven_wallets_total` (counter): wallets processed by outcome
//! - `camphaven_actions_total` (counter): account operations by action, result
//! - `camphaven_batch_duration_seconds` (histogram): wall time of a batch run
//!
//! # Design Decisions
//! - A Prometheus endpoint is served when `observability.metrics_enabled` is
//!   set; otherwise the recording calls are no-ops and batch totals are only
//!   reported by the `Batch complete` log event
//! - Labels are static strings, never addresses or user ids

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the global Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, address = %addr, "Failed to install metrics exporter"),
    }
}

pub fn record_wallet(outcome: &'static str) {
    metrics::counter!("camphaven_wallets_total", "outcome" => outcome).increment(1);
}

pub fn record_action(action: &'static str, result: &'static str) {
    metrics::counter!("camphaven_actions_total", "action" => action, "result" => result).increment(1);
}

pub fn record_batch_duration(elapsed: Duration) {
    metrics::histogram!("camphaven_batch_duration_seconds").record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_values_are_exported() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_wallet("succeeded");
            record_wallet("succeeded");
            record_wallet("login_failed");
            record_action("checkin", "completed");
            record_batch_duration(Duration::from_millis(1_500));
        });

        let rendered = handle.render();
        assert!(rendered.contains("camphaven_wallets_total{outcome=\"succeeded\"} 2"));
        assert!(rendered.contains("camphaven_wallets_total{outcome=\"login_failed\"} 1"));
        assert!(rendered.contains("camphaven_actions_total{action=\"checkin\",result=\"completed\"} 1"));
        assert!(rendered.contains("camphaven_batch_duration_seconds"));
    }
}
