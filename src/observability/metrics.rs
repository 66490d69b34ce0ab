//! Telemetry metrics for the simulation engine.
//!
//! Prometheus-compatible counters and gauges describing engine
//! operation, distinct from the in-state [`Metrics`] aggregate the
//! dashboard consumes. Every label value here comes from a closed enum,
//! so no cardinality protection is needed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::engine::state::Metrics;
use crate::error::SentraError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint (metrics are recorded internally and can be read
/// programmatically).
///
/// # Errors
///
/// Returns `SentraError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), SentraError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| SentraError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "sentra_phase_transitions_total",
        "Total number of cycle phase transitions"
    );
    describe_gauge!(
        "sentra_current_phase",
        "Currently active phase (1 = active)"
    );
    describe_counter!(
        "sentra_threats_detected_total",
        "Threats synthesized by the generator"
    );
    describe_counter!(
        "sentra_threats_contained_total",
        "Threats resolved into the honeypot at the terminal phase"
    );
    describe_counter!(
        "sentra_anomaly_increments_total",
        "Anomaly observations accompanying threat generation"
    );
    describe_histogram!("sentra_threat_severity", "Severity of generated threats");
    describe_gauge!(
        "sentra_metric_total_threats",
        "Dashboard aggregate: total threats"
    );
    describe_gauge!(
        "sentra_metric_blocked",
        "Dashboard aggregate: blocked threats"
    );
    describe_gauge!(
        "sentra_metric_anomalies",
        "Dashboard aggregate: anomaly count"
    );
    describe_gauge!("sentra_health_score", "Dashboard aggregate: health score");
    describe_gauge!("sentra_uptime_seconds", "Engine uptime in seconds");
}

/// Records a cycle phase transition.
pub fn record_phase_transition(from: &'static str, to: &'static str) {
    counter!("sentra_phase_transitions_total", "from" => from, "to" => to).increment(1);
}

/// Sets the currently active phase gauge.
///
/// Zeros out the previous phase label (if any) before setting the new
/// one, preventing stale labels from showing `1.0` in Prometheus.
pub fn set_current_phase(phase: &'static str, previous: Option<&'static str>) {
    if let Some(prev) = previous {
        gauge!("sentra_current_phase", "phase" => prev).set(0.0);
    }
    gauge!("sentra_current_phase", "phase" => phase).set(1.0);
}

/// Records one generated threat and its severity.
pub fn record_threat_detected(severity: u8) {
    counter!("sentra_threats_detected_total").increment(1);
    histogram!("sentra_threat_severity").record(f64::from(severity));
}

/// Records one threat containment.
pub fn record_threat_contained() {
    counter!("sentra_threats_contained_total").increment(1);
}

/// Records the anomaly-counter delta of one generation tick.
pub fn record_anomaly_delta(delta: u64) {
    counter!("sentra_anomaly_increments_total").increment(delta);
}

/// Mirrors the dashboard aggregate counters as gauges.
#[allow(clippy::cast_precision_loss)]
pub fn set_domain_gauges(metrics: &Metrics) {
    gauge!("sentra_metric_total_threats").set(metrics.total_threats as f64);
    gauge!("sentra_metric_blocked").set(metrics.blocked as f64);
    gauge!("sentra_metric_anomalies").set(metrics.anomalies as f64);
    gauge!("sentra_health_score").set(metrics.health_score);
}

/// Sets the engine uptime gauge.
pub fn set_uptime(duration: Duration) {
    gauge!("sentra_uptime_seconds").set(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_phase_transition("MONITOR", "ANALYZE");
        set_current_phase("ANALYZE", Some("MONITOR"));
        set_current_phase("MONITOR", None);
        record_threat_detected(85);
        record_threat_contained();
        record_anomaly_delta(9);
        set_domain_gauges(&Metrics::default());
        set_uptime(Duration::from_secs(300));
    }
}
