//! Metrics for the enrichment run, recorded through the `metrics` facade and exposed with a
//! Prometheus recorder.

use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info};

pub const REGISTRY_COLLABORATOR: &str = "registry";
pub const CONTACT_COLLABORATOR: &str = "contact";

/// Every metric name used by the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RowsProcessed,
    RowsSkipped,
    CollaboratorFailures,
    RowConfidence,
    RegistryRequestDuration,
    ContactRequestDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RowsProcessed => "enrich_rows_processed_total",
            MetricName::RowsSkipped => "enrich_rows_skipped_total",
            MetricName::CollaboratorFailures => "enrich_collaborator_failures_total",
            MetricName::RowConfidence => "enrich_row_confidence",
            MetricName::RegistryRequestDuration => "enrich_registry_request_duration_seconds",
            MetricName::ContactRequestDuration => "enrich_contact_request_duration_seconds",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling this more than once is a no-op.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics recorder installed");
    Ok(())
}

/// Render the current metric values in Prometheus text format, if a recorder is installed
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

/// Log the current snapshot at debug level
pub fn log_snapshot() {
    if let Some(snapshot) = render() {
        debug!("Metrics snapshot:\n{}", snapshot);
    }
}

pub mod enrich {
    use super::MetricName;

    pub fn row_processed() {
        ::metrics::counter!(MetricName::RowsProcessed.as_str()).increment(1);
    }

    pub fn row_skipped() {
        ::metrics::counter!(MetricName::RowsSkipped.as_str()).increment(1);
    }

    pub fn collaborator_failure(collaborator: &'static str) {
        ::metrics::counter!(MetricName::CollaboratorFailures.as_str(), "collaborator" => collaborator)
            .increment(1);
    }

    pub fn confidence_recorded(confidence: f64) {
        ::metrics::histogram!(MetricName::RowConfidence.as_str()).record(confidence);
    }
}

pub mod requests {
    use super::MetricName;

    pub fn registry_duration(secs: f64) {
        ::metrics::histogram!(MetricName::RegistryRequestDuration.as_str()).record(secs);
    }

    pub fn contact_duration(secs: f64) {
        ::metrics::histogram!(MetricName::ContactRequestDuration.as_str()).record(secs);
    }
}
