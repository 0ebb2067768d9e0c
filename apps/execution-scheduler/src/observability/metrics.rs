//! Prometheus metrics for the execution scheduler.
//!
//! Counters for advanced-order lifecycle, child releases, timeouts, retries
//! and state saves. Recording is a no-op until an exporter is installed.
//!
//! # Example
//!
//! ```ignore
//! use execution_scheduler::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::default())?;
//! record_advanced_order_submitted(AlgorithmKind::Twap);
//! ```

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

use crate::domain::order_scheduling::value_objects::AlgorithmKind;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9090)),
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub const fn with_addr(addr: SocketAddr) -> Self {
        Self { listen_addr: addr }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Scheduling Metrics
// ============================================================================

/// Record an accepted advanced order.
pub fn record_advanced_order_submitted(kind: AlgorithmKind) {
    counter!("advanced_orders_submitted_total", "kind" => kind.to_string()).increment(1);
}

/// Record child orders released for submission.
pub fn record_child_orders_released(kind: AlgorithmKind, count: u64) {
    counter!("child_orders_released_total", "kind" => kind.to_string()).increment(count);
}

/// Record a completed advanced order.
pub fn record_advanced_order_completed(kind: AlgorithmKind) {
    counter!("advanced_orders_completed_total", "kind" => kind.to_string()).increment(1);
}

/// Record a cancelled advanced order.
pub fn record_advanced_order_cancelled(kind: AlgorithmKind) {
    counter!("advanced_orders_cancelled_total", "kind" => kind.to_string()).increment(1);
}

// ============================================================================
// Execution Metrics
// ============================================================================

/// Record a venue order timeout.
pub fn record_order_timeout() {
    counter!("order_timeouts_total").increment(1);
}

/// Record a price-walk retry.
pub fn record_order_retry() {
    counter!("order_retries_total").increment(1);
}

/// Record a venue order that ran out of retries.
pub fn record_retries_exhausted() {
    counter!("order_retries_exhausted_total").increment(1);
}

// ============================================================================
// Persistence Metrics
// ============================================================================

/// Record a state save attempt.
///
/// # Arguments
///
/// * `outcome` - `saved`, `skipped_unchanged`, `dropped_in_flight` or `failed`
pub fn record_state_save(outcome: &'static str) {
    counter!("state_saves_total", "outcome" => outcome).increment(1);
}
