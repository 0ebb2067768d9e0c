//! Observability module for metrics and logging.
//!
//! This module provides instrumentation for the execution scheduler,
//! including Prometheus metrics export and tracing subscriber setup.

mod metrics;
mod tracing;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_advanced_order_cancelled,
    record_advanced_order_completed, record_advanced_order_submitted,
    record_child_orders_released, record_order_retry, record_order_timeout,
    record_retries_exhausted, record_state_save,
};
pub use tracing::{LogFormat, TracingError, default_directive, init_tracing};
