// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the fabric provisioner.
//!
//! All metrics carry the namespace prefix `fabric_provisioner_`.
//!
//! # Metrics Categories
//!
//! - **Operation Metrics** - Count and time every orchestration operation
//! - **Controller Metrics** - Count calls to the fabric controller by outcome
//! - **Event Metrics** - Track published and dropped resource events
//!
//! # Example
//!
//! ```rust,no_run
//! use fabric_provisioner::metrics::record_operation_success;
//!
//! record_operation_success("Zone", "create", std::time::Duration::from_millis(120));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

use crate::controller::ControllerError;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics
const METRICS_NAMESPACE: &str = "fabric_provisioner";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Operation Metrics
// ============================================================================

/// Total number of orchestration operations
///
/// Labels:
/// - `resource_type`: `Zone`, `Endpoint` or `AddressPool`
/// - `operation`: `create`, `update`, `delete`
/// - `status`: `success` or the error class (`conflict`, `validation`, ...)
pub static OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_operations_total"),
        "Total number of orchestration operations by resource type, operation and status",
    );
    let counter = CounterVec::new(opts, &["resource_type", "operation", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of orchestration operations in seconds
///
/// Labels:
/// - `resource_type`: `Zone`, `Endpoint` or `AddressPool`
/// - `operation`: `create`, `update`, `delete`
pub static OPERATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_operation_duration_seconds"),
        "Duration of orchestration operations in seconds",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["resource_type", "operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Controller Metrics
// ============================================================================

/// Total number of fabric controller calls
///
/// Labels:
/// - `method`: HTTP method
/// - `outcome`: `success`, `not_found`, `rejected`, `transport`
pub static CONTROLLER_CALLS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_controller_calls_total"),
        "Total number of fabric controller calls by method and outcome",
    );
    let counter = CounterVec::new(opts, &["method", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Event Metrics
// ============================================================================

/// Total number of resource events
///
/// Labels:
/// - `outcome`: `published` or `dropped`
pub static EVENTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_events_total"),
        "Total number of resource events by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful orchestration operation
///
/// # Arguments
/// * `resource_type` - The kind of resource (e.g., `Zone`)
/// * `operation` - The operation (e.g., `create`)
/// * `duration` - Duration of the operation
pub fn record_operation_success(resource_type: &str, operation: &str, duration: Duration) {
    OPERATIONS_TOTAL
        .with_label_values(&[resource_type, operation, "success"])
        .inc();
    OPERATION_DURATION_SECONDS
        .with_label_values(&[resource_type, operation])
        .observe(duration.as_secs_f64());
}

/// Record a failed orchestration operation
///
/// # Arguments
/// * `resource_type` - The kind of resource
/// * `operation` - The operation
/// * `error_class` - Short error label (see `FabricError::metric_label`)
/// * `duration` - Duration of the operation before failure
pub fn record_operation_error(
    resource_type: &str,
    operation: &str,
    error_class: &str,
    duration: Duration,
) {
    OPERATIONS_TOTAL
        .with_label_values(&[resource_type, operation, error_class])
        .inc();
    OPERATION_DURATION_SECONDS
        .with_label_values(&[resource_type, operation])
        .observe(duration.as_secs_f64());
}

/// Record the outcome of one controller call
pub fn record_controller_call<T>(method: &str, result: &Result<T, ControllerError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(ControllerError::NotFound { .. }) => "not_found",
        Err(ControllerError::Rejected { .. }) => "rejected",
        Err(ControllerError::Transport(_)) => "transport",
    };
    CONTROLLER_CALLS_TOTAL
        .with_label_values(&[method, outcome])
        .inc();
}

/// Record a published event
pub fn record_event_published() {
    EVENTS_TOTAL.with_label_values(&["published"]).inc();
}

/// Record an event dropped because the queue was full or closed
pub fn record_event_dropped() {
    EVENTS_TOTAL.with_label_values(&["dropped"]).inc();
}

/// Gather all metrics in Prometheus text format
///
/// # Errors
/// Returns error if metrics encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operation_success() {
        let duration = Duration::from_millis(500);

        record_operation_success("TestResource", "create", duration);

        let counter = OPERATIONS_TOTAL.with_label_values(&["TestResource", "create", "success"]);
        assert!(counter.get() > 0.0);

        let histogram = OPERATION_DURATION_SECONDS.with_label_values(&["TestResource", "create"]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_operation_error() {
        record_operation_error(
            "TestResourceError",
            "delete",
            "cannot_delete",
            Duration::from_millis(250),
        );

        let counter =
            OPERATIONS_TOTAL.with_label_values(&["TestResourceError", "delete", "cannot_delete"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn test_record_controller_call() {
        let result: Result<(), ControllerError> = Err(ControllerError::NotFound {
            dn: "uni/tn-x".to_string(),
        });
        record_controller_call("TESTGET", &result);

        let counter = CONTROLLER_CALLS_TOTAL.with_label_values(&["TESTGET", "not_found"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn test_gather_metrics() {
        record_operation_success("GatherTest", "create", Duration::from_millis(100));

        let result = gather_metrics();
        assert!(result.is_ok(), "Gathering metrics should succeed");

        let metrics_text = result.unwrap();
        assert!(
            metrics_text.contains("fabric_provisioner"),
            "Metrics should contain namespace prefix"
        );
        assert!(
            metrics_text.contains("operations_total"),
            "Metrics should contain operation counter"
        );
    }
}
