// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provisioning workflows.
//!
//! Each submodule owns the lifecycle of one resource kind:
//!
//! - [`address_pool`] - IPv4/VLAN allocation blocks
//! - [`endpoint`] - port groups bound to controller policy groups
//! - [`zone`] - tenants, application profiles and bridge domains
//!
//! Every public operation validates its request before touching the controller,
//! holds the locks of every resource it reads and writes, records an operation
//! metric and publishes a resource event on success.

pub mod address_pool;
pub mod endpoint;
pub mod zone;

use std::future::Future;
use std::time::Instant;

use tracing::{error, warn};
use uuid::Uuid;

use crate::errors::FabricError;
use crate::metrics;
use crate::model::Link;

/// Resource type label of zones
pub(crate) const RESOURCE_ZONE: &str = "Zone";
/// Resource type label of endpoints
pub(crate) const RESOURCE_ENDPOINT: &str = "Endpoint";
/// Resource type label of address pools
pub(crate) const RESOURCE_ADDRESS_POOL: &str = "AddressPool";

/// Run one operation, recording its outcome and duration.
pub(crate) async fn observed<T, F>(
    resource_type: &'static str,
    operation: &'static str,
    work: F,
) -> Result<T, FabricError>
where
    F: Future<Output = Result<T, FabricError>>,
{
    let start = Instant::now();
    let result = work.await;
    let elapsed = start.elapsed();

    match &result {
        Ok(_) => metrics::record_operation_success(resource_type, operation, elapsed),
        Err(e) => {
            if e.status_code() >= 500 || matches!(e, FabricError::Upstream(_)) {
                error!(
                    resource_type = resource_type,
                    operation = operation,
                    error = %e,
                    "Operation failed"
                );
            } else {
                warn!(
                    resource_type = resource_type,
                    operation = operation,
                    status = e.status_code(),
                    error = %e,
                    "Operation rejected"
                );
            }
            metrics::record_operation_error(resource_type, operation, e.metric_label(), elapsed);
        }
    }
    result
}

/// A fresh resource identifier.
#[must_use]
pub(crate) fn new_resource_id() -> String {
    Uuid::new_v4().to_string()
}

/// Reject a link list that repeats a URI.
pub(crate) fn ensure_distinct(links: &[Link], property: &str) -> Result<(), FabricError> {
    let mut seen = std::collections::BTreeSet::new();
    for link in links {
        if !seen.insert(link.uri()) {
            return Err(FabricError::value_conflict(
                format!("{} appears more than once in {property}", link.uri()),
                vec![link.uri().to_string(), property.to_string()],
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
