// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error taxonomy of the provisioning engine.
//!
//! Every orchestration operation returns [`FabricError`]. Each variant maps to
//! one HTTP status and one Redfish message identifier, so the HTTP layer can
//! turn any failure into an [`ErrorPayload`] without inspecting messages.
//!
//! | Variant | HTTP | Meaning |
//! |---------|------|---------|
//! | `Validation` | 400 | Malformed or missing request fields |
//! | `MalformedTopology` | 400 | Endpoint ports cannot be unified into one pattern |
//! | `Upstream` | 400 | The fabric controller failed a request |
//! | `NotFound` | 404 | Unknown fabric, zone, endpoint or address pool |
//! | `MethodNotAllowed` | 405 | Operation not legal on this resource type |
//! | `CannotDelete` | 406 | Dependents are still linked |
//! | `Conflict` | 409 | Duplicate name, gateway or port assignment |
//! | `StoreUnavailable` | 500 | Persistence layer unreachable |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::ControllerError;
use crate::status_reasons::{
    REASON_ACTION_NOT_SUPPORTED, REASON_GENERAL_ERROR, REASON_INTERNAL_ERROR,
    REASON_PROPERTY_MISSING, REASON_PROPERTY_VALUE_CONFLICT, REASON_PROPERTY_VALUE_FORMAT_ERROR,
    REASON_RESOURCE_ALREADY_EXISTS, REASON_RESOURCE_CANNOT_BE_DELETED, REASON_RESOURCE_NOT_FOUND,
};
use crate::store::StoreError;
use crate::topology::TopologyError;

/// Structured error body returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    /// Redfish message identifier (see [`crate::status_reasons`])
    pub status_message: String,
    /// Human-readable explanation
    pub error_message: String,
    /// Message arguments, usually the offending property or URI
    pub args: Vec<String>,
}

/// Errors returned by the orchestration engine.
#[derive(Error, Debug, Clone)]
pub enum FabricError {
    /// Malformed or missing request fields (HTTP 400)
    #[error("{message}")]
    Validation {
        /// Redfish message identifier
        reason: &'static str,
        /// Explanation of what is invalid
        message: String,
        /// Offending properties or values
        args: Vec<String>,
    },

    /// Duplicate name, gateway, port assignment or controller object (HTTP 409)
    #[error("{message}")]
    Conflict {
        /// Redfish message identifier
        reason: &'static str,
        /// Explanation of the conflict
        message: String,
        /// Conflicting resources or values
        args: Vec<String>,
    },

    /// The resource still has dependents (HTTP 406)
    #[error("{message}")]
    CannotDelete {
        /// Explanation of what still depends on the resource
        message: String,
        /// The resource that cannot be deleted
        args: Vec<String>,
    },

    /// Unknown fabric, zone, endpoint or address pool (HTTP 404)
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of the missing resource
        kind: &'static str,
        /// URI or identifier of the missing resource
        id: String,
    },

    /// Operation not legal for this resource (HTTP 405)
    #[error("{action} is not supported on {target}")]
    MethodNotAllowed {
        /// The rejected operation
        action: String,
        /// The resource it was attempted on
        target: String,
    },

    /// Endpoint ports cannot be unified into a switch/port pattern (HTTP 400)
    #[error("malformed topology: {0}")]
    MalformedTopology(#[from] TopologyError),

    /// Unexpected fabric controller failure (HTTP 400, message passed through)
    #[error("{0}")]
    Upstream(#[from] ControllerError),

    /// Persistence layer unreachable (HTTP 500)
    #[error("resource store unavailable: {0}")]
    StoreUnavailable(String),
}

impl FabricError {
    /// A required property is missing from the request.
    #[must_use]
    pub fn missing_property(property: &str) -> Self {
        Self::Validation {
            reason: REASON_PROPERTY_MISSING,
            message: format!("Property {property} is missing from the request body"),
            args: vec![property.to_string()],
        }
    }

    /// A property has an unparsable value.
    #[must_use]
    pub fn invalid_format(property: &str, value: &str) -> Self {
        Self::Validation {
            reason: REASON_PROPERTY_VALUE_FORMAT_ERROR,
            message: format!("Value {value} of property {property} has an invalid format"),
            args: vec![value.to_string(), property.to_string()],
        }
    }

    /// A property value conflicts with another value in the request or its referents.
    #[must_use]
    pub fn value_conflict(message: impl Into<String>, args: Vec<String>) -> Self {
        Self::Validation {
            reason: REASON_PROPERTY_VALUE_CONFLICT,
            message: message.into(),
            args,
        }
    }

    /// The resource, or an object it maps to, already exists.
    #[must_use]
    pub fn already_exists(message: impl Into<String>, args: Vec<String>) -> Self {
        Self::Conflict {
            reason: REASON_RESOURCE_ALREADY_EXISTS,
            message: message.into(),
            args,
        }
    }

    /// The resource cannot be deleted while dependents remain.
    #[must_use]
    pub fn cannot_delete(uri: &str, message: impl Into<String>) -> Self {
        Self::CannotDelete {
            message: message.into(),
            args: vec![uri.to_string()],
        }
    }

    /// The addressed resource does not exist.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::MalformedTopology(_) | Self::Upstream(_) => 400,
            Self::NotFound { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::CannotDelete { .. } => 406,
            Self::Conflict { .. } => 409,
            Self::StoreUnavailable(_) => 500,
        }
    }

    /// Redfish message identifier for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation { reason, .. } | Self::Conflict { reason, .. } => reason,
            Self::MalformedTopology(_) => REASON_PROPERTY_VALUE_FORMAT_ERROR,
            Self::Upstream(_) => REASON_GENERAL_ERROR,
            Self::NotFound { .. } => REASON_RESOURCE_NOT_FOUND,
            Self::MethodNotAllowed { .. } => REASON_ACTION_NOT_SUPPORTED,
            Self::CannotDelete { .. } => REASON_RESOURCE_CANNOT_BE_DELETED,
            Self::StoreUnavailable(_) => REASON_INTERNAL_ERROR,
        }
    }

    /// Build the structured payload returned to API clients.
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        let args = match self {
            Self::Validation { args, .. }
            | Self::Conflict { args, .. }
            | Self::CannotDelete { args, .. } => args.clone(),
            Self::NotFound { id, .. } => vec![id.clone()],
            Self::MethodNotAllowed { action, target } => vec![action.clone(), target.clone()],
            Self::MalformedTopology(_) | Self::Upstream(_) | Self::StoreUnavailable(_) => {
                Vec::new()
            }
        };

        ErrorPayload {
            status_message: self.reason().to_string(),
            error_message: self.to_string(),
            args,
        }
    }

    /// Short metric label for this error.
    #[must_use]
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::MalformedTopology(_) => "topology",
            Self::Upstream(_) => "controller",
            Self::NotFound { .. } => "not_found",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::CannotDelete { .. } => "cannot_delete",
            Self::Conflict { .. } => "conflict",
            Self::StoreUnavailable(_) => "store",
        }
    }
}

impl From<StoreError> for FabricError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, key } => Self::NotFound {
                kind: "resource",
                id: format!("{table}/{key}"),
            },
            StoreError::AlreadyExists { table, key } => Self::Conflict {
                reason: REASON_RESOURCE_ALREADY_EXISTS,
                message: format!("{table} {key} already exists"),
                args: vec![key],
            },
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
            StoreError::Corrupt { table, key, reason } => {
                Self::StoreUnavailable(format!("{table}/{key} is unreadable: {reason}"))
            }
        }
    }
}
