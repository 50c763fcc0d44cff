// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Redfish message identifiers reported in error payloads.
//!
//! Every failed request returns an [`ErrorPayload`](crate::errors::ErrorPayload)
//! whose `statusMessage` is one of the identifiers below. Clients match on these
//! identifiers, never on the human-readable `errorMessage`.
//!
//! # Example Payload
//!
//! ```json
//! {
//!   "statusMessage": "ResourceCannotBeDeleted",
//!   "errorMessage": "Zone /redfish/v1/Fabrics/f1/Zones/z1 still contains 2 zones",
//!   "args": ["/redfish/v1/Fabrics/f1/Zones/z1"]
//! }
//! ```

// ============================================================================
// Validation (400)
// ============================================================================

/// A required property was absent from the request body.
pub const REASON_PROPERTY_MISSING: &str = "PropertyMissing";

/// A property value has the wrong format (bad CIDR, malformed port URI, ...).
pub const REASON_PROPERTY_VALUE_FORMAT_ERROR: &str = "PropertyValueFormatError";

/// A property value conflicts with another value in the same request
/// (duplicate ports, inverted ranges, wrong parent type).
pub const REASON_PROPERTY_VALUE_CONFLICT: &str = "PropertyValueConflict";

/// The request body could not be parsed.
pub const REASON_MALFORMED_JSON: &str = "MalformedJSON";

// ============================================================================
// Conflicts (409)
// ============================================================================

/// The resource, or a controller object it maps to, already exists.
pub const REASON_RESOURCE_ALREADY_EXISTS: &str = "ResourceAlreadyExists";

/// The resource is already claimed by another resource.
pub const REASON_RESOURCE_IN_USE: &str = "ResourceInUse";

// ============================================================================
// Lifecycle (404 / 405 / 406)
// ============================================================================

/// The addressed resource does not exist.
pub const REASON_RESOURCE_NOT_FOUND: &str = "ResourceNotFound";

/// The operation is not supported on this resource.
pub const REASON_ACTION_NOT_SUPPORTED: &str = "ActionNotSupported";

/// The resource still has dependents and cannot be deleted.
pub const REASON_RESOURCE_CANNOT_BE_DELETED: &str = "ResourceCannotBeDeleted";

// ============================================================================
// Failures (400 / 500)
// ============================================================================

/// The fabric controller rejected or failed a request.
pub const REASON_GENERAL_ERROR: &str = "GeneralError";

/// The resource store could not be reached.
pub const REASON_INTERNAL_ERROR: &str = "InternalError";
