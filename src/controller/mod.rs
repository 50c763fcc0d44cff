// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fabric controller boundary.
//!
//! The engine sees the SDN controller as a tree of managed objects addressed by
//! distinguished name. Three primitives cover every workflow:
//!
//! - [`Controller::read`] - fetch one object, [`ControllerError::NotFound`] if absent
//! - [`Controller::create`] - create or modify one object
//! - [`Controller::delete`] - remove one object and its subtree
//!
//! Not-found is a typed variant. Only an empty read result or HTTP 404 produces it,
//! so unrelated failures can never be mistaken for a missing object.
//!
//! # Implementations
//!
//! - [`apic::ApicClient`] - REST transport with session login and retry
//! - [`memory::MemoryController`] - in-process object tree for tests and dry runs

pub mod apic;
pub mod memory;
pub mod retry;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors returned by a [`Controller`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The object does not exist
    #[error("object {dn} does not exist")]
    NotFound {
        /// Distinguished name that was addressed
        dn: String,
    },

    /// The controller answered with an error status
    #[error("controller rejected {dn} with HTTP {status}: {text}")]
    Rejected {
        /// Distinguished name that was addressed
        dn: String,
        /// HTTP status code
        status: u16,
        /// Error text returned by the controller
        text: String,
    },

    /// The controller could not be reached or answered with garbage
    #[error("controller transport error: {0}")]
    Transport(String),
}

impl ControllerError {
    /// True for the not-found class that triggers creation in ensure-exists.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for failures worth retrying (rate limiting, server errors, transport).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::Rejected { status, .. } => retry::is_transient_status(*status),
            Self::Transport(_) => true,
        }
    }
}

/// One controller object: class name, DN and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedObject {
    /// Controller class (e.g. `fvTenant`)
    pub class: String,
    /// Distinguished name
    pub dn: String,
    /// Attributes other than `dn`
    pub attributes: BTreeMap<String, String>,
}

impl ManagedObject {
    /// Create an object with no attributes.
    pub fn new(class: impl Into<String>, dn: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Read an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Encode as the controller's `{class: {attributes: {...}}}` document.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut attributes = Map::new();
        attributes.insert("dn".to_string(), Value::String(self.dn.clone()));
        for (name, value) in &self.attributes {
            attributes.insert(name.clone(), Value::String(value.clone()));
        }
        let mut document = Map::new();
        document.insert(self.class.clone(), json!({ "attributes": attributes }));
        Value::Object(document)
    }

    /// Decode one entry of a controller `imdata` array.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Transport`] if the document is not a single
    /// class object carrying a `dn` attribute.
    pub fn from_payload(payload: &Value) -> Result<Self, ControllerError> {
        let malformed = || ControllerError::Transport(format!("malformed object: {payload}"));

        let object = payload.as_object().ok_or_else(malformed)?;
        let (class, body) = object.iter().next().ok_or_else(malformed)?;
        let raw_attributes = body
            .get("attributes")
            .and_then(Value::as_object)
            .ok_or_else(malformed)?;

        let mut dn = None;
        let mut attributes = BTreeMap::new();
        for (name, value) in raw_attributes {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if name == "dn" {
                dn = Some(value);
            } else {
                attributes.insert(name.clone(), value);
            }
        }

        Ok(Self {
            class: class.clone(),
            dn: dn.ok_or_else(malformed)?,
            attributes,
        })
    }
}

/// Object-level operations against the fabric controller.
#[async_trait]
pub trait Controller: Send + Sync {
    /// Read one object by DN.
    async fn read(&self, dn: &str) -> Result<ManagedObject, ControllerError>;

    /// Create or modify one object.
    async fn create(&self, object: &ManagedObject) -> Result<(), ControllerError>;

    /// Delete one object and everything beneath it. Deleting an absent object succeeds.
    async fn delete(&self, dn: &str) -> Result<(), ControllerError>;
}
