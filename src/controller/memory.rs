// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-process controller.
//!
//! Keeps the object tree in memory and journals every call, so tests can assert
//! exactly which objects a workflow created or deleted and in which order. The
//! binary uses it in `--dry-run` mode.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::{Controller, ControllerError, ManagedObject};

/// One journaled controller call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCall {
    /// `read(dn)`
    Read(String),
    /// `create(object)`
    Create(String),
    /// `delete(dn)`
    Delete(String),
}

#[derive(Debug, Default)]
struct State {
    objects: BTreeMap<String, ManagedObject>,
    journal: Vec<ControllerCall>,
    failures: HashMap<String, ControllerError>,
}

/// Controller backed by an in-memory object tree.
#[derive(Debug, Default)]
pub struct MemoryController {
    state: Mutex<State>,
}

impl MemoryController {
    /// Create an empty controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call addressing `dn` fail with `error`.
    pub fn fail_on(&self, dn: &str, error: ControllerError) {
        self.state().failures.insert(dn.to_string(), error);
    }

    /// Stop injecting failures for `dn`.
    pub fn clear_failure(&self, dn: &str) {
        self.state().failures.remove(dn);
    }

    /// Seed an object without journaling the call.
    pub fn insert(&self, object: ManagedObject) {
        self.state().objects.insert(object.dn.clone(), object);
    }

    /// True when an object exists at `dn`.
    #[must_use]
    pub fn contains(&self, dn: &str) -> bool {
        self.state().objects.contains_key(dn)
    }

    /// Copy of the object at `dn`.
    #[must_use]
    pub fn get(&self, dn: &str) -> Option<ManagedObject> {
        self.state().objects.get(dn).cloned()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.state().objects.len()
    }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ControllerCall> {
        self.state().journal.clone()
    }

    /// DNs passed to `create`, oldest first.
    #[must_use]
    pub fn created_dns(&self) -> Vec<String> {
        self.state()
            .journal
            .iter()
            .filter_map(|call| match call {
                ControllerCall::Create(dn) => Some(dn.clone()),
                _ => None,
            })
            .collect()
    }

    /// DNs passed to `delete`, oldest first.
    #[must_use]
    pub fn deleted_dns(&self) -> Vec<String> {
        self.state()
            .journal
            .iter()
            .filter_map(|call| match call {
                ControllerCall::Delete(dn) => Some(dn.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget the journal, keeping objects.
    pub fn clear_journal(&self) {
        self.state().journal.clear();
    }
}

#[async_trait]
impl Controller for MemoryController {
    async fn read(&self, dn: &str) -> Result<ManagedObject, ControllerError> {
        let mut state = self.state();
        state.journal.push(ControllerCall::Read(dn.to_string()));
        if let Some(err) = state.failures.get(dn) {
            return Err(err.clone());
        }
        state
            .objects
            .get(dn)
            .cloned()
            .ok_or_else(|| ControllerError::NotFound { dn: dn.to_string() })
    }

    async fn create(&self, object: &ManagedObject) -> Result<(), ControllerError> {
        let mut state = self.state();
        state.journal.push(ControllerCall::Create(object.dn.clone()));
        if let Some(err) = state.failures.get(&object.dn) {
            return Err(err.clone());
        }
        match state.objects.get_mut(&object.dn) {
            Some(existing) => existing
                .attributes
                .extend(object.attributes.iter().map(|(k, v)| (k.clone(), v.clone()))),
            None => {
                state.objects.insert(object.dn.clone(), object.clone());
            }
        }
        debug!(dn = %object.dn, class = %object.class, "Stored controller object");
        Ok(())
    }

    async fn delete(&self, dn: &str) -> Result<(), ControllerError> {
        let mut state = self.state();
        state.journal.push(ControllerCall::Delete(dn.to_string()));
        if let Some(err) = state.failures.get(dn) {
            return Err(err.clone());
        }
        let subtree = format!("{dn}/");
        state
            .objects
            .retain(|key, _| key != dn && !key.starts_with(&subtree));
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
