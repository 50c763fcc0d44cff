// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-resource mutual exclusion for provisioning workflows.
//!
//! Workflows read, check and then write both the store and the controller.
//! Two workflows touching the same `(fabricID, resourceID)` are serialized by
//! an async mutex keyed on that pair. A workflow that touches several resources
//! acquires all of their locks in sorted key order, so lock order is global and
//! no two workflows can deadlock.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

use crate::constants::KEY_SEPARATOR;

/// Registry of per-resource async mutexes.
#[derive(Debug, Default)]
pub struct ResourceLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held locks; released on drop.
#[derive(Debug)]
pub struct ResourceGuard {
    keys: Vec<String>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl ResourceGuard {
    /// Keys held by this guard, in acquisition order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl ResourceLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex_for(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Entries nobody holds or waits on can go.
        locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Lock every `resource` of `fabric_id`, waiting for current holders.
    pub async fn acquire<I, S>(&self, fabric_id: &str, resources: I) -> ResourceGuard
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: BTreeSet<String> = resources
            .into_iter()
            .map(|resource| format!("{fabric_id}{KEY_SEPARATOR}{}", resource.as_ref()))
            .collect();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            let mutex = self.mutex_for(key);
            guards.push(mutex.lock_owned().await);
            trace!(key = %key, "Acquired resource lock");
        }

        ResourceGuard {
            keys: keys.into_iter().collect(),
            _guards: guards,
        }
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
