// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Keyed resource store.
//!
//! The store maps `(table, key)` to a serialized snapshot and keeps named sets
//! for membership enumeration. It is the only durable state of the engine; all
//! typed access goes through [`crate::repository`].
//!
//! [`MemoryStore`] is the in-process implementation used by the binary and by
//! tests. A networked key-value backend implements the same trait.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors returned by a [`ResourceStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No value is stored under the key
    #[error("{table} {key} not found")]
    NotFound {
        /// Table that was read
        table: String,
        /// Missing key
        key: String,
    },

    /// A value is already stored under the key
    #[error("{table} {key} already exists")]
    AlreadyExists {
        /// Table that was written
        table: String,
        /// Existing key
        key: String,
    },

    /// The stored value cannot be decoded
    #[error("{table} {key} is corrupt: {reason}")]
    Corrupt {
        /// Table that was read
        table: String,
        /// Key of the corrupt value
        key: String,
        /// Decoding failure
        reason: String,
    },

    /// The backend cannot be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence primitives consumed by the repositories.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Store a new value. Fails with `AlreadyExists` if the key is taken.
    async fn create(&self, table: &str, key: &str, value: &str) -> Result<(), StoreError>;

    /// Replace an existing value. Fails with `NotFound` if the key is absent.
    async fn update(&self, table: &str, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read a value.
    async fn get(&self, table: &str, key: &str) -> Result<String, StoreError>;

    /// Remove a value. Fails with `NotFound` if the key is absent.
    async fn delete(&self, table: &str, key: &str) -> Result<(), StoreError>;

    /// Add a member to a named set.
    async fn add_to_set(&self, set_key: &str, member: &str) -> Result<(), StoreError>;

    /// Remove a member from a named set. Absent members are ignored.
    async fn remove_from_set(&self, set_key: &str, member: &str) -> Result<(), StoreError>;

    /// List the members of a named set, sorted.
    async fn list_set(&self, set_key: &str) -> Result<Vec<String>, StoreError>;

    /// List the keys of a table matching a `*` glob pattern, sorted.
    async fn list_keys_matching(&self, table: &str, pattern: &str)
        -> Result<Vec<String>, StoreError>;
}

/// Match `key` against a glob where `*` matches any run of characters.
#[must_use]
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let (first, last) = (parts[0], parts[parts.len() - 1]);
    if !key.starts_with(first) || key.len() < first.len() + last.len() || !key.ends_with(last) {
        return false;
    }

    let mut rest = &key[first.len()..key.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    true
}

/// In-process [`ResourceStore`].
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, BTreeMap<String, String>>>,
    sets: RwLock<HashMap<String, BTreeSet<String>>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            sets: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the backend going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }

    /// Number of values stored across all tables.
    pub async fn len(&self) -> usize {
        self.tables.read().await.values().map(BTreeMap::len).sum()
    }

    /// True when no value is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn create(&self, table: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains_key(key) {
            return Err(StoreError::AlreadyExists {
                table: table.to_string(),
                key: key.to_string(),
            });
        }
        rows.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn update(&self, table: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        match tables.get_mut(table).and_then(|rows| rows.get_mut(key)) {
            Some(existing) => {
                *existing = value.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                table: table.to_string(),
                key: key.to_string(),
            }),
        }
    }

    async fn get(&self, table: &str, key: &str) -> Result<String, StoreError> {
        self.check_available()?;
        self.tables
            .read()
            .await
            .get(table)
            .and_then(|rows| rows.get(key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                key: key.to_string(),
            })
    }

    async fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.tables
            .write()
            .await
            .get_mut(table)
            .and_then(|rows| rows.remove(key))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                key: key.to_string(),
            })
    }

    async fn add_to_set(&self, set_key: &str, member: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.sets
            .write()
            .await
            .entry(set_key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn remove_from_set(&self, set_key: &str, member: &str) -> Result<(), StoreError> {
        self.check_available()?;
        if let Some(members) = self.sets.write().await.get_mut(set_key) {
            members.remove(member);
        }
        Ok(())
    }

    async fn list_set(&self, set_key: &str) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        Ok(self
            .sets
            .read()
            .await
            .get(set_key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_keys_matching(
        &self,
        table: &str,
        pattern: &str,
    ) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .get(table)
            .map(|rows| {
                rows.keys()
                    .filter(|key| glob_match(pattern, key))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
