// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all orchestrators.
//!
//! Every workflow receives an `Arc<Context>` that contains:
//! - Entity repositories over the resource store
//! - The fabric controller client
//! - Per-resource locks
//! - The event publisher

use std::sync::Arc;

use crate::controller::Controller;
use crate::events::EventPublisher;
use crate::locks::ResourceLocks;
use crate::repository::Repositories;
use crate::store::ResourceStore;

/// Shared context passed to all orchestrators.
#[derive(Clone)]
pub struct Context {
    /// Typed access to persisted entities
    pub repos: Repositories,

    /// Fabric controller client
    pub controller: Arc<dyn Controller>,

    /// Per-(fabric, resource) mutual exclusion
    pub locks: Arc<ResourceLocks>,

    /// Outbound event queue
    pub events: EventPublisher,
}

impl Context {
    /// Assemble a context around a store, a controller and an event publisher.
    #[must_use]
    pub fn new(
        store: Arc<dyn ResourceStore>,
        controller: Arc<dyn Controller>,
        events: EventPublisher,
    ) -> Self {
        Self {
            repos: Repositories::new(store),
            controller,
            locks: Arc::new(ResourceLocks::new()),
            events,
        }
    }
}
