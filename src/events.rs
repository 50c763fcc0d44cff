// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Outbound resource events.
//!
//! Every successful create, update or delete publishes a [`ResourceEvent`].
//! Publishing never blocks and never fails the request: events go onto a
//! bounded FIFO queue and a background worker drains it into an [`EventSink`].
//! When the queue is full the event is dropped and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::metrics;

/// What happened to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The resource was created
    ResourceAdded,
    /// The resource was modified
    ResourceUpdated,
    /// The resource was deleted
    ResourceRemoved,
}

/// A change notification for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceEvent {
    /// Kind of change
    pub event_type: EventKind,
    /// URI of the changed resource
    pub origin_of_condition: String,
    /// When the change completed
    pub event_timestamp: DateTime<Utc>,
}

impl ResourceEvent {
    /// Build an event stamped with the current time.
    pub fn new(event_type: EventKind, uri: impl Into<String>) -> Self {
        Self {
            event_type,
            origin_of_condition: uri.into(),
            event_timestamp: Utc::now(),
        }
    }
}

/// Destination of drained events, e.g. a message bus.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event. Failures are the sink's to log.
    async fn deliver(&self, event: ResourceEvent);
}

/// Sink that writes events to the log.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    async fn deliver(&self, event: ResourceEvent) {
        info!(
            event_type = ?event.event_type,
            origin = %event.origin_of_condition,
            "Resource event"
        );
    }
}

/// Publication counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublisherStats {
    /// Events accepted onto the queue
    pub published: u64,
    /// Events dropped because the queue was full or closed
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    dropped: AtomicU64,
}

/// Non-blocking handle for publishing events.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: mpsc::Sender<ResourceEvent>,
    counters: Arc<Counters>,
}

/// Receiving end of the event queue.
pub struct EventQueue {
    receiver: mpsc::Receiver<ResourceEvent>,
}

impl EventPublisher {
    /// Create a publisher and its queue holding at most `capacity` events.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, EventQueue) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                counters: Arc::new(Counters::default()),
            },
            EventQueue { receiver },
        )
    }

    /// Create a publisher and spawn a worker draining its queue into `sink`.
    #[must_use]
    pub fn spawn(capacity: usize, sink: Arc<dyn EventSink>) -> (Self, JoinHandle<()>) {
        let (publisher, queue) = Self::channel(capacity);
        let worker = tokio::spawn(queue.drain_into(sink));
        (publisher, worker)
    }

    /// Enqueue an event without waiting. A full or closed queue drops it.
    pub fn publish(&self, event: ResourceEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {
                self.counters.published.fetch_add(1, Ordering::Relaxed);
                metrics::record_event_published();
            }
            Err(TrySendError::Full(event) | TrySendError::Closed(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::record_event_dropped();
                warn!(
                    event_type = ?event.event_type,
                    origin = %event.origin_of_condition,
                    "Event queue unavailable, dropping event"
                );
            }
        }
    }

    /// Shorthand for [`publish`](Self::publish) of a new event.
    pub fn notify(&self, event_type: EventKind, uri: &str) {
        self.publish(ResourceEvent::new(event_type, uri));
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> PublisherStats {
        PublisherStats {
            published: self.counters.published.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

impl EventQueue {
    /// Receive the next event, or `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<ResourceEvent> {
        self.receiver.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<ResourceEvent> {
        self.receiver.try_recv().ok()
    }

    /// Deliver events to `sink` in FIFO order until every publisher is dropped.
    pub async fn drain_into(mut self, sink: Arc<dyn EventSink>) {
        while let Some(event) = self.receiver.recv().await {
            sink.deliver(event).await;
        }
        debug!("Event queue closed, worker exiting");
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod events_tests;
