// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `events.rs`

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::events::{EventKind, EventPublisher, EventSink, PublisherStats, ResourceEvent};

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<ResourceEvent>>,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn deliver(&self, event: ResourceEvent) {
            self.events.lock().await.push(event);
        }
    }

    #[tokio::test]
    async fn test_events_are_fifo() {
        let (publisher, mut queue) = EventPublisher::channel(8);

        publisher.notify(EventKind::ResourceAdded, "/a");
        publisher.notify(EventKind::ResourceRemoved, "/b");

        assert_eq!(queue.recv().await.unwrap().origin_of_condition, "/a");
        let second = queue.recv().await.unwrap();
        assert_eq!(second.origin_of_condition, "/b");
        assert_eq!(second.event_type, EventKind::ResourceRemoved);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (publisher, _queue) = EventPublisher::channel(1);

        publisher.notify(EventKind::ResourceAdded, "/a");
        publisher.notify(EventKind::ResourceAdded, "/b");

        assert_eq!(
            publisher.stats(),
            PublisherStats {
                published: 1,
                dropped: 1
            }
        );
    }

    #[tokio::test]
    async fn test_closed_queue_drops() {
        let (publisher, queue) = EventPublisher::channel(4);
        drop(queue);

        publisher.notify(EventKind::ResourceUpdated, "/a");

        assert_eq!(publisher.stats().dropped, 1);
    }

    #[tokio::test]
    async fn test_worker_drains_into_sink() {
        let sink = Arc::new(RecordingSink::default());
        let (publisher, worker) = EventPublisher::spawn(4, sink.clone());

        publisher.notify(EventKind::ResourceAdded, "/a");
        publisher.notify(EventKind::ResourceUpdated, "/a");
        drop(publisher);
        worker.await.unwrap();

        let events = sink.events.lock().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type, EventKind::ResourceUpdated);
    }

    #[test]
    fn test_event_wire_shape() {
        let event = ResourceEvent::new(EventKind::ResourceAdded, "/redfish/v1/Fabrics/f1/Zones/z");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["EventType"], "ResourceAdded");
        assert_eq!(json["OriginOfCondition"], "/redfish/v1/Fabrics/f1/Zones/z");
        assert!(json.get("EventTimestamp").is_some());
    }
}
