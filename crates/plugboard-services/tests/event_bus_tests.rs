//! Unit tests for the event bus providers

use plugboard_domain::events::{ContainerEvent, EventPublisher};
use plugboard_services::{BroadcastEventBus, EVENT_BUS, NullEventBus, event_bus_definition};
use std::sync::Arc;

fn sample_event() -> ContainerEvent {
    ContainerEvent::ServiceActivated {
        friendly_name: "Sample Service".to_string(),
        produces: vec!["Sample".to_string()],
    }
}

/// Test the null bus accepts events and reports no subscribers
#[tokio::test]
async fn test_null_bus_discards_events() {
    let bus = NullEventBus::new();

    assert!(!bus.has_subscribers());
    bus.publish(sample_event()).await.expect("publish must succeed");
}

/// Test broadcast subscribers receive published events
#[tokio::test]
async fn test_broadcast_delivery() {
    let bus = BroadcastEventBus::new();
    let mut receiver = bus.subscribe();

    assert!(bus.has_subscribers());
    bus.publish(sample_event()).await.expect("publish must succeed");

    let received = receiver.recv().await.expect("event must arrive");
    assert_eq!(received, sample_event());
}

/// Test subscriber count tracks open receivers
#[tokio::test]
async fn test_subscriber_count() {
    let bus = BroadcastEventBus::with_capacity(8);
    assert_eq!(bus.subscriber_count(), 0);
    assert!(!bus.has_subscribers());

    let first = bus.subscribe();
    let second = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 2);

    drop(first);
    drop(second);
    assert_eq!(bus.subscriber_count(), 0);
}

/// Test publishing without subscribers is not an error
#[tokio::test]
async fn test_broadcast_without_subscribers() {
    let bus = BroadcastEventBus::new();
    bus.publish(sample_event()).await.expect("publish must succeed");
}

/// Test the event bus definition exposes a pre-built bus
#[test]
fn test_event_bus_definition_shape() {
    let bus = BroadcastEventBus::new_shared();
    let definition = event_bus_definition(bus);

    assert_eq!(definition.friendly_name(), "Event Bus");
    assert_eq!(definition.produces(), &[EVENT_BUS.clone()]);
    assert!(definition.consumes().is_empty());
}

/// Test clones publish into the same channel
#[tokio::test]
async fn test_cloned_bus_shares_channel() {
    let bus = Arc::new(BroadcastEventBus::new());
    let clone = Arc::clone(&bus);
    let mut receiver = bus.subscribe();

    clone.publish(sample_event()).await.expect("publish must succeed");
    let received = receiver.recv().await.expect("event must arrive");
    assert_eq!(received, sample_event());
}
