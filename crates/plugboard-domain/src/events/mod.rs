//! Container lifecycle events and the publisher port

mod container_events;

pub use container_events::{ContainerEvent, EventPublisher, SharedEventPublisher};
