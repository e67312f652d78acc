//! Event Bus Providers
//!
//! In-process implementations of the container's [`EventPublisher`] port.
//! Both are plain services as well, so the bootstrap can expose the bus the
//! container publishes to as a consumable capability (see [`EVENT_BUS`]).

use async_trait::async_trait;
use plugboard_domain::error::Result;
use plugboard_domain::events::{ContainerEvent, EventPublisher};
use plugboard_domain::{CapabilityId, Service, ServiceDefinition, SharedService};
use std::sync::{Arc, LazyLock};
use tokio::sync::broadcast;
use tracing::debug;

/// Capability identity of the event bus service
pub static EVENT_BUS: LazyLock<CapabilityId> = LazyLock::new(|| CapabilityId::new("EventBus"));

/// Expose an already-built event bus as the [`EVENT_BUS`] capability
pub fn event_bus_definition(bus: SharedService) -> ServiceDefinition {
    ServiceDefinition::from_instance("Event Bus", EVENT_BUS.clone(), bus)
}

// ============================================================================
// Null Event Bus (Testing)
// ============================================================================

/// Event bus that discards every published event.
///
/// Useful in tests and in runtimes that do not care about container
/// lifecycle monitoring.
#[derive(Debug, Default)]
pub struct NullEventBus;

impl NullEventBus {
    /// Create a new null event bus
    pub fn new() -> Self {
        Self
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl EventPublisher for NullEventBus {
    async fn publish(&self, _event: ContainerEvent) -> Result<()> {
        Ok(())
    }

    fn has_subscribers(&self) -> bool {
        false
    }
}

impl Service for NullEventBus {}

// ============================================================================
// Tokio Broadcast Event Bus (Production)
// ============================================================================

/// Default channel capacity
const DEFAULT_CAPACITY: usize = 1024;

/// Event bus backed by a tokio broadcast channel.
///
/// Events fan out to every active subscriber without persistence; slow
/// subscribers that fall more than `capacity` events behind observe a lag.
#[derive(Clone)]
pub struct BroadcastEventBus {
    sender: Arc<broadcast::Sender<ContainerEvent>>,
    capacity: usize,
}

impl BroadcastEventBus {
    /// Create a new broadcast bus with the default capacity (1024)
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create with custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
            capacity,
        }
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Open a new subscription to container events
    pub fn subscribe(&self) -> broadcast::Receiver<ContainerEvent> {
        self.sender.subscribe()
    }

    /// Get the current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BroadcastEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastEventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventBus {
    async fn publish(&self, event: ContainerEvent) -> Result<()> {
        match self.sender.send(event) {
            Ok(count) => {
                debug!("Published container event to {} subscribers", count);
            }
            Err(_) => {
                debug!("Published container event but no subscribers");
            }
        }
        Ok(())
    }

    fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Service for BroadcastEventBus {}
