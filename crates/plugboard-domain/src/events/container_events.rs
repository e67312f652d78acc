//! Container Event Domain Port
//!
//! Defines the business contract for publishing container lifecycle events.
//! This abstraction lets the container announce state changes without
//! coupling to a specific transport (tokio broadcast, null sink, etc.).

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle events emitted by the service container.
///
/// Capabilities appear by diagnostic name only: events are serializable
/// monitoring data, not lookup handles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ContainerEvent {
    /// A definition was accepted and is pending or about to resolve
    DefinitionRegistered {
        /// Friendly name of the registered definition
        friendly_name: String,
    },
    /// A definition's factory ran and its capabilities became available
    ServiceActivated {
        /// Friendly name of the activated definition
        friendly_name: String,
        /// Diagnostic names of the capabilities it produced
        produces: Vec<String>,
    },
    /// A definition's factory failed; the definition was dropped
    FactoryFailed {
        /// Friendly name of the failed definition
        friendly_name: String,
        /// Failure description
        message: String,
    },
    /// An active definition was removed and its capabilities released
    ServiceRemoved {
        /// Friendly name of the removed definition
        friendly_name: String,
        /// Diagnostic names of the released capabilities
        released: Vec<String>,
    },
    /// The whole container was torn down
    ContainerDisposed {
        /// Number of definitions disposed
        disposed: usize,
        /// Number of disposers that failed
        failures: usize,
    },
}

/// Domain port for publishing container events.
///
/// Publishing is best effort: implementations report transport problems, but
/// the container never lets a publish failure change a resolution outcome.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all subscribers
    async fn publish(&self, event: ContainerEvent) -> Result<()>;

    /// Check if there are any active subscribers
    ///
    /// Useful for skipping event construction when no one is listening.
    fn has_subscribers(&self) -> bool;
}

/// Shared event publisher for dependency injection
pub type SharedEventPublisher = Arc<dyn EventPublisher>;
