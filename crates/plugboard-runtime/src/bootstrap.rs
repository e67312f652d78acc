//! Runtime Bootstrap - Composition Root
//!
//! Builds a ready-to-use container from a [`RuntimeConfig`]: picks the event
//! bus implementation, creates the container publishing to it, and registers
//! the built-in service definitions. The resulting [`RuntimeContext`] is the
//! single process-scoped handle the host application owns and passes
//! explicitly to every subsystem that registers or looks up services — there
//! are no module-level container singletons.
//!
//! ## Usage
//!
//! ```ignore
//! let context = init_default_runtime().await?;
//!
//! // Register tool features / extensions
//! context.container().add_definitions(my_definitions).await?;
//!
//! // Look up built-ins
//! let settings = context
//!     .container()
//!     .get_service_as::<SettingsStore>(&SETTINGS_STORE);
//! ```

use crate::config::{EventBusKind, RuntimeConfig};
use crate::container::ServiceContainer;
use plugboard_domain::error::Result;
use plugboard_domain::events::SharedEventPublisher;
use plugboard_domain::SharedService;
use plugboard_services::{
    BroadcastEventBus, NullEventBus, event_bus_definition, settings_store_definition,
};
use std::sync::Arc;
use tracing::info;

/// Process-scoped runtime context owning the container and its event bus
pub struct RuntimeContext {
    /// Runtime configuration the context was built from
    config: Arc<RuntimeConfig>,
    /// The service container
    container: Arc<ServiceContainer>,
    /// Event bus the container publishes lifecycle events to
    event_bus: SharedEventPublisher,
}

impl RuntimeContext {
    /// Configuration the runtime was initialized with
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Get the service container
    pub fn container(&self) -> Arc<ServiceContainer> {
        self.container.clone()
    }

    /// Get the event bus
    pub fn event_bus(&self) -> SharedEventPublisher {
        self.event_bus.clone()
    }

    /// Tear down the container, disposing every active service
    pub async fn shutdown(&self) {
        let failures = self.container.dispose().await;
        info!(failures = failures.len(), "Runtime shut down");
    }
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("event_bus", &self.config.event_bus.provider)
            .finish_non_exhaustive()
    }
}

/// Initialize a runtime context from configuration.
///
/// Creates the configured event bus, a container publishing to it, and
/// registers the built-in definitions (the event bus itself as the
/// `EVENT_BUS` capability, and the settings store).
pub async fn init_runtime(config: RuntimeConfig) -> Result<RuntimeContext> {
    info!("Initializing plugboard runtime");
    let config = Arc::new(config);

    let (event_bus, bus_service): (SharedEventPublisher, SharedService) =
        match config.event_bus.provider {
            EventBusKind::Broadcast => {
                let bus = Arc::new(BroadcastEventBus::with_capacity(config.event_bus.capacity));
                let publisher: SharedEventPublisher = bus.clone();
                let service: SharedService = bus;
                (publisher, service)
            }
            EventBusKind::Null => {
                let bus = NullEventBus::new_shared();
                let publisher: SharedEventPublisher = bus.clone();
                let service: SharedService = bus;
                (publisher, service)
            }
        };

    let container = Arc::new(ServiceContainer::with_event_publisher(event_bus.clone()));
    container
        .add_definitions(vec![
            event_bus_definition(bus_service),
            settings_store_definition(),
        ])
        .await?;

    let active = container.active_count().await;
    info!(active, "Runtime initialized");

    Ok(RuntimeContext {
        config,
        container,
        event_bus,
    })
}

/// Initialize a runtime context with default configuration
pub async fn init_default_runtime() -> Result<RuntimeContext> {
    init_runtime(RuntimeConfig::default()).await
}
