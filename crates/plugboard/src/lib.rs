//! # plugboard
//!
//! A runtime service container for modular tools: independently developed
//! features declare which capabilities they *produce* and *consume*, and the
//! container wires them together with lazy, order-independent instantiation.
//!
//! ## Features
//!
//! - **Capability identities**: opaque tokens, never name-collided across
//!   independently authored modules
//! - **Incremental registration**: definitions may arrive in any order, at
//!   any time (plugin/extension loading); activation cascades as
//!   dependencies appear
//! - **Async factories**: construction may await I/O; resolution stays
//!   serialized so a capability never gains two producers
//! - **Lifecycle events**: registrations, activations, failures, and
//!   teardown published on an event bus
//! - **Diagnostics**: ask the container why a service is still waiting
//!
//! ## Example
//!
//! ```
//! use plugboard::{CapabilityId, Service, ServiceContainer, ServiceDefinition, ServiceProducts};
//!
//! struct Value(i32);
//! impl Service for Value {}
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> plugboard::Result<()> {
//! let x = CapabilityId::new("X");
//! let y = CapabilityId::new("Y");
//!
//! let container = ServiceContainer::new();
//! container
//!     .add_definitions(vec![
//!         ServiceDefinition::new("X Service", vec![x.clone()], vec![], |_deps| async {
//!             Ok(ServiceProducts::single(Value(1)))
//!         }),
//!         ServiceDefinition::new(
//!             "Y Service",
//!             vec![y.clone()],
//!             vec![x.clone()],
//!             |deps| async move {
//!                 let x = deps.downcast::<Value>(0)?;
//!                 Ok(ServiceProducts::single(Value(x.0 + 1)))
//!             },
//!         ),
//!     ])
//!     .await?;
//!
//! let y_service = container.get_service_as::<Value>(&y).expect("Y is active");
//! assert_eq!(y_service.0, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - `domain` - contracts: identities, definitions, events, errors
//! - `services` - built-in services: event bus providers, settings store
//! - `runtime` - the container, diagnostics, config, logging, bootstrap

/// Domain layer - contracts and shared types
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use plugboard_domain::*;
}

/// Built-in services - event bus providers and the settings store
///
/// Re-exports from the services crate for convenience
pub mod services {
    pub use plugboard_services::*;
}

/// Runtime layer - container, diagnostics, config, and bootstrap
///
/// Re-exports from the runtime crate for convenience
pub mod runtime {
    pub use plugboard_runtime::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::{
    CapabilityId, ContainerEvent, Error, EventPublisher, Observable, ObserverToken,
    ResolvedDependencies, Result, Service, ServiceDefinition, ServiceProducts, ServiceState,
    SharedEventPublisher, SharedService,
};

// Re-export the container and bootstrap entry points at the crate root
pub use runtime::{
    ConfigLoader, RuntimeConfig, RuntimeContext, ServiceContainer, init_default_runtime,
    init_runtime,
};

// Re-export the built-in service handles
pub use services::{
    BroadcastEventBus, EVENT_BUS, NullEventBus, SETTINGS_STORE, SettingDescriptor, SettingsStore,
};
