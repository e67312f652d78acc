//! # plugboard-domain
//!
//! Core contracts of the plugboard service container: capability identities,
//! service definitions, lifecycle states, container events, and the shared
//! error type. This crate is pure — it holds no container machinery and no
//! I/O, only the types the other layers agree on.

pub mod definition;
pub mod error;
pub mod events;
pub mod identity;
pub mod lifecycle;
pub mod observable;
pub mod service;

pub use definition::{
    FactoryFuture, ResolvedDependencies, ServiceDefinition, ServiceFactory, ServiceProducts,
};
pub use error::{Error, Result};
pub use events::{ContainerEvent, EventPublisher, SharedEventPublisher};
pub use identity::CapabilityId;
pub use lifecycle::ServiceState;
pub use observable::{Observable, ObserverToken};
pub use service::{Service, SharedService};
