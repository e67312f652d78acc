//! # plugboard-runtime
//!
//! Runtime layer of the plugboard service container: the container and its
//! dependency resolver, diagnostics, configuration loading, logging setup,
//! and the bootstrap composition root.

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod container;
pub mod logging;

pub use bootstrap::{RuntimeContext, init_default_runtime, init_runtime};
pub use config::{ConfigLoader, EventBusConfig, EventBusKind, LoggingConfig, RuntimeConfig};
pub use container::ServiceContainer;
pub use container::diagnostics::{CapabilityRef, PendingReport, ServiceInfo};
pub use logging::{init_logging, parse_log_level};
