//! # plugboard-services
//!
//! Built-in service implementations for the plugboard container: in-process
//! event bus providers (null and tokio broadcast) and the settings store.
//! Each module exports its capability identity and a ready-made
//! [`ServiceDefinition`](plugboard_domain::ServiceDefinition) so the
//! bootstrap can register it like any other plugin-provided service.

pub mod events;
pub mod settings;

pub use events::{BroadcastEventBus, EVENT_BUS, NullEventBus, event_bus_definition};
pub use settings::{
    SETTINGS_STORE, SettingDescriptor, SettingsStore, settings_store_definition,
};
