//! Settings Store Service
//!
//! A headless key/value settings service: typed descriptors with defaults,
//! JSON-encoded storage, and synchronous change notification. Persistence of
//! the underlying values (disk, browser storage, ...) is the host's concern;
//! this service owns the in-memory state and the change observable.

use dashmap::DashMap;
use plugboard_domain::error::{Error, Result};
use plugboard_domain::observable::Observable;
use plugboard_domain::{CapabilityId, Service, ServiceDefinition, ServiceProducts};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

/// Capability identity of the settings store service
pub static SETTINGS_STORE: LazyLock<CapabilityId> =
    LazyLock::new(|| CapabilityId::new("SettingsStore"));

/// Built-in definition producing the [`SETTINGS_STORE`] capability
pub fn settings_store_definition() -> ServiceDefinition {
    ServiceDefinition::new(
        "Settings Store",
        vec![SETTINGS_STORE.clone()],
        Vec::new(),
        |_deps| async { Ok(ServiceProducts::single(SettingsStore::new())) },
    )
}

/// Describes one setting: its storage key and the value used until the
/// setting is first written.
#[derive(Debug, Clone)]
pub struct SettingDescriptor<T> {
    /// Storage key, unique per setting
    pub key: String,
    /// Value reported while no stored value exists
    pub default_value: T,
}

impl<T> SettingDescriptor<T> {
    /// Create a descriptor
    pub fn new(key: impl Into<String>, default_value: T) -> Self {
        Self {
            key: key.into(),
            default_value,
        }
    }
}

/// In-memory settings store with change notification.
///
/// Values are stored as JSON so independently authored services can share the
/// store without sharing concrete Rust types. Reads fall back to the
/// descriptor default when no value is stored or the stored value no longer
/// decodes as the requested type.
pub struct SettingsStore {
    values: DashMap<String, Value>,
    on_setting_changed: Observable<String>,
}

impl SettingsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
            on_setting_changed: Observable::new(),
        }
    }

    /// Read a setting, falling back to the descriptor default
    pub fn read_setting<T>(&self, descriptor: &SettingDescriptor<T>) -> T
    where
        T: DeserializeOwned + Clone,
    {
        match self.values.get(&descriptor.key) {
            Some(stored) => match serde_json::from_value(stored.value().clone()) {
                Ok(value) => value,
                Err(err) => {
                    warn!(
                        key = %descriptor.key,
                        error = %err,
                        "Stored setting no longer decodes; using default"
                    );
                    descriptor.default_value.clone()
                }
            },
            None => descriptor.default_value.clone(),
        }
    }

    /// Write a setting, notifying observers only when the value changed
    pub fn write_setting<T>(&self, descriptor: &SettingDescriptor<T>, value: T) -> Result<()>
    where
        T: Serialize,
    {
        let encoded = serde_json::to_value(value).map_err(|err| {
            Error::configuration_with_source(
                format!("setting '{}' is not serializable", descriptor.key),
                err,
            )
        })?;

        let changed = match self.values.insert(descriptor.key.clone(), encoded.clone()) {
            Some(previous) => previous != encoded,
            None => true,
        };

        if changed {
            self.on_setting_changed.notify_observers(&descriptor.key);
        }
        Ok(())
    }

    /// Remove a stored value, reverting the setting to its default
    pub fn remove_setting(&self, key: &str) -> bool {
        let removed = self.values.remove(key).is_some();
        if removed {
            self.on_setting_changed.notify_observers(&key.to_string());
        }
        removed
    }

    /// True when a value is stored for `key`
    pub fn has_setting(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys changed by writes and removals, notified synchronously
    pub fn on_setting_changed(&self) -> &Observable<String> {
        &self.on_setting_changed
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("stored", &self.values.len())
            .field("observers", &self.on_setting_changed.observer_count())
            .finish()
    }
}

impl Service for SettingsStore {
    fn dispose(&self) -> Result<()> {
        self.on_setting_changed.clear();
        Ok(())
    }
}
