//! Configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily-rolling file in addition to stdout
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}

/// Event bus provider types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventBusKind {
    /// In-process broadcast channel (tokio) - default
    #[default]
    Broadcast,
    /// No-op event bus for testing and event-free runtimes
    Null,
}

/// Event bus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBusConfig {
    /// Event bus provider to use
    pub provider: EventBusKind,

    /// Buffer capacity for the broadcast bus; subscribers falling further
    /// behind than this observe a lag
    pub capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            provider: EventBusKind::default(),
            capacity: DEFAULT_EVENT_BUS_CAPACITY,
        }
    }
}

/// Top-level runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Event bus configuration
    pub event_bus: EventBusConfig,
}
