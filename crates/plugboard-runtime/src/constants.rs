//! Runtime layer constants

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "plugboard.toml";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "PLUGBOARD";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "PLUGBOARD_LOG";

// ============================================================================
// EVENT BUS CONSTANTS
// ============================================================================

/// Default buffer capacity of the broadcast event bus
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;
