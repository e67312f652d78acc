//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the plugboard service container
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed service definition, rejected before any container mutation
    #[error("Invalid service definition '{friendly_name}': {message}")]
    InvalidDefinition {
        /// Friendly name of the offending definition
        friendly_name: String,
        /// What was wrong with the descriptor
        message: String,
    },

    /// A capability is already produced or claimed by another definition
    #[error("Capability '{identity}' is already produced by '{producer}'")]
    DuplicateProduction {
        /// Diagnostic name of the contested capability
        identity: String,
        /// Friendly name of the definition holding the capability
        producer: String,
    },

    /// A service factory returned an error or a malformed product set
    #[error("Factory for '{friendly_name}' failed: {message}")]
    FactoryFailed {
        /// Friendly name of the definition whose factory failed
        friendly_name: String,
        /// Description of the failure
        message: String,
        /// Original factory error, when available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A disposer raised during teardown
    #[error("Disposal of '{friendly_name}' failed: {message}")]
    DisposalFailed {
        /// Friendly name of the definition whose disposer failed
        friendly_name: String,
        /// Description of the failure
        message: String,
    },

    /// No active definition produces the requested capability
    #[error("No active definition produces capability '{identity}'")]
    NotFound {
        /// Diagnostic name of the missing capability
        identity: String,
    },

    /// The container has been disposed and accepts no further operations
    #[error("Service container has been disposed")]
    ContainerDisposed,

    /// A resolved dependency could not be downcast to the requested type
    #[error("Dependency at position {index} is not a '{expected}'")]
    TypeMismatch {
        /// Position of the dependency in the consumes list
        index: usize,
        /// Type name the caller asked for
        expected: &'static str,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic string-based error
    #[error("{0}")]
    String(String),
}

// Definition and production error creation methods
impl Error {
    /// Create an invalid definition error
    pub fn invalid_definition<N: Into<String>, M: Into<String>>(
        friendly_name: N,
        message: M,
    ) -> Self {
        Self::InvalidDefinition {
            friendly_name: friendly_name.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate production error
    pub fn duplicate_production<I: Into<String>, P: Into<String>>(
        identity: I,
        producer: P,
    ) -> Self {
        Self::DuplicateProduction {
            identity: identity.into(),
            producer: producer.into(),
        }
    }

    /// Create a factory failure error
    pub fn factory_failed<N: Into<String>, M: Into<String>>(friendly_name: N, message: M) -> Self {
        Self::FactoryFailed {
            friendly_name: friendly_name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a factory failure error wrapping the original factory error
    pub fn factory_failed_with_source<N: Into<String>>(friendly_name: N, source: Error) -> Self {
        Self::FactoryFailed {
            friendly_name: friendly_name.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a disposal failure error
    pub fn disposal_failed<N: Into<String>, M: Into<String>>(friendly_name: N, message: M) -> Self {
        Self::DisposalFailed {
            friendly_name: friendly_name.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<I: Into<String>>(identity: I) -> Self {
        Self::NotFound {
            identity: identity.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(index: usize, expected: &'static str) -> Self {
        Self::TypeMismatch { index, expected }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
