//! Service lifecycle states

use serde::{Deserialize, Serialize};

/// Lifecycle state of a service definition within the container.
///
/// Transitions only move forward: `Pending -> Active -> Disposed`. A
/// logically reinstalled service registers a fresh definition instead of
/// reviving a disposed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ServiceState {
    /// Registered, waiting for every consumed capability to become available
    #[default]
    Pending,
    /// Factory has run; produced capabilities are live
    Active,
    /// Torn down, either individually or with the container
    Disposed,
}
