//! Capability identity tokens
//!
//! A [`CapabilityId`] names an abstract capability (an interface a service can
//! produce or consume). Identity is carried by a per-token UUID: two tokens
//! created with the same diagnostic name are still distinct, so independently
//! authored modules can never collide by accident.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Opaque, globally-unique token naming an abstract capability.
///
/// Created once per capability, typically in a `LazyLock` static next to the
/// service that defines the capability's contract:
///
/// ```
/// use std::sync::LazyLock;
/// use plugboard_domain::CapabilityId;
///
/// pub static SELECTION: LazyLock<CapabilityId> =
///     LazyLock::new(|| CapabilityId::new("SelectionService"));
/// ```
///
/// Cloning is cheap and clones compare equal to the original; equality and
/// hashing ignore the diagnostic name entirely.
#[derive(Clone)]
pub struct CapabilityId {
    name: Arc<str>,
    token: Uuid,
}

impl CapabilityId {
    /// Create a new capability identity with a diagnostic name
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            token: Uuid::new_v4(),
        }
    }

    /// Diagnostic name of the capability (not part of its identity)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unique token backing equality and hashing
    pub fn token(&self) -> Uuid {
        self.token
    }
}

impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short token suffix keeps same-named identities distinguishable in logs
        let token = self.token.simple().to_string();
        write!(f, "CapabilityId({}#{})", self.name, &token[..8])
    }
}
