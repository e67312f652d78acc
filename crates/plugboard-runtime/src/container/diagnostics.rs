//! Container diagnostics
//!
//! Serializable reports answering "why is this service still waiting" —
//! pending definitions never fail loudly when nothing produces what they
//! consume, so these probes are the caller-facing way to inspect them.

use super::ServiceContainer;
use plugboard_domain::{CapabilityId, ServiceState};
use serde::Serialize;

/// Serializable reference to a capability identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityRef {
    /// Diagnostic name
    pub name: String,
    /// Unique token, hex-encoded
    pub token: String,
}

impl From<&CapabilityId> for CapabilityRef {
    fn from(identity: &CapabilityId) -> Self {
        Self {
            name: identity.name().to_string(),
            token: identity.token().simple().to_string(),
        }
    }
}

/// Why one pending definition has not activated yet
#[derive(Debug, Clone, Serialize)]
pub struct PendingReport {
    /// Friendly name of the pending definition
    pub friendly_name: String,
    /// Capabilities it will produce once activated
    pub produces: Vec<CapabilityRef>,
    /// Consumed capabilities nothing currently produces
    pub unmet: Vec<CapabilityRef>,
}

/// Registration snapshot of one definition
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    /// Friendly name of the definition
    pub friendly_name: String,
    /// Current lifecycle state
    pub state: ServiceState,
    /// Capabilities the definition produces
    pub produces: Vec<CapabilityRef>,
}

impl ServiceContainer {
    /// Report every pending definition together with its unmet dependencies
    pub async fn pending_reports(&self) -> Vec<PendingReport> {
        let state = self.state.lock().await;
        state
            .pending
            .iter()
            .map(|entry| PendingReport {
                friendly_name: entry.friendly_name.clone(),
                produces: entry.produces.iter().map(CapabilityRef::from).collect(),
                unmet: entry
                    .consumes
                    .iter()
                    .filter(|identity| !self.produced.contains_key(identity))
                    .map(CapabilityRef::from)
                    .collect(),
            })
            .collect()
    }

    /// Unmet dependencies of the pending definition that would produce
    /// `identity`, or `None` when no pending definition produces it
    pub async fn waiting_on(&self, identity: &CapabilityId) -> Option<Vec<CapabilityRef>> {
        let state = self.state.lock().await;
        state
            .pending
            .iter()
            .find(|entry| entry.produces.contains(identity))
            .map(|entry| {
                entry
                    .consumes
                    .iter()
                    .filter(|consumed| !self.produced.contains_key(consumed))
                    .map(CapabilityRef::from)
                    .collect()
            })
    }

    /// Snapshot of every known definition: active ones in activation order,
    /// then pending ones in registration order
    pub async fn service_infos(&self) -> Vec<ServiceInfo> {
        let state = self.state.lock().await;
        let mut infos: Vec<ServiceInfo> = state
            .active
            .iter()
            .map(|service| ServiceInfo {
                friendly_name: service.friendly_name.clone(),
                state: ServiceState::Active,
                produces: service.produces.iter().map(CapabilityRef::from).collect(),
            })
            .collect();
        infos.extend(state.pending.iter().map(|entry| ServiceInfo {
            friendly_name: entry.friendly_name.clone(),
            state: ServiceState::Pending,
            produces: entry.produces.iter().map(CapabilityRef::from).collect(),
        }));
        infos
    }
}
