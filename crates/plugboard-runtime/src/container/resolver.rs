//! Resolution pass engine
//!
//! One resolution pass sweeps the pending list in registration order and
//! activates every definition whose consumed capabilities are all produced;
//! sweeps repeat until a fixpoint so transitive chains resolve regardless of
//! the order definitions arrived in. The caller holds the container's state
//! lock for the whole pass, which is what serializes resolution: two passes
//! never interleave, and a capability can never gain a second producer
//! between a check and an insert.

use dashmap::DashMap;
use plugboard_domain::error::Error;
use plugboard_domain::events::{ContainerEvent, SharedEventPublisher};
use plugboard_domain::{
    CapabilityId, ResolvedDependencies, ServiceFactory, ServiceProducts, SharedService,
};
use std::collections::HashMap;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Outcome delivered to a definition's registration future
pub(crate) type ActivationResult = Result<(), Error>;

/// A registered definition waiting for its consumed capabilities
pub(crate) struct PendingService {
    pub friendly_name: String,
    pub produces: Vec<CapabilityId>,
    pub consumes: Vec<CapabilityId>,
    pub factory: ServiceFactory,
    pub waiter: Option<oneshot::Sender<ActivationResult>>,
}

/// A definition whose factory has run, paired with its live products
pub(crate) struct ActiveService {
    pub friendly_name: String,
    pub produces: Vec<CapabilityId>,
    pub instances: Vec<(CapabilityId, SharedService)>,
}

/// Bookkeeping owned exclusively by the container and mutated only under its
/// state lock.
pub(crate) struct ContainerState {
    /// Definitions awaiting satisfaction, in registration order
    pub pending: Vec<PendingService>,
    /// Definitions whose factories have run, in activation order
    pub active: Vec<ActiveService>,
    /// Capabilities reserved by pending definitions (identity -> claimant)
    pub claims: HashMap<CapabilityId, String>,
    /// Set once the container is torn down
    pub disposed: bool,
}

impl ContainerState {
    pub(crate) fn new() -> Self {
        Self {
            pending: Vec::new(),
            active: Vec::new(),
            claims: HashMap::new(),
            disposed: false,
        }
    }

    /// Friendly name of the active definition producing `identity`
    pub(crate) fn producer_name(&self, identity: &CapabilityId) -> Option<String> {
        self.active
            .iter()
            .find(|service| service.produces.contains(identity))
            .map(|service| service.friendly_name.clone())
    }
}

/// Run resolution passes until no pending definition changes state.
///
/// Returns the errors of every factory that failed during the run; each
/// failed definition's own registration future has already been completed
/// with an equivalent error, and its capability claims have been released.
pub(crate) async fn run_resolution(
    state: &mut ContainerState,
    produced: &DashMap<CapabilityId, SharedService>,
    events: &SharedEventPublisher,
) -> Vec<Error> {
    let mut failures = Vec::new();
    loop {
        let mut progressed = false;
        let mut index = 0;
        while index < state.pending.len() {
            let Some(dependencies) = gather_dependencies(&state.pending[index].consumes, produced)
            else {
                index += 1;
                continue;
            };
            let entry = state.pending.remove(index);
            if activate(entry, dependencies, state, produced, events, &mut failures).await {
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    failures
}

/// Collect the consumed instances positionally, or `None` when any is missing
fn gather_dependencies(
    consumes: &[CapabilityId],
    produced: &DashMap<CapabilityId, SharedService>,
) -> Option<Vec<SharedService>> {
    let mut resolved = Vec::with_capacity(consumes.len());
    for identity in consumes {
        resolved.push(produced.get(identity)?.value().clone());
    }
    Some(resolved)
}

/// Invoke one satisfied definition's factory and fold the outcome into the
/// container state. Returns true when new capabilities were produced.
async fn activate(
    mut entry: PendingService,
    dependencies: Vec<SharedService>,
    state: &mut ContainerState,
    produced: &DashMap<CapabilityId, SharedService>,
    events: &SharedEventPublisher,
    failures: &mut Vec<Error>,
) -> bool {
    let waiter = entry.waiter.take();
    info!(service = %entry.friendly_name, "Activating service");

    let result = (entry.factory)(ResolvedDependencies::new(dependencies)).await;
    let instances = match result.and_then(|products| {
        align_products(&entry.friendly_name, &entry.produces, products)
    }) {
        Ok(instances) => instances,
        Err(err) => {
            let err = wrap_factory_error(&entry.friendly_name, err);
            fail(entry, waiter, err, state, events, failures).await;
            return false;
        }
    };

    // Claims reserved at registration keep activations collision-free; if an
    // identity is nonetheless taken, reject this definition, keep the first.
    if let Some((identity, _)) = instances
        .iter()
        .find(|(identity, _)| produced.contains_key(identity))
    {
        let producer = state
            .producer_name(identity)
            .unwrap_or_else(|| "unknown".to_string());
        let err = Error::duplicate_production(identity.name(), producer);
        fail(entry, waiter, err, state, events, failures).await;
        return false;
    }

    for (identity, instance) in &instances {
        produced.insert(identity.clone(), instance.clone());
        state.claims.remove(identity);
    }

    let produces_names: Vec<String> = entry
        .produces
        .iter()
        .map(|identity| identity.name().to_string())
        .collect();
    info!(
        service = %entry.friendly_name,
        produces = ?produces_names,
        "Service activated"
    );
    publish_event(
        events,
        ContainerEvent::ServiceActivated {
            friendly_name: entry.friendly_name.clone(),
            produces: produces_names,
        },
    )
    .await;

    if let Some(tx) = waiter {
        let _ = tx.send(Ok(()));
    }
    state.active.push(ActiveService {
        friendly_name: entry.friendly_name,
        produces: entry.produces,
        instances,
    });
    true
}

/// Drop a failed definition: release its claims, complete its registration
/// future, record the failure for the triggering caller, publish the event.
async fn fail(
    entry: PendingService,
    waiter: Option<oneshot::Sender<ActivationResult>>,
    err: Error,
    state: &mut ContainerState,
    events: &SharedEventPublisher,
    failures: &mut Vec<Error>,
) {
    warn!(service = %entry.friendly_name, error = %err, "Service activation failed");
    for identity in &entry.produces {
        state.claims.remove(identity);
    }
    // Error has no Clone; rebuild an equivalent for the registration future
    // while the original (with its source chain) goes to the triggering caller.
    let waiter_err = match &err {
        Error::DuplicateProduction { identity, producer } => {
            Error::duplicate_production(identity.clone(), producer.clone())
        }
        Error::FactoryFailed {
            friendly_name,
            message,
            ..
        } => Error::factory_failed(friendly_name.clone(), message.clone()),
        other => Error::factory_failed(entry.friendly_name.clone(), other.to_string()),
    };
    let message = waiter_err.to_string();
    if let Some(tx) = waiter {
        let _ = tx.send(Err(waiter_err));
    }
    publish_event(
        events,
        ContainerEvent::FactoryFailed {
            friendly_name: entry.friendly_name.clone(),
            message,
        },
    )
    .await;
    failures.push(err);
}

/// Check the factory's products against the declared produces set and pair
/// each declared capability with its instance, in declaration order.
fn align_products(
    friendly_name: &str,
    produces: &[CapabilityId],
    products: ServiceProducts,
) -> Result<Vec<(CapabilityId, SharedService)>, Error> {
    match products {
        ServiceProducts::Single(instance) => {
            if let [identity] = produces {
                Ok(vec![(identity.clone(), instance)])
            } else {
                Err(Error::factory_failed(
                    friendly_name,
                    format!(
                        "factory returned a single product but the definition produces {} capabilities",
                        produces.len()
                    ),
                ))
            }
        }
        ServiceProducts::Multi(entries) => {
            let mut remaining: Vec<&CapabilityId> = produces.iter().collect();
            let mut aligned = Vec::with_capacity(entries.len());
            for (identity, instance) in entries {
                match remaining.iter().position(|declared| **declared == identity) {
                    Some(position) => {
                        remaining.remove(position);
                        aligned.push((identity, instance));
                    }
                    None => {
                        return Err(Error::factory_failed(
                            friendly_name,
                            format!(
                                "factory returned capability '{identity}' which the definition does not declare (or returned it twice)"
                            ),
                        ));
                    }
                }
            }
            if let Some(missing) = remaining.first() {
                return Err(Error::factory_failed(
                    friendly_name,
                    format!("factory did not return declared capability '{missing}'"),
                ));
            }
            Ok(aligned)
        }
    }
}

/// Wrap a raw factory error, leaving already-classified failures untouched
fn wrap_factory_error(friendly_name: &str, err: Error) -> Error {
    match err {
        classified @ (Error::FactoryFailed { .. } | Error::DuplicateProduction { .. }) => classified,
        other => Error::factory_failed_with_source(friendly_name, other),
    }
}

/// Publish a container event, logging (never propagating) transport errors
pub(crate) async fn publish_event(events: &SharedEventPublisher, event: ContainerEvent) {
    if !events.has_subscribers() {
        return;
    }
    if let Err(err) = events.publish(event).await {
        warn!(error = %err, "Failed to publish container event");
    }
}
