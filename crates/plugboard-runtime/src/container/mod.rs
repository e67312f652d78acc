//! Service Container
//!
//! The container owns every registered [`ServiceDefinition`]: it validates
//! definitions, reserves the capabilities they promise to produce, runs
//! resolution passes that activate definitions as their dependencies become
//! available, and tears everything down in reverse activation order.
//!
//! ## Concurrency model
//!
//! All registration, resolution, removal, and disposal bookkeeping is
//! serialized through one async mutex — the single queue through which every
//! state transition flows. Async factories are awaited inside that critical
//! section, so two definitions racing to produce the same capability can
//! never both succeed: the second registrant always observes the first one's
//! claim and is rejected with `DuplicateProduction`.
//!
//! Lookups stay cheap: [`ServiceContainer::get_service`] reads a lock-free
//! snapshot of the produced capabilities that is only written inside the
//! critical section.
//!
//! Factories must not call the container's registration API synchronously
//! (the critical section is held while they run); they may spawn tasks that
//! register later.

pub mod diagnostics;
mod resolver;

use dashmap::DashMap;
use plugboard_domain::error::{Error, Result};
use plugboard_domain::events::{ContainerEvent, SharedEventPublisher};
use plugboard_domain::{CapabilityId, Service, ServiceDefinition, SharedService};
use plugboard_services::NullEventBus;
use resolver::{ActivationResult, ContainerState, PendingService, publish_event, run_resolution};
use std::sync::Arc;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, error, info};

/// Service registry and dependency resolver.
///
/// Supports incremental, order-independent registration of service
/// definitions; each activates lazily once everything it consumes is
/// produced, which may transitively unblock further pending definitions.
///
/// ```
/// use plugboard_domain::{CapabilityId, Service, ServiceDefinition, ServiceProducts};
/// use plugboard_runtime::ServiceContainer;
///
/// struct Clock;
/// impl Service for Clock {}
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> plugboard_domain::Result<()> {
/// let clock = CapabilityId::new("Clock");
/// let container = ServiceContainer::new();
/// container
///     .add_definition(ServiceDefinition::new(
///         "Clock Service",
///         vec![clock.clone()],
///         vec![],
///         |_deps| async { Ok(ServiceProducts::single(Clock)) },
///     ))
///     .await?;
/// assert!(container.get_service(&clock).is_some());
/// # Ok(())
/// # }
/// ```
pub struct ServiceContainer {
    /// Serialized bookkeeping: pending, active, claims
    state: Mutex<ContainerState>,
    /// Live instance per produced capability; written only under `state`
    produced: DashMap<CapabilityId, SharedService>,
    /// Sink for lifecycle events
    events: SharedEventPublisher,
}

impl ServiceContainer {
    /// Create a container that discards lifecycle events
    pub fn new() -> Self {
        Self::with_event_publisher(NullEventBus::new_shared())
    }

    /// Create a container publishing lifecycle events to `events`
    pub fn with_event_publisher(events: SharedEventPublisher) -> Self {
        Self {
            state: Mutex::new(ContainerState::new()),
            produced: DashMap::new(),
            events,
        }
    }

    /// Register one definition and wait for it to become active.
    ///
    /// The returned future completes when the definition's factory has run —
    /// immediately when everything it consumes is already produced, or later
    /// when a subsequent registration supplies the missing capabilities. It
    /// fails with `InvalidDefinition` or `DuplicateProduction` before any
    /// state changes, with `FactoryFailed` when a factory invoked by the
    /// triggered resolution pass fails, and with `ContainerDisposed` when the
    /// container is torn down first.
    ///
    /// A definition whose dependencies never materialize leaves the future
    /// pending indefinitely; [`diagnostics`](Self::pending_reports) is the
    /// way to find out what it is waiting for.
    pub async fn add_definition(&self, definition: ServiceDefinition) -> Result<()> {
        let (receiver, mut failures) = {
            let mut state = self.state.lock().await;
            let receiver = self.register_locked(&mut state, definition).await?;
            let failures = run_resolution(&mut state, &self.produced, &self.events).await;
            (receiver, failures)
        };
        if !failures.is_empty() {
            return Err(failures.remove(0));
        }
        Self::await_activation(receiver).await
    }

    /// Register a batch of definitions and wait for all of them.
    ///
    /// All definitions are registered before the resolution pass runs, so
    /// definitions inside the batch may depend on each other in any order.
    /// A definition that fails validation does not roll back its siblings;
    /// the first error (validation or factory) is returned once the pass has
    /// settled.
    pub async fn add_definitions(
        &self,
        definitions: impl IntoIterator<Item = ServiceDefinition>,
    ) -> Result<()> {
        let (receivers, first_error) = {
            let mut state = self.state.lock().await;
            let mut receivers = Vec::new();
            let mut first_error = None;
            for definition in definitions {
                match self.register_locked(&mut state, definition).await {
                    Ok(receiver) => receivers.push(receiver),
                    Err(err) => {
                        if first_error.is_none() {
                            first_error = Some(err);
                        }
                    }
                }
            }
            let mut failures = run_resolution(&mut state, &self.produced, &self.events).await;
            if first_error.is_none() && !failures.is_empty() {
                first_error = Some(failures.remove(0));
            }
            (receivers, first_error)
        };
        if let Some(err) = first_error {
            return Err(err);
        }
        for receiver in receivers {
            Self::await_activation(receiver).await?;
        }
        Ok(())
    }

    /// Current instance produced for `identity`, if any.
    ///
    /// Returns `None` before the producing definition activates and the exact
    /// instance its factory returned afterwards.
    pub fn get_service(&self, identity: &CapabilityId) -> Option<SharedService> {
        self.produced
            .get(identity)
            .map(|entry| entry.value().clone())
    }

    /// Typed variant of [`get_service`](Self::get_service)
    pub fn get_service_as<T: Service>(&self, identity: &CapabilityId) -> Option<Arc<T>> {
        self.get_service(identity)
            .and_then(|service| service.downcast_arc::<T>().ok())
    }

    /// True when `identity` is currently produced
    pub fn is_produced(&self, identity: &CapabilityId) -> bool {
        self.produced.contains_key(identity)
    }

    /// Dispose the active definition producing `identity` and release every
    /// capability it produced.
    ///
    /// Dependents are **not** cascaded: they keep the instance handles they
    /// received at construction and it is the caller's job to re-resolve or
    /// remove them. The released capabilities become free for a fresh
    /// registration (the plugin-uninstall flow).
    pub async fn remove_definition(&self, identity: &CapabilityId) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.disposed {
            return Err(Error::ContainerDisposed);
        }
        let position = state
            .active
            .iter()
            .position(|service| service.produces.contains(identity))
            .ok_or_else(|| Error::not_found(identity.name()))?;
        let service = state.active.remove(position);
        for produced_identity in &service.produces {
            self.produced.remove(produced_identity);
        }
        info!(service = %service.friendly_name, "Removing service definition");

        let mut first_failure = None;
        for instance in distinct_instances(&service.instances) {
            if let Err(err) = instance.dispose() {
                error!(
                    service = %service.friendly_name,
                    error = %err,
                    "Disposer failed during removal"
                );
                if first_failure.is_none() {
                    first_failure =
                        Some(Error::disposal_failed(service.friendly_name.clone(), err.to_string()));
                }
            }
        }
        publish_event(
            &self.events,
            ContainerEvent::ServiceRemoved {
                friendly_name: service.friendly_name.clone(),
                released: service
                    .produces
                    .iter()
                    .map(|id| id.name().to_string())
                    .collect(),
            },
        )
        .await;
        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Tear the container down.
    ///
    /// Every active definition's products are disposed exactly once, in
    /// reverse activation order; a failing disposer is collected and logged
    /// but never stops the rest. Pending registrations observe
    /// `ContainerDisposed`, and so does every later container operation.
    /// Returns the collected disposal failures.
    pub async fn dispose(&self) -> Vec<Error> {
        let mut state = self.state.lock().await;
        if state.disposed {
            return Vec::new();
        }
        state.disposed = true;
        let active = std::mem::take(&mut state.active);
        // Dropping pending entries drops their waiters, failing outstanding
        // add_definition futures with ContainerDisposed.
        state.pending.clear();
        state.claims.clear();
        self.produced.clear();

        let mut failures = Vec::new();
        for service in active.iter().rev() {
            for instance in distinct_instances(&service.instances) {
                if let Err(err) = instance.dispose() {
                    error!(
                        service = %service.friendly_name,
                        error = %err,
                        "Disposer failed during container teardown"
                    );
                    failures.push(Error::disposal_failed(
                        service.friendly_name.clone(),
                        err.to_string(),
                    ));
                }
            }
        }
        info!(
            disposed = active.len(),
            failures = failures.len(),
            "Service container disposed"
        );
        publish_event(
            &self.events,
            ContainerEvent::ContainerDisposed {
                disposed: active.len(),
                failures: failures.len(),
            },
        )
        .await;
        failures
    }

    /// True once [`dispose`](Self::dispose) has run
    pub async fn is_disposed(&self) -> bool {
        self.state.lock().await.disposed
    }

    /// Number of active definitions
    pub async fn active_count(&self) -> usize {
        self.state.lock().await.active.len()
    }

    /// Number of definitions still waiting for dependencies
    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Validate a definition and enqueue it, reserving its produced
    /// capabilities. Caller holds the state lock and runs the resolution
    /// pass afterwards.
    async fn register_locked(
        &self,
        state: &mut ContainerState,
        definition: ServiceDefinition,
    ) -> Result<oneshot::Receiver<ActivationResult>> {
        if state.disposed {
            return Err(Error::ContainerDisposed);
        }
        definition.validate()?;
        for identity in definition.produces() {
            if self.produced.contains_key(identity) {
                let producer = state
                    .producer_name(identity)
                    .unwrap_or_else(|| "unknown".to_string());
                return Err(Error::duplicate_production(identity.name(), producer));
            }
            if let Some(claimant) = state.claims.get(identity) {
                return Err(Error::duplicate_production(identity.name(), claimant.clone()));
            }
        }

        let (friendly_name, produces, consumes, factory) = definition.into_parts();
        debug!(service = %friendly_name, "Registering service definition");
        for identity in &produces {
            state.claims.insert(identity.clone(), friendly_name.clone());
        }
        let (sender, receiver) = oneshot::channel();
        state.pending.push(PendingService {
            friendly_name: friendly_name.clone(),
            produces,
            consumes,
            factory,
            waiter: Some(sender),
        });
        publish_event(
            &self.events,
            ContainerEvent::DefinitionRegistered { friendly_name },
        )
        .await;
        Ok(receiver)
    }

    /// Wait for a definition's activation outcome
    async fn await_activation(receiver: oneshot::Receiver<ActivationResult>) -> Result<()> {
        match receiver.await {
            Ok(result) => result,
            // Sender dropped without an outcome: the container was disposed
            Err(_) => Err(Error::ContainerDisposed),
        }
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("produced", &self.produced.len())
            .field(
                "capabilities",
                &self
                    .produced
                    .iter()
                    .map(|entry| entry.key().name().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Distinct product instances of one definition (a factory may expose the
/// same instance under several capabilities; its disposer runs once).
fn distinct_instances(instances: &[(CapabilityId, SharedService)]) -> Vec<SharedService> {
    let mut distinct: Vec<SharedService> = Vec::with_capacity(instances.len());
    for (_, instance) in instances {
        if !distinct.iter().any(|seen| Arc::ptr_eq(seen, instance)) {
            distinct.push(instance.clone());
        }
    }
    distinct
}
