//! Service definition descriptors
//!
//! A [`ServiceDefinition`] declares what a component needs (`consumes`), what
//! it provides (`produces`), and how to build it (an async factory). The
//! descriptor is passive: only the container interprets it.

use crate::error::{Error, Result};
use crate::identity::CapabilityId;
use crate::service::{Service, SharedService};
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// What a factory returned.
///
/// The shape is an explicit tagged variant rather than runtime inspection:
/// `Single` is only valid for definitions producing exactly one capability,
/// `Multi` must map every declared capability exactly once (and may be empty
/// for effect-only definitions that produce nothing).
pub enum ServiceProducts {
    /// One instance satisfying the definition's single produced capability
    Single(SharedService),
    /// One instance per produced capability
    Multi(Vec<(CapabilityId, SharedService)>),
}

impl ServiceProducts {
    /// Wrap a single concrete service instance
    pub fn single<S: Service>(service: S) -> Self {
        Self::Single(Arc::new(service))
    }

    /// Products of an effect-only definition (empty `produces`)
    pub fn none() -> Self {
        Self::Multi(Vec::new())
    }
}

impl fmt::Debug for ServiceProducts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(_) => f.write_str("ServiceProducts::Single"),
            Self::Multi(entries) => write!(f, "ServiceProducts::Multi({})", entries.len()),
        }
    }
}

/// Resolved service instances handed to a factory, one per `consumes` entry,
/// in matching order.
pub struct ResolvedDependencies {
    services: Vec<SharedService>,
}

impl ResolvedDependencies {
    /// Build the positional dependency list (container-side)
    pub fn new(services: Vec<SharedService>) -> Self {
        Self { services }
    }

    /// Number of resolved dependencies
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// True when the definition consumed nothing
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Untyped access to the dependency at `index`
    pub fn get(&self, index: usize) -> Option<&SharedService> {
        self.services.get(index)
    }

    /// Typed access to the dependency at `index`.
    ///
    /// Fails with [`Error::TypeMismatch`] when the instance at that position
    /// is not a `T`, and with [`Error::NotFound`] when the index is out of
    /// bounds (which indicates a consumes/parameter mismatch in the caller).
    pub fn downcast<T: Service>(&self, index: usize) -> Result<Arc<T>> {
        let service = self
            .services
            .get(index)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("dependency #{index}")))?;
        service
            .downcast_arc::<T>()
            .map_err(|_| Error::type_mismatch(index, std::any::type_name::<T>()))
    }
}

/// Future returned by a service factory
pub type FactoryFuture = BoxFuture<'static, Result<ServiceProducts>>;

/// Boxed async construction logic of a service definition
pub type ServiceFactory = Box<dyn Fn(ResolvedDependencies) -> FactoryFuture + Send + Sync>;

/// Declarative descriptor of a service: friendly name, produced and consumed
/// capabilities, and the factory that builds it once every consumed
/// capability is available.
pub struct ServiceDefinition {
    friendly_name: String,
    produces: Vec<CapabilityId>,
    consumes: Vec<CapabilityId>,
    factory: ServiceFactory,
}

impl ServiceDefinition {
    /// Create a definition from an async factory.
    ///
    /// ```
    /// use plugboard_domain::{
    ///     CapabilityId, Service, ServiceDefinition, ServiceProducts,
    /// };
    ///
    /// struct Counter(u32);
    /// impl Service for Counter {}
    ///
    /// let counter = CapabilityId::new("Counter");
    /// let definition = ServiceDefinition::new(
    ///     "Counter Service",
    ///     vec![counter.clone()],
    ///     vec![],
    ///     |_deps| async { Ok(ServiceProducts::single(Counter(0))) },
    /// );
    /// assert_eq!(definition.friendly_name(), "Counter Service");
    /// ```
    pub fn new<F, Fut>(
        friendly_name: impl Into<String>,
        produces: Vec<CapabilityId>,
        consumes: Vec<CapabilityId>,
        factory: F,
    ) -> Self
    where
        F: Fn(ResolvedDependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ServiceProducts>> + Send + 'static,
    {
        Self {
            friendly_name: friendly_name.into(),
            produces,
            consumes,
            factory: Box::new(move |deps| Box::pin(factory(deps))),
        }
    }

    /// Create a definition that exposes an already-built instance under a
    /// single capability. Used by bootstrap code to publish externally owned
    /// objects (for example the event bus) through the container.
    pub fn from_instance(
        friendly_name: impl Into<String>,
        identity: CapabilityId,
        instance: SharedService,
    ) -> Self {
        Self::new(friendly_name, vec![identity], Vec::new(), move |_deps| {
            let instance = instance.clone();
            async move { Ok(ServiceProducts::Single(instance)) }
        })
    }

    /// Diagnostic name of the definition
    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    /// Capabilities this definition produces
    pub fn produces(&self) -> &[CapabilityId] {
        &self.produces
    }

    /// Capabilities this definition consumes
    pub fn consumes(&self) -> &[CapabilityId] {
        &self.consumes
    }

    /// Validate the descriptor itself, independent of container state.
    ///
    /// Rejects an empty friendly name and duplicate identities within
    /// `produces`. Duplicate `consumes` entries are legal: the same instance
    /// is simply handed to the factory at each matching position.
    pub fn validate(&self) -> Result<()> {
        if self.friendly_name.trim().is_empty() {
            return Err(Error::invalid_definition(
                self.friendly_name.clone(),
                "friendly name must not be empty",
            ));
        }
        let mut seen = HashSet::with_capacity(self.produces.len());
        for identity in &self.produces {
            if !seen.insert(identity.clone()) {
                return Err(Error::invalid_definition(
                    self.friendly_name.clone(),
                    format!("capability '{identity}' is declared twice in produces"),
                ));
            }
        }
        Ok(())
    }

    /// Decompose the definition for container bookkeeping
    pub fn into_parts(self) -> (String, Vec<CapabilityId>, Vec<CapabilityId>, ServiceFactory) {
        (
            self.friendly_name,
            self.produces,
            self.consumes,
            self.factory,
        )
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("friendly_name", &self.friendly_name)
            .field("produces", &self.produces)
            .field("consumes", &self.consumes)
            .finish_non_exhaustive()
    }
}
