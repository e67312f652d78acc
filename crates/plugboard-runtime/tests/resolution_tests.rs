//! Unit tests for resolution-pass behavior
//!
//! Covers async factories, factory failures and their propagation, product
//! shape validation, and multi-capability products.

use plugboard_domain::error::Error;
use plugboard_domain::{CapabilityId, Service, ServiceDefinition, ServiceProducts};
use plugboard_runtime::ServiceContainer;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, timeout};

struct Value(i32);
impl Service for Value {}

struct Shared {
    disposal_log: Arc<Mutex<u32>>,
}

impl Service for Shared {
    fn dispose(&self) -> plugboard_domain::Result<()> {
        *self.disposal_log.lock().unwrap() += 1;
        Ok(())
    }
}

fn producer(name: &'static str, identity: &CapabilityId, value: i32) -> ServiceDefinition {
    ServiceDefinition::new(name, vec![identity.clone()], vec![], move |_deps| async move {
        Ok(ServiceProducts::single(Value(value)))
    })
}

// =============================================================================
// Async Factory Tests
// =============================================================================

/// Test a factory that awaits still activates
#[tokio::test]
async fn test_async_factory() {
    let container = ServiceContainer::new();
    let identity = CapabilityId::new("SlowStart");

    container
        .add_definition(ServiceDefinition::new(
            "Slow Service",
            vec![identity.clone()],
            vec![],
            |_deps| async {
                sleep(Duration::from_millis(20)).await;
                Ok(ServiceProducts::single(Value(11)))
            },
        ))
        .await
        .expect("registration must succeed");

    assert_eq!(
        container.get_service_as::<Value>(&identity).expect("active").0,
        11
    );
}

/// Test an unrelated registration queued behind a slow factory completes
#[tokio::test]
async fn test_unrelated_registrations_queue() {
    let container = Arc::new(ServiceContainer::new());
    let slow = CapabilityId::new("Slow");
    let fast = CapabilityId::new("Fast");

    let slow_definition = ServiceDefinition::new(
        "Slow Service",
        vec![slow.clone()],
        vec![],
        |_deps| async {
            sleep(Duration::from_millis(30)).await;
            Ok(ServiceProducts::single(Value(1)))
        },
    );
    let slow_container = Arc::clone(&container);
    let slow_registration =
        tokio::spawn(async move { slow_container.add_definition(slow_definition).await });

    let fast_container = Arc::clone(&container);
    let fast_definition = producer("Fast Service", &fast, 2);
    let fast_registration =
        tokio::spawn(async move { fast_container.add_definition(fast_definition).await });

    timeout(Duration::from_secs(5), async {
        slow_registration
            .await
            .expect("task must not panic")
            .expect("slow registration must succeed");
        fast_registration
            .await
            .expect("task must not panic")
            .expect("fast registration must succeed");
    })
    .await
    .expect("registrations must settle");

    assert!(container.is_produced(&slow));
    assert!(container.is_produced(&fast));
}

// =============================================================================
// Factory Failure Tests
// =============================================================================

/// Test a failing factory rejects the registration and leaves no trace
#[tokio::test]
async fn test_factory_failure_rejects_registration() {
    let container = ServiceContainer::new();
    let identity = CapabilityId::new("Doomed");

    let err = container
        .add_definition(ServiceDefinition::new(
            "Doomed Service",
            vec![identity.clone()],
            vec![],
            |_deps| async { Err("construction exploded".into()) },
        ))
        .await
        .expect_err("registration must fail");

    match err {
        Error::FactoryFailed { friendly_name, message, .. } => {
            assert_eq!(friendly_name, "Doomed Service");
            assert!(message.contains("construction exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(!container.is_produced(&identity));
    assert_eq!(container.active_count().await, 0);
    assert_eq!(container.pending_count().await, 0);
}

/// Test a failed producer's capability stays free and dependents stay pending
#[tokio::test]
async fn test_failure_keeps_dependents_pending() {
    let container = ServiceContainer::new();
    let base = CapabilityId::new("Base");
    let dependent = CapabilityId::new("Dependent");

    let outcome = container
        .add_definitions(vec![
            ServiceDefinition::new(
                "Dependent Service",
                vec![dependent.clone()],
                vec![base.clone()],
                |_deps| async { Ok(ServiceProducts::single(Value(0))) },
            ),
            ServiceDefinition::new("Base Service", vec![base.clone()], vec![], |_deps| async {
                Err("no base today".into())
            }),
        ])
        .await;

    assert!(matches!(outcome, Err(Error::FactoryFailed { .. })));
    assert!(!container.is_produced(&base));
    assert!(!container.is_produced(&dependent));
    assert_eq!(container.pending_count().await, 1);

    // A replacement producer unblocks the still-pending dependent
    container
        .add_definition(producer("Base Replacement", &base, 1))
        .await
        .expect("replacement must succeed");
    assert!(container.is_produced(&dependent));
    assert_eq!(container.pending_count().await, 0);
}

/// Test the failure of a cascaded factory reaches the triggering caller
#[tokio::test]
async fn test_cascaded_failure_reaches_trigger() {
    let container = Arc::new(ServiceContainer::new());
    let base = CapabilityId::new("Base");
    let doomed = CapabilityId::new("Doomed");

    // Waits for Base, then fails during construction
    let doomed_definition = ServiceDefinition::new(
        "Doomed Dependent",
        vec![doomed.clone()],
        vec![base.clone()],
        |_deps| async { Err("dependent exploded".into()) },
    );
    let doomed_container = Arc::clone(&container);
    let doomed_registration =
        tokio::spawn(async move { doomed_container.add_definition(doomed_definition).await });
    timeout(Duration::from_secs(5), async {
        while container.pending_count().await != 1 {
            sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("dependent must be pending");

    // Registering Base triggers the pass in which the dependent fails; the
    // failure surfaces here even though Base itself activated fine
    let err = container
        .add_definition(producer("Base Service", &base, 1))
        .await
        .expect_err("triggering caller must observe the cascaded failure");
    match &err {
        Error::FactoryFailed { friendly_name, .. } => {
            assert_eq!(friendly_name, "Doomed Dependent");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The dependent's own registration future observes the failure too
    assert!(matches!(
        doomed_registration.await.expect("task must not panic"),
        Err(Error::FactoryFailed { .. })
    ));

    // Base is active regardless
    assert!(container.is_produced(&base));
    assert_eq!(container.active_count().await, 1);
}

// =============================================================================
// Product Shape Tests
// =============================================================================

/// Test a single product against a multi-capability declaration is rejected
#[tokio::test]
async fn test_single_product_for_multi_declaration() {
    let container = ServiceContainer::new();

    let err = container
        .add_definition(ServiceDefinition::new(
            "Mismatched",
            vec![CapabilityId::new("One"), CapabilityId::new("Two")],
            vec![],
            |_deps| async { Ok(ServiceProducts::single(Value(0))) },
        ))
        .await
        .expect_err("shape mismatch must fail");

    assert!(matches!(err, Error::FactoryFailed { .. }));
    assert!(err.to_string().contains("single product"));
}

/// Test a product map missing a declared capability is rejected
#[tokio::test]
async fn test_missing_declared_capability() {
    let container = ServiceContainer::new();
    let one = CapabilityId::new("One");
    let two = CapabilityId::new("Two");

    let partial = one.clone();
    let err = container
        .add_definition(ServiceDefinition::new(
            "Partial Producer",
            vec![one.clone(), two.clone()],
            vec![],
            move |_deps| {
                let only = partial.clone();
                async move {
                    Ok(ServiceProducts::Multi(vec![(only, Arc::new(Value(1)))]))
                }
            },
        ))
        .await
        .expect_err("missing capability must fail");

    assert!(matches!(err, Error::FactoryFailed { .. }));
    assert!(!container.is_produced(&one));
    assert!(!container.is_produced(&two));
}

/// Test a product map with an undeclared capability is rejected
#[tokio::test]
async fn test_undeclared_capability_rejected() {
    let container = ServiceContainer::new();
    let declared = CapabilityId::new("Declared");

    let smuggled = CapabilityId::new("Smuggled");
    let declared_for_factory = declared.clone();
    let err = container
        .add_definition(ServiceDefinition::new(
            "Smuggler",
            vec![declared.clone()],
            vec![],
            move |_deps| {
                let declared = declared_for_factory.clone();
                let smuggled = smuggled.clone();
                async move {
                    Ok(ServiceProducts::Multi(vec![
                        (declared, Arc::new(Value(1))),
                        (smuggled, Arc::new(Value(2))),
                    ]))
                }
            },
        ))
        .await
        .expect_err("undeclared capability must fail");

    assert!(matches!(err, Error::FactoryFailed { .. }));
    assert!(!container.is_produced(&declared));
}

/// Test a definition producing several capabilities from one factory
#[tokio::test]
async fn test_multi_capability_product() {
    let container = ServiceContainer::new();
    let reader = CapabilityId::new("Reader");
    let writer = CapabilityId::new("Writer");
    let disposal_log = Arc::new(Mutex::new(0u32));

    let reader_for_factory = reader.clone();
    let writer_for_factory = writer.clone();
    let log_for_factory = Arc::clone(&disposal_log);
    container
        .add_definition(ServiceDefinition::new(
            "Store Service",
            vec![reader.clone(), writer.clone()],
            vec![],
            move |_deps| {
                let reader = reader_for_factory.clone();
                let writer = writer_for_factory.clone();
                let log = Arc::clone(&log_for_factory);
                async move {
                    // One instance exposed under both capabilities
                    let shared = Arc::new(Shared { disposal_log: log });
                    Ok(ServiceProducts::Multi(vec![
                        (reader, shared.clone()),
                        (writer, shared),
                    ]))
                }
            },
        ))
        .await
        .expect("registration must succeed");

    assert!(container.is_produced(&reader));
    assert!(container.is_produced(&writer));
    assert_eq!(container.active_count().await, 1);

    // The shared instance's disposer runs once, not once per capability
    container.dispose().await;
    assert_eq!(*disposal_log.lock().unwrap(), 1);
}
