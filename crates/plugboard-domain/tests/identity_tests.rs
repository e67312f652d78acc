//! Unit tests for capability identity tokens
//!
//! Identity must be carried by the token, never by the diagnostic name.

use plugboard_domain::CapabilityId;
use std::collections::HashMap;

/// Test two identities with the same name are still distinct
#[test]
fn test_same_name_identities_are_distinct() {
    let first = CapabilityId::new("SelectionService");
    let second = CapabilityId::new("SelectionService");

    assert_ne!(first, second);
    assert_eq!(first.name(), second.name());
}

/// Test clones compare equal to the original
#[test]
fn test_clone_preserves_identity() {
    let identity = CapabilityId::new("ThemeService");
    let clone = identity.clone();

    assert_eq!(identity, clone);
    assert_eq!(identity.token(), clone.token());
}

/// Test identities work as hash map keys across clones
#[test]
fn test_identity_as_map_key() {
    let identity = CapabilityId::new("SettingsStore");
    let impostor = CapabilityId::new("SettingsStore");

    let mut map = HashMap::new();
    map.insert(identity.clone(), 1);

    assert_eq!(map.get(&identity.clone()), Some(&1));
    assert_eq!(map.get(&impostor), None);
}

/// Test display uses the diagnostic name
#[test]
fn test_identity_display() {
    let identity = CapabilityId::new("ShellService");
    assert_eq!(identity.to_string(), "ShellService");
}

/// Test debug output contains the name and a token fragment
#[test]
fn test_identity_debug() {
    let identity = CapabilityId::new("PickingService");
    let debug = format!("{identity:?}");

    assert!(debug.contains("PickingService"));
    assert!(debug.contains('#'));
}
