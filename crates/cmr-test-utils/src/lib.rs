//! Testing utilities for the CMR workspace
//!
//! Shared fixtures, registry builders and tracing setup.

#![allow(missing_docs)]

use cmr_name::NameFingerprint;
use cmr_registry::{
    ComponentRegistry, ComponentType, ManifestItem, NewComponent, RegistryFactory, SystemComponent,
};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Route `tracing` output to the test harness; honours `RUST_LOG`
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Deterministic id for fixtures
pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn fingerprint(name: &str) -> NameFingerprint {
    NameFingerprint::create(Uuid::nil(), name)
}

pub fn new_layer(name: &str) -> NewComponent {
    NewComponent::new(ComponentType::Layer).with_name(name)
}

pub fn new_material(name: &str) -> NewComponent {
    NewComponent::new(ComponentType::Material).with_name(name)
}

pub fn add_layer(registry: &mut ComponentRegistry, name: &str) -> ManifestItem {
    registry.add_component(new_layer(name), false).unwrap().item
}

/// Registry with the built-ins a fresh document carries
pub fn registry_with_defaults() -> ComponentRegistry {
    let mut registry = RegistryFactory::new().create_registry();
    registry
        .add_system_component(
            SystemComponent::new(ComponentType::LinePattern, id(0xC0))
                .with_index(-1)
                .with_name("Continuous"),
        )
        .unwrap();
    registry
        .add_system_component(
            SystemComponent::new(ComponentType::Material, id(0xD0))
                .with_index(-1)
                .with_name("Default"),
        )
        .unwrap();
    registry
}

/// Registry holding `names` as layers in order
pub fn registry_with_layers(names: &[&str]) -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for name in names {
        add_layer(&mut registry, name);
    }
    registry
}
