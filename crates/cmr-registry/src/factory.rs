//! Registry factory
//!
//! Provides [`RegistryFactory`], the owner of the counters that number
//! registries and runtime objects within one process-level session.

use crate::component_type::ComponentTypeTraits;
use crate::config::RegistryConfig;
use crate::registry::ComponentRegistry;
use crate::StandardTypeTraits;
use tracing::debug;

/// Source of registries and runtime serial numbers
///
/// Serial numbers start at 1; 0 always means "none".
#[derive(Debug, Clone)]
pub struct RegistryFactory {
    config: RegistryConfig,
    last_registry_serial: u64,
    last_runtime_serial: u64,
}

impl RegistryFactory {
    /// Create factory handing out registries with the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create factory handing out registries with `config`
    #[inline]
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            last_registry_serial: 0,
            last_runtime_serial: 0,
        }
    }

    /// Empty registry with the standard naming rules and the next registry
    /// serial number
    pub fn create_registry(&mut self) -> ComponentRegistry<StandardTypeTraits> {
        self.create_registry_with_traits(StandardTypeTraits)
    }

    /// Empty registry with custom naming rules
    pub fn create_registry_with_traits<T: ComponentTypeTraits>(&mut self, traits: T) -> ComponentRegistry<T> {
        self.last_registry_serial += 1;
        debug!(serial_number = self.last_registry_serial, "registry created");
        ComponentRegistry::with_config(traits, self.config.clone()).with_serial_number(self.last_registry_serial)
    }

    /// Next runtime serial number for a component
    pub fn next_runtime_serial_number(&mut self) -> u64 {
        self.last_runtime_serial += 1;
        self.last_runtime_serial
    }

    /// Last runtime serial number handed out, 0 before the first
    #[inline]
    #[must_use]
    pub fn last_runtime_serial_number(&self) -> u64 {
        self.last_runtime_serial
    }
}

impl Default for RegistryFactory {
    fn default() -> Self {
        Self::new()
    }
}
