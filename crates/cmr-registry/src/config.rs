//! Registry configuration

use serde::{Deserialize, Serialize};

/// Tunables of a [`ComponentRegistry`](crate::ComponentRegistry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Text placed between a base name and its synthesized suffix
    pub name_separator: String,
    /// Random 8-hex-digit suffixes tried before falling back to a UUID
    pub random_suffix_attempts: usize,
    /// Initial bucket count of each hash table
    pub initial_buckets: usize,
    /// Average chain length that makes a hash table grow
    pub max_load_factor: usize,
}

impl RegistryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With name suffix separator
    #[inline]
    #[must_use]
    pub fn with_name_separator(mut self, separator: impl Into<String>) -> Self {
        self.name_separator = separator.into();
        self
    }

    /// With random suffix attempt budget
    #[inline]
    #[must_use]
    pub fn with_random_suffix_attempts(mut self, attempts: usize) -> Self {
        self.random_suffix_attempts = attempts;
        self
    }

    /// With hash table sizing
    #[inline]
    #[must_use]
    pub fn with_table_sizing(mut self, initial_buckets: usize, max_load_factor: usize) -> Self {
        self.initial_buckets = initial_buckets;
        self.max_load_factor = max_load_factor;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name_separator: " ".to_string(),
            random_suffix_attempts: 1000,
            initial_buckets: 64,
            max_load_factor: 2,
        }
    }
}
