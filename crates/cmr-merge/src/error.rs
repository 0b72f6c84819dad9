//! Error types for cross-registry maps

use cmr_registry::{ComponentType, RegistryError};
use uuid::Uuid;

/// Cross-registry map error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// Map item cannot be stored
    #[error("invalid map item: {reason}")]
    InvalidMapItem {
        /// What was wrong
        reason: String,
    },

    /// Source id already mapped
    #[error("source id {0} already mapped")]
    DuplicateSourceId(Uuid),

    /// Source index already mapped
    #[error("{component_type} source index {index} already mapped")]
    DuplicateSourceIndex {
        /// Type of the component
        component_type: ComponentType,
        /// Index in the source registry
        index: i32,
    },

    /// No map item for the source
    #[error("no map item for source id {0}")]
    NotFound(Uuid),

    /// Stored item and update disagree on the source identity
    #[error("map item for source id {id} does not match the update")]
    SourceMismatch {
        /// Source id of the stored item
        id: Uuid,
    },

    /// A map item no longer resolves in its registry
    #[error("map validation failed: {0}")]
    Validation(String),

    /// Registry failure
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl MapError {
    /// Check if the caller handed in an unusable map item
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Self::InvalidMapItem { .. } => true,
            Self::Registry(err) => err.is_contract_violation(),
            _ => false,
        }
    }
}
