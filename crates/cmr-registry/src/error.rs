//! Error types for the component registry
//!
//! Failures come in two classes:
//! - Contract violations: the caller asked for something that is never
//!   legal (unstorable type, nil id, deleting a built-in). These are logged
//!   at `error` level where they are raised.
//! - Business failures: the request was legal but the registry state
//!   refuses it (id or name already in use, item not found).

use crate::component_type::ComponentType;
use uuid::Uuid;

/// Registry operation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Type cannot be stored in a registry
    #[error("component type {0:?} cannot be stored")]
    InvalidComponentType(ComponentType),

    /// A non-nil id was required
    #[error("nil component id")]
    NilId,

    /// Built-in items cannot be deleted, renamed or removed one by one
    #[error("system component {id} cannot be modified")]
    SystemComponentImmutable {
        /// Id of the built-in item
        id: Uuid,
    },

    /// System component description breaks the built-in rules
    #[error("invalid system component: {reason}")]
    InvalidSystemComponent {
        /// What was wrong
        reason: String,
    },

    /// The type has handed out every positional index
    #[error("index space of {0:?} exhausted")]
    IndexSpaceExhausted(ComponentType),

    /// Id already identifies an item
    #[error("id {0} already in use")]
    IdInUse(Uuid),

    /// Name already identifies an active item of the type
    #[error("{component_type} name \"{name}\" already in use")]
    NameInUse {
        /// Type whose uniqueness rule was broken
        component_type: ComponentType,
        /// Name (or fingerprint rendering) that collided
        name: String,
    },

    /// Name breaks the naming rules of the type
    #[error("invalid name \"{0}\"")]
    InvalidName(String),

    /// Runtime serial number already identifies an item
    #[error("runtime serial number {0} already in use")]
    SerialNumberInUse(u64),

    /// No item matched
    #[error("item not found: {key}")]
    ItemNotFound {
        /// Rendering of the lookup key
        key: String,
    },

    /// Undelete of an item that is not deleted
    #[error("item {id} is not deleted")]
    NotDeleted {
        /// Id of the item
        id: Uuid,
    },

    /// Every unused-name candidate collided
    #[error("no unused name could be built from \"{base}\"")]
    NameSynthesisExhausted {
        /// Base of the candidates
        base: String,
    },

    /// Registry structures disagree with each other
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl RegistryError {
    /// Check if the caller broke the registry contract
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidComponentType(_)
                | Self::NilId
                | Self::SystemComponentImmutable { .. }
                | Self::InvalidSystemComponent { .. }
                | Self::IndexSpaceExhausted(_)
        )
    }

    /// Check if the failure is an expected consequence of registry state
    #[inline]
    #[must_use]
    pub fn is_business_failure(&self) -> bool {
        matches!(
            self,
            Self::IdInUse(_)
                | Self::NameInUse { .. }
                | Self::InvalidName(_)
                | Self::SerialNumberInUse(_)
                | Self::ItemNotFound { .. }
                | Self::NotDeleted { .. }
        )
    }

    pub(crate) fn not_found(key: impl std::fmt::Display) -> Self {
        Self::ItemNotFound {
            key: key.to_string(),
        }
    }
}

/// Result alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
