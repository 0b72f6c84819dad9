//! Registry items and component descriptions
//!
//! Provides [`ManifestItem`], the identity record a registry keeps for one
//! component, and the request types used to add components.

use crate::component_type::ComponentType;
use cmr_name::NameFingerprint;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Lifecycle flags of a registry item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ItemStatus {
    /// Soft-deleted: name released, id and index retained
    pub deleted: bool,

    /// Built-in item that can never be deleted
    pub system: bool,
}

/// Identity record of one component
///
/// # Structure
/// - `component_type`: kind of component
/// - `index`: dense positional index (indexed types only; negative for
///   system items)
/// - `id`: persistent 128-bit id, never nil for a registered item
/// - `name_fingerprint`: scoped fingerprint of the current name
/// - `runtime_serial_number`: process-local handle, 0 when none
/// - `status`: deleted/system flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestItem {
    pub(crate) component_type: ComponentType,
    pub(crate) index: Option<i32>,
    pub(crate) id: Uuid,
    pub(crate) name_fingerprint: NameFingerprint,
    pub(crate) runtime_serial_number: u64,
    pub(crate) status: ItemStatus,
}

impl ManifestItem {
    /// Item that identifies nothing
    pub const UNSET: Self = Self {
        component_type: ComponentType::Unset,
        index: None,
        id: Uuid::nil(),
        name_fingerprint: NameFingerprint::UNSET,
        runtime_serial_number: 0,
        status: ItemStatus {
            deleted: false,
            system: false,
        },
    };

    /// Kind of component
    #[inline]
    #[must_use]
    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Positional index, `None` for types without indices
    #[inline]
    #[must_use]
    pub fn index(&self) -> Option<i32> {
        self.index
    }

    /// Persistent id
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Fingerprint of the current name
    #[inline]
    #[must_use]
    pub fn name_fingerprint(&self) -> &NameFingerprint {
        &self.name_fingerprint
    }

    /// Process-local runtime serial number (0 when none)
    #[inline]
    #[must_use]
    pub fn runtime_serial_number(&self) -> u64 {
        self.runtime_serial_number
    }

    /// Lifecycle flags
    #[inline]
    #[must_use]
    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// True for soft-deleted items
    #[inline]
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status.deleted
    }

    /// True for built-in items
    #[inline]
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.status.system
    }

    /// True for items that are not deleted
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.status.deleted
    }

    /// True when the item identifies a component
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.component_type.is_storable() && !self.id.is_nil()
    }

    /// True for [`Self::UNSET`]
    #[inline]
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }

    /// Order by type, then id
    #[must_use]
    pub fn compare_type_and_id(a: &Self, b: &Self) -> Ordering {
        a.component_type
            .cmp(&b.component_type)
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Order by type, then name fingerprint
    #[must_use]
    pub fn compare_type_and_name(a: &Self, b: &Self) -> Ordering {
        a.component_type
            .cmp(&b.component_type)
            .then_with(|| a.name_fingerprint.cmp(&b.name_fingerprint))
    }
}

impl Default for ManifestItem {
    fn default() -> Self {
        Self::UNSET
    }
}

/// Name supplied with a new component
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComponentName {
    /// No name
    #[default]
    None,

    /// Display name (or file path for embedded files)
    Text(String),

    /// Precomputed fingerprint, as read back by an archive
    Fingerprint(NameFingerprint),
}

/// Description of a component to add
///
/// # Example
/// ```
/// use cmr_registry::{ComponentType, NewComponent};
/// use uuid::Uuid;
///
/// let layer = NewComponent::new(ComponentType::Layer)
///     .with_id(Uuid::new_v4())
///     .with_name("Walls")
///     .with_runtime_serial_number(17);
/// assert_eq!(layer.component_type, ComponentType::Layer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComponent {
    /// Kind of component
    pub component_type: ComponentType,
    /// Runtime serial number, 0 when the component has none
    pub runtime_serial_number: u64,
    /// Parent scope for parent-scoped names
    pub parent_id: Uuid,
    /// Requested id; nil asks the registry to generate one
    pub id: Uuid,
    /// Requested name
    pub name: ComponentName,
}

impl NewComponent {
    /// Unnamed component of the given type with a nil id
    #[inline]
    #[must_use]
    pub fn new(component_type: ComponentType) -> Self {
        Self {
            component_type,
            runtime_serial_number: 0,
            parent_id: Uuid::nil(),
            id: Uuid::nil(),
            name: ComponentName::None,
        }
    }

    /// With explicit id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// With parent scope
    #[inline]
    #[must_use]
    pub fn with_parent_id(mut self, parent_id: Uuid) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = ComponentName::Text(name.into());
        self
    }

    /// With precomputed name fingerprint
    #[inline]
    #[must_use]
    pub fn with_name_hash(mut self, fingerprint: NameFingerprint) -> Self {
        self.name = ComponentName::Fingerprint(fingerprint);
        self
    }

    /// With runtime serial number
    #[inline]
    #[must_use]
    pub fn with_runtime_serial_number(mut self, serial_number: u64) -> Self {
        self.runtime_serial_number = serial_number;
        self
    }
}

/// Description of a built-in component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemComponent {
    /// Kind of component
    pub component_type: ComponentType,
    /// Id, must not be nil
    pub id: Uuid,
    /// Negative index for indexed types, `None` otherwise
    pub index: Option<i32>,
    /// Name, empty for unnamed built-ins
    pub name: String,
    /// Runtime serial number, 0 when none
    pub runtime_serial_number: u64,
}

impl SystemComponent {
    /// Unnamed built-in without index or serial number
    #[inline]
    #[must_use]
    pub fn new(component_type: ComponentType, id: Uuid) -> Self {
        Self {
            component_type,
            id,
            index: None,
            name: String::new(),
            runtime_serial_number: 0,
        }
    }

    /// With index
    #[inline]
    #[must_use]
    pub fn with_index(mut self, index: i32) -> Self {
        self.index = Some(index);
        self
    }

    /// With name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With runtime serial number
    #[inline]
    #[must_use]
    pub fn with_runtime_serial_number(mut self, serial_number: u64) -> Self {
        self.runtime_serial_number = serial_number;
        self
    }
}

/// Outcome of adding a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedComponent {
    /// The registered item
    pub item: ManifestItem,

    /// Name the component must now carry, `None` when it was added by
    /// fingerprint or without a name
    pub assigned_name: Option<String>,

    /// The requested name collided or was invalid and was replaced
    pub name_changed: bool,

    /// The requested id collided (or was nil) and was replaced
    pub id_changed: bool,
}
