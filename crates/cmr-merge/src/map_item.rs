//! Map items
//!
//! Provides [`MapItem`], the pairing of a component's identity in a source
//! registry with its identity in a destination registry.

use cmr_registry::{ComponentType, ManifestItem};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Source and destination identity of one merged component
///
/// Either side may be unset (nil id, no index) on its own. For indexed
/// types a side only counts as set once its index is set too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapItem {
    component_type: ComponentType,
    source_id: Uuid,
    source_index: Option<i32>,
    destination_id: Uuid,
    destination_index: Option<i32>,
}

impl MapItem {
    /// Item of a type with neither side set
    #[inline]
    #[must_use]
    pub const fn unset(component_type: ComponentType) -> Self {
        Self {
            component_type,
            source_id: Uuid::nil(),
            source_index: None,
            destination_id: Uuid::nil(),
            destination_index: None,
        }
    }

    /// Item pairing two registry items of the same type
    ///
    /// Returns `None` when the types differ.
    #[must_use]
    pub fn from_items(source: &ManifestItem, destination: &ManifestItem) -> Option<Self> {
        (source.component_type() == destination.component_type()).then(|| {
            Self::unset(source.component_type())
                .with_source(source.id(), source.index())
                .with_destination(destination.id(), destination.index())
        })
    }

    /// With source identity
    #[inline]
    #[must_use]
    pub fn with_source(mut self, id: Uuid, index: Option<i32>) -> Self {
        self.set_source_identification(id, index);
        self
    }

    /// With destination identity
    #[inline]
    #[must_use]
    pub fn with_destination(mut self, id: Uuid, index: Option<i32>) -> Self {
        self.set_destination_identification(id, index);
        self
    }

    /// Overwrite the source identity
    #[inline]
    pub fn set_source_identification(&mut self, id: Uuid, index: Option<i32>) {
        self.source_id = id;
        self.source_index = index;
    }

    /// Overwrite the destination identity
    #[inline]
    pub fn set_destination_identification(&mut self, id: Uuid, index: Option<i32>) {
        self.destination_id = id;
        self.destination_index = index;
    }

    /// Kind of component
    #[inline]
    #[must_use]
    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Id in the source registry
    #[inline]
    #[must_use]
    pub fn source_id(&self) -> Uuid {
        self.source_id
    }

    /// Index in the source registry
    #[inline]
    #[must_use]
    pub fn source_index(&self) -> Option<i32> {
        self.source_index
    }

    /// Id in the destination registry
    #[inline]
    #[must_use]
    pub fn destination_id(&self) -> Uuid {
        self.destination_id
    }

    /// Index in the destination registry
    #[inline]
    #[must_use]
    pub fn destination_index(&self) -> Option<i32> {
        self.destination_index
    }

    /// True when the source side identifies a component
    #[must_use]
    pub fn source_is_set(&self) -> bool {
        side_is_set(self.component_type, self.source_id, self.source_index)
    }

    /// True when the destination side identifies a component
    #[must_use]
    pub fn destination_is_set(&self) -> bool {
        side_is_set(self.component_type, self.destination_id, self.destination_index)
    }

    /// Same pairing seen from the destination
    #[inline]
    #[must_use]
    pub fn swap_source_and_destination(&self) -> Self {
        Self {
            component_type: self.component_type,
            source_id: self.destination_id,
            source_index: self.destination_index,
            destination_id: self.source_id,
            destination_index: self.source_index,
        }
    }

    /// Order by type, then source id
    #[must_use]
    pub fn compare_type_and_source_id(a: &Self, b: &Self) -> Ordering {
        a.component_type
            .cmp(&b.component_type)
            .then_with(|| a.source_id.cmp(&b.source_id))
    }

    /// Order by type, then source index (unset indices first)
    #[must_use]
    pub fn compare_type_and_source_index(a: &Self, b: &Self) -> Ordering {
        a.component_type
            .cmp(&b.component_type)
            .then_with(|| a.source_index.cmp(&b.source_index))
    }
}

impl Default for MapItem {
    fn default() -> Self {
        Self::unset(ComponentType::Unset)
    }
}

fn side_is_set(component_type: ComponentType, id: Uuid, index: Option<i32>) -> bool {
    component_type.is_storable() && !id.is_nil() && (index.is_some() || !component_type.index_required())
}
