//! Cross-registry map
//!
//! Provides [`CrossRegistryMap`], the table a merge uses to translate
//! references from a source model to a destination model. Items are looked
//! up by source id and, when they carry one, by source type and index.

use crate::error::MapError;
use crate::map_item::MapItem;
use cmr_registry::arena::{Arena, Handle};
use cmr_registry::bucket_table::BucketTable;
use cmr_registry::{ComponentRegistry, ComponentType, ComponentTypeTraits, ManifestItem};
use tracing::{debug, error, warn};
use uuid::Uuid;

type ItemHandle = Handle<MapItem>;

#[allow(clippy::cast_possible_truncation)]
fn id_hash(id: Uuid) -> u32 {
    let (hi, lo) = id.as_u64_pair();
    let x = hi ^ lo.rotate_left(17);
    (x ^ (x >> 32)) as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn index_hash(component_type: ComponentType, index: i32) -> u32 {
    let slot = component_type.slot().map_or(u32::MAX, |s| s as u32);
    (index as u32).wrapping_mul(0x9E37_79B9) ^ slot.rotate_left(24)
}

/// Source → destination identity map of one merge
#[derive(Debug, Default)]
pub struct CrossRegistryMap {
    items: Arena<MapItem>,
    by_source_id: BucketTable<ItemHandle>,
    by_source_index: BucketTable<ItemHandle>,
}

impl CrossRegistryMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of map items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the map is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every map item in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &MapItem> {
        self.items.iter().map(|(_, item)| item)
    }

    /// Remove every map item
    pub fn clear(&mut self) {
        self.items.clear();
        self.by_source_id.clear();
        self.by_source_index.clear();
    }

    /// Store a map item
    ///
    /// # Errors
    /// - [`MapError::InvalidMapItem`] when the source side is not set
    /// - [`MapError::DuplicateSourceId`] / [`MapError::DuplicateSourceIndex`]
    ///   when the source is already mapped
    pub fn add_map_item(&mut self, item: MapItem) -> Result<(), MapError> {
        if !item.source_is_set() {
            let err = MapError::InvalidMapItem {
                reason: format!("{} source identity is not set", item.component_type()),
            };
            error!(error = %err, "map contract violation");
            return Err(err);
        }
        if self.handle_from_source_id(item.source_id()).is_some() {
            return Err(MapError::DuplicateSourceId(item.source_id()));
        }
        if let Some(index) = item.source_index() {
            if self.handle_from_source_index(item.component_type(), index).is_some() {
                return Err(MapError::DuplicateSourceIndex {
                    component_type: item.component_type(),
                    index,
                });
            }
        }

        let handle = self.items.insert(item);
        self.by_source_id.insert(id_hash(item.source_id()), handle);
        if let Some(index) = item.source_index() {
            self.by_source_index
                .insert(index_hash(item.component_type(), index), handle);
        }
        debug!(
            component_type = %item.component_type(),
            source = %item.source_id(),
            destination = %item.destination_id(),
            "map item added"
        );
        Ok(())
    }

    /// Map item whose source has `id`
    #[must_use]
    pub fn map_item_from_source_id(&self, id: Uuid) -> Option<&MapItem> {
        self.handle_from_source_id(id).and_then(|h| self.items.get(h))
    }

    /// Map item whose source is the item of a type at `index`
    #[must_use]
    pub fn map_item_from_source_index(&self, component_type: ComponentType, index: i32) -> Option<&MapItem> {
        self.handle_from_source_index(component_type, index)
            .and_then(|h| self.items.get(h))
    }

    /// Overwrite the destination of the stored item with `item`'s source
    ///
    /// The stored item must agree with `item` on type, source id and,
    /// unless `ignore_source_index`, source index.
    ///
    /// # Errors
    /// [`MapError::NotFound`] or [`MapError::SourceMismatch`].
    pub fn update_map_item_destination(&mut self, item: &MapItem, ignore_source_index: bool) -> Result<MapItem, MapError> {
        let id = item.source_id();
        let handle = self.handle_from_source_id(id).ok_or(MapError::NotFound(id))?;
        let stored = self.items.get_mut(handle).ok_or(MapError::NotFound(id))?;
        let matches = stored.component_type() == item.component_type()
            && (ignore_source_index || stored.source_index() == item.source_index());
        if !matches {
            warn!(source = %id, "map item update does not match the stored source");
            return Err(MapError::SourceMismatch { id });
        }
        stored.set_destination_identification(item.destination_id(), item.destination_index());
        Ok(*stored)
    }

    /// Destination index mapped to a source index, if it still names an
    /// active item of the type in `destination`
    #[must_use]
    pub fn get_and_validate_destination_index<T: ComponentTypeTraits>(
        &self,
        component_type: ComponentType,
        source_index: i32,
        destination: &ComponentRegistry<T>,
    ) -> Option<i32> {
        let item = self.map_item_from_source_index(component_type, source_index)?;
        let index = item.destination_index()?;
        let found = destination.item_from_index(component_type, index)?;
        resolves(item, found).then_some(index)
    }

    /// Destination id mapped to a source id, if it still names an active
    /// item of the type in `destination`
    #[must_use]
    pub fn get_and_validate_destination_id<T: ComponentTypeTraits>(
        &self,
        component_type: ComponentType,
        source_id: Uuid,
        destination: &ComponentRegistry<T>,
    ) -> Option<Uuid> {
        let item = self
            .map_item_from_source_id(source_id)
            .filter(|item| item.component_type() == component_type)?;
        let found = destination.item_from_id(item.destination_id())?;
        resolves(item, found).then_some(item.destination_id())
    }

    /// Check every item against the registries it refers to
    ///
    /// Sources must still exist in `source` (when given); destinations that
    /// are set must still exist in `destination`. The destination registry
    /// is validated first.
    ///
    /// # Errors
    /// [`MapError::Registry`] when the destination registry is inconsistent,
    /// [`MapError::Validation`] naming the first item that no longer
    /// resolves.
    pub fn validate<S: ComponentTypeTraits, D: ComponentTypeTraits>(
        &self,
        source: Option<&ComponentRegistry<S>>,
        destination: &ComponentRegistry<D>,
    ) -> Result<(), MapError> {
        destination.validate()?;
        for item in self.iter() {
            if let Some(source) = source {
                let ok = source.item_from_id(item.source_id()).is_some_and(|found| {
                    found.component_type() == item.component_type() && found.index() == item.source_index()
                });
                if !ok {
                    return Err(MapError::Validation(format!(
                        "source {} no longer resolves",
                        item.source_id()
                    )));
                }
            }
            if item.destination_is_set() {
                let ok = destination.item_from_id(item.destination_id()).is_some_and(|found| {
                    found.component_type() == item.component_type() && found.index() == item.destination_index()
                });
                if !ok {
                    return Err(MapError::Validation(format!(
                        "destination {} of source {} no longer resolves",
                        item.destination_id(),
                        item.source_id()
                    )));
                }
            }
        }
        Ok(())
    }

    /// The map with source and destination exchanged
    ///
    /// Items whose destination is not set have no source in the swapped map
    /// and are left out.
    #[must_use]
    pub fn swapped(&self) -> Self {
        let mut swapped = Self::new();
        for item in self.iter().filter(|item| item.destination_is_set()) {
            if let Err(err) = swapped.add_map_item(item.swap_source_and_destination()) {
                warn!(error = %err, "map item dropped while swapping");
            }
        }
        swapped
    }

    fn handle_from_source_id(&self, id: Uuid) -> Option<ItemHandle> {
        if id.is_nil() {
            return None;
        }
        self.by_source_id
            .find_first(id_hash(id), |&h| self.items.get(h).is_some_and(|i| i.source_id() == id))
            .copied()
    }

    fn handle_from_source_index(&self, component_type: ComponentType, index: i32) -> Option<ItemHandle> {
        self.by_source_index
            .find_first(index_hash(component_type, index), |&h| {
                self.items.get(h).is_some_and(|i| {
                    i.component_type() == component_type && i.source_index() == Some(index)
                })
            })
            .copied()
    }
}

fn resolves(item: &MapItem, found: &ManifestItem) -> bool {
    found.component_type() == item.component_type()
        && found.id() == item.destination_id()
        && found.is_active()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmr_registry::NewComponent;

    fn layer_item(source: u128, source_index: i32) -> MapItem {
        MapItem::unset(ComponentType::Layer).with_source(Uuid::from_u128(source), Some(source_index))
    }

    #[test]
    fn add_and_find() {
        let mut map = CrossRegistryMap::new();
        map.add_map_item(layer_item(1, 0)).unwrap();

        assert_eq!(map.len(), 1);
        assert!(map.map_item_from_source_id(Uuid::from_u128(1)).is_some());
        assert!(map.map_item_from_source_index(ComponentType::Layer, 0).is_some());
        assert!(map.map_item_from_source_index(ComponentType::Material, 0).is_none());
    }

    #[test]
    fn rejects_unset_and_duplicate_sources() {
        let mut map = CrossRegistryMap::new();
        let err = map.add_map_item(MapItem::unset(ComponentType::Layer)).unwrap_err();
        assert!(err.is_contract_violation());

        map.add_map_item(layer_item(1, 0)).unwrap();
        assert_eq!(
            map.add_map_item(layer_item(1, 5)).unwrap_err(),
            MapError::DuplicateSourceId(Uuid::from_u128(1))
        );
        assert!(matches!(
            map.add_map_item(layer_item(2, 0)).unwrap_err(),
            MapError::DuplicateSourceIndex { index: 0, .. }
        ));
    }

    #[test]
    fn update_destination_checks_source() {
        let mut map = CrossRegistryMap::new();
        map.add_map_item(layer_item(1, 0)).unwrap();

        let wrong_index = layer_item(1, 4).with_destination(Uuid::from_u128(9), Some(2));
        assert!(map.update_map_item_destination(&wrong_index, false).is_err());
        let updated = map.update_map_item_destination(&wrong_index, true).unwrap();
        assert_eq!(updated.destination_id(), Uuid::from_u128(9));
        assert_eq!(updated.source_index(), Some(0));

        let missing = layer_item(3, 0);
        assert_eq!(
            map.update_map_item_destination(&missing, false).unwrap_err(),
            MapError::NotFound(Uuid::from_u128(3))
        );
    }

    #[test]
    fn destination_must_still_be_live() {
        let mut destination = ComponentRegistry::new();
        let target = destination
            .add_component(NewComponent::new(ComponentType::Layer).with_name("Walls"), false)
            .unwrap()
            .item;

        let mut map = CrossRegistryMap::new();
        map.add_map_item(layer_item(1, 4).with_destination(target.id(), target.index()))
            .unwrap();

        assert_eq!(
            map.get_and_validate_destination_index(ComponentType::Layer, 4, &destination),
            Some(0)
        );
        assert_eq!(
            map.get_and_validate_destination_id(ComponentType::Layer, Uuid::from_u128(1), &destination),
            Some(target.id())
        );
        assert_eq!(
            map.get_and_validate_destination_id(ComponentType::Material, Uuid::from_u128(1), &destination),
            None
        );

        destination.delete_component(target.id()).unwrap();
        assert_eq!(map.get_and_validate_destination_index(ComponentType::Layer, 4, &destination), None);
        assert_eq!(
            map.get_and_validate_destination_id(ComponentType::Layer, Uuid::from_u128(1), &destination),
            None
        );
    }

    #[test]
    fn swapped_skips_unset_destinations() {
        let mut map = CrossRegistryMap::new();
        map.add_map_item(layer_item(1, 0).with_destination(Uuid::from_u128(10), Some(3)))
            .unwrap();
        map.add_map_item(layer_item(2, 1)).unwrap();

        let swapped = map.swapped();
        assert_eq!(swapped.len(), 1);
        let item = swapped.map_item_from_source_index(ComponentType::Layer, 3).unwrap();
        assert_eq!(item.destination_id(), Uuid::from_u128(1));
    }

    #[test]
    fn clear_empties_map() {
        let mut map = CrossRegistryMap::new();
        map.add_map_item(layer_item(1, 0)).unwrap();
        map.clear();

        assert!(map.is_empty());
        assert!(map.map_item_from_source_id(Uuid::from_u128(1)).is_none());
        assert_eq!(map.iter().count(), 0);
    }
}
