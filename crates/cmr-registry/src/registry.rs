//! Component registry
//!
//! Provides [`ComponentRegistry`], the identity authority of one model. It
//! keeps one [`TypeTable`] per storable component type plus global hash
//! tables:
//! - id → entry (every item)
//! - unique name → entry (active items of unique-name types)
//! - name → entry (active named items of other types)
//! - system name → entry (named built-in items)
//! - runtime serial number → entry (items with a non-zero serial)
//!
//! Deleted items stay in the id and serial tables and in their type's list
//! but leave the name tables, which frees their name for reuse.

use crate::arena::Arena;
use crate::bucket_table::BucketTable;
use crate::component_type::{ComponentType, ComponentTypeTraits, StandardTypeTraits};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::item::{AddedComponent, ComponentName, ItemStatus, ManifestItem, NewComponent, SystemComponent};
use crate::table_index::{Entry, EntryHandle, Items, TypeTable};
use crate::unused_name::{self, SuffixPlan};
use cmr_name::NameFingerprint;
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

/// Name table an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameTable {
    Unique,
    Shared,
    System,
}

#[allow(clippy::cast_possible_truncation)]
fn fold64(x: u64) -> u32 {
    (x ^ (x >> 32)) as u32
}

fn id_hash(id: Uuid) -> u32 {
    let (hi, lo) = id.as_u64_pair();
    fold64(hi ^ lo.rotate_left(17))
}

fn serial_hash(serial_number: u64) -> u32 {
    fold64(serial_number)
}

/// Log a contract violation and hand the error back
fn violation(err: RegistryError) -> RegistryError {
    error!(error = %err, "registry contract violation");
    err
}

/// Identity registry of the components of one model
///
/// Generic over the naming rules; the default registry uses
/// [`StandardTypeTraits`]. Every mutation bumps
/// [`content_version`](Self::content_version).
///
/// # Example
/// ```
/// use cmr_registry::{ComponentRegistry, ComponentType, NewComponent};
///
/// let mut registry = ComponentRegistry::new();
/// let layer = NewComponent::new(ComponentType::Layer).with_name("Base");
///
/// let first = registry.add_component(layer.clone(), false).unwrap();
/// assert_eq!(first.item.index(), Some(0));
///
/// // Same name again: refused, unless collisions are resolved
/// assert!(registry.add_component(layer.clone(), false).is_err());
/// let second = registry.add_component(layer, true).unwrap();
/// assert_eq!(second.assigned_name.as_deref(), Some("Base 01"));
/// ```
#[derive(Debug)]
pub struct ComponentRegistry<T: ComponentTypeTraits = StandardTypeTraits> {
    traits: T,
    config: RegistryConfig,
    serial_number: u64,
    entries: Arena<Entry>,
    tables: Vec<TypeTable>,
    by_id: BucketTable<EntryHandle>,
    by_unique_name: BucketTable<EntryHandle>,
    by_name: BucketTable<EntryHandle>,
    by_system_name: BucketTable<EntryHandle>,
    by_serial: BucketTable<EntryHandle>,
    content_version: u64,
}

impl ComponentRegistry<StandardTypeTraits> {
    /// Create empty registry with the standard naming rules
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StandardTypeTraits, RegistryConfig::default())
    }
}

impl Default for ComponentRegistry<StandardTypeTraits> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ComponentTypeTraits> ComponentRegistry<T> {
    /// Create empty registry
    #[must_use]
    pub fn with_config(traits: T, config: RegistryConfig) -> Self {
        let table = || BucketTable::with_sizing(config.initial_buckets, config.max_load_factor);
        Self {
            by_id: table(),
            by_unique_name: table(),
            by_name: table(),
            by_system_name: table(),
            by_serial: table(),
            traits,
            serial_number: 0,
            entries: Arena::new(),
            tables: ComponentType::STORABLE.iter().map(|_| TypeTable::default()).collect(),
            content_version: 0,
            config,
        }
    }

    pub(crate) fn with_serial_number(mut self, serial_number: u64) -> Self {
        self.serial_number = serial_number;
        self
    }

    /// Serial number handed out by the factory that created the registry, 0
    /// otherwise
    #[inline]
    #[must_use]
    pub fn serial_number(&self) -> u64 {
        self.serial_number
    }

    /// Naming rules
    #[inline]
    #[must_use]
    pub fn traits(&self) -> &T {
        &self.traits
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Counter bumped by every mutation
    #[inline]
    #[must_use]
    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    /// Number of items of every type and state
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry holds no items
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Active, non-system items of a type
    #[must_use]
    pub fn active_component_count(&self, component_type: ComponentType) -> usize {
        self.table(component_type).map_or(0, TypeTable::active_count)
    }

    /// Deleted items of a type
    #[must_use]
    pub fn deleted_component_count(&self, component_type: ComponentType) -> usize {
        self.table(component_type).map_or(0, TypeTable::deleted_count)
    }

    /// Built-in items of a type
    #[must_use]
    pub fn system_component_count(&self, component_type: ComponentType) -> usize {
        self.table(component_type).map_or(0, TypeTable::system_count)
    }

    /// Active, deleted and built-in items of a type
    #[must_use]
    pub fn total_component_count(&self, component_type: ComponentType) -> usize {
        self.table(component_type)
            .map_or(0, |t| t.active_count() + t.deleted_count() + t.system_count())
    }

    /// Next index the type will assign (0 for types without indices)
    #[must_use]
    pub fn component_index_limit(&self, component_type: ComponentType) -> usize {
        self.table(component_type).map_or(0, TypeTable::index_limit)
    }

    /// Item with the given id
    #[must_use]
    pub fn item_from_id(&self, id: Uuid) -> Option<&ManifestItem> {
        self.handle_from_id(id).and_then(|h| self.item(h))
    }

    /// Item of a type at an index; negative indices address built-ins
    #[must_use]
    pub fn item_from_index(&self, component_type: ComponentType, index: i32) -> Option<&ManifestItem> {
        if index < 0 {
            return self.system_item_from_index(component_type, index);
        }
        let handle = self.table(component_type)?.entry_at(index)?;
        self.item(handle)
    }

    /// Item currently named by `fingerprint`, built-ins included
    ///
    /// The fingerprint is rescoped the way the type's uniqueness rule
    /// requires before it is looked up.
    #[must_use]
    pub fn item_from_name_hash(
        &self,
        component_type: ComponentType,
        fingerprint: &NameFingerprint,
    ) -> Option<&ManifestItem> {
        self.handle_from_name(component_type, fingerprint)
            .or_else(|| self.handle_from_system_name(component_type, fingerprint))
            .and_then(|h| self.item(h))
    }

    /// Item with a runtime serial number; 0 never matches
    #[must_use]
    pub fn item_from_runtime_serial_number(&self, serial_number: u64) -> Option<&ManifestItem> {
        self.handle_from_serial(serial_number).and_then(|h| self.item(h))
    }

    /// Built-in item of a type at a (negative) index
    #[must_use]
    pub fn system_item_from_index(&self, component_type: ComponentType, index: i32) -> Option<&ManifestItem> {
        let handle = self.table(component_type)?.system_entry_at(index)?;
        self.item(handle)
    }

    /// Built-in item of a type named by `fingerprint`
    #[must_use]
    pub fn system_item_from_name_hash(
        &self,
        component_type: ComponentType,
        fingerprint: &NameFingerprint,
    ) -> Option<&ManifestItem> {
        self.handle_from_system_name(component_type, fingerprint)
            .and_then(|h| self.item(h))
    }

    /// Active and deleted items of a type in insertion order
    #[must_use]
    pub fn items(&self, component_type: ComponentType) -> Items<'_> {
        Items::new(&self.entries, self.table(component_type).and_then(TypeTable::first))
    }

    /// Built-in items of a type in insertion order
    #[must_use]
    pub fn system_items(&self, component_type: ComponentType) -> Items<'_> {
        Items::new(&self.entries, self.table(component_type).and_then(TypeTable::system_first))
    }

    /// Oldest active or deleted item of a type
    #[must_use]
    pub fn first_item(&self, component_type: ComponentType) -> Option<&ManifestItem> {
        self.table(component_type)?.first().and_then(|h| self.item(h))
    }

    /// Newest active or deleted item of a type
    #[must_use]
    pub fn last_item(&self, component_type: ComponentType) -> Option<&ManifestItem> {
        self.table(component_type)?.last().and_then(|h| self.item(h))
    }

    /// Item added after the item with `id` in the same type list
    ///
    /// Walks by id, so the registry must not be mutated between steps if
    /// the walk is to visit every item exactly once.
    #[must_use]
    pub fn next_item(&self, id: Uuid) -> Option<&ManifestItem> {
        let entry = self.entries.get(self.handle_from_id(id)?)?;
        entry.next().and_then(|h| self.item(h))
    }

    /// Item added before the item with `id` in the same type list
    #[must_use]
    pub fn previous_item(&self, id: Uuid) -> Option<&ManifestItem> {
        let entry = self.entries.get(self.handle_from_id(id)?)?;
        entry.prev().and_then(|h| self.item(h))
    }

    /// Check that `id` is non-nil and names no item
    #[must_use]
    pub fn id_is_available(&self, id: Uuid) -> bool {
        !id.is_nil() && self.handle_from_id(id).is_none()
    }

    /// `candidate` when available, otherwise a fresh random id
    #[must_use]
    pub fn unused_id(&self, candidate: Uuid) -> Uuid {
        if self.id_is_available(candidate) {
            return candidate;
        }
        loop {
            let id = Uuid::new_v4();
            if self.id_is_available(id) {
                return id;
            }
        }
    }

    /// Check whether an active or built-in item of the type carries the
    /// name
    ///
    /// With `ignore_parent` on a parent-scoped type the name is compared
    /// across every scope, which walks the type's items.
    #[must_use]
    pub fn name_in_use(
        &self,
        component_type: ComponentType,
        fingerprint: &NameFingerprint,
        ignore_parent: bool,
    ) -> bool {
        if !fingerprint.is_valid_and_not_empty() || !component_type.is_storable() {
            return false;
        }
        if ignore_parent && self.traits.unique_name_includes_parent(component_type) {
            trace!(%component_type, %fingerprint, "scanning names across scopes");
            return self
                .items(component_type)
                .chain(self.system_items(component_type))
                .any(|item| item.is_active() && item.name_fingerprint.eq_ignoring_parent(fingerprint));
        }
        self.handle_from_name(component_type, fingerprint).is_some()
            || self.handle_from_system_name(component_type, fingerprint).is_some()
    }

    /// Check that a name is usable by a new item of the type
    #[must_use]
    pub fn name_is_available(&self, component_type: ComponentType, fingerprint: &NameFingerprint) -> bool {
        fingerprint.is_valid_and_not_empty() && !self.name_in_use(component_type, fingerprint, false)
    }

    /// A name for a new item of the type that is not in use
    ///
    /// `candidate` is returned unchanged when it is valid and available.
    /// Otherwise a name is built from `base` (or from `candidate` stripped
    /// of its trailing counter, or from the type's default name) followed by
    /// the configured separator and a suffix.
    ///
    /// # Errors
    /// [`RegistryError::InvalidComponentType`] for unstorable types and
    /// [`RegistryError::NameSynthesisExhausted`] when every suffix collides.
    pub fn unused_name(
        &self,
        component_type: ComponentType,
        parent_id: Uuid,
        candidate: Option<&str>,
        base: Option<&str>,
    ) -> Result<String> {
        let table = self
            .table(component_type)
            .ok_or_else(|| violation(RegistryError::InvalidComponentType(component_type)))?;
        let available = |name: &str| {
            let fp = self.traits.name_fingerprint(component_type, parent_id, name);
            self.name_is_available(component_type, &fp)
        };
        if let Some(name) = candidate.filter(|&c| available(c)) {
            return Ok(name.to_string());
        }

        let base = unused_name::base_name(&self.traits, component_type, base, candidate);
        let index_limit = if component_type.index_required() {
            table.index_limit()
        } else {
            table.active_count() + table.deleted_count()
        };
        let plan = SuffixPlan {
            separator: &self.config.name_separator,
            seed: table.active_count().max(1),
            index_limit,
            random_attempts: self.config.random_suffix_attempts,
        };
        unused_name::synthesize(&base, plan, available)
    }

    /// Register a component
    ///
    /// A nil id is always replaced with a fresh one. Without
    /// `resolve_collisions` an id in use, an invalid name or a name in use
    /// (for unique-name types) fails; with it the id is replaced and a name
    /// is synthesized and reported in
    /// [`AddedComponent::assigned_name`].
    ///
    /// # Errors
    /// - [`RegistryError::InvalidComponentType`] for unstorable types
    /// - [`RegistryError::SerialNumberInUse`] when the runtime serial number
    ///   already names an item
    /// - [`RegistryError::IdInUse`], [`RegistryError::InvalidName`],
    ///   [`RegistryError::NameInUse`] without collision resolution
    pub fn add_component(&mut self, component: NewComponent, resolve_collisions: bool) -> Result<AddedComponent> {
        let NewComponent {
            component_type,
            runtime_serial_number,
            parent_id,
            id,
            name,
        } = component;
        let slot = component_type
            .slot()
            .ok_or_else(|| violation(RegistryError::InvalidComponentType(component_type)))?;
        if runtime_serial_number != 0 && self.handle_from_serial(runtime_serial_number).is_some() {
            return Err(RegistryError::SerialNumberInUse(runtime_serial_number));
        }

        let mut id_changed = false;
        let id = if id.is_nil() {
            id_changed = true;
            self.unused_id(id)
        } else if self.id_is_available(id) {
            id
        } else if resolve_collisions {
            id_changed = true;
            self.unused_id(id)
        } else {
            return Err(RegistryError::IdInUse(id));
        };

        let (name_fingerprint, assigned_name, name_changed) = match name {
            ComponentName::None => (NameFingerprint::EMPTY, None, false),
            ComponentName::Text(text) => self.acquire_name(component_type, parent_id, &text, resolve_collisions)?,
            ComponentName::Fingerprint(fp) => self.acquire_name_hash(component_type, parent_id, &fp, resolve_collisions)?,
        };

        let index = if component_type.index_required() {
            Some(
                self.tables[slot]
                    .next_index()
                    .ok_or_else(|| violation(RegistryError::IndexSpaceExhausted(component_type)))?,
            )
        } else {
            None
        };

        let item = ManifestItem {
            component_type,
            index,
            id,
            name_fingerprint,
            runtime_serial_number,
            status: ItemStatus::default(),
        };
        let handle = self.entries.insert(Entry::new(item));
        if index.is_some() {
            self.tables[slot].assign_index(handle);
        }
        self.tables[slot].push(&mut self.entries, handle);
        self.link(handle, &item);
        self.content_version += 1;

        debug!(%component_type, %id, ?index, name_changed, id_changed, "component added");
        Ok(AddedComponent {
            item,
            assigned_name,
            name_changed,
            id_changed,
        })
    }

    /// Register a built-in component
    ///
    /// # Errors
    /// [`RegistryError::NilId`] for a nil id, [`RegistryError::IdInUse`]
    /// when the id already identifies an item, and
    /// [`RegistryError::InvalidSystemComponent`] when the index sign is
    /// wrong for the type, or the name is invalid, disallowed or taken by
    /// another built-in of the type.
    pub fn add_system_component(&mut self, component: SystemComponent) -> Result<ManifestItem> {
        let SystemComponent {
            component_type,
            id,
            index,
            name,
            runtime_serial_number,
        } = component;
        let slot = component_type
            .slot()
            .ok_or_else(|| violation(RegistryError::InvalidComponentType(component_type)))?;
        let invalid = |reason: &str| {
            violation(RegistryError::InvalidSystemComponent {
                reason: reason.to_string(),
            })
        };

        if id.is_nil() {
            return Err(violation(RegistryError::NilId));
        }
        if self.handle_from_id(id).is_some() {
            return Err(RegistryError::IdInUse(id));
        }
        match (component_type.index_required(), index) {
            (true, Some(i)) if i < 0 => {}
            (true, _) => return Err(invalid("indexed built-ins need a negative index")),
            (false, None) => {}
            (false, Some(_)) => return Err(invalid("type does not use indices")),
        }
        if let Some(i) = index {
            if self.system_item_from_index(component_type, i).is_some() {
                return Err(invalid("index already used by another built-in"));
            }
        }
        let name_fingerprint = if name.trim().is_empty() {
            NameFingerprint::EMPTY
        } else {
            if !self.traits.system_names_allowed(component_type) {
                return Err(invalid("type has no system names"));
            }
            let fp = self.traits.name_fingerprint(component_type, Uuid::nil(), &name);
            if !fp.is_valid_and_not_empty() {
                return Err(invalid("invalid name"));
            }
            if self.handle_from_system_name(component_type, &fp).is_some() {
                return Err(invalid("name already used by another built-in"));
            }
            fp
        };
        if runtime_serial_number != 0 && self.handle_from_serial(runtime_serial_number).is_some() {
            return Err(RegistryError::SerialNumberInUse(runtime_serial_number));
        }

        let item = ManifestItem {
            component_type,
            index,
            id,
            name_fingerprint,
            runtime_serial_number,
            status: ItemStatus {
                deleted: false,
                system: true,
            },
        };
        let handle = self.entries.insert(Entry::new(item));
        self.tables[slot].push_system(&mut self.entries, handle);
        self.link(handle, &item);
        self.content_version += 1;

        debug!(%component_type, %id, ?index, "system component added");
        Ok(item)
    }

    /// Permanently remove the item with `id`
    ///
    /// Returns false when no item matches or the item is a built-in.
    pub fn remove_component(&mut self, id: Uuid) -> bool {
        match self.handle_from_id(id) {
            Some(handle) => self.remove_handle(handle),
            None => false,
        }
    }

    /// Permanently remove the item with a runtime serial number
    pub fn remove_component_by_serial_number(&mut self, serial_number: u64) -> bool {
        match self.handle_from_serial(serial_number) {
            Some(handle) => self.remove_handle(handle),
            None => false,
        }
    }

    /// Permanently remove the item of a type at a non-negative index
    ///
    /// The index is not handed out again.
    pub fn remove_indexed_component(&mut self, component_type: ComponentType, index: i32) -> bool {
        match self.table(component_type).and_then(|t| t.entry_at(index)) {
            Some(handle) => self.remove_handle(handle),
            None => false,
        }
    }

    /// Permanently remove every active and deleted item of a type
    ///
    /// Built-ins stay. With `reset_indices` the type starts handing out
    /// indices from 0 again. Returns the number of removed items.
    pub fn remove_all_components(&mut self, component_type: ComponentType, reset_indices: bool) -> usize {
        let Some(slot) = component_type.slot() else {
            violation(RegistryError::InvalidComponentType(component_type));
            return 0;
        };
        let mut removed = 0;
        while let Some(handle) = self.tables[slot].first() {
            if !self.remove_handle(handle) {
                break;
            }
            removed += 1;
        }
        if reset_indices {
            self.tables[slot].reset_indices();
        }
        self.content_version += 1;
        debug!(%component_type, removed, reset_indices, "components removed");
        removed
    }

    /// Remove every item, built-ins included, and reset all indices
    pub fn reset(&mut self) {
        self.entries.clear();
        self.tables.iter_mut().for_each(|t| *t = TypeTable::default());
        self.by_id.clear();
        self.by_unique_name.clear();
        self.by_name.clear();
        self.by_system_name.clear();
        self.by_serial.clear();
        self.content_version += 1;
        debug!("registry reset");
    }

    /// Soft-delete the item with `id`
    ///
    /// The name is released; id, index and serial number are kept. Deleting
    /// a deleted item is a no-op.
    ///
    /// # Errors
    /// [`RegistryError::ItemNotFound`], or
    /// [`RegistryError::SystemComponentImmutable`] for built-ins.
    pub fn delete_component(&mut self, id: Uuid) -> Result<ManifestItem> {
        let handle = self
            .handle_from_id(id)
            .ok_or_else(|| RegistryError::not_found(format!("id {id}")))?;
        self.delete_handle(handle)
    }

    /// Soft-delete the item with a runtime serial number
    ///
    /// # Errors
    /// As [`Self::delete_component`].
    pub fn delete_component_by_serial_number(&mut self, serial_number: u64) -> Result<ManifestItem> {
        let handle = self
            .handle_from_serial(serial_number)
            .ok_or_else(|| RegistryError::not_found(format!("runtime serial number {serial_number}")))?;
        self.delete_handle(handle)
    }

    /// Restore a soft-deleted item
    ///
    /// The item takes `candidate_name` when it is available, its previous
    /// name when no candidate is given and that name is still free, and a
    /// synthesized name otherwise. The name the item must now carry is
    /// returned alongside the item (`None` when it kept its previous name or
    /// has none).
    ///
    /// # Errors
    /// [`RegistryError::ItemNotFound`], [`RegistryError::NotDeleted`], or a
    /// synthesis failure.
    pub fn undelete_component(
        &mut self,
        id: Uuid,
        parent_id: Uuid,
        candidate_name: &str,
    ) -> Result<(ManifestItem, Option<String>)> {
        let handle = self
            .handle_from_id(id)
            .ok_or_else(|| RegistryError::not_found(format!("id {id}")))?;
        let old = self.item(handle).copied().ok_or_else(|| RegistryError::not_found(format!("id {id}")))?;
        if !old.is_deleted() {
            return Err(RegistryError::NotDeleted { id });
        }
        let component_type = old.component_type;

        let (name_fingerprint, assigned_name) = if !candidate_name.trim().is_empty() {
            let (fp, name, _) = self.acquire_name(component_type, parent_id, candidate_name, true)?;
            (fp, name)
        } else if !old.name_fingerprint.is_valid_and_not_empty()
            || !self.traits.unique_name_required(component_type)
            || self.name_is_available(component_type, &old.name_fingerprint)
        {
            (old.name_fingerprint, None)
        } else {
            let name = self.unused_name(component_type, parent_id, None, None)?;
            (self.traits.name_fingerprint(component_type, parent_id, &name), Some(name))
        };

        let item = self.update(handle, |item| {
            item.status.deleted = false;
            item.name_fingerprint = name_fingerprint;
        })?;
        if let Some(table) = self.table_mut(component_type) {
            table.mark_deleted(false);
        }
        self.link_name(handle, &item);
        self.content_version += 1;

        debug!(%component_type, %id, "component undeleted");
        Ok((item, assigned_name))
    }

    /// Restore a soft-deleted item and give it a new runtime serial number
    ///
    /// # Errors
    /// As [`Self::undelete_component`], plus
    /// [`RegistryError::SerialNumberInUse`]; the item stays deleted when the
    /// serial number is taken.
    pub fn undelete_component_and_change_runtime_serial_number(
        &mut self,
        id: Uuid,
        parent_id: Uuid,
        candidate_name: &str,
        new_serial_number: u64,
    ) -> Result<(ManifestItem, Option<String>)> {
        if let Some(owner) = self.item_from_runtime_serial_number(new_serial_number) {
            if owner.id != id {
                return Err(RegistryError::SerialNumberInUse(new_serial_number));
            }
        }
        let (_, assigned_name) = self.undelete_component(id, parent_id, candidate_name)?;
        let item = self.change_component_runtime_serial_number(id, new_serial_number)?;
        Ok((item, assigned_name))
    }

    /// Rename the item with `id`
    ///
    /// An empty name removes the name. Deleted items only record the new
    /// fingerprint; their name stays released.
    ///
    /// # Errors
    /// [`RegistryError::ItemNotFound`],
    /// [`RegistryError::SystemComponentImmutable`],
    /// [`RegistryError::InvalidName`] or [`RegistryError::NameInUse`].
    pub fn change_component_name(&mut self, id: Uuid, parent_id: Uuid, new_name: &str) -> Result<ManifestItem> {
        let handle = self.mutable_handle(id)?;
        let component_type = self.item(handle).map_or(ComponentType::Unset, |i| i.component_type);
        let fp = self.traits.name_fingerprint(component_type, parent_id, new_name);
        if fp.is_invalid_name_hash() {
            return Err(RegistryError::InvalidName(new_name.to_string()));
        }
        self.rename_handle(handle, fp, new_name)
    }

    /// Rename the item with `id` by fingerprint
    ///
    /// # Errors
    /// As [`Self::change_component_name`].
    pub fn change_component_name_hash(&mut self, id: Uuid, fingerprint: &NameFingerprint) -> Result<ManifestItem> {
        let handle = self.mutable_handle(id)?;
        let component_type = self.item(handle).map_or(ComponentType::Unset, |i| i.component_type);
        if fingerprint.is_invalid_name_hash() {
            return Err(RegistryError::InvalidName(fingerprint.to_string()));
        }
        let fp = self.scoped_fingerprint(component_type, fingerprint);
        self.rename_handle(handle, fp, &fingerprint.to_string())
    }

    /// Give the item with `id` a new runtime serial number (0 clears it)
    ///
    /// # Errors
    /// [`RegistryError::ItemNotFound`] or
    /// [`RegistryError::SerialNumberInUse`].
    pub fn change_component_runtime_serial_number(&mut self, id: Uuid, new_serial_number: u64) -> Result<ManifestItem> {
        let handle = self
            .handle_from_id(id)
            .ok_or_else(|| RegistryError::not_found(format!("id {id}")))?;
        let old = self.item(handle).copied().ok_or_else(|| RegistryError::not_found(format!("id {id}")))?;
        if old.runtime_serial_number == new_serial_number {
            return Ok(old);
        }
        if new_serial_number != 0 && self.handle_from_serial(new_serial_number).is_some() {
            return Err(RegistryError::SerialNumberInUse(new_serial_number));
        }
        self.unlink_serial(handle, old.runtime_serial_number);
        let item = self.update(handle, |item| item.runtime_serial_number = new_serial_number)?;
        if new_serial_number != 0 {
            self.by_serial.insert(serial_hash(new_serial_number), handle);
        }
        self.content_version += 1;

        debug!(%id, old = old.runtime_serial_number, new = new_serial_number, "runtime serial number changed");
        Ok(item)
    }

    /// Walk every structure and report the first broken invariant
    ///
    /// # Errors
    /// [`RegistryError::InvariantViolation`] describing the problem.
    pub fn validate(&self) -> Result<()> {
        let broken = |msg: String| -> Result<()> {
            warn!(problem = %msg, "registry validation failed");
            Err(RegistryError::InvariantViolation(msg))
        };

        let mut listed = 0;
        for (slot, &component_type) in ComponentType::STORABLE.iter().enumerate() {
            let table = &self.tables[slot];
            let (mut active, mut deleted) = (0, 0);
            let mut indices = Vec::new();

            for (handle, system) in self.walk(table.first()).chain(self.walk(table.system_first())) {
                let Some(item) = self.item(handle) else {
                    return broken(format!("{component_type} list holds a stale handle"));
                };
                if item.component_type != component_type {
                    return broken(format!("{} item {} in the {component_type} list", item.component_type, item.id));
                }
                if item.is_system() != system {
                    return broken(format!("item {} is in the wrong list", item.id));
                }
                if item.id.is_nil() || self.handle_from_id(item.id) != Some(handle) {
                    return broken(format!("item {} is not reachable by id", item.id));
                }
                if item.runtime_serial_number != 0
                    && self.handle_from_serial(item.runtime_serial_number) != Some(handle)
                {
                    return broken(format!("item {} is not reachable by serial number", item.id));
                }
                if item.is_active() && item.name_fingerprint.is_valid_and_not_empty() {
                    let reachable = self
                        .name_table_for(item)
                        .and_then(|which| self.find_in_name_table(which, component_type, &item.name_fingerprint))
                        .is_some();
                    if !reachable {
                        return broken(format!("item {} is not reachable by name", item.id));
                    }
                }
                match (system, item.is_deleted(), component_type.index_required(), item.index) {
                    (true, true, ..) => return broken(format!("system item {} is deleted", item.id)),
                    (true, false, true, Some(i)) if i < 0 => {}
                    (true, false, false, None) => {}
                    (true, ..) => return broken(format!("system item {} has a bad index", item.id)),
                    (false, _, true, Some(i)) if table.entry_at(i) == Some(handle) => indices.push(i),
                    (false, _, false, None) => {}
                    (false, ..) => return broken(format!("item {} has a bad index", item.id)),
                }
                if !system {
                    if item.is_deleted() {
                        deleted += 1;
                    } else {
                        active += 1;
                    }
                }
                listed += 1;
            }

            if active != table.active_count() || deleted != table.deleted_count() {
                return broken(format!("{component_type} counts disagree with its list"));
            }
            indices.sort_unstable();
            if indices.windows(2).any(|w| w[0] == w[1]) {
                return broken(format!("{component_type} index used twice"));
            }
            if self.traits.unique_name_required(component_type) {
                let mut names: Vec<NameFingerprint> = self
                    .items(component_type)
                    .filter(|item| item.is_active() && item.name_fingerprint.is_valid_and_not_empty())
                    .map(|item| item.name_fingerprint)
                    .collect();
                names.sort_unstable();
                if names.windows(2).any(|w| w[0] == w[1]) {
                    return broken(format!("{component_type} name used twice"));
                }
            }
        }

        if listed != self.entries.len() || self.by_id.len() != self.entries.len() {
            return broken(format!(
                "{} items listed, {} by id, {} stored",
                listed,
                self.by_id.len(),
                self.entries.len()
            ));
        }
        Ok(())
    }

    fn table(&self, component_type: ComponentType) -> Option<&TypeTable> {
        self.tables.get(component_type.slot()?)
    }

    fn table_mut(&mut self, component_type: ComponentType) -> Option<&mut TypeTable> {
        self.tables.get_mut(component_type.slot()?)
    }

    fn item(&self, handle: EntryHandle) -> Option<&ManifestItem> {
        self.entries.get(handle).map(|e| &e.item)
    }

    fn update(&mut self, handle: EntryHandle, change: impl FnOnce(&mut ManifestItem)) -> Result<ManifestItem> {
        let entry = self
            .entries
            .get_mut(handle)
            .ok_or_else(|| RegistryError::InvariantViolation(format!("stale entry {handle:?}")))?;
        change(&mut entry.item);
        Ok(entry.item)
    }

    /// Handles of a list with their system flag
    fn walk(&self, first: Option<EntryHandle>) -> impl Iterator<Item = (EntryHandle, bool)> + '_ {
        std::iter::successors(first, |&h| self.entries.get(h).and_then(Entry::next))
            .map(|h| (h, self.item(h).is_some_and(ManifestItem::is_system)))
    }

    fn handle_from_id(&self, id: Uuid) -> Option<EntryHandle> {
        if id.is_nil() {
            return None;
        }
        self.by_id
            .find_first(id_hash(id), |&h| self.item(h).is_some_and(|i| i.id == id))
            .copied()
    }

    fn handle_from_serial(&self, serial_number: u64) -> Option<EntryHandle> {
        if serial_number == 0 {
            return None;
        }
        self.by_serial
            .find_first(serial_hash(serial_number), |&h| {
                self.item(h).is_some_and(|i| i.runtime_serial_number == serial_number)
            })
            .copied()
    }

    /// Rescope a fingerprint the way the type's uniqueness rule requires
    fn scoped_fingerprint(&self, component_type: ComponentType, fingerprint: &NameFingerprint) -> NameFingerprint {
        if fingerprint.is_file_path_hash() || self.traits.unique_name_includes_parent(component_type) {
            *fingerprint
        } else {
            fingerprint.with_parent_id(Uuid::nil())
        }
    }

    fn name_table_for(&self, item: &ManifestItem) -> Option<NameTable> {
        if !item.name_fingerprint.is_valid_and_not_empty() || item.is_deleted() {
            None
        } else if item.is_system() {
            Some(NameTable::System)
        } else if self.traits.unique_name_required(item.component_type) {
            Some(NameTable::Unique)
        } else {
            Some(NameTable::Shared)
        }
    }

    fn name_table(&self, which: NameTable) -> &BucketTable<EntryHandle> {
        match which {
            NameTable::Unique => &self.by_unique_name,
            NameTable::Shared => &self.by_name,
            NameTable::System => &self.by_system_name,
        }
    }

    fn name_table_mut(&mut self, which: NameTable) -> &mut BucketTable<EntryHandle> {
        match which {
            NameTable::Unique => &mut self.by_unique_name,
            NameTable::Shared => &mut self.by_name,
            NameTable::System => &mut self.by_system_name,
        }
    }

    fn find_in_name_table(
        &self,
        which: NameTable,
        component_type: ComponentType,
        fingerprint: &NameFingerprint,
    ) -> Option<EntryHandle> {
        self.name_table(which)
            .find_first(fingerprint.table_hash(), |&h| {
                self.item(h).is_some_and(|i| {
                    i.component_type == component_type && i.is_active() && i.name_fingerprint == *fingerprint
                })
            })
            .copied()
    }

    /// Active non-system item of the type carrying the name
    fn handle_from_name(&self, component_type: ComponentType, fingerprint: &NameFingerprint) -> Option<EntryHandle> {
        if !fingerprint.is_valid_and_not_empty() || !component_type.is_storable() {
            return None;
        }
        let which = if self.traits.unique_name_required(component_type) {
            NameTable::Unique
        } else {
            NameTable::Shared
        };
        let scoped = self.scoped_fingerprint(component_type, fingerprint);
        trace!(%component_type, fingerprint = %scoped, "name lookup");
        self.find_in_name_table(which, component_type, &scoped)
    }

    fn handle_from_system_name(
        &self,
        component_type: ComponentType,
        fingerprint: &NameFingerprint,
    ) -> Option<EntryHandle> {
        if !fingerprint.is_valid_and_not_empty() || !component_type.is_storable() {
            return None;
        }
        // built-in names are never parent scoped
        let scoped = if fingerprint.is_file_path_hash() {
            *fingerprint
        } else {
            fingerprint.with_parent_id(Uuid::nil())
        };
        self.find_in_name_table(NameTable::System, component_type, &scoped)
    }

    /// Name a new or undeleted item should receive from display text
    fn acquire_name(
        &self,
        component_type: ComponentType,
        parent_id: Uuid,
        text: &str,
        resolve_collisions: bool,
    ) -> Result<(NameFingerprint, Option<String>, bool)> {
        let fp = self.traits.name_fingerprint(component_type, parent_id, text);
        if fp.is_empty_name_hash() {
            return Ok((fp, None, false));
        }
        let collides = fp.is_invalid_name_hash()
            || (self.traits.unique_name_required(component_type) && !self.name_is_available(component_type, &fp))
            || self.handle_from_system_name(component_type, &fp).is_some();
        if !collides {
            return Ok((fp, Some(text.to_string()), false));
        }
        if !resolve_collisions {
            return Err(if fp.is_invalid_name_hash() {
                RegistryError::InvalidName(text.to_string())
            } else {
                RegistryError::NameInUse {
                    component_type,
                    name: text.to_string(),
                }
            });
        }
        let name = self.unused_name(component_type, parent_id, Some(text), None)?;
        let fp = self.traits.name_fingerprint(component_type, parent_id, &name);
        Ok((fp, Some(name), true))
    }

    /// Name a new item should receive from a precomputed fingerprint
    fn acquire_name_hash(
        &self,
        component_type: ComponentType,
        parent_id: Uuid,
        fingerprint: &NameFingerprint,
        resolve_collisions: bool,
    ) -> Result<(NameFingerprint, Option<String>, bool)> {
        if fingerprint.is_unset() || fingerprint.is_empty_name_hash() {
            return Ok((NameFingerprint::EMPTY, None, false));
        }
        let fp = self.scoped_fingerprint(component_type, fingerprint);
        let invalid = fp.is_invalid_name_hash();
        let collides = invalid
            || (self.traits.unique_name_required(component_type) && self.name_in_use(component_type, &fp, false))
            || self.handle_from_system_name(component_type, &fp).is_some();
        if !collides {
            return Ok((fp, None, false));
        }
        if !resolve_collisions {
            return Err(if invalid {
                RegistryError::InvalidName(fingerprint.to_string())
            } else {
                RegistryError::NameInUse {
                    component_type,
                    name: fingerprint.to_string(),
                }
            });
        }
        let name = self.unused_name(component_type, parent_id, None, None)?;
        let fp = self.traits.name_fingerprint(component_type, parent_id, &name);
        Ok((fp, Some(name), true))
    }

    /// Handle of an item that may be renamed
    fn mutable_handle(&self, id: Uuid) -> Result<EntryHandle> {
        let handle = self
            .handle_from_id(id)
            .ok_or_else(|| RegistryError::not_found(format!("id {id}")))?;
        if self.item(handle).is_some_and(ManifestItem::is_system) {
            return Err(violation(RegistryError::SystemComponentImmutable { id }));
        }
        Ok(handle)
    }

    fn rename_handle(&mut self, handle: EntryHandle, fp: NameFingerprint, shown: &str) -> Result<ManifestItem> {
        let old = self
            .item(handle)
            .copied()
            .ok_or_else(|| RegistryError::InvariantViolation(format!("stale entry {handle:?}")))?;
        if old.name_fingerprint == fp {
            return Ok(old);
        }
        let component_type = old.component_type;
        if old.is_active() && fp.is_valid_and_not_empty() {
            let taken = (self.traits.unique_name_required(component_type)
                && self.handle_from_name(component_type, &fp).is_some_and(|h| h != handle))
                || self.handle_from_system_name(component_type, &fp).is_some();
            if taken {
                return Err(RegistryError::NameInUse {
                    component_type,
                    name: shown.to_string(),
                });
            }
        }

        self.unlink_name(handle, &old);
        let item = self.update(handle, |item| item.name_fingerprint = fp)?;
        self.link_name(handle, &item);
        self.content_version += 1;

        debug!(%component_type, id = %item.id, "component renamed");
        Ok(item)
    }

    fn delete_handle(&mut self, handle: EntryHandle) -> Result<ManifestItem> {
        let old = self
            .item(handle)
            .copied()
            .ok_or_else(|| RegistryError::InvariantViolation(format!("stale entry {handle:?}")))?;
        if old.is_system() {
            return Err(violation(RegistryError::SystemComponentImmutable { id: old.id }));
        }
        if old.is_deleted() {
            return Ok(old);
        }
        self.unlink_name(handle, &old);
        let item = self.update(handle, |item| item.status.deleted = true)?;
        if let Some(table) = self.table_mut(old.component_type) {
            table.mark_deleted(true);
        }
        self.content_version += 1;

        debug!(component_type = %old.component_type, id = %old.id, index = ?old.index, "component deleted");
        Ok(item)
    }

    fn remove_handle(&mut self, handle: EntryHandle) -> bool {
        let Some(item) = self.item(handle).copied() else {
            warn!(?handle, "stale registry handle");
            return false;
        };
        if item.is_system() {
            violation(RegistryError::SystemComponentImmutable { id: item.id });
            return false;
        }
        self.unlink(handle, &item);
        if let Some(slot) = item.component_type.slot() {
            self.tables[slot].unlink(&mut self.entries, handle);
        }
        self.entries.remove(handle);
        self.content_version += 1;

        debug!(component_type = %item.component_type, id = %item.id, index = ?item.index, "component removed");
        true
    }

    /// Enter an item into the id, serial and name tables
    fn link(&mut self, handle: EntryHandle, item: &ManifestItem) {
        self.by_id.insert(id_hash(item.id), handle);
        if item.runtime_serial_number != 0 {
            self.by_serial.insert(serial_hash(item.runtime_serial_number), handle);
        }
        self.link_name(handle, item);
    }

    fn unlink(&mut self, handle: EntryHandle, item: &ManifestItem) {
        self.by_id.remove(id_hash(item.id), |&h| h == handle);
        self.unlink_serial(handle, item.runtime_serial_number);
        self.unlink_name(handle, item);
    }

    fn unlink_serial(&mut self, handle: EntryHandle, serial_number: u64) {
        if serial_number != 0 {
            self.by_serial.remove(serial_hash(serial_number), |&h| h == handle);
        }
    }

    fn link_name(&mut self, handle: EntryHandle, item: &ManifestItem) {
        if let Some(which) = self.name_table_for(item) {
            let hash = item.name_fingerprint.table_hash();
            self.name_table_mut(which).insert(hash, handle);
        }
    }

    fn unlink_name(&mut self, handle: EntryHandle, item: &ManifestItem) {
        if let Some(which) = self.name_table_for(item) {
            let hash = item.name_fingerprint.table_hash();
            self.name_table_mut(which).remove(hash, |&h| h == handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layer(name: &str) -> NewComponent {
        NewComponent::new(ComponentType::Layer).with_name(name)
    }

    #[test]
    fn add_assigns_dense_indices() {
        let mut registry = ComponentRegistry::new();
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            let added = registry.add_component(layer(name), false).unwrap();
            assert_eq!(added.item.index(), i32::try_from(i).ok());
        }
        assert_eq!(registry.component_index_limit(ComponentType::Layer), 3);
        assert_eq!(registry.content_version(), 3);
        registry.validate().unwrap();
    }

    #[test]
    fn unindexed_types_have_no_index() {
        let mut registry = ComponentRegistry::new();
        let added = registry
            .add_component(NewComponent::new(ComponentType::ModelGeometry), false)
            .unwrap();
        assert_eq!(added.item.index(), None);
        assert!(added.id_changed);
        assert!(!added.item.id().is_nil());
    }

    #[test]
    fn unstorable_type_is_a_contract_violation() {
        let mut registry = ComponentRegistry::new();
        let err = registry
            .add_component(NewComponent::new(ComponentType::Mixed), true)
            .unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn id_collision() {
        let mut registry = ComponentRegistry::new();
        let id = Uuid::from_u128(5);
        registry.add_component(layer("A").with_id(id), false).unwrap();

        let err = registry.add_component(layer("B").with_id(id), false).unwrap_err();
        assert_eq!(err, RegistryError::IdInUse(id));

        let added = registry.add_component(layer("B").with_id(id), true).unwrap();
        assert!(added.id_changed);
        assert_ne!(added.item.id(), id);
    }

    #[test]
    fn invalid_name_resolution() {
        let mut registry = ComponentRegistry::new();
        let err = registry.add_component(layer("(bad)"), false).unwrap_err();
        assert_eq!(err, RegistryError::InvalidName("(bad)".into()));

        let added = registry.add_component(layer("(bad)"), true).unwrap();
        assert!(added.name_changed);
        assert_eq!(added.assigned_name.as_deref(), Some("Layer 01"));
    }

    #[test]
    fn non_unique_types_share_names() {
        let mut registry = ComponentRegistry::new();
        let geometry = NewComponent::new(ComponentType::ModelGeometry).with_name("Bolt");
        registry.add_component(geometry.clone(), false).unwrap();
        let second = registry.add_component(geometry, false).unwrap();
        assert!(!second.name_changed);

        let fp = NameFingerprint::create(Uuid::nil(), "bolt");
        assert!(registry.name_in_use(ComponentType::ModelGeometry, &fp, false));
        registry.validate().unwrap();
    }

    #[test]
    fn layer_names_are_parent_scoped() {
        let mut registry = ComponentRegistry::new();
        let (p1, p2) = (Uuid::from_u128(1), Uuid::from_u128(2));
        registry.add_component(layer("Doors").with_parent_id(p1), false).unwrap();
        registry.add_component(layer("Doors").with_parent_id(p2), false).unwrap();

        let fp = NameFingerprint::create(Uuid::from_u128(3), "Doors");
        assert!(!registry.name_in_use(ComponentType::Layer, &fp, false));
        assert!(registry.name_in_use(ComponentType::Layer, &fp, true));
    }

    #[test]
    fn material_names_ignore_parent() {
        let mut registry = ComponentRegistry::new();
        let material = NewComponent::new(ComponentType::Material).with_name("Steel");
        registry
            .add_component(material.clone().with_parent_id(Uuid::from_u128(1)), false)
            .unwrap();
        let err = registry
            .add_component(material.with_parent_id(Uuid::from_u128(2)), false)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NameInUse { .. }));
    }

    #[test]
    fn add_by_name_hash() {
        let mut registry = ComponentRegistry::new();
        let fp = NameFingerprint::create(Uuid::nil(), "Dashed");
        let added = registry
            .add_component(
                NewComponent::new(ComponentType::LinePattern).with_name_hash(fp),
                false,
            )
            .unwrap();
        assert_eq!(added.assigned_name, None);
        assert_eq!(registry.item_from_name_hash(ComponentType::LinePattern, &fp), Some(&added.item));

        let again = registry
            .add_component(
                NewComponent::new(ComponentType::LinePattern).with_name_hash(fp),
                true,
            )
            .unwrap();
        assert!(again.name_changed);
        assert_eq!(again.assigned_name.as_deref(), Some("Line Pattern 01"));
    }

    #[test]
    fn serial_numbers() {
        let mut registry = ComponentRegistry::new();
        let added = registry.add_component(layer("A").with_runtime_serial_number(7), false).unwrap();
        assert_eq!(registry.item_from_runtime_serial_number(7), Some(&added.item));
        assert_eq!(registry.item_from_runtime_serial_number(0), None);

        let err = registry
            .add_component(layer("B").with_runtime_serial_number(7), true)
            .unwrap_err();
        assert_eq!(err, RegistryError::SerialNumberInUse(7));

        let id = added.item.id();
        let changed = registry.change_component_runtime_serial_number(id, 9).unwrap();
        assert_eq!(changed.runtime_serial_number(), 9);
        assert_eq!(registry.item_from_runtime_serial_number(7), None);
        assert_eq!(registry.item_from_runtime_serial_number(9).map(ManifestItem::id), Some(id));
    }

    #[test]
    fn delete_releases_name_and_keeps_index() {
        let mut registry = ComponentRegistry::new();
        let added = registry.add_component(layer("Base"), false).unwrap();
        let deleted = registry.delete_component(added.item.id()).unwrap();

        assert!(deleted.is_deleted());
        assert_eq!(deleted.index(), Some(0));
        assert_eq!(registry.item_from_index(ComponentType::Layer, 0), Some(&deleted));
        let fp = NameFingerprint::create(Uuid::nil(), "Base");
        assert!(!registry.name_in_use(ComponentType::Layer, &fp, false));
        assert_eq!(registry.active_component_count(ComponentType::Layer), 0);
        assert_eq!(registry.deleted_component_count(ComponentType::Layer), 1);
        registry.validate().unwrap();
    }

    #[test]
    fn undelete_restores_previous_name() {
        let mut registry = ComponentRegistry::new();
        let added = registry.add_component(layer("Base"), false).unwrap();
        let id = added.item.id();
        registry.delete_component(id).unwrap();

        let (item, assigned) = registry.undelete_component(id, Uuid::nil(), "").unwrap();
        assert_eq!(item, added.item);
        assert_eq!(assigned, None);
        registry.validate().unwrap();
    }

    #[test]
    fn undelete_after_name_reuse_synthesizes() {
        let mut registry = ComponentRegistry::new();
        let id = registry.add_component(layer("Base"), false).unwrap().item.id();
        registry.delete_component(id).unwrap();
        registry.add_component(layer("Base"), false).unwrap();

        let (item, assigned) = registry.undelete_component(id, Uuid::nil(), "Base").unwrap();
        assert!(item.is_active());
        assert_eq!(assigned.as_deref(), Some("Base 01"));
        registry.validate().unwrap();
    }

    #[test]
    fn undelete_active_item_fails() {
        let mut registry = ComponentRegistry::new();
        let id = registry.add_component(layer("Base"), false).unwrap().item.id();
        let err = registry.undelete_component(id, Uuid::nil(), "").unwrap_err();
        assert_eq!(err, RegistryError::NotDeleted { id });
    }

    #[test]
    fn undelete_with_new_serial_number() {
        let mut registry = ComponentRegistry::new();
        let id = registry
            .add_component(layer("Base").with_runtime_serial_number(3), false)
            .unwrap()
            .item
            .id();
        registry.delete_component(id).unwrap();

        let (item, _) = registry
            .undelete_component_and_change_runtime_serial_number(id, Uuid::nil(), "Base", 30)
            .unwrap();
        assert!(item.is_active());
        assert_eq!(item.runtime_serial_number(), 30);
    }

    #[test]
    fn rename() {
        let mut registry = ComponentRegistry::new();
        let a = registry.add_component(layer("A"), false).unwrap().item.id();
        registry.add_component(layer("B"), false).unwrap();

        let err = registry.change_component_name(a, Uuid::nil(), "b").unwrap_err();
        assert!(matches!(err, RegistryError::NameInUse { .. }));

        let renamed = registry.change_component_name(a, Uuid::nil(), "C").unwrap();
        assert_eq!(renamed.name_fingerprint(), &NameFingerprint::create(Uuid::nil(), "C"));
        assert!(registry.name_is_available(ComponentType::Layer, &NameFingerprint::create(Uuid::nil(), "A")));
        registry.validate().unwrap();
    }

    #[test]
    fn rename_by_hash() {
        let mut registry = ComponentRegistry::new();
        let id = registry
            .add_component(NewComponent::new(ComponentType::Group).with_name("G"), false)
            .unwrap()
            .item
            .id();
        let fp = NameFingerprint::create(Uuid::from_u128(8), "H");
        let renamed = registry.change_component_name_hash(id, &fp).unwrap();
        assert_eq!(renamed.name_fingerprint().parent_id(), Uuid::nil());
        assert!(registry.item_from_name_hash(ComponentType::Group, &fp).is_some());
    }

    #[test]
    fn system_components() {
        let mut registry = ComponentRegistry::new();
        let continuous = SystemComponent::new(ComponentType::LinePattern, Uuid::from_u128(100))
            .with_index(-1)
            .with_name("Continuous");
        let item = registry.add_system_component(continuous).unwrap();
        assert!(item.is_system());
        assert_eq!(registry.item_from_index(ComponentType::LinePattern, -1), Some(&item));

        let fp = NameFingerprint::create(Uuid::nil(), "continuous");
        assert_eq!(registry.system_item_from_name_hash(ComponentType::LinePattern, &fp), Some(&item));
        assert!(registry.name_in_use(ComponentType::LinePattern, &fp, false));

        let err = registry.delete_component(item.id()).unwrap_err();
        assert!(err.is_contract_violation());
        assert!(!registry.remove_component(item.id()));

        let added = registry
            .add_component(NewComponent::new(ComponentType::LinePattern).with_name("Continuous"), true)
            .unwrap();
        assert_eq!(added.assigned_name.as_deref(), Some("Continuous 01"));
        registry.validate().unwrap();
    }

    #[test]
    fn bad_system_components() {
        let mut registry = ComponentRegistry::new();
        let no_index = SystemComponent::new(ComponentType::Layer, Uuid::from_u128(1));
        assert!(registry.add_system_component(no_index).is_err());

        let positive = SystemComponent::new(ComponentType::Layer, Uuid::from_u128(1)).with_index(0);
        assert!(registry.add_system_component(positive).is_err());

        let named_light = SystemComponent::new(ComponentType::RenderLight, Uuid::from_u128(1))
            .with_index(-1)
            .with_name("Sun");
        assert!(registry.add_system_component(named_light).is_err());

        let nil = SystemComponent::new(ComponentType::ModelGeometry, Uuid::nil());
        let err = registry.add_system_component(nil).unwrap_err();
        assert_eq!(err, RegistryError::NilId);
        assert!(err.is_contract_violation());
        assert!(registry.is_empty());

        let first = SystemComponent::new(ComponentType::ModelGeometry, Uuid::from_u128(5));
        registry.add_system_component(first.clone()).unwrap();
        assert_eq!(
            registry.add_system_component(first),
            Err(RegistryError::IdInUse(Uuid::from_u128(5)))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn hard_removal_does_not_reuse_indices() {
        let mut registry = ComponentRegistry::new();
        let a = registry.add_component(layer("A"), false).unwrap().item;
        assert!(registry.remove_indexed_component(ComponentType::Layer, 0));
        assert!(registry.item_from_id(a.id()).is_none());

        let b = registry.add_component(layer("A"), false).unwrap().item;
        assert_eq!(b.index(), Some(1));
        registry.validate().unwrap();
    }

    #[test]
    fn remove_all_components_resets_indices() {
        let mut registry = ComponentRegistry::new();
        for name in ["A", "B"] {
            registry.add_component(layer(name), false).unwrap();
        }
        registry
            .add_system_component(SystemComponent::new(ComponentType::Layer, Uuid::from_u128(9)).with_index(-1))
            .unwrap();

        assert_eq!(registry.remove_all_components(ComponentType::Layer, true), 2);
        assert_eq!(registry.total_component_count(ComponentType::Layer), 1);
        let c = registry.add_component(layer("C"), false).unwrap().item;
        assert_eq!(c.index(), Some(0));
        registry.validate().unwrap();
    }

    #[test]
    fn reset_clears_everything() {
        let mut registry = ComponentRegistry::new();
        registry.add_component(layer("A"), false).unwrap();
        let before = registry.content_version();
        registry.reset();

        assert!(registry.is_empty());
        assert!(registry.content_version() > before);
        assert_eq!(registry.component_index_limit(ComponentType::Layer), 0);
    }

    #[test]
    fn iteration_in_insertion_order() {
        let mut registry = ComponentRegistry::new();
        let ids: Vec<Uuid> = ["A", "B", "C"]
            .iter()
            .map(|n| registry.add_component(layer(n), false).unwrap().item.id())
            .collect();
        registry.delete_component(ids[1]).unwrap();

        let listed: Vec<Uuid> = registry.items(ComponentType::Layer).map(ManifestItem::id).collect();
        assert_eq!(listed, ids);
        assert_eq!(registry.first_item(ComponentType::Layer).map(ManifestItem::id), Some(ids[0]));
        assert_eq!(registry.last_item(ComponentType::Layer).map(ManifestItem::id), Some(ids[2]));
        assert_eq!(registry.next_item(ids[0]).map(ManifestItem::id), Some(ids[1]));
        assert_eq!(registry.previous_item(ids[0]), None);
        assert_eq!(registry.previous_item(ids[2]).map(ManifestItem::id), Some(ids[1]));
    }

    #[test]
    fn unused_name_keeps_available_candidate() {
        let registry = ComponentRegistry::new();
        let name = registry
            .unused_name(ComponentType::Material, Uuid::nil(), Some("Glass"), None)
            .unwrap();
        assert_eq!(name, "Glass");
    }

    #[test]
    fn unused_id() {
        let mut registry = ComponentRegistry::new();
        let id = Uuid::from_u128(1);
        assert_eq!(registry.unused_id(id), id);
        registry.add_component(layer("A").with_id(id), false).unwrap();
        assert!(!registry.id_is_available(id));
        assert_ne!(registry.unused_id(id), id);
        assert!(!registry.id_is_available(Uuid::nil()));
    }

    #[test]
    fn custom_separator() {
        let config = RegistryConfig::new().with_name_separator("_");
        let mut registry = ComponentRegistry::with_config(StandardTypeTraits, config);
        registry.add_component(layer("Base"), false).unwrap();
        let added = registry.add_component(layer("Base"), true).unwrap();
        assert_eq!(added.assigned_name.as_deref(), Some("Base_01"));
    }
}
