//! Per-type table index
//!
//! Each component type owns a [`TypeTable`]: an insertion-ordered doubly
//! linked list of its active and deleted entries, a separate list of its
//! system entries, and for indexed types a dense index → entry array plus
//! a negative index → entry map for built-ins. The links are handles into
//! the registry's entry arena.

use crate::arena::{Arena, Handle};
use crate::item::ManifestItem;
use std::collections::HashMap;

/// Arena record behind every registry item
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) item: ManifestItem,
    prev: Option<EntryHandle>,
    next: Option<EntryHandle>,
}

impl Entry {
    pub(crate) fn new(item: ManifestItem) -> Self {
        Self {
            item,
            prev: None,
            next: None,
        }
    }

    pub(crate) fn prev(&self) -> Option<EntryHandle> {
        self.prev
    }

    pub(crate) fn next(&self) -> Option<EntryHandle> {
        self.next
    }
}

pub(crate) type EntryHandle = Handle<Entry>;

#[derive(Debug, Default, Clone, Copy)]
struct List {
    first: Option<EntryHandle>,
    last: Option<EntryHandle>,
}

impl List {
    fn push_back(&mut self, entries: &mut Arena<Entry>, handle: EntryHandle) {
        let prev = self.last;
        if let Some(entry) = entries.get_mut(handle) {
            entry.prev = prev;
            entry.next = None;
        }
        match prev {
            Some(p) => {
                if let Some(last) = entries.get_mut(p) {
                    last.next = Some(handle);
                }
            }
            None => self.first = Some(handle),
        }
        self.last = Some(handle);
    }

    fn unlink(&mut self, entries: &mut Arena<Entry>, handle: EntryHandle) {
        let Some(entry) = entries.get_mut(handle) else {
            return;
        };
        let (prev, next) = (entry.prev.take(), entry.next.take());
        match prev {
            Some(p) => {
                if let Some(entry) = entries.get_mut(p) {
                    entry.next = next;
                }
            }
            None => self.first = next,
        }
        match next {
            Some(n) => {
                if let Some(entry) = entries.get_mut(n) {
                    entry.prev = prev;
                }
            }
            None => self.last = prev,
        }
    }
}

/// Storage index of one component type
#[derive(Debug, Default)]
pub(crate) struct TypeTable {
    items: List,
    system: List,
    by_index: Vec<Option<EntryHandle>>,
    by_system_index: HashMap<i32, EntryHandle>,
    active: usize,
    deleted: usize,
    system_count: usize,
}

impl TypeTable {
    /// Append an active or deleted entry
    pub(crate) fn push(&mut self, entries: &mut Arena<Entry>, handle: EntryHandle) {
        let deleted = entries.get(handle).is_some_and(|e| e.item.is_deleted());
        self.items.push_back(entries, handle);
        if deleted {
            self.deleted += 1;
        } else {
            self.active += 1;
        }
    }

    /// Append a system entry
    pub(crate) fn push_system(&mut self, entries: &mut Arena<Entry>, handle: EntryHandle) {
        if let Some(index) = entries.get(handle).and_then(|e| e.item.index) {
            self.by_system_index.insert(index, handle);
        }
        self.system.push_back(entries, handle);
        self.system_count += 1;
    }

    /// Detach an entry from whichever list holds it and release its index
    pub(crate) fn unlink(&mut self, entries: &mut Arena<Entry>, handle: EntryHandle) {
        let Some(item) = entries.get(handle).map(|e| e.item) else {
            return;
        };
        if item.is_system() {
            if let Some(index) = item.index {
                if self.by_system_index.get(&index) == Some(&handle) {
                    self.by_system_index.remove(&index);
                }
            }
            self.system.unlink(entries, handle);
            self.system_count -= 1;
            return;
        }
        self.items.unlink(entries, handle);
        if item.is_deleted() {
            self.deleted -= 1;
        } else {
            self.active -= 1;
        }
        if let Some(slot) = item
            .index
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.by_index.get_mut(i))
        {
            if *slot == Some(handle) {
                *slot = None;
            }
        }
    }

    /// Record that an entry flipped between active and deleted
    pub(crate) fn mark_deleted(&mut self, deleted: bool) {
        if deleted {
            self.active -= 1;
            self.deleted += 1;
        } else {
            self.deleted -= 1;
            self.active += 1;
        }
    }

    /// Index the next indexed entry will receive
    pub(crate) fn next_index(&self) -> Option<i32> {
        i32::try_from(self.by_index.len()).ok()
    }

    /// Bind the next index to `handle`
    pub(crate) fn assign_index(&mut self, handle: EntryHandle) {
        self.by_index.push(Some(handle));
    }

    /// Entry holding a non-negative index
    pub(crate) fn entry_at(&self, index: i32) -> Option<EntryHandle> {
        let i = usize::try_from(index).ok()?;
        self.by_index.get(i).copied().flatten()
    }

    /// System entry holding a negative index
    pub(crate) fn system_entry_at(&self, index: i32) -> Option<EntryHandle> {
        self.by_system_index.get(&index).copied()
    }

    /// Forget every index; only valid once no indexed entry remains
    pub(crate) fn reset_indices(&mut self) {
        debug_assert_eq!(self.active + self.deleted, 0);
        self.by_index.clear();
    }

    pub(crate) fn first(&self) -> Option<EntryHandle> {
        self.items.first
    }

    pub(crate) fn last(&self) -> Option<EntryHandle> {
        self.items.last
    }

    pub(crate) fn system_first(&self) -> Option<EntryHandle> {
        self.system.first
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active
    }

    pub(crate) fn deleted_count(&self) -> usize {
        self.deleted
    }

    pub(crate) fn system_count(&self) -> usize {
        self.system_count
    }

    /// Length of the index array (removed slots included)
    pub(crate) fn index_limit(&self) -> usize {
        self.by_index.len()
    }
}

/// Iterator over one list of a type table
///
/// The registry is borrowed for the iterator's lifetime, so it cannot be
/// mutated mid-walk.
pub struct Items<'a> {
    entries: &'a Arena<Entry>,
    cursor: Option<EntryHandle>,
}

impl<'a> Items<'a> {
    pub(crate) fn new(entries: &'a Arena<Entry>, first: Option<EntryHandle>) -> Self {
        Self {
            entries,
            cursor: first,
        }
    }
}

impl<'a> Iterator for Items<'a> {
    type Item = &'a ManifestItem;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.cursor?)?;
        self.cursor = entry.next;
        Some(&entry.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_type::ComponentType;
    use uuid::Uuid;

    fn entry(n: u128) -> Entry {
        let mut item = ManifestItem::UNSET;
        item.component_type = ComponentType::Group;
        item.id = Uuid::from_u128(n);
        Entry::new(item)
    }

    fn ids(entries: &Arena<Entry>, table: &TypeTable) -> Vec<u128> {
        Items::new(entries, table.first())
            .map(|item| item.id.as_u128())
            .collect()
    }

    #[test]
    fn push_keeps_insertion_order() {
        let mut entries = Arena::new();
        let mut table = TypeTable::default();
        for n in 1..=3 {
            let h = entries.insert(entry(n));
            table.push(&mut entries, h);
        }

        assert_eq!(ids(&entries, &table), vec![1, 2, 3]);
        assert_eq!(table.active_count(), 3);
    }

    #[test]
    fn unlink_middle_first_and_last() {
        let mut entries = Arena::new();
        let mut table = TypeTable::default();
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let h = entries.insert(entry(n));
                table.push(&mut entries, h);
                h
            })
            .collect();

        table.unlink(&mut entries, handles[1]);
        assert_eq!(ids(&entries, &table), vec![1, 3, 4]);
        table.unlink(&mut entries, handles[0]);
        table.unlink(&mut entries, handles[3]);
        assert_eq!(ids(&entries, &table), vec![3]);
        assert_eq!(table.first(), table.last());
        assert_eq!(table.active_count(), 1);
    }

    #[test]
    fn indices_are_not_reused_after_unlink() {
        let mut entries = Arena::new();
        let mut table = TypeTable::default();
        let mut first = entry(1);
        first.item.index = table.next_index();
        let h0 = entries.insert(first);
        table.assign_index(h0);
        table.push(&mut entries, h0);

        table.unlink(&mut entries, h0);
        assert_eq!(table.entry_at(0), None);
        assert_eq!(table.next_index(), Some(1));

        table.reset_indices();
        assert_eq!(table.next_index(), Some(0));
    }

    #[test]
    fn system_entries_live_in_their_own_list() {
        let mut entries = Arena::new();
        let mut table = TypeTable::default();
        let mut sys = entry(9);
        sys.item.status.system = true;
        sys.item.index = Some(-3);
        let h = entries.insert(sys);
        table.push_system(&mut entries, h);

        assert!(table.first().is_none());
        assert_eq!(table.system_first(), Some(h));
        assert_eq!(table.system_count(), 1);
        assert_eq!(table.system_entry_at(-3), Some(h));
        assert_eq!(table.system_entry_at(-1), None);
        assert_eq!(table.entry_at(-3), None);

        table.unlink(&mut entries, h);
        assert_eq!(table.system_count(), 0);
        assert!(table.system_first().is_none());
        assert_eq!(table.system_entry_at(-3), None);
    }
}
