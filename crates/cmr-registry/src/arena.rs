//! Generation-checked record pool
//!
//! Provides [`Arena`], a pool of fixed-type records addressed by
//! [`Handle`]s. Freed slots go on a free list and are reused; every reuse
//! bumps the slot generation so a handle kept past removal no longer
//! resolves. Slots are never given back to the allocator, so a pool only
//! grows until it is dropped.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Stable address of a record in an [`Arena`]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot position
    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued
    #[inline]
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

// manual impls: derives would require `T: Clone` etc.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<u32> },
}

/// Pool of records with stable, generation-checked handles
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Arena<T> {
    /// Create empty arena
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Create arena with room for `capacity` records
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Store a record, reusing a freed slot when one exists
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` slots are requested.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.len += 1;
        let free = self.free_head.and_then(|index| match self.slots.get(index as usize) {
            Some(&Slot::Vacant {
                generation,
                next_free,
            }) => Some((index, generation, next_free)),
            _ => None,
        });
        debug_assert_eq!(free.map(|(index, ..)| index), self.free_head, "free list points at an occupied slot");
        if let Some((index, generation, next_free)) = free {
            self.slots[index as usize] = Slot::Occupied { generation, value };
            self.free_head = next_free;
            return Handle::new(index, generation);
        }
        self.free_head = None;
        let index = u32::try_from(self.slots.len()).expect("arena slot count exceeds u32");
        self.slots.push(Slot::Occupied {
            generation: 0,
            value,
        });
        Handle::new(index, 0)
    }

    /// Take a record out, invalidating every handle to it
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == handle.generation => {}
            _ => return None,
        }
        let vacant = Slot::Vacant {
            generation: handle.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let Slot::Occupied { value, .. } = std::mem::replace(slot, vacant) else {
            return None;
        };
        self.free_head = Some(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Record behind a handle, `None` when the handle is stale
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        match self.slots.get(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Mutable record behind a handle, `None` when the handle is stale
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        match self.slots.get_mut(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Check whether a handle still resolves
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if arena holds no live records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots ever allocated (live plus free)
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Free every record; slots stay allocated for reuse
    pub fn clear(&mut self) {
        let handles: Vec<Handle<T>> = self.iter().map(|(h, _)| h).collect();
        for handle in handles {
            self.remove(handle);
        }
    }

    /// Live records with their handles, in slot order
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Slot::Occupied { generation, value } => Some((Handle::new(i as u32, *generation), value)),
                Slot::Vacant { .. } => None,
            })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn removed_handle_is_stale() {
        let mut arena = Arena::new();
        let a = arena.insert(1);

        assert_eq!(arena.remove(a), Some(1));
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn freed_slot_is_reused_with_new_generation() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let b = arena.insert(2);

        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&2));
        assert_eq!(arena.slot_count(), 1);
    }

    #[test]
    fn free_list_hands_out_every_freed_slot_before_growing() {
        let mut arena = Arena::new();
        let handles: Vec<_> = (0..3).map(|i| arena.insert(i)).collect();
        arena.remove(handles[0]);
        arena.remove(handles[2]);

        let c = arena.insert(10);
        let d = arena.insert(11);
        assert_eq!(c.index(), handles[2].index());
        assert_eq!(d.index(), handles[0].index());
        assert_eq!(arena.slot_count(), 3);
        assert_eq!(arena.len(), 3);

        let e = arena.insert(12);
        assert_eq!(e.index(), 3);
        assert_eq!(arena.get(e), Some(&12));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut arena = Arena::new();
        let a = arena.insert(String::from("x"));
        arena.get_mut(a).unwrap().push('y');
        assert_eq!(arena.get(a).map(String::as_str), Some("xy"));
    }

    #[test]
    fn clear_keeps_slots_and_invalidates_handles() {
        let mut arena = Arena::with_capacity(4);
        let handles: Vec<_> = (0..4).map(|i| arena.insert(i)).collect();
        arena.clear();

        assert!(arena.is_empty());
        assert_eq!(arena.slot_count(), 4);
        assert!(handles.iter().all(|&h| !arena.contains(h)));
    }

    #[test]
    fn iter_skips_vacant_slots() {
        let mut arena = Arena::new();
        let a = arena.insert('a');
        let _b = arena.insert('b');
        arena.remove(a);

        let values: Vec<char> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!['b']);
    }
}
