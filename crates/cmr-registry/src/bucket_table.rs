//! Bucket hash table over arena-allocated links
//!
//! Provides [`BucketTable`], a table keyed by caller-computed 32-bit
//! hashes. Several values may share a hash (and a bucket); lookups hand
//! back every value stored under a hash and the caller re-verifies the
//! exact key. Link nodes live in an [`Arena`] so growing the bucket array
//! only rewrites `next` fields.

use crate::arena::{Arena, Handle};

#[derive(Debug)]
struct Link<V> {
    hash: u32,
    value: V,
    next: Option<Handle<Link<V>>>,
}

type LinkHandle<V> = Handle<Link<V>>;

/// Multi-value hash table keyed by 32-bit hashes
#[derive(Debug)]
pub struct BucketTable<V> {
    buckets: Vec<Option<LinkHandle<V>>>,
    links: Arena<Link<V>>,
    max_load_factor: usize,
}

impl<V> BucketTable<V> {
    /// Default number of buckets
    pub const DEFAULT_BUCKETS: usize = 64;

    /// Default average chain length that triggers growth
    pub const DEFAULT_MAX_LOAD_FACTOR: usize = 2;

    /// Create empty table with default sizing
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_sizing(Self::DEFAULT_BUCKETS, Self::DEFAULT_MAX_LOAD_FACTOR)
    }

    /// Create empty table
    ///
    /// `buckets` is rounded up to a power of two; a zero load factor is
    /// treated as one.
    #[must_use]
    pub fn with_sizing(buckets: usize, max_load_factor: usize) -> Self {
        let count = buckets.max(1).next_power_of_two();
        Self {
            buckets: vec![None; count],
            links: Arena::new(),
            max_load_factor: max_load_factor.max(1),
        }
    }

    /// Number of stored values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Current bucket count
    #[inline]
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket_of(&self, hash: u32) -> usize {
        hash as usize & (self.buckets.len() - 1)
    }

    /// Store `value` under `hash`
    pub fn insert(&mut self, hash: u32, value: V) {
        if self.links.len() + 1 > self.buckets.len() * self.max_load_factor {
            self.grow();
        }
        let bucket = self.bucket_of(hash);
        let head = self.buckets[bucket];
        let link = self.links.insert(Link {
            hash,
            value,
            next: head,
        });
        self.buckets[bucket] = Some(link);
    }

    /// Every value stored under `hash`, most recent first
    pub fn find(&self, hash: u32) -> Candidates<'_, V> {
        Candidates {
            links: &self.links,
            hash,
            cursor: self.buckets[self.bucket_of(hash)],
        }
    }

    /// First value stored under `hash` that satisfies `predicate`
    pub fn find_first(&self, hash: u32, mut predicate: impl FnMut(&V) -> bool) -> Option<&V> {
        self.find(hash).find(|v| predicate(v))
    }

    /// Remove the first value under `hash` that satisfies `predicate`
    pub fn remove(&mut self, hash: u32, mut predicate: impl FnMut(&V) -> bool) -> Option<V> {
        let bucket = self.bucket_of(hash);
        let mut prev: Option<LinkHandle<V>> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(handle) = cursor {
            let link = self.links.get(handle)?;
            if link.hash == hash && predicate(&link.value) {
                let next = link.next;
                match prev {
                    Some(p) => {
                        if let Some(prev_link) = self.links.get_mut(p) {
                            prev_link.next = next;
                        }
                    }
                    None => self.buckets[bucket] = next,
                }
                return self.links.remove(handle).map(|link| link.value);
            }
            prev = Some(handle);
            cursor = link.next;
        }
        None
    }

    /// Remove every value
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.links.clear();
    }

    /// Every stored value in no particular order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.links.iter().map(|(_, link)| &link.value)
    }

    fn grow(&mut self) {
        let count = self.buckets.len() * 2;
        let handles: Vec<(LinkHandle<V>, u32)> =
            self.links.iter().map(|(h, link)| (h, link.hash)).collect();
        self.buckets = vec![None; count];
        for (handle, hash) in handles {
            let bucket = self.bucket_of(hash);
            let head = self.buckets[bucket];
            if let Some(link) = self.links.get_mut(handle) {
                link.next = head;
            }
            self.buckets[bucket] = Some(handle);
        }
    }
}

impl<V> Default for BucketTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the values stored under one hash
pub struct Candidates<'a, V> {
    links: &'a Arena<Link<V>>,
    hash: u32,
    cursor: Option<LinkHandle<V>>,
}

impl<'a, V> Iterator for Candidates<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.cursor {
            let link = self.links.get(handle)?;
            self.cursor = link.next;
            if link.hash == self.hash {
                return Some(&link.value);
            }
        }
        None
    }
}
