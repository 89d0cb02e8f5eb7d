//! ChainedHashMap: bucket array, hash addressing and load-factor growth.

use crate::bucket::{Bucket, Entry};
use crate::config::{Config, DEFAULT_BUCKETS, DEFAULT_MAX_LOAD_FACTOR};
use crate::cursor::{self, Cursor, CursorMut, Iter, IterMut};
use crate::error::{ConfigError, GrowError};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use std::collections::hash_map::RandomState;
use std::io;

/// `(bucket, offset)` of an entry the caller needs to find again after growth.
type Slot = (usize, usize);

/// Hash map resolving collisions by chaining entries per bucket.
///
/// Grows by doubling its bucket count whenever an insert brings
/// `len / bucket_count` up to the configured maximum load factor. Lookups
/// accept any borrowed form of the key, like `std::collections::HashMap`.
#[derive(Clone)]
pub struct ChainedHashMap<K, V, S = RandomState> {
    hasher: S,
    buckets: Vec<Bucket<K, V>>, // never empty
    len: usize,
    max_load_factor: f32,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates a map with 10 buckets, a 0.8 load-factor threshold and
    /// `RandomState` hashing.
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Creates a map with `n` buckets (at least one) and default settings otherwise.
    pub fn with_buckets(n: usize) -> Self {
        Self::with_buckets_and_hasher(n, RandomState::new())
    }
}

impl<K, V, S> Default for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKETS, hasher)
    }

    pub fn with_buckets_and_hasher(n: usize, hasher: S) -> Self {
        Self::from_parts(n.max(1), DEFAULT_MAX_LOAD_FACTOR, hasher)
    }

    /// Creates a map from validated parameters.
    pub fn with_config(config: Config, hasher: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(
            config.initial_buckets,
            config.max_load_factor,
            hasher,
        ))
    }

    fn from_parts(buckets: usize, max_load_factor: f32, hasher: S) -> Self {
        let mut v = Vec::with_capacity(buckets);
        v.resize_with(buckets, Bucket::default);
        Self {
            hasher,
            buckets: v,
            len: 0,
            max_load_factor,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn locate<Q>(&self, q: &Q) -> Option<Slot>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let idx = self.bucket_index(hash);
        self.buckets[idx].position(hash, q).map(|off| (idx, off))
    }

    fn entry(&self, (b, off): Slot) -> Option<&Entry<K, V>> {
        self.buckets.get(b)?.get(off)
    }

    fn entry_mut(&mut self, (b, off): Slot) -> Option<&mut Entry<K, V>> {
        self.buckets.get_mut(b)?.get_mut(off)
    }

    /// Looks up `q`, returning the stored key and value.
    pub fn find<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.locate(q)?;
        self.entry(slot).map(|e| (&e.key, &e.value))
    }

    pub fn find_mut<Q>(&mut self, q: &Q) -> Option<(&K, &mut V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.locate(q)?;
        self.entry_mut(slot).map(|e| (&e.key, &mut e.value))
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).map(|(_, v)| v)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_mut(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q).is_some()
    }

    /// Inserts or overwrites. Returns the previous value when `key` was present.
    ///
    /// # Panics
    ///
    /// Panics if growing the bucket array fails; see [`Self::try_insert`].
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.try_insert(key, value) {
            Ok(old) => old,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`Self::insert`], but reports a failed rehash instead of panicking.
    ///
    /// On error the entry has been stored and the table is consistent; only
    /// the growth was abandoned, so the load factor is above the threshold.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, GrowError> {
        let hash = self.make_hash(&key);
        let idx = self.bucket_index(hash);
        if let Some(off) = self.buckets[idx].position(hash, &key) {
            if let Some(e) = self.buckets[idx].get_mut(off) {
                return Ok(Some(core::mem::replace(&mut e.value, value)));
            }
        }

        let off = self.buckets[idx].push(Entry { key, value, hash });
        self.len += 1;
        if let Err(e) = self.grow_to_fit((idx, off)) {
            log::warn!(
                "keeping {} buckets at {} entries: {e}",
                self.buckets.len(),
                self.len
            );
            return Err(e);
        }
        Ok(None)
    }

    /// Returns the value for `key`, inserting `default()` first if absent.
    ///
    /// `default` runs only when inserting. A rehash triggered by the insert
    /// completes before the reference is taken.
    ///
    /// # Panics
    ///
    /// Panics if growing the bucket array fails.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        let idx = self.bucket_index(hash);
        let slot = match self.buckets[idx].position(hash, &key) {
            Some(off) => (idx, off),
            None => {
                let off = self.buckets[idx].push(Entry {
                    key,
                    value: default(),
                    hash,
                });
                self.len += 1;
                match self.grow_to_fit((idx, off)) {
                    Ok(slot) => slot,
                    Err(e) => panic!("{e}"),
                }
            }
        };
        &mut self
            .entry_mut(slot)
            .expect("entry must exist at its tracked slot after insert")
            .value
    }

    /// Returns the value for `key`, inserting `V::default()` first if absent.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Removes `q`, returning its value. Absent keys are a no-op.
    /// The bucket array never shrinks.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (b, off) = self.locate(q)?;
        let e = self.buckets[b].swap_remove(off);
        self.len -= 1;
        Some((e.key, e.value))
    }

    /// Rehashes until the load factor drops below the threshold, following
    /// `tracked` to its final slot.
    fn grow_to_fit(&mut self, tracked: Slot) -> Result<Slot, GrowError> {
        let mut slot = tracked;
        while self.load_factor() >= self.max_load_factor {
            slot = self.rehash(slot)?;
        }
        Ok(slot)
    }

    /// Doubles the bucket count and moves every entry to its new bucket
    /// using the stored digest. The fresh array is allocated before the old
    /// one is consumed, so a failure leaves the table untouched.
    fn rehash(&mut self, tracked: Slot) -> Result<Slot, GrowError> {
        let old_count = self.buckets.len();
        let new_count = doubled(old_count)?;

        let mut fresh: Vec<Bucket<K, V>> = Vec::new();
        fresh
            .try_reserve_exact(new_count)
            .map_err(|source| GrowError::Alloc {
                buckets: new_count,
                source,
            })?;
        fresh.resize_with(new_count, Bucket::default);

        let old = core::mem::replace(&mut self.buckets, fresh);
        let mut relocated = tracked;
        for (b, bucket) in old.into_iter().enumerate() {
            for (off, entry) in bucket.into_entries().enumerate() {
                let idx = self.bucket_index(entry.hash);
                let new_off = self.buckets[idx].push(entry);
                if (b, off) == tracked {
                    relocated = (idx, new_off);
                }
            }
        }

        log::debug!(
            "rehashed {} entries: {} -> {} buckets",
            self.len,
            old_count,
            new_count
        );
        Ok(relocated)
    }
}

fn doubled(buckets: usize) -> Result<usize, GrowError> {
    buckets
        .checked_mul(2)
        .ok_or(GrowError::CapacityOverflow { buckets })
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// `len / bucket_count`.
    pub fn load_factor(&self) -> f32 {
        self.len as f32 / self.buckets.len() as f32
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drops every entry; the bucket count is kept.
    pub fn clear(&mut self) {
        log::trace!("clearing {} entries", self.len);
        for b in &mut self.buckets {
            b.clear();
        }
        self.len = 0;
    }

    /// Cursor on the first entry of the first non-empty bucket, or `end()`
    /// when the map is empty.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.buckets, cursor::begin(&self.buckets))
    }

    /// Cursor past the last entry: last bucket, end-of-bucket marker.
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.buckets, cursor::end(&self.buckets))
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        let pos = cursor::begin(&self.buckets);
        CursorMut::new(&mut self.buckets, pos)
    }

    pub fn end_mut(&mut self) -> CursorMut<'_, K, V> {
        let pos = cursor::end(&self.buckets);
        CursorMut::new(&mut self.buckets, pos)
    }

    /// Entries in traversal order: bucket index, then position in bucket.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.buckets, self.len)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.buckets, self.len)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    /// Prints every pair in traversal order to stdout. Diagnostic output only.
    pub fn display(&self) {
        print!("{self}");
    }

    /// Writes the same text as [`Self::display`] to `out`.
    pub fn display_to<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "{self}")
    }
}

impl<K, V, S> fmt::Display for ChainedHashMap<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in self.iter() {
            write!(f, "[{k},{v}] ")?;
        }
        Ok(())
    }
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, Q, V, S> Index<&Q> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present; use
    /// [`ChainedHashMap::get_or_default`] to insert on miss.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not present in ChainedHashMap")
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::default();
        m.extend(iter);
        m
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
