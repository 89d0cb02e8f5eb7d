//! Bucket: one hash slot's chain of entries.

use core::borrow::Borrow;

#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // Digest computed once at insertion; rehash reuses it.
    pub(crate) hash: u64,
}

/// Entries whose digest maps to the same slot. Order inside a bucket carries
/// no meaning: inserts append, removals swap the last entry into the hole.
#[derive(Clone, Debug)]
pub(crate) struct Bucket<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> Default for Bucket<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K, V> Bucket<K, V> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offset of the entry holding `q`, comparing stored digests before keys.
    pub(crate) fn position<Q>(&self, hash: u64, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entries
            .iter()
            .position(|e| e.hash == hash && e.key.borrow() == q)
    }

    #[inline]
    pub(crate) fn get(&self, offset: usize) -> Option<&Entry<K, V>> {
        self.entries.get(offset)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, offset: usize) -> Option<&mut Entry<K, V>> {
        self.entries.get_mut(offset)
    }

    /// Appends without checking for duplicates; returns the new entry's offset.
    pub(crate) fn push(&mut self, entry: Entry<K, V>) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub(crate) fn swap_remove(&mut self, offset: usize) -> Entry<K, V> {
        self.entries.swap_remove(offset)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> core::slice::Iter<'_, Entry<K, V>> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> core::slice::IterMut<'_, Entry<K, V>> {
        self.entries.iter_mut()
    }

    /// Moves every entry out, leaving the bucket empty.
    pub(crate) fn into_entries(self) -> std::vec::IntoIter<Entry<K, V>> {
        self.entries.into_iter()
    }
}
