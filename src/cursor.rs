//! Bidirectional traversal over the sparse bucket array.
//!
//! A position is an explicit `(bucket, offset)` pair. `offset == None` is the
//! end-of-bucket marker; the table's end position is the end-of-bucket
//! marker of its last bucket, whether or not that bucket is empty.
//! Positions are kept normalized: `Some(i)` always addresses a live entry.
//!
//! Stepping rules:
//! - advance moves to the next entry of the bucket, else to the first entry
//!   of the next non-empty bucket, else to end. Advancing end stays at end.
//! - retreat moves to the previous entry of the bucket (from an end marker,
//!   the bucket's last entry), else to the last entry of the nearest
//!   non-empty bucket before it. On the first bucket it stays put, and a
//!   backward scan that finds only empty buckets resets to `begin`. Hence
//!   retreating from `begin` is a no-op.

use crate::bucket::{Bucket, Entry};
use core::fmt;
use core::iter::FusedIterator;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    bucket: usize,
    offset: Option<usize>,
}

impl Position {
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// Offset inside the bucket, `None` for the end-of-bucket marker.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

pub(crate) fn begin<K, V>(buckets: &[Bucket<K, V>]) -> Position {
    match buckets.iter().position(|b| !b.is_empty()) {
        Some(bucket) => Position {
            bucket,
            offset: Some(0),
        },
        None => end(buckets),
    }
}

pub(crate) fn end<K, V>(buckets: &[Bucket<K, V>]) -> Position {
    Position {
        bucket: buckets.len().saturating_sub(1),
        offset: None,
    }
}

fn entry_at<K, V>(buckets: &[Bucket<K, V>], pos: Position) -> Option<&Entry<K, V>> {
    buckets.get(pos.bucket)?.get(pos.offset?)
}

fn entry_at_mut<K, V>(buckets: &mut [Bucket<K, V>], pos: Position) -> Option<&mut Entry<K, V>> {
    buckets.get_mut(pos.bucket)?.get_mut(pos.offset?)
}

pub(crate) fn advance<K, V>(buckets: &[Bucket<K, V>], pos: Position) -> Position {
    let Some(bucket) = buckets.get(pos.bucket) else {
        return end(buckets);
    };
    if let Some(off) = pos.offset {
        if off + 1 < bucket.len() {
            return Position {
                bucket: pos.bucket,
                offset: Some(off + 1),
            };
        }
    }
    match (pos.bucket + 1..buckets.len()).find(|&b| !buckets[b].is_empty()) {
        Some(bucket) => Position {
            bucket,
            offset: Some(0),
        },
        None => end(buckets),
    }
}

pub(crate) fn retreat<K, V>(buckets: &[Bucket<K, V>], pos: Position) -> Position {
    let pos = if pos.bucket < buckets.len() {
        pos
    } else {
        end(buckets)
    };
    let len = buckets[pos.bucket].len();

    let prev = match pos.offset {
        Some(off) => off.checked_sub(1),
        None => len.checked_sub(1),
    };
    if let Some(off) = prev.filter(|&off| off < len) {
        return Position {
            bucket: pos.bucket,
            offset: Some(off),
        };
    }

    if pos.bucket == 0 {
        return Position {
            bucket: 0,
            offset: (len > 0).then_some(0),
        };
    }

    let mut b = pos.bucket - 1;
    while b != 0 && buckets[b].is_empty() {
        b -= 1;
    }
    match buckets[b].len() {
        0 => begin(buckets),
        n => Position {
            bucket: b,
            offset: Some(n - 1),
        },
    }
}

/// Shared cursor interface: an explicit position that can step in both
/// directions and be dereferenced.
pub trait Traverse {
    type Key;
    type Value;

    fn position(&self) -> Position;

    /// Entry under the cursor; `None` at an end-of-bucket marker.
    fn current(&self) -> Option<(&Self::Key, &Self::Value)>;

    fn advance(&mut self);

    /// Steps backward. A no-op on the first entry of the table.
    fn retreat(&mut self);

    fn at_end(&self) -> bool;
}

/// Read-only cursor. Borrowing the map keeps it from being mutated while
/// the cursor lives, so a cursor is never left pointing into rehashed or
/// cleared storage.
pub struct Cursor<'a, K, V> {
    buckets: &'a [Bucket<K, V>],
    pos: Position,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(buckets: &'a [Bucket<K, V>], pos: Position) -> Self {
        Self { buckets, pos }
    }

    /// Like [`Traverse::current`], but bound to the map borrow rather than
    /// the cursor.
    pub fn get(&self) -> Option<(&'a K, &'a V)> {
        entry_at(self.buckets, self.pos).map(|e| (&e.key, &e.value))
    }

    pub fn key(&self) -> Option<&'a K> {
        self.get().map(|(k, _)| k)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.get().map(|(_, v)| v)
    }
}

impl<'a, K, V> Traverse for Cursor<'a, K, V> {
    type Key = K;
    type Value = V;

    fn position(&self) -> Position {
        self.pos
    }

    fn current(&self) -> Option<(&K, &V)> {
        self.get()
    }

    fn advance(&mut self) {
        self.pos = advance(self.buckets, self.pos);
    }

    fn retreat(&mut self) {
        self.pos = retreat(self.buckets, self.pos);
    }

    fn at_end(&self) -> bool {
        self.pos == end(self.buckets)
    }
}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for Cursor<'a, K, V> {}

/// Equal iff both cursors walk the same map and sit at the same position.
impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.buckets, other.buckets) && self.pos == other.pos
    }
}

impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K, V> fmt::Debug for Cursor<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("position", &self.pos).finish()
    }
}

/// Cursor with mutable access to values. Keys stay immutable.
pub struct CursorMut<'a, K, V> {
    buckets: &'a mut [Bucket<K, V>],
    pos: Position,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(crate) fn new(buckets: &'a mut [Bucket<K, V>], pos: Position) -> Self {
        Self { buckets, pos }
    }

    pub fn current_mut(&mut self) -> Option<(&K, &mut V)> {
        entry_at_mut(self.buckets, self.pos).map(|e| (&e.key, &mut e.value))
    }

    /// Consumes the cursor, keeping the entry borrowed for the map's lifetime.
    pub fn into_current_mut(self) -> Option<(&'a K, &'a mut V)> {
        entry_at_mut(self.buckets, self.pos).map(|e| (&e.key, &mut e.value))
    }

    /// Read-only view at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(&*self.buckets, self.pos)
    }
}

impl<'a, K, V> Traverse for CursorMut<'a, K, V> {
    type Key = K;
    type Value = V;

    fn position(&self) -> Position {
        self.pos
    }

    fn current(&self) -> Option<(&K, &V)> {
        entry_at(&*self.buckets, self.pos).map(|e| (&e.key, &e.value))
    }

    fn advance(&mut self) {
        self.pos = advance(&*self.buckets, self.pos);
    }

    fn retreat(&mut self) {
        self.pos = retreat(&*self.buckets, self.pos);
    }

    fn at_end(&self) -> bool {
        self.pos == end(&*self.buckets)
    }
}

impl<'a, K, V> fmt::Debug for CursorMut<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("position", &self.pos)
            .finish()
    }
}

/// Iterator over entries in traversal order. Walking from the back uses the
/// retreat rule starting at `end`.
pub struct Iter<'a, K, V> {
    buckets: &'a [Bucket<K, V>],
    front: Position,
    back: Position,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(buckets: &'a [Bucket<K, V>], len: usize) -> Self {
        Self {
            buckets,
            front: begin(buckets),
            back: end(buckets),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let e = entry_at(self.buckets, self.front)?;
        self.front = advance(self.buckets, self.front);
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.back = retreat(self.buckets, self.back);
        let e = entry_at(self.buckets, self.back)?;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

/// Mutable iterator in the same order as [`Iter`].
pub struct IterMut<'a, K, V> {
    buckets: core::slice::IterMut<'a, Bucket<K, V>>,
    entries: core::slice::IterMut<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(buckets: &'a mut [Bucket<K, V>], len: usize) -> Self {
        Self {
            buckets: buckets.iter_mut(),
            entries: Default::default(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.entries.next() {
                self.remaining -= 1;
                return Some((&e.key, &mut e.value));
            }
            self.entries = self.buckets.next()?.iter_mut();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}
