//! Cumulative shift tables mapping one genome's native coordinates of one
//! chromosome to meta-genome coordinates and back.
use serde::{Deserialize, Serialize};

use metagen_core::search::{SearchKey, insertion_point};

///
/// From `native` on, a native position `p` sits at `p + delta` in the
/// meta-genome, until the next entry.
///
/// Deltas are cumulative: a translation is one search and one addition.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftEntry {
    pub native: u32,
    pub delta: u32,
}

impl ShiftEntry {
    pub fn new(native: u32, delta: u32) -> Self {
        ShiftEntry { native, delta }
    }

    /// Meta-genome position of the entry's native position.
    #[inline]
    pub fn meta(&self) -> u32 {
        self.native + self.delta
    }
}

/// Result of a meta to native translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativePosition {
    /// The meta position maps to this native base.
    Exact(u32),
    /// The meta position lies in a gap of the genome (an insertion of another
    /// genome, or a deletion of this one). `snapped` is the first native base
    /// after the gap.
    Gap { snapped: u32 },
}

impl NativePosition {
    /// The exact position, or the snapped one for a gap.
    pub fn position(&self) -> u32 {
        match *self {
            NativePosition::Exact(position) => position,
            NativePosition::Gap { snapped } => snapped,
        }
    }

    pub fn exact(&self) -> Option<u32> {
        match *self {
            NativePosition::Exact(position) => Some(position),
            NativePosition::Gap { .. } => None,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, NativePosition::Gap { .. })
    }
}

///
/// Ordered shift entries of one genome on one chromosome.
///
/// Invariants: natives are strictly increasing and so are metas. Positions
/// before the first entry map unchanged.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTable {
    entries: Vec<ShiftEntry>,
}

impl ShiftTable {
    /// Identity table.
    pub fn new() -> Self {
        ShiftTable::default()
    }

    pub(crate) fn from_entries(entries: Vec<ShiftEntry>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].native < w[1].native && w[0].meta() < w[1].meta()));
        ShiftTable { entries }
    }

    pub fn entries(&self) -> &[ShiftEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the last entry whose key is at or before `position`.
    fn entry_before<F>(&self, position: u32, key: F) -> Option<usize>
    where
        F: Fn(&ShiftEntry) -> u32,
    {
        let index = insertion_point(self.entries.len(), position, SearchKey::Start, |i| {
            let value = key(&self.entries[i]);
            (value, value + 1)
        })?;
        match key(&self.entries[index]) <= position {
            true => Some(index),
            false => index.checked_sub(1),
        }
    }

    pub fn to_meta(&self, native: u32) -> u32 {
        match self.entry_before(native, |e| e.native) {
            Some(index) => native + self.entries[index].delta,
            None => native,
        }
    }

    pub fn to_native(&self, meta: u32) -> NativePosition {
        let (delta, next) = match self.entry_before(meta, ShiftEntry::meta) {
            Some(index) => (self.entries[index].delta, index + 1),
            None => (0, 0),
        };
        let candidate = meta - delta;
        match self.entries.get(next) {
            Some(next) if candidate >= next.native => NativePosition::Gap { snapped: next.native },
            _ => NativePosition::Exact(candidate),
        }
    }

    /// Meta-genome extent of the native window `[start, stop)`.
    pub fn to_meta_range(&self, start: u32, stop: u32) -> (u32, u32) {
        match stop > start {
            true => (self.to_meta(start), self.to_meta(stop - 1) + 1),
            false => {
                let start = self.to_meta(start);
                (start, start)
            }
        }
    }

    /// Native extent of the meta window `[start, stop)`, gaps snapped inward.
    pub fn to_native_range(&self, start: u32, stop: u32) -> (u32, u32) {
        let native_start = self.to_native(start).position();
        if stop <= start {
            return (native_start, native_start);
        }
        let native_stop = match self.to_native(stop - 1) {
            NativePosition::Exact(position) => position + 1,
            NativePosition::Gap { snapped } => snapped,
        };
        (native_start, native_stop.max(native_start))
    }
}
