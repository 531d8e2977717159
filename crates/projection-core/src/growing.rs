//! Growing spans: tracked live ranges of the disk buffer.
//!
//! Every live mapping of a language buffer is backed by a [`GrowingSpan`] stored in a
//! [`GrowingSpanArena`] and addressed by a stable [`GrowingSpanHandle`]. The composed view refers
//! to spans by handle only. A span that loses its underlying text is tombstoned
//! (`disconnected`) and stays addressable until the next [`GrowingSpanArena::prune`] sweep, so
//! no collection is ever shrunk while someone is iterating it.

use crate::mapping::TrailingInclusion;
use std::ops::Range;

/// Stable handle to a [`GrowingSpan`].
///
/// Slots are reused after pruning; the generation makes stale handles miss instead of aliasing
/// a newer span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GrowingSpanHandle {
    index: u32,
    generation: u32,
}

/// A tracked range of the disk buffer backing one live mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowingSpan {
    /// Current disk range.
    pub disk_range: Range<usize>,
    /// Whether insertions at the end of the range grow it.
    pub trailing_inclusion: TrailingInclusion,
    disconnected: bool,
}

impl GrowingSpan {
    /// Create a connected span.
    pub fn new(disk_range: Range<usize>, trailing_inclusion: TrailingInclusion) -> Self {
        Self {
            disk_range,
            trailing_inclusion,
            disconnected: false,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.disk_range.len()
    }

    /// Returns `true` if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.disk_range.is_empty()
    }

    /// Returns `true` once the span has been tombstoned.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    span: Option<GrowingSpan>,
}

/// Arena of growing spans.
#[derive(Debug, Clone, Default)]
pub struct GrowingSpanArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl GrowingSpanArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a span and return its handle.
    pub fn insert(&mut self, span: GrowingSpan) -> GrowingSpanHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.span = Some(span);
            return GrowingSpanHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            span: Some(span),
        });
        GrowingSpanHandle {
            index,
            generation: 0,
        }
    }

    /// Look up a span (connected or tombstoned).
    pub fn get(&self, handle: GrowingSpanHandle) -> Option<&GrowingSpan> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.span.as_ref())
    }

    /// Look up a span mutably.
    pub fn get_mut(&mut self, handle: GrowingSpanHandle) -> Option<&mut GrowingSpan> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.span.as_mut())
    }

    /// Returns `true` if `handle` refers to a connected span.
    pub fn is_live(&self, handle: GrowingSpanHandle) -> bool {
        self.get(handle).is_some_and(|span| !span.disconnected)
    }

    /// Tombstone one span. Returns `false` if it was already gone or disconnected.
    pub fn disconnect(&mut self, handle: GrowingSpanHandle) -> bool {
        match self.get_mut(handle) {
            Some(span) if !span.disconnected => {
                span.disconnected = true;
                true
            }
            _ => false,
        }
    }

    /// Tombstone every span.
    pub fn disconnect_all(&mut self) -> usize {
        let mut count = 0;
        for span in self.slots.iter_mut().filter_map(|slot| slot.span.as_mut()) {
            if !span.disconnected {
                span.disconnected = true;
                count += 1;
            }
        }
        count
    }

    /// Returns `true` if any span is waiting to be pruned.
    pub fn has_disconnected(&self) -> bool {
        self.slots
            .iter()
            .filter_map(|slot| slot.span.as_ref())
            .any(|span| span.disconnected)
    }

    /// Remove every tombstoned span, returning the handles that were swept.
    pub fn prune(&mut self) -> Vec<GrowingSpanHandle> {
        let mut swept = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.span.as_ref().is_some_and(|span| span.disconnected) {
                swept.push(GrowingSpanHandle {
                    index: index as u32,
                    generation: slot.generation,
                });
                slot.span = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        swept
    }

    /// Number of connected spans.
    pub fn live_len(&self) -> usize {
        self.slots
            .iter()
            .filter_map(|slot| slot.span.as_ref())
            .filter(|span| !span.disconnected)
            .count()
    }

    /// Number of stored spans, tombstones included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.span.is_some()).count()
    }

    /// Returns `true` if the arena stores no span at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
