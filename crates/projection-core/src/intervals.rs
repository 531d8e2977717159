//! Mapping lookup over a language buffer's segment list.
//!
//! Mappings are not stored. A [`MappingIndex`] is derived from a traversal of the language
//! buffer's constituent spans: disk-owned spans are the live mappings, every other span only
//! advances the secondary offset. Owner data is zipped in from a table indexed over the live
//! spans alone, so it cannot drift when inert spans are added or removed.

use crate::mapping::{ExtraData, ProjectionMapping, TrailingInclusion};
use crate::span::SpanOwner;
use std::ops::Range;

/// One constituent span reported by a language buffer traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversedSpan {
    /// Buffer the span's text comes from.
    pub owner: SpanOwner,
    /// Range in the owner's coordinates (for disk-owned spans: disk offsets).
    pub range: Range<usize>,
    /// Trailing inclusion of the live span (ignored for inert spans).
    pub trailing_inclusion: TrailingInclusion,
}

/// A live interval: compact form of a mapping without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    primary_start: usize,
    secondary_start: usize,
    length: usize,
    trailing_inclusion: TrailingInclusion,
}

impl Interval {
    fn primary_end(&self) -> usize {
        self.primary_start + self.length
    }
}

/// Lookup structure over the mappings of one language buffer.
///
/// Intervals are kept in secondary order, which is generally *not* disk order, so lookups by
/// disk position are linear scans. Each scan first applies a coarse `start <= pos <= end` check
/// on the compact interval and only builds a full [`ProjectionMapping`] for the survivors.
#[derive(Debug, Clone, Default)]
pub struct MappingIndex {
    intervals: Vec<Interval>,
    extra_data: Vec<Option<ExtraData>>,
}

impl MappingIndex {
    /// Build an index from a traversal of a language buffer, in secondary order.
    ///
    /// `extra_data[i]` belongs to the `i`-th disk-owned span of the traversal.
    pub fn from_traversal<I>(spans: I, extra_data: &[Option<ExtraData>]) -> Self
    where
        I: IntoIterator<Item = TraversedSpan>,
    {
        let mut intervals = Vec::new();
        let mut secondary_offset = 0usize;

        for span in spans {
            let length = span.range.len();
            if span.owner.is_disk() {
                intervals.push(Interval {
                    primary_start: span.range.start,
                    secondary_start: secondary_offset,
                    length,
                    trailing_inclusion: span.trailing_inclusion,
                });
            }
            secondary_offset += length;
        }

        debug_assert_eq!(
            intervals.len(),
            extra_data.len(),
            "live span count and extra data count diverged"
        );

        // Filter-then-zip: payloads only line up with the live spans.
        let extra_data = (0..intervals.len())
            .map(|idx| extra_data.get(idx).cloned().flatten())
            .collect();

        Self {
            intervals,
            extra_data,
        }
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns `true` if there are no mappings.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// All mappings, in secondary order.
    pub fn all(&self) -> Vec<ProjectionMapping> {
        (0..self.intervals.len())
            .map(|idx| self.mapping(idx))
            .collect()
    }

    /// The mapping whose disk range contains `position`.
    pub fn lookup(&self, position: usize) -> Option<ProjectionMapping> {
        self.intervals
            .iter()
            .enumerate()
            .filter(|(_, iv)| iv.primary_start <= position && position <= iv.primary_end())
            .map(|(idx, _)| self.mapping(idx))
            .find(|candidate| candidate.contains_primary(position))
    }

    fn mapping(&self, idx: usize) -> ProjectionMapping {
        let iv = self.intervals[idx];
        ProjectionMapping {
            primary_start: iv.primary_start,
            secondary_start: iv.secondary_start,
            length: iv.length,
            trailing_inclusion: iv.trailing_inclusion,
            extra_data: self.extra_data[idx].clone(),
        }
    }
}
