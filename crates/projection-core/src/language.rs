//! Language (secondary) buffers.
//!
//! A [`LanguageProjection`] owns one secondary buffer, e.g. the R code of an R Markdown
//! document. Its text is an interleaving of:
//!
//! - **inert** segments: filler text supplied by the language service, never shown in the
//!   composed view;
//! - **live** segments: growing spans whose text tracks the disk buffer.
//!
//! ```text
//! disk:      # Title\n```{r}\nx <- 1\n```\n
//!                           ^^^^^^^ live (disk 13..20)
//! language:  <inert filler>x <- 1\n<inert filler>
//! ```
//!
//! The segment list is the authoritative state; mappings are derived from it on every read.

use crate::delta::{TextDelta, TextDeltaEdit};
use crate::error::ProjectionError;
use crate::growing::{GrowingSpan, GrowingSpanArena, GrowingSpanHandle};
use crate::intervals::{MappingIndex, TraversedSpan};
use crate::mapping::{self, ExtraData, ProjectionMapping, TrailingInclusion};
use crate::policy::EditPolicy;
use crate::span::{LanguageBufferId, SourceSpan, SpanOwner};
use crate::text_buffer::{TextBuffer, TextSnapshot};
use projection_lang::ContentType;
use ropey::Rope;
use std::ops::Range;

/// One segment of a language buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSegment {
    /// Literal filler text.
    Inert(String),
    /// Text tracked from the disk buffer.
    Live(GrowingSpanHandle),
}

/// A connected live span as seen by the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSpan {
    /// Handle of the growing span.
    pub handle: GrowingSpanHandle,
    /// Current disk range.
    pub disk_range: Range<usize>,
}

/// Outcome of replacing a language buffer's text and mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageUpdate {
    /// Change of the language buffer text.
    pub delta: TextDelta,
    /// Policy chosen for the span replacement.
    pub policy: EditPolicy,
    /// Number of growing spans swept by the update.
    pub swept: usize,
}

/// Synchronizer for one language buffer.
#[derive(Debug, Clone)]
pub struct LanguageProjection {
    id: LanguageBufferId,
    buffer: TextBuffer,
    segments: Vec<LanguageSegment>,
    spans: GrowingSpanArena,
    /// One entry per `Live` segment, in segment order.
    extra_data: Vec<Option<ExtraData>>,
}

impl LanguageProjection {
    /// Create an empty language buffer.
    pub fn new(id: LanguageBufferId, content_type: ContentType) -> Self {
        Self {
            id,
            buffer: TextBuffer::new("", content_type),
            segments: Vec::new(),
            spans: GrowingSpanArena::new(),
            extra_data: Vec::new(),
        }
    }

    /// The buffer id.
    pub fn id(&self) -> LanguageBufferId {
        self.id
    }

    /// Content type of the language buffer.
    pub fn content_type(&self) -> &ContentType {
        self.buffer.content_type()
    }

    /// Full text of the language buffer.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Immutable snapshot of the language buffer.
    pub fn snapshot(&self) -> TextSnapshot {
        self.buffer.snapshot()
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the language buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The segment list.
    pub fn segments(&self) -> &[LanguageSegment] {
        &self.segments
    }

    /// Look up a growing span of this buffer.
    pub fn span(&self, handle: GrowingSpanHandle) -> Option<&GrowingSpan> {
        self.spans.get(handle)
    }

    /// Number of connected live segments.
    pub fn live_count(&self) -> usize {
        self.live_handles()
            .filter(|handle| self.spans.is_live(*handle))
            .count()
    }

    /// Connected live spans, in segment order.
    pub fn live_spans(&self) -> Vec<LiveSpan> {
        self.live_handles()
            .filter_map(|handle| {
                let span = self.spans.get(handle)?;
                (!span.is_disconnected()).then(|| LiveSpan {
                    handle,
                    disk_range: span.disk_range.clone(),
                })
            })
            .collect()
    }

    /// Constituent spans of the language buffer snapshot.
    ///
    /// Connected live segments are reported as disk-owned (disk offsets); everything else is
    /// owned by this buffer (language buffer offsets).
    pub fn traverse(&self) -> Vec<TraversedSpan> {
        self.traverse_with_extra().0
    }

    /// [`Self::traverse`] without trailing inclusion details.
    pub fn source_spans(&self) -> Vec<SourceSpan> {
        self.traverse()
            .into_iter()
            .map(|span| SourceSpan::new(span.owner, span.range))
            .collect()
    }

    /// Mapping index derived from the current segment list.
    pub fn index(&self) -> MappingIndex {
        let (spans, extra) = self.traverse_with_extra();
        MappingIndex::from_traversal(spans, &extra)
    }

    /// Current mappings, in secondary order.
    pub fn mappings(&self) -> Vec<ProjectionMapping> {
        self.index().all()
    }

    /// The mapping whose disk range contains `position`.
    pub fn mapping_at(&self, position: usize) -> Option<ProjectionMapping> {
        self.index().lookup(position)
    }

    /// Offset of a live segment inside the language buffer.
    pub fn secondary_start_of(&self, handle: GrowingSpanHandle) -> Option<usize> {
        let mut offset = 0;
        for segment in &self.segments {
            match segment {
                LanguageSegment::Live(h) if *h == handle => return Some(offset),
                segment => offset += self.segment_len(segment),
            }
        }
        None
    }

    /// The first connected live segment whose closed range `[start, end]` contains `position`,
    /// with its offset in the language buffer.
    pub fn live_segment_at(&self, position: usize) -> Option<(GrowingSpanHandle, usize)> {
        let mut offset = 0;
        for segment in &self.segments {
            let len = self.segment_len(segment);
            if let LanguageSegment::Live(handle) = segment
                && self.spans.is_live(*handle)
                && offset <= position
                && position <= offset + len
            {
                return Some((*handle, offset));
            }
            offset += len;
        }
        None
    }

    /// Current text of a live segment.
    pub fn span_text(&self, handle: GrowingSpanHandle) -> Option<String> {
        let start = self.secondary_start_of(handle)?;
        let len = self.spans.get(handle)?.len();
        Some(self.buffer.text_range(start..start + len))
    }

    /// Replace the buffer text and mappings.
    ///
    /// The mappings are walked in secondary order with a cursor: the text between the cursor and
    /// the next mapping becomes an inert segment, the mapping itself becomes a live segment
    /// tracking `primary_range` of the disk buffer. Text past the last mapping becomes a final
    /// inert segment. Previous live spans are tombstoned and swept.
    pub fn update(
        &mut self,
        text: &str,
        mappings: &[ProjectionMapping],
        disk: &TextBuffer,
    ) -> Result<LanguageUpdate, ProjectionError> {
        mapping::validate_mappings(mappings, disk.len())?;

        let source = Rope::from_str(text);
        let text_len = source.len_chars();

        self.spans.disconnect_all();

        let mut segments = Vec::with_capacity(mappings.len() * 2 + 1);
        let mut new_text = String::with_capacity(text.len());
        let mut cursor = 0usize;

        for mapping in mappings {
            let gap_end = mapping.secondary_start.min(text_len);
            let gap_start = cursor.min(gap_end);
            if gap_start < gap_end {
                let inert = source.slice(gap_start..gap_end).to_string();
                new_text.push_str(&inert);
                segments.push(LanguageSegment::Inert(inert));
            }

            let handle = self.spans.insert(GrowingSpan::new(
                mapping.primary_range(),
                mapping.trailing_inclusion,
            ));
            new_text.push_str(&disk.text_range(mapping.primary_range()));
            segments.push(LanguageSegment::Live(handle));

            cursor = mapping.secondary_end();
        }

        if cursor < text_len {
            let inert = source.slice(cursor..text_len).to_string();
            new_text.push_str(&inert);
            segments.push(LanguageSegment::Inert(inert));
        }

        let policy = EditPolicy::for_span_replacement(
            self.segments.len(),
            segments.len(),
            self.buffer.len(),
            new_text.chars().count(),
        );
        tracing::debug!(
            buffer = self.id.get(),
            old_segments = self.segments.len(),
            new_segments = segments.len(),
            ?policy,
            "replacing language buffer spans"
        );

        let delta = self.buffer.set_text(&new_text, policy);
        self.segments = segments;
        self.extra_data = mappings.iter().map(|m| m.extra_data.clone()).collect();
        let swept = self.spans.prune().len();

        debug_assert_eq!(self.spans.live_len(), self.extra_data.len());

        Ok(LanguageUpdate {
            delta,
            policy,
            swept,
        })
    }

    /// Switch the content type, returning the previous one if it changed.
    pub fn set_content_type(&mut self, content_type: ContentType) -> Option<ContentType> {
        self.buffer.set_content_type(content_type)
    }

    /// Tombstone one live span.
    pub fn disconnect(&mut self, handle: GrowingSpanHandle) -> bool {
        self.spans.disconnect(handle)
    }

    /// Tombstone every live span.
    pub fn disconnect_all(&mut self) -> usize {
        self.spans.disconnect_all()
    }

    /// Returns `true` if tombstoned spans are waiting for [`Self::prune_disconnected`].
    pub fn has_disconnected(&self) -> bool {
        self.spans.has_disconnected()
    }

    /// Sweep tombstoned spans.
    ///
    /// The text of a swept live segment stays in the buffer as inert text; empty segments are
    /// dropped and neighbouring inert segments merged. The buffer text does not change.
    pub fn prune_disconnected(&mut self) -> usize {
        if !self.spans.has_disconnected() {
            return 0;
        }

        let mut segments: Vec<LanguageSegment> = Vec::with_capacity(self.segments.len());
        let mut extra_data = Vec::with_capacity(self.extra_data.len());
        let mut offset = 0usize;
        let mut ordinal = 0usize;

        for segment in &self.segments {
            let len = self.segment_len(segment);
            let inert = match segment {
                LanguageSegment::Live(handle) => {
                    let data = self.extra_data.get(ordinal).cloned().flatten();
                    ordinal += 1;
                    if self.spans.is_live(*handle) {
                        extra_data.push(data);
                        segments.push(segment.clone());
                        offset += len;
                        continue;
                    }
                    self.buffer.text_range(offset..offset + len)
                }
                LanguageSegment::Inert(text) => text.clone(),
            };
            offset += len;

            if inert.is_empty() {
                continue;
            }
            if let Some(LanguageSegment::Inert(previous)) = segments.last_mut() {
                previous.push_str(&inert);
            } else {
                segments.push(LanguageSegment::Inert(inert));
            }
        }

        self.segments = segments;
        self.extra_data = extra_data;
        let swept = self.spans.prune().len();
        tracing::trace!(buffer = self.id.get(), swept, "pruned disconnected spans");
        swept
    }

    /// Apply an edit made inside a live segment.
    ///
    /// `local_start` and `deleted_len` are relative to the segment. The span grows or shrinks in
    /// place; its disk start is refreshed later by [`Self::set_disk_start`].
    pub(crate) fn apply_live_edit(
        &mut self,
        handle: GrowingSpanHandle,
        local_start: usize,
        deleted_len: usize,
        inserted: &str,
    ) -> Result<TextDeltaEdit, ProjectionError> {
        let span_len = self.spans.get(handle).map_or(0, GrowingSpan::len);
        let Some(start) = self.secondary_start_of(handle) else {
            return Err(ProjectionError::InvalidRange {
                start: local_start,
                end: local_start + deleted_len,
                len: 0,
            });
        };
        if local_start + deleted_len > span_len {
            return Err(ProjectionError::InvalidRange {
                start: local_start,
                end: local_start + deleted_len,
                len: span_len,
            });
        }

        let range = start + local_start..start + local_start + deleted_len;
        let edit = self.buffer.replace(range, inserted)?;
        if let Some(span) = self.spans.get_mut(handle) {
            let new_len = span_len - deleted_len + edit.inserted_len();
            span.disk_range.end = span.disk_range.start + new_len;
        }
        Ok(edit)
    }

    /// Move a live span to `disk_start`, keeping its length.
    pub(crate) fn set_disk_start(&mut self, handle: GrowingSpanHandle, disk_start: usize) {
        if let Some(span) = self.spans.get_mut(handle) {
            let len = span.len();
            span.disk_range = disk_start..disk_start + len;
        }
    }

    /// Trailing inclusion of a connected live span.
    pub(crate) fn trailing_inclusion(
        &self,
        handle: GrowingSpanHandle,
    ) -> Option<TrailingInclusion> {
        self.spans
            .get(handle)
            .filter(|span| !span.is_disconnected())
            .map(|span| span.trailing_inclusion)
    }

    fn live_handles(&self) -> impl Iterator<Item = GrowingSpanHandle> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            LanguageSegment::Live(handle) => Some(*handle),
            LanguageSegment::Inert(_) => None,
        })
    }

    fn segment_len(&self, segment: &LanguageSegment) -> usize {
        match segment {
            LanguageSegment::Inert(text) => text.chars().count(),
            LanguageSegment::Live(handle) => self.spans.get(*handle).map_or(0, GrowingSpan::len),
        }
    }

    fn traverse_with_extra(&self) -> (Vec<TraversedSpan>, Vec<Option<ExtraData>>) {
        let mut spans = Vec::with_capacity(self.segments.len());
        let mut extra = Vec::with_capacity(self.extra_data.len());
        let mut offset = 0usize;
        let mut ordinal = 0usize;

        for segment in &self.segments {
            let len = self.segment_len(segment);
            let own = TraversedSpan {
                owner: SpanOwner::Language(self.id),
                range: offset..offset + len,
                trailing_inclusion: TrailingInclusion::Exclusive,
            };

            match segment {
                LanguageSegment::Inert(_) => spans.push(own),
                LanguageSegment::Live(handle) => {
                    let data = self.extra_data.get(ordinal).cloned().flatten();
                    ordinal += 1;
                    match self.spans.get(*handle) {
                        Some(span) if !span.is_disconnected() => {
                            spans.push(TraversedSpan {
                                owner: SpanOwner::Disk,
                                range: span.disk_range.clone(),
                                trailing_inclusion: span.trailing_inclusion,
                            });
                            extra.push(data);
                        }
                        _ => spans.push(own),
                    }
                }
            }
            offset += len;
        }

        (spans, extra)
    }
}
