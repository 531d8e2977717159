//! The projection buffer manager.
//!
//! [`ProjectionBufferManager`] owns everything a contained-language document needs: the disk
//! buffer, one [`LanguageProjection`] per embedded content type, the composed view and the
//! [`EditResolver`]. Language services talk to it through the mapping operations; the host
//! routes edits through [`ProjectionBufferManager::edit_view`] or
//! [`ProjectionBufferManager::edit_disk`].
//!
//! The composed view always carries the disk text, so view offsets and disk offsets are the
//! same numbers. The tile list only decides which buffers an edit at a given offset reaches.

use crate::composer::{ComposeSources, ViewComposer, ViewTile};
use crate::delta::{TextDelta, TextDeltaEdit};
use crate::error::ProjectionError;
use crate::events::{BufferTarget, EditOrigin, ProjectionEvent, ProjectionEventCallback};
use crate::growing::GrowingSpanHandle;
use crate::language::{LanguageProjection, LiveSpan};
use crate::mapping::{self, ProjectionMapping, TrailingInclusion};
use crate::policy::EditPolicy;
use crate::resolver::{EditResolver, LanguageEditResolver};
use crate::span::{LanguageBufferId, SnapshotPoint, SnapshotSpan, SourceSpan, SpanOwner};
use crate::text_buffer::{TextBuffer, TextSnapshot};
use projection_lang::ContentType;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

struct ProjectionSources {
    disk: TextBuffer,
    languages: BTreeMap<LanguageBufferId, LanguageProjection>,
}

impl ComposeSources for ProjectionSources {
    fn disk(&self) -> &TextBuffer {
        &self.disk
    }

    fn live_spans(&self, buffer: LanguageBufferId) -> Vec<LiveSpan> {
        self.languages
            .get(&buffer)
            .map(LanguageProjection::live_spans)
            .unwrap_or_default()
    }

    fn disconnect(&mut self, buffer: LanguageBufferId, span: GrowingSpanHandle) -> bool {
        self.languages
            .get_mut(&buffer)
            .is_some_and(|language| language.disconnect(span))
    }

    fn prune_disconnected(&mut self, buffer: LanguageBufferId, composer: &mut ViewComposer) {
        let Some(language) = self.languages.get_mut(&buffer) else {
            return;
        };
        let swept = language.prune_disconnected();
        if swept > 0 && language.live_count() == 0 {
            tracing::debug!(
                buffer = buffer.get(),
                "language buffer lost its last mapping"
            );
            composer.remove_language_buffer(buffer, self);
        }
    }
}

/// One piece of a routed edit: the part of the edit that lands in one tile.
#[derive(Debug)]
struct TileEdit {
    tile: usize,
    range: Range<usize>,
    text: String,
}

/// Facade over the disk buffer, its language buffers and the composed view.
pub struct ProjectionBufferManager {
    sources: ProjectionSources,
    composer: ViewComposer,
    resolver: Box<dyn EditResolver + Send>,
    callbacks: Vec<ProjectionEventCallback>,
    next_language_id: u64,
}

impl ProjectionBufferManager {
    /// Create a manager for a document holding `disk_text`.
    pub fn new(disk_text: &str, content_type: ContentType) -> Self {
        let disk = TextBuffer::new(disk_text, content_type);
        let composer = ViewComposer::new(&disk);
        Self {
            sources: ProjectionSources {
                disk,
                languages: BTreeMap::new(),
            },
            composer,
            resolver: Box::new(LanguageEditResolver::new()),
            callbacks: Vec::new(),
            next_language_id: 0,
        }
    }

    /// Replace the edit resolver.
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: EditResolver + Send + 'static,
    {
        self.resolver = Box::new(resolver);
        self
    }


    /// Full text of the disk buffer.
    pub fn disk_text(&self) -> String {
        self.sources.disk.text()
    }

    /// Snapshot of the disk buffer.
    pub fn disk_snapshot(&self) -> TextSnapshot {
        self.sources.disk.snapshot()
    }

    /// Content type of the disk buffer.
    pub fn disk_content_type(&self) -> &ContentType {
        self.sources.disk.content_type()
    }

    /// Full text of the composed view.
    pub fn view_text(&self) -> String {
        self.composer.text()
    }

    /// Snapshot of the composed view.
    pub fn view_snapshot(&self) -> TextSnapshot {
        self.composer.snapshot()
    }

    /// Constituent spans of the composed view.
    ///
    /// Disk spans use disk offsets, language spans use offsets in their language buffer.
    pub fn view_spans(&self) -> Vec<SourceSpan> {
        self.composer
            .tile_ranges()
            .into_iter()
            .map(|(tile, range)| match tile {
                ViewTile::Disk { .. } => SourceSpan::new(SpanOwner::Disk, range),
                ViewTile::Language { buffer, span, len } => {
                    match self.secondary_start_of(buffer, span) {
                        Some(start) => {
                            SourceSpan::new(SpanOwner::Language(buffer), start..start + len)
                        }
                        None => SourceSpan::new(SpanOwner::Disk, range),
                    }
                }
            })
            .collect()
    }

    /// The view composer.
    pub fn composer(&self) -> &ViewComposer {
        &self.composer
    }


    /// Open the language buffer for `content_type`.
    ///
    /// A document has at most one language buffer per content type.
    pub fn create_language_buffer(
        &mut self,
        content_type: ContentType,
    ) -> Result<LanguageBufferId, ProjectionError> {
        if self.language_buffer_id(&content_type).is_some() {
            return Err(ProjectionError::ContentTypeAlreadyOpen(content_type));
        }
        let id = LanguageBufferId(self.next_language_id);
        self.next_language_id += 1;
        tracing::debug!(buffer = id.get(), %content_type, "created language buffer");
        self.sources
            .languages
            .insert(id, LanguageProjection::new(id, content_type));
        Ok(id)
    }

    /// The language buffer open for `content_type`, if any.
    pub fn language_buffer_id(&self, content_type: &ContentType) -> Option<LanguageBufferId> {
        self.sources
            .languages
            .values()
            .find(|language| language.content_type() == content_type)
            .map(LanguageProjection::id)
    }

    /// Ids of all open language buffers.
    pub fn language_buffers(&self) -> Vec<LanguageBufferId> {
        self.sources.languages.keys().copied().collect()
    }

    /// Read access to a language buffer.
    pub fn language_buffer(
        &self,
        id: LanguageBufferId,
    ) -> Result<&LanguageProjection, ProjectionError> {
        self.sources
            .languages
            .get(&id)
            .ok_or(ProjectionError::LanguageBufferNotFound(id))
    }

    /// Detach a language buffer from the view and drop it.
    pub fn close_language_buffer(&mut self, id: LanguageBufferId) -> Result<(), ProjectionError> {
        self.remove_spans(id)?;
        self.sources.languages.remove(&id);
        tracing::debug!(buffer = id.get(), "closed language buffer");
        Ok(())
    }

    /// Full text of a language buffer.
    pub fn language_text(&self, id: LanguageBufferId) -> Result<String, ProjectionError> {
        Ok(self.language_buffer(id)?.text())
    }

    /// Content type of a language buffer.
    pub fn language_content_type(
        &self,
        id: LanguageBufferId,
    ) -> Result<ContentType, ProjectionError> {
        Ok(self.language_buffer(id)?.content_type().clone())
    }

    /// Constituent spans of a language buffer.
    pub fn language_spans(&self, id: LanguageBufferId) -> Result<Vec<SourceSpan>, ProjectionError> {
        Ok(self.language_buffer(id)?.source_spans())
    }


    /// Replace the text and mappings of a language buffer.
    ///
    /// Emits [`ProjectionEvent::MappingsChanging`] before and
    /// [`ProjectionEvent::MappingsChanged`] after the update. Passing no mappings detaches the
    /// buffer from the view.
    pub fn set_text_and_mappings(
        &mut self,
        id: LanguageBufferId,
        text: &str,
        mappings: &[ProjectionMapping],
    ) -> Result<(), ProjectionError> {
        let old_mappings = self.language_buffer(id)?.mappings();
        mapping::validate_mappings(mappings, self.sources.disk.len())?;

        self.notify(&ProjectionEvent::MappingsChanging {
            buffer: id,
            old_mappings,
        });

        if self.composer.contains_language(id) {
            self.composer.remove_language_buffer(id, &mut self.sources);
        }

        let sources = &mut self.sources;
        let language = sources
            .languages
            .get_mut(&id)
            .ok_or(ProjectionError::LanguageBufferNotFound(id))?;
        let update = language.update(text, mappings, &sources.disk)?;
        let has_live = language.live_count() > 0;

        if !update.delta.is_empty() {
            self.notify(&ProjectionEvent::BufferChanged {
                target: BufferTarget::Language(id),
                origin: EditOrigin::LanguageService,
                delta: Arc::new(update.delta),
            });
        }

        if has_live {
            self.composer.add_language_buffer(id, &mut self.sources);
        }

        let language = self.language_buffer(id)?;
        let event = ProjectionEvent::MappingsChanged {
            buffer: id,
            text: language.text(),
            mappings: language.mappings(),
        };
        self.notify(&event);
        Ok(())
    }

    /// Replace the mappings of a language buffer, keeping its current text.
    pub fn set_mappings(
        &mut self,
        id: LanguageBufferId,
        mappings: &[ProjectionMapping],
    ) -> Result<(), ProjectionError> {
        let text = self.language_text(id)?;
        self.set_text_and_mappings(id, &text, mappings)
    }

    /// Round-trip the content type of a language buffer through [`ContentType::INERT`].
    ///
    /// Text and mappings are left alone; observers see two content type changes and re-read
    /// the buffer from scratch.
    pub fn reset_mappings(&mut self, id: LanguageBufferId) -> Result<(), ProjectionError> {
        let language = self
            .sources
            .languages
            .get_mut(&id)
            .ok_or(ProjectionError::LanguageBufferNotFound(id))?;
        let original = language.content_type().clone();

        let mut events = Vec::with_capacity(2);
        if let Some(before) = language.set_content_type(ContentType::INERT) {
            events.push(ProjectionEvent::ContentTypeChanged {
                buffer: id,
                before,
                after: ContentType::INERT,
            });
        }
        if let Some(before) = language.set_content_type(original.clone()) {
            events.push(ProjectionEvent::ContentTypeChanged {
                buffer: id,
                before,
                after: original,
            });
        }

        for event in &events {
            self.notify(event);
        }
        Ok(())
    }

    /// Current mappings of a language buffer, in language buffer order.
    pub fn mappings(
        &self,
        id: LanguageBufferId,
    ) -> Result<Vec<ProjectionMapping>, ProjectionError> {
        Ok(self.language_buffer(id)?.mappings())
    }

    /// The mapping of a language buffer whose disk range contains `position`.
    pub fn mapping_at(
        &self,
        id: LanguageBufferId,
        position: usize,
    ) -> Result<Option<ProjectionMapping>, ProjectionError> {
        Ok(self.language_buffer(id)?.mapping_at(position))
    }

    /// Detach a language buffer from the view.
    ///
    /// Live text stays in the language buffer as inert text and the buffer ends up without
    /// mappings.
    pub fn remove_spans(&mut self, id: LanguageBufferId) -> Result<(), ProjectionError> {
        let old_mappings = self.language_buffer(id)?.mappings();
        self.notify(&ProjectionEvent::MappingsChanging {
            buffer: id,
            old_mappings,
        });

        if let Some(language) = self.sources.languages.get_mut(&id) {
            language.disconnect_all();
        }
        if self.composer.contains_language(id) {
            self.composer.remove_language_buffer(id, &mut self.sources);
        }

        let language = self
            .sources
            .languages
            .get_mut(&id)
            .ok_or(ProjectionError::LanguageBufferNotFound(id))?;
        language.prune_disconnected();
        let text = language.text();

        self.notify(&ProjectionEvent::MappingsChanged {
            buffer: id,
            text,
            mappings: Vec::new(),
        });
        Ok(())
    }


    /// Replace `range` of the composed view with `text`.
    ///
    /// The edit is split between the tiles it touches (see [`EditResolver`]) and every piece is
    /// applied to the disk buffer and to the language buffer owning its tile. Returns the
    /// change of the view.
    pub fn edit_view(
        &mut self,
        range: Range<usize>,
        text: &str,
    ) -> Result<TextDelta, ProjectionError> {
        self.apply_edit(range, text, EditOrigin::View)
    }

    /// Replace `range` of the disk buffer with `text`.
    ///
    /// Language buffers whose live segments are touched follow the change. Returns the change
    /// of the disk buffer.
    pub fn edit_disk(
        &mut self,
        range: Range<usize>,
        text: &str,
    ) -> Result<TextDelta, ProjectionError> {
        self.apply_edit(range, text, EditOrigin::Disk)
    }

    fn apply_edit(
        &mut self,
        range: Range<usize>,
        text: &str,
        origin: EditOrigin,
    ) -> Result<TextDelta, ProjectionError> {
        let len = self.composer.len();
        if range.start > range.end || range.end > len {
            return Err(ProjectionError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }

        let tiles = self.composer.tile_ranges();
        let pieces = if range.is_empty() {
            self.route_insertion(&tiles, range.start, text)
        } else {
            self.route_replacement(&tiles, range.clone(), text)
        };
        tracing::trace!(?range, ?origin, pieces = pieces.len(), "routed edit");

        let before_disk = self.sources.disk.len();
        let before_view = self.composer.len();
        let mut before_languages = BTreeMap::new();
        let mut view_edits = Vec::with_capacity(pieces.len());
        let mut disk_edits = Vec::with_capacity(pieces.len());
        let mut language_edits: BTreeMap<LanguageBufferId, Vec<TextDeltaEdit>> = BTreeMap::new();

        for piece in pieces.iter().rev() {
            if piece.range.is_empty() && piece.text.is_empty() {
                continue;
            }
            let (tile, tile_range) = &tiles[piece.tile];

            if let ViewTile::Language { buffer, span, .. } = *tile {
                let language = self
                    .sources
                    .languages
                    .get_mut(&buffer)
                    .ok_or(ProjectionError::LanguageBufferNotFound(buffer))?;
                before_languages
                    .entry(buffer)
                    .or_insert_with(|| language.len());
                let edit = language.apply_live_edit(
                    span,
                    piece.range.start - tile_range.start,
                    piece.range.len(),
                    &piece.text,
                )?;
                language_edits.entry(buffer).or_default().push(edit);
            }

            view_edits.push(
                self.composer
                    .view_mut()
                    .replace(piece.range.clone(), &piece.text)?,
            );
            disk_edits.push(self.sources.disk.replace(piece.range.clone(), &piece.text)?);

            let tile_len = self.composer.tiles()[piece.tile].len();
            let new_len = tile_len - piece.range.len() + piece.text.chars().count();
            self.composer.tiles_mut()[piece.tile].set_len(new_len);
        }

        self.sync_span_positions();

        // Live tiles deleted across both edges are gone for good.
        let swallowed: Vec<(LanguageBufferId, GrowingSpanHandle)> = pieces
            .iter()
            .filter(|piece| piece.text.is_empty())
            .filter_map(|piece| match tiles[piece.tile] {
                (ViewTile::Language { buffer, span, .. }, ref tile_range)
                    if range.start < tile_range.start && tile_range.end < range.end =>
                {
                    Some((buffer, span))
                }
                _ => None,
            })
            .collect();
        for (buffer, span) in &swallowed {
            if let Some(language) = self.sources.languages.get_mut(buffer) {
                language.disconnect(*span);
            }
        }
        if let Some((requester, _)) = swallowed.first() {
            tracing::debug!(
                swallowed = swallowed.len(),
                "edit removed live segments, recomposing"
            );
            self.composer.recompose(*requester, &mut self.sources);
        }

        let view_delta = TextDelta {
            before_char_count: before_view,
            after_char_count: self.composer.len(),
            edits: view_edits,
            policy: EditPolicy::MinimalDiff,
        };
        let disk_delta = TextDelta {
            before_char_count: before_disk,
            after_char_count: self.sources.disk.len(),
            edits: disk_edits,
            policy: EditPolicy::MinimalDiff,
        };
        if view_delta.is_empty() {
            return Ok(view_delta);
        }

        self.notify(&ProjectionEvent::BufferChanged {
            target: BufferTarget::Disk,
            origin,
            delta: Arc::new(disk_delta.clone()),
        });
        self.notify(&ProjectionEvent::BufferChanged {
            target: BufferTarget::View,
            origin,
            delta: Arc::new(view_delta.clone()),
        });
        for (buffer, edits) in language_edits {
            let before_char_count = before_languages.get(&buffer).copied().unwrap_or_default();
            let after_char_count = self
                .sources
                .languages
                .get(&buffer)
                .map_or(0, LanguageProjection::len);
            self.notify(&ProjectionEvent::BufferChanged {
                target: BufferTarget::Language(buffer),
                origin,
                delta: Arc::new(TextDelta {
                    before_char_count,
                    after_char_count,
                    edits,
                    policy: EditPolicy::MinimalDiff,
                }),
            });
        }

        Ok(match origin {
            EditOrigin::Disk => disk_delta,
            EditOrigin::View | EditOrigin::LanguageService => view_delta,
        })
    }

    fn route_insertion(
        &self,
        tiles: &[(ViewTile, Range<usize>)],
        position: usize,
        text: &str,
    ) -> Vec<TileEdit> {
        let candidates = Self::insertion_candidates(tiles, position);
        let len = text.chars().count();
        let sizes = match self.claiming_tile(tiles, &candidates, position) {
            Some(claimed) => candidates
                .iter()
                .map(|&index| if index == claimed { len } else { 0 })
                .collect(),
            None if candidates.len() == 1 => vec![len],
            None => {
                let points = self.snapshot_points(tiles, &candidates, position);
                let sizes = self
                    .resolver
                    .resolve_insertion_sizes(position, &points, text);
                let fallback = self.resolver.typical_insertion_position(position, &points);
                normalize_sizes(sizes, candidates.len(), len, fallback)
            }
        };

        split_text(text, &sizes)
            .into_iter()
            .zip(candidates)
            .map(|(text, tile)| TileEdit {
                tile,
                range: position..position,
                text,
            })
            .collect()
    }

    fn route_replacement(
        &self,
        tiles: &[(ViewTile, Range<usize>)],
        range: Range<usize>,
        text: &str,
    ) -> Vec<TileEdit> {
        let candidates: Vec<usize> = tiles
            .iter()
            .enumerate()
            .filter(|(_, (_, tile_range))| {
                (tile_range.start < range.end && tile_range.end > range.start)
                    || (tile_range.is_empty() && tile_range.start == range.start)
            })
            .map(|(index, _)| index)
            .collect();
        let overlaps: Vec<Range<usize>> = candidates
            .iter()
            .map(|&index| {
                let tile_range = &tiles[index].1;
                tile_range.start.max(range.start)..tile_range.end.min(range.end)
            })
            .collect();

        let total = text.chars().count();
        let sizes = if candidates.len() == 1 {
            vec![total]
        } else {
            let spans: Vec<SnapshotSpan> = candidates
                .iter()
                .zip(&overlaps)
                .map(|(&index, overlap)| self.snapshot_span(tiles, index, overlap.clone()))
                .collect();
            let points: Vec<SnapshotPoint> = spans
                .iter()
                .map(|span| SnapshotPoint::new(span.owner, span.range.start))
                .collect();
            let sizes = self
                .resolver
                .resolve_replacement_sizes(range.clone(), &spans, text);
            let fallback = self
                .resolver
                .typical_insertion_position(range.start, &points);
            normalize_sizes(sizes, candidates.len(), total, fallback)
        };

        split_text(text, &sizes)
            .into_iter()
            .zip(candidates.into_iter().zip(overlaps))
            .map(|(text, (tile, range))| TileEdit { tile, range, text })
            .collect()
    }

    fn insertion_candidates(tiles: &[(ViewTile, Range<usize>)], position: usize) -> Vec<usize> {
        tiles
            .iter()
            .enumerate()
            .filter(|(_, (_, range))| range.start <= position && position <= range.end)
            .map(|(index, _)| index)
            .collect()
    }

    /// An inclusive language tile ending at `position` takes insertions there.
    fn claiming_tile(
        &self,
        tiles: &[(ViewTile, Range<usize>)],
        candidates: &[usize],
        position: usize,
    ) -> Option<usize> {
        candidates.iter().copied().find(|&index| match &tiles[index] {
            (ViewTile::Language { buffer, span, .. }, range) => {
                range.end == position
                    && self
                        .sources
                        .languages
                        .get(buffer)
                        .and_then(|language| language.trailing_inclusion(*span))
                        == Some(TrailingInclusion::Inclusive)
            }
            _ => false,
        })
    }

    fn snapshot_points(
        &self,
        tiles: &[(ViewTile, Range<usize>)],
        candidates: &[usize],
        position: usize,
    ) -> Vec<SnapshotPoint> {
        candidates
            .iter()
            .map(|&index| {
                let span = self.snapshot_span(tiles, index, position..position);
                SnapshotPoint::new(span.owner, span.range.start)
            })
            .collect()
    }

    /// Describe `overlap` (view offsets inside tile `index`) in the tile owner's coordinates.
    fn snapshot_span(
        &self,
        tiles: &[(ViewTile, Range<usize>)],
        index: usize,
        overlap: Range<usize>,
    ) -> SnapshotSpan {
        let (tile, tile_range) = &tiles[index];
        let text = self.composer.snapshot().text_range(overlap.clone());
        match *tile {
            ViewTile::Language { buffer, span, .. } => {
                match self.secondary_start_of(buffer, span) {
                    Some(start) => {
                        let local = overlap.start - tile_range.start;
                        SnapshotSpan::new(
                            SpanOwner::Language(buffer),
                            start + local..start + local + overlap.len(),
                            text,
                        )
                    }
                    None => SnapshotSpan::new(SpanOwner::Disk, overlap, text),
                }
            }
            ViewTile::Disk { .. } => SnapshotSpan::new(SpanOwner::Disk, overlap, text),
        }
    }

    fn secondary_start_of(
        &self,
        buffer: LanguageBufferId,
        span: GrowingSpanHandle,
    ) -> Option<usize> {
        self.sources
            .languages
            .get(&buffer)
            .and_then(|language| language.secondary_start_of(span))
    }

    /// Realign growing spans with the tile walk after an edit.
    fn sync_span_positions(&mut self) {
        let mut offset = 0;
        for tile in self.composer.tiles() {
            if let ViewTile::Language { buffer, span, .. } = *tile
                && let Some(language) = self.sources.languages.get_mut(&buffer)
            {
                language.set_disk_start(span, offset);
            }
            offset += tile.len();
        }
    }


    /// Map a view position into the language buffer it belongs to.
    ///
    /// At a tile boundary the resolver's typical insertion position picks the candidate.
    /// Returns `None` when the position belongs to the disk buffer.
    pub fn map_view_to_language(&self, position: usize) -> Option<(LanguageBufferId, usize)> {
        if position > self.composer.len() {
            return None;
        }
        let tiles = self.composer.tile_ranges();
        let candidates = Self::insertion_candidates(&tiles, position);
        let chosen = match self.claiming_tile(&tiles, &candidates, position) {
            Some(claimed) => claimed,
            None if candidates.len() == 1 => candidates[0],
            None => {
                let points = self.snapshot_points(&tiles, &candidates, position);
                let index = self.resolver.typical_insertion_position(position, &points);
                *candidates.get(index)?
            }
        };

        let span = self.snapshot_span(&tiles, chosen, position..position);
        span.owner
            .language()
            .map(|buffer| (buffer, span.range.start))
    }

    /// Map a language buffer position into the view.
    ///
    /// Returns `None` when the position is inert text or the buffer is not projected.
    pub fn map_language_to_view(&self, id: LanguageBufferId, position: usize) -> Option<usize> {
        let language = self.sources.languages.get(&id)?;
        let (handle, start) = language.live_segment_at(position)?;
        self.composer
            .tile_ranges()
            .into_iter()
            .find_map(|(tile, range)| match tile {
                ViewTile::Language { buffer, span, .. } if buffer == id && span == handle => {
                    Some(range.start + (position - start))
                }
                _ => None,
            })
    }


    /// Subscribe to projection events.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&ProjectionEvent) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn notify(&mut self, event: &ProjectionEvent) {
        for callback in &mut self.callbacks {
            callback(event);
        }
    }
}

/// Accept resolver output only if it is a partition of `total`; otherwise give everything to
/// `fallback`.
fn normalize_sizes(sizes: Vec<usize>, count: usize, total: usize, fallback: usize) -> Vec<usize> {
    if sizes.len() == count && sizes.iter().sum::<usize>() == total {
        return sizes;
    }
    tracing::warn!(?sizes, count, total, "resolver returned an invalid partition");
    let mut fixed = vec![0; count];
    if let Some(slot) = fixed.get_mut(fallback.min(count.saturating_sub(1))) {
        *slot = total;
    }
    fixed
}

fn split_text(text: &str, sizes: &[usize]) -> Vec<String> {
    let mut chars = text.chars();
    sizes
        .iter()
        .map(|&size| chars.by_ref().take(size).collect())
        .collect()
}
