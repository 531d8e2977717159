//! The composed view.
//!
//! The view is stitched from tiles: disk tiles show disk text verbatim, language tiles show the
//! live segment of a language buffer. Both carry the same text, so the view always reads the
//! same as the disk buffer; the tile list decides which buffer owns each region.
//!
//! ```text
//! disk:   <style>.a{color:red}</style>
//! tiles:  [Disk 7][Language css #0 13][Disk 8]
//! ```
//!
//! Recomposition is guarded by a two-state machine. A request arriving while a pass is running
//! (pruning can re-enter through [`ComposeSources::prune_disconnected`]) drops every projection
//! and leaves the running pass to rebuild from scratch.

use crate::delta::TextDelta;
use crate::error::ProjectionError;
use crate::growing::GrowingSpanHandle;
use crate::language::LiveSpan;
use crate::policy::EditPolicy;
use crate::span::{LanguageBufferId, SpanOwner};
use crate::text_buffer::{TextBuffer, TextSnapshot};
use std::collections::{BTreeSet, HashSet};
use std::ops::Range;

/// One constituent span of the composed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTile {
    /// Disk text shown verbatim.
    Disk {
        /// Length in characters.
        len: usize,
    },
    /// A live segment of a language buffer.
    Language {
        /// Owning language buffer.
        buffer: LanguageBufferId,
        /// Growing span backing the segment.
        span: GrowingSpanHandle,
        /// Length in characters.
        len: usize,
    },
}

impl ViewTile {
    /// Length in characters.
    pub fn len(&self) -> usize {
        match self {
            ViewTile::Disk { len } | ViewTile::Language { len, .. } => *len,
        }
    }

    /// Returns `true` if the tile is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer owning the tile's text.
    pub fn owner(&self) -> SpanOwner {
        match self {
            ViewTile::Disk { .. } => SpanOwner::Disk,
            ViewTile::Language { buffer, .. } => SpanOwner::Language(*buffer),
        }
    }

    pub(crate) fn set_len(&mut self, new_len: usize) {
        match self {
            ViewTile::Disk { len } | ViewTile::Language { len, .. } => *len = new_len,
        }
    }
}

/// Recomposition state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeState {
    /// No pass running.
    #[default]
    Idle,
    /// A pass is running; nested requests take the reset branch.
    Composing,
}

/// What the composer needs from the owner of the disk and language buffers.
pub trait ComposeSources {
    /// The disk buffer.
    fn disk(&self) -> &TextBuffer;

    /// Connected live spans of a language buffer, in segment order.
    fn live_spans(&self, buffer: LanguageBufferId) -> Vec<LiveSpan>;

    /// Tombstone one live span of a language buffer.
    fn disconnect(&mut self, buffer: LanguageBufferId, span: GrowingSpanHandle) -> bool;

    /// Sweep the buffer's disconnected spans.
    ///
    /// Runs inside a recompose pass and may call back into `composer`.
    fn prune_disconnected(&mut self, buffer: LanguageBufferId, composer: &mut ViewComposer);
}

/// Owner of the composed view.
#[derive(Debug, Clone)]
pub struct ViewComposer {
    view: TextBuffer,
    tiles: Vec<ViewTile>,
    languages: BTreeSet<LanguageBufferId>,
    state: ComposeState,
    reentrant_resets: usize,
}

impl ViewComposer {
    /// Create a composer showing `disk` as a single pass-through tile.
    pub fn new(disk: &TextBuffer) -> Self {
        Self {
            view: TextBuffer::new(&disk.text(), disk.content_type().clone()),
            tiles: vec![ViewTile::Disk { len: disk.len() }],
            languages: BTreeSet::new(),
            state: ComposeState::Idle,
            reentrant_resets: 0,
        }
    }

    /// Full text of the view.
    pub fn text(&self) -> String {
        self.view.text()
    }

    /// Snapshot of the view buffer.
    pub fn snapshot(&self) -> TextSnapshot {
        self.view.snapshot()
    }

    /// Length of the view in characters.
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// Returns `true` if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Current tile list.
    pub fn tiles(&self) -> &[ViewTile] {
        &self.tiles
    }

    /// Tiles with their view ranges.
    pub fn tile_ranges(&self) -> Vec<(ViewTile, Range<usize>)> {
        let mut offset = 0;
        self.tiles
            .iter()
            .map(|tile| {
                let range = offset..offset + tile.len();
                offset = range.end;
                (*tile, range)
            })
            .collect()
    }

    /// Current state.
    pub fn state(&self) -> ComposeState {
        self.state
    }

    /// Registered language buffers.
    pub fn languages(&self) -> impl Iterator<Item = LanguageBufferId> + '_ {
        self.languages.iter().copied()
    }

    /// Returns `true` if `buffer` is registered.
    pub fn contains_language(&self, buffer: LanguageBufferId) -> bool {
        self.languages.contains(&buffer)
    }

    /// Number of re-entrant requests that reset the view to a pass-through tile.
    pub fn reentrant_reset_count(&self) -> usize {
        self.reentrant_resets
    }

    /// Register a language buffer and recompose.
    pub fn add_language_buffer<S>(
        &mut self,
        buffer: LanguageBufferId,
        sources: &mut S,
    ) -> Option<TextDelta>
    where
        S: ComposeSources + ?Sized,
    {
        self.languages.insert(buffer);
        self.recompose(buffer, sources)
    }

    /// Unregister a language buffer and recompose. Does nothing for unknown buffers.
    pub fn remove_language_buffer<S>(
        &mut self,
        buffer: LanguageBufferId,
        sources: &mut S,
    ) -> Option<TextDelta>
    where
        S: ComposeSources + ?Sized,
    {
        if !self.languages.remove(&buffer) {
            return None;
        }
        self.recompose(buffer, sources)
    }

    /// Drop every projection, leaving one pass-through disk tile.
    pub fn reset(&mut self, disk_len: usize) {
        self.tiles = vec![ViewTile::Disk { len: disk_len }];
    }

    /// Rebuild the tile list on behalf of `requester`.
    ///
    /// Returns the change of the view text, if any. Overlapping live spans abort the pass; the
    /// failure is logged, the previous tiles are kept with stale projections turned into disk
    /// tiles, and live spans left without a tile are disconnected.
    pub fn recompose<S>(
        &mut self,
        requester: LanguageBufferId,
        sources: &mut S,
    ) -> Option<TextDelta>
    where
        S: ComposeSources + ?Sized,
    {
        if self.state == ComposeState::Composing {
            let projected = self
                .tiles
                .iter()
                .any(|tile| tile.owner() == SpanOwner::Language(requester));
            if projected {
                tracing::warn!(
                    requester = requester.get(),
                    "re-entrant recompose, resetting view to pass-through"
                );
                self.reset(sources.disk().len());
                self.reentrant_resets += 1;
            } else {
                tracing::trace!(requester = requester.get(), "ignoring nested recompose");
            }
            return None;
        }

        self.state = ComposeState::Composing;
        let result = self.compose_pass(sources);
        self.state = ComposeState::Idle;

        match result {
            Ok(delta) => delta,
            Err(err) => {
                tracing::warn!(requester = requester.get(), %err, "recompose failed");
                self.drop_stale_tiles(&*sources);
                self.disconnect_untiled(sources);
                None
            }
        }
    }

    fn compose_pass<S>(&mut self, sources: &mut S) -> Result<Option<TextDelta>, ProjectionError>
    where
        S: ComposeSources + ?Sized,
    {
        let registered: Vec<_> = self.languages.iter().copied().collect();
        for buffer in registered {
            sources.prune_disconnected(buffer, self);
        }

        let mut spans: Vec<(LanguageBufferId, LiveSpan)> = self
            .languages
            .iter()
            .flat_map(|&buffer| {
                sources
                    .live_spans(buffer)
                    .into_iter()
                    .map(move |span| (buffer, span))
            })
            .collect();
        spans.sort_by_key(|(_, span)| (span.disk_range.start, span.disk_range.end));

        for pair in spans.windows(2) {
            let (first, second) = (&pair[0].1.disk_range, &pair[1].1.disk_range);
            if first.end > second.start {
                return Err(ProjectionError::OverlappingSpans {
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }

        let disk = sources.disk();
        let disk_len = disk.len();
        let mut tiles = Vec::with_capacity(spans.len() * 2 + 1);
        let mut cursor = 0;
        for (buffer, span) in &spans {
            let range = &span.disk_range;
            if range.end > disk_len {
                return Err(ProjectionError::InvalidRange {
                    start: range.start,
                    end: range.end,
                    len: disk_len,
                });
            }
            tiles.push(ViewTile::Disk {
                len: range.start - cursor,
            });
            tiles.push(ViewTile::Language {
                buffer: *buffer,
                span: span.handle,
                len: range.len(),
            });
            cursor = range.end;
        }
        tiles.push(ViewTile::Disk {
            len: disk_len - cursor,
        });

        tracing::debug!(
            languages = self.languages.len(),
            tiles = tiles.len(),
            "recomposed view"
        );

        self.tiles = tiles;
        let delta = self.view.set_text(&disk.text(), EditPolicy::MinimalDiff);
        Ok((!delta.is_empty()).then_some(delta))
    }

    /// Turn tiles whose span is no longer live into disk tiles and merge neighbouring disk tiles.
    fn drop_stale_tiles<S>(&mut self, sources: &S)
    where
        S: ComposeSources + ?Sized,
    {
        let live: HashSet<(LanguageBufferId, GrowingSpanHandle)> = self
            .languages
            .iter()
            .flat_map(|&buffer| {
                sources
                    .live_spans(buffer)
                    .into_iter()
                    .map(move |span| (buffer, span.handle))
            })
            .collect();

        let mut tiles: Vec<ViewTile> = Vec::with_capacity(self.tiles.len());
        for tile in &self.tiles {
            let tile = match *tile {
                ViewTile::Language { buffer, span, len } if !live.contains(&(buffer, span)) => {
                    ViewTile::Disk { len }
                }
                tile => tile,
            };
            if let ViewTile::Disk { len } = tile
                && let Some(ViewTile::Disk { len: previous }) = tiles.last_mut()
            {
                *previous += len;
            } else {
                tiles.push(tile);
            }
        }
        if !matches!(tiles.last(), Some(ViewTile::Disk { .. })) {
            tiles.push(ViewTile::Disk { len: 0 });
        }
        self.tiles = tiles;
    }

    /// Tombstone live spans that did not make it into the tile list and sweep their buffers.
    ///
    /// Untiled spans would never see edits routed to them.
    fn disconnect_untiled<S>(&mut self, sources: &mut S)
    where
        S: ComposeSources + ?Sized,
    {
        let tiled: HashSet<(LanguageBufferId, GrowingSpanHandle)> = self
            .tiles
            .iter()
            .filter_map(|tile| match *tile {
                ViewTile::Language { buffer, span, .. } => Some((buffer, span)),
                ViewTile::Disk { .. } => None,
            })
            .collect();

        let registered: Vec<_> = self.languages.iter().copied().collect();
        let mut affected = Vec::new();
        for buffer in registered {
            let mut disconnected = 0;
            for span in sources.live_spans(buffer) {
                if !tiled.contains(&(buffer, span.handle))
                    && sources.disconnect(buffer, span.handle)
                {
                    disconnected += 1;
                }
            }
            if disconnected > 0 {
                tracing::debug!(
                    buffer = buffer.get(),
                    disconnected,
                    "disconnected untiled spans"
                );
                affected.push(buffer);
            }
        }

        for buffer in affected {
            sources.prune_disconnected(buffer, self);
        }
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut Vec<ViewTile> {
        &mut self.tiles
    }

    pub(crate) fn view_mut(&mut self) -> &mut TextBuffer {
        &mut self.view
    }
}
