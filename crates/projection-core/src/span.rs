//! Buffer identities and source spans.
//!
//! A projected buffer is made of spans taken from other buffers. Instead of comparing live
//! buffer handles to find out who owns a span, every span carries a [`SpanOwner`] tag.

use std::ops::Range;

/// Opaque identifier for a language (secondary) buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LanguageBufferId(pub(crate) u64);

impl LanguageBufferId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// The buffer a span's text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanOwner {
    /// The primary (disk) buffer.
    Disk,
    /// A language buffer.
    Language(LanguageBufferId),
}

impl SpanOwner {
    /// Returns `true` for spans owned by the disk buffer.
    pub fn is_disk(self) -> bool {
        matches!(self, SpanOwner::Disk)
    }

    /// The language buffer id, if this span is owned by one.
    pub fn language(self) -> Option<LanguageBufferId> {
        match self {
            SpanOwner::Disk => None,
            SpanOwner::Language(id) => Some(id),
        }
    }
}

/// A constituent span of a buffer snapshot: a range in the owner's coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    /// Buffer the text comes from.
    pub owner: SpanOwner,
    /// Range in the owner's character offsets.
    pub range: Range<usize>,
}

impl SourceSpan {
    /// Create a source span.
    pub fn new(owner: SpanOwner, range: Range<usize>) -> Self {
        Self { owner, range }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns `true` for degenerate (zero-length) spans.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// A source span together with its current text, as handed to an
/// [`EditResolver`](crate::EditResolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSpan {
    /// Buffer the text comes from.
    pub owner: SpanOwner,
    /// Range in the owner's character offsets.
    pub range: Range<usize>,
    /// Text currently covered by `range`.
    pub text: String,
}

impl SnapshotSpan {
    /// Create a snapshot span. `text` must be the owner's text for `range`.
    pub fn new(owner: SpanOwner, range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            owner,
            range,
            text: text.into(),
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns `true` for degenerate (zero-length) spans.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// A position in one of the buffers a projected buffer is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotPoint {
    /// Buffer the position belongs to.
    pub owner: SpanOwner,
    /// Character offset in the owner's coordinates.
    pub position: usize,
}

impl SnapshotPoint {
    /// Create a snapshot point.
    pub fn new(owner: SpanOwner, position: usize) -> Self {
        Self { owner, position }
    }
}
