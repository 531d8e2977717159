//! Error types.

use crate::span::LanguageBufferId;
use projection_lang::ContentType;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by the projection engine.
pub enum ProjectionError {
    #[error("invalid range {start}..{end} for a buffer of length {len}")]
    /// A character range does not fit the target buffer.
    InvalidRange {
        /// Inclusive start character offset.
        start: usize,
        /// Exclusive end character offset.
        end: usize,
        /// Length of the buffer the range was checked against.
        len: usize,
    },

    #[error("invalid mapping at index {index}: {violation}")]
    /// A mapping passed to `set_text_and_mappings` / `set_mappings` is malformed.
    InvalidMapping {
        /// Index of the offending mapping in the caller's slice.
        index: usize,
        /// What is wrong with it.
        violation: MappingViolation,
    },

    #[error("language buffer {0:?} not found")]
    /// A language buffer id was not found.
    LanguageBufferNotFound(LanguageBufferId),

    #[error("a language buffer for content type '{0}' already exists")]
    /// Only one language buffer per content type is allowed per document.
    ContentTypeAlreadyOpen(ContentType),

    #[error("projected spans {first:?} and {second:?} overlap in the disk buffer")]
    /// Two live spans claim the same disk text; the composed view cannot be built.
    OverlappingSpans {
        /// The earlier span (disk offsets).
        first: Range<usize>,
        /// The span overlapping it (disk offsets).
        second: Range<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
/// The ways a single mapping can be malformed.
pub enum MappingViolation {
    #[error("primary range ends at {end} past the disk buffer length {len}")]
    /// The primary range does not fit the disk buffer.
    PrimaryOutOfBounds {
        /// Exclusive primary end offset.
        end: usize,
        /// Disk buffer length.
        len: usize,
    },

    #[error("secondary start {start} precedes the end {previous_end} of the previous mapping")]
    /// Mappings must be ordered and non-overlapping in secondary space.
    SecondaryOutOfOrder {
        /// Secondary start offset of the offending mapping.
        start: usize,
        /// Secondary end offset of the previous mapping.
        previous_end: usize,
    },
}
