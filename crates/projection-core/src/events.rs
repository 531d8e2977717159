//! Change notifications.
//!
//! Mapping updates are reported in two phases: [`ProjectionEvent::MappingsChanging`] fires
//! before anything is mutated (observers can still read the old state through the manager's
//! accessors on their next turn), [`ProjectionEvent::MappingsChanged`] fires once the new
//! state is in place.

use crate::delta::TextDelta;
use crate::mapping::ProjectionMapping;
use crate::span::LanguageBufferId;
use projection_lang::ContentType;
use std::sync::Arc;

/// Buffer a text change happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// The disk (primary) buffer.
    Disk,
    /// The composed view.
    View,
    /// A language buffer.
    Language(LanguageBufferId),
}

/// Where an edit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOrigin {
    /// Edit applied to the disk buffer.
    Disk,
    /// Edit applied through the composed view.
    View,
    /// Text or mapping update from a language service.
    LanguageService,
}

/// Notification record.
#[derive(Debug, Clone)]
pub enum ProjectionEvent {
    /// Mappings of a language buffer are about to be replaced.
    MappingsChanging {
        /// Language buffer.
        buffer: LanguageBufferId,
        /// Mappings before the update.
        old_mappings: Vec<ProjectionMapping>,
    },
    /// Mappings of a language buffer were replaced.
    MappingsChanged {
        /// Language buffer.
        buffer: LanguageBufferId,
        /// New text of the language buffer.
        text: String,
        /// New mappings.
        mappings: Vec<ProjectionMapping>,
    },
    /// Text of a buffer changed.
    BufferChanged {
        /// Changed buffer.
        target: BufferTarget,
        /// What caused the change.
        origin: EditOrigin,
        /// The change.
        delta: Arc<TextDelta>,
    },
    /// Content type of a language buffer changed.
    ContentTypeChanged {
        /// Language buffer.
        buffer: LanguageBufferId,
        /// Previous content type.
        before: ContentType,
        /// New content type.
        after: ContentType,
    },
}

/// Projection event callback function type
pub type ProjectionEventCallback = Box<dyn FnMut(&ProjectionEvent) + Send>;
