#![warn(missing_docs)]
//! Projection Core - Headless Contained-Language Projection Engine
//!
//! # Overview
//!
//! `projection-core` keeps a primary ("disk") document and the secondary ("language") buffers of
//! the languages embedded in it in sync: R chunks inside R Markdown, CSS and JavaScript inside
//! HTML. Language services describe which disk ranges belong to their buffer with
//! [`ProjectionMapping`]s; the engine maintains the language buffers, a composed view stitched
//! from disk and language spans, and routes every edit to the buffers it touches.
//!
//! It does not parse anything. Mappings always come from a language service.
//!
//! # Core Features
//!
//! - **Bidirectional mapping**: disk ↔ language buffer positions through an interval index
//! - **Live segments**: mapped regions of a language buffer follow disk edits as growing spans
//! - **Composed view**: tiles of disk and language text, rebuilt under a re-entrancy-safe
//!   state machine
//! - **Edit resolution**: boundary edits are split between buffers by a pluggable [`EditResolver`]
//! - **Change notifications**: two-phase mapping events and per-buffer [`TextDelta`]s
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ProjectionBufferManager                    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Edit Resolver (boundary edit allocation)   │  ← Edit Routing
//! ├─────────────────────────────────────────────┤
//! │  View Composer (tiles, Idle/Composing)      │  ← Composed View
//! ├─────────────────────────────────────────────┤
//! │  Language Projections (segments, spans)     │  ← Secondary Buffers
//! ├─────────────────────────────────────────────┤
//! │  Mapping Index + Growing Span Arena         │  ← Position Tracking
//! ├─────────────────────────────────────────────┤
//! │  Rope Text Buffers + Deltas                 │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use projection_core::{ProjectionBufferManager, ProjectionMapping};
//! use projection_lang::ContentType;
//!
//! let mut manager =
//!     ProjectionBufferManager::new("<style>.a{color:red}</style>", ContentType::HTML);
//! let css = manager.create_language_buffer(ContentType::CSS).unwrap();
//!
//! manager
//!     .set_text_and_mappings(css, ".a{color:red}", &[ProjectionMapping::new(7, 0, 13)])
//!     .unwrap();
//!
//! // Typing inside the rule reaches the CSS buffer.
//! manager.edit_view(19..19, ";").unwrap();
//! assert_eq!(manager.language_text(css).unwrap(), ".a{color:red;}");
//! assert_eq!(manager.view_text(), "<style>.a{color:red;}</style>");
//!
//! assert_eq!(manager.map_view_to_language(10), Some((css, 3)));
//! assert_eq!(manager.map_view_to_language(2), None);
//! ```
//!
//! # Module Description
//!
//! - [`text_buffer`] - Rope-backed buffers and snapshots
//! - [`mapping`] - Projection mappings
//! - [`intervals`] - Mapping lookup
//! - [`growing`] - Growing span arena
//! - [`language`] - Language buffer synchronizer
//! - [`composer`] - Composed view
//! - [`resolver`] - Boundary edit allocation
//! - [`manager`] - Facade over all of the above

pub mod composer;
pub mod delta;
pub mod error;
pub mod events;
pub mod growing;
pub mod intervals;
pub mod language;
pub mod manager;
pub mod mapping;
pub mod policy;
pub mod resolver;
pub mod span;
pub mod text_buffer;

pub use composer::{ComposeSources, ComposeState, ViewComposer, ViewTile};
pub use delta::{TextDelta, TextDeltaEdit};
pub use error::{MappingViolation, ProjectionError};
pub use events::{BufferTarget, EditOrigin, ProjectionEvent, ProjectionEventCallback};
pub use growing::{GrowingSpan, GrowingSpanArena, GrowingSpanHandle};
pub use intervals::{MappingIndex, TraversedSpan};
pub use language::{LanguageProjection, LanguageSegment, LanguageUpdate, LiveSpan};
pub use manager::ProjectionBufferManager;
pub use mapping::{ExtraData, ProjectionMapping, TrailingInclusion};
pub use policy::{EditPolicy, MINIMAL_DIFF_LENGTH_DELTA, MINIMAL_DIFF_SEGMENT_DELTA};
pub use resolver::{EditResolver, LanguageEditResolver};
pub use span::{LanguageBufferId, SnapshotPoint, SnapshotSpan, SourceSpan, SpanOwner};
pub use text_buffer::{TextBuffer, TextSnapshot};
