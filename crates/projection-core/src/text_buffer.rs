//! Rope-backed text buffers and immutable snapshots.
//!
//! Every buffer of a projection graph stores its text in a [`Rope`], which gives O(log N)
//! character-offset edits and O(1) snapshots (ropes are cheap to clone).

use crate::delta::{TextDelta, TextDeltaEdit};
use crate::error::ProjectionError;
use crate::policy::EditPolicy;
use projection_lang::ContentType;
use ropey::Rope;
use std::ops::Range;

/// Immutable view of a buffer's text at one version.
#[derive(Debug, Clone)]
pub struct TextSnapshot {
    rope: Rope,
    version: u64,
}

impl TextSnapshot {
    /// Version of the buffer this snapshot was taken from.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the snapshot holds no text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full text of the snapshot.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text of `range`, clamped to the snapshot bounds.
    pub fn text_range(&self, range: Range<usize>) -> String {
        slice_clamped(&self.rope, range)
    }
}

/// A mutable text buffer with a content type and a version counter.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    content_type: ContentType,
    version: u64,
}

impl TextBuffer {
    /// Create a buffer holding `text`.
    pub fn new(text: &str, content_type: ContentType) -> Self {
        Self {
            rope: Rope::from_str(text),
            content_type,
            version: 0,
        }
    }

    /// Take an immutable snapshot of the current text.
    pub fn snapshot(&self) -> TextSnapshot {
        TextSnapshot {
            rope: self.rope.clone(),
            version: self.version,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current version; bumped by every text or content type change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text of `range`, clamped to the buffer bounds.
    pub fn text_range(&self, range: Range<usize>) -> String {
        slice_clamped(&self.rope, range)
    }

    /// Content type tag.
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Change the content type. Returns the previous type if it actually changed.
    pub fn set_content_type(&mut self, content_type: ContentType) -> Option<ContentType> {
        if self.content_type == content_type {
            return None;
        }
        self.version += 1;
        Some(std::mem::replace(&mut self.content_type, content_type))
    }

    /// Replace `range` with `text`.
    pub fn replace(
        &mut self,
        range: Range<usize>,
        text: &str,
    ) -> Result<TextDeltaEdit, ProjectionError> {
        let len = self.len();
        if range.start > range.end || range.end > len {
            return Err(ProjectionError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }

        let deleted_text = self.rope.slice(range.clone()).to_string();
        if !range.is_empty() {
            self.rope.remove(range.clone());
        }
        if !text.is_empty() {
            self.rope.insert(range.start, text);
        }
        self.version += 1;

        Ok(TextDeltaEdit {
            start: range.start,
            deleted_text,
            inserted_text: text.to_string(),
        })
    }

    /// Replace the whole text, reporting the change under `policy`.
    pub fn set_text(&mut self, text: &str, policy: EditPolicy) -> TextDelta {
        let old = self.rope.to_string();
        let delta = TextDelta::between(&old, text, policy);
        if !delta.is_empty() {
            self.rope = Rope::from_str(text);
            self.version += 1;
        }
        delta
    }
}

fn slice_clamped(rope: &Rope, range: Range<usize>) -> String {
    let len = rope.len_chars();
    let end = range.end.min(len);
    let start = range.start.min(end);
    rope.slice(start..end).to_string()
}
