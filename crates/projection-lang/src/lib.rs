#![warn(missing_docs)]
//! `projection-lang` - content type descriptors for `projection-core`.
//!
//! This crate intentionally stays lightweight and does **not** know anything about parsing or
//! highlighting. It only names the kinds of content a buffer can hold, so that hosts and the
//! projection engine agree on which secondary buffer carries which embedded language.

use std::borrow::Cow;
use std::fmt;

/// Content type tag attached to every buffer (disk, view and language buffers).
///
/// Names are compared case-insensitively: [`ContentType::new`] normalizes them to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentType(Cow<'static, str>);

impl ContentType {
    /// Plain text (the default).
    pub const TEXT: Self = Self(Cow::Borrowed("text"));
    /// R source code.
    pub const R: Self = Self(Cow::Borrowed("r"));
    /// R Markdown documents (Markdown with embedded R chunks).
    pub const RMARKDOWN: Self = Self(Cow::Borrowed("rmarkdown"));
    /// HTML documents.
    pub const HTML: Self = Self(Cow::Borrowed("html"));
    /// CSS style sheets.
    pub const CSS: Self = Self(Cow::Borrowed("css"));
    /// JavaScript.
    pub const JAVASCRIPT: Self = Self(Cow::Borrowed("javascript"));
    /// Neutral content type.
    ///
    /// Buffers are switched to this type and back to force downstream consumers to
    /// re-initialize; nothing should ever classify or parse inert content.
    pub const INERT: Self = Self(Cow::Borrowed("inert"));

    const WELL_KNOWN: [Self; 7] = [
        Self::TEXT,
        Self::R,
        Self::RMARKDOWN,
        Self::HTML,
        Self::CSS,
        Self::JAVASCRIPT,
        Self::INERT,
    ];

    /// Create a content type from a name.
    ///
    /// Well-known names resolve to the shared constants; anything else is stored lowercased.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim().to_lowercase();
        Self::WELL_KNOWN
            .into_iter()
            .find(|known| known.name() == name)
            .unwrap_or(Self(Cow::Owned(name)))
    }

    /// The normalized content type name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the neutral [`ContentType::INERT`] type.
    pub fn is_inert(&self) -> bool {
        *self == Self::INERT
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::TEXT
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for ContentType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
