//! Structured text change deltas.
//!
//! Every buffer in a projection graph (disk, composed view, language buffers) reports its text
//! changes as a [`TextDelta`], so that incremental consumers can follow a buffer without diffing
//! old/new text themselves. Deltas are expressed in **character offsets** (Unicode scalar
//! values).

use crate::policy::EditPolicy;

/// A single text edit expressed in character offsets.
///
/// Semantics:
/// - `start` is a character offset in the buffer **at the time this edit is applied**.
/// - The deleted range is defined by the length (in `char`s) of `deleted_text`.
/// - Edits inside a [`TextDelta`] must be applied **in order** to transform the "before" buffer
///   into the "after" buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDeltaEdit {
    /// Start character offset of the edit.
    pub start: usize,
    /// Exact deleted text (may be empty).
    pub deleted_text: String,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
}

impl TextDeltaEdit {
    /// Length of `deleted_text` in characters.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Exclusive end character offset in the pre-edit buffer.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.deleted_len())
    }
}

/// A structured description of a buffer text change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    /// Character count before applying `edits`.
    pub before_char_count: usize,
    /// Character count after applying `edits`.
    pub after_char_count: usize,
    /// Ordered list of edits that transforms the "before" buffer into the "after" buffer.
    pub edits: Vec<TextDeltaEdit>,
    /// The policy that produced `edits`.
    pub policy: EditPolicy,
}

impl TextDelta {
    /// Returns `true` if this delta contains no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Describe the change from `old` to `new` under `policy`.
    ///
    /// - [`EditPolicy::MinimalDiff`] trims the common prefix and suffix and reports at most one
    ///   edit covering the changed region (no edit at all when the texts are equal).
    /// - [`EditPolicy::NonMinimal`] does not compare the texts: it reports one edit replacing
    ///   the whole buffer (unless both texts are empty).
    pub fn between(old: &str, new: &str, policy: EditPolicy) -> Self {
        let before_char_count = old.chars().count();
        let after_char_count = new.chars().count();

        let edits = match policy {
            EditPolicy::NonMinimal => {
                if old.is_empty() && new.is_empty() {
                    Vec::new()
                } else {
                    vec![TextDeltaEdit {
                        start: 0,
                        deleted_text: old.to_string(),
                        inserted_text: new.to_string(),
                    }]
                }
            }
            EditPolicy::MinimalDiff => minimal_edit(old, new).into_iter().collect(),
        };

        Self {
            before_char_count,
            after_char_count,
            edits,
            policy,
        }
    }

    /// Apply this delta to `text`, returning the "after" text.
    pub fn apply_to(&self, text: &str) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        for edit in &self.edits {
            let start = edit.start.min(chars.len());
            let end = edit.end().min(chars.len());
            chars.splice(start..end, edit.inserted_text.chars());
        }
        chars.into_iter().collect()
    }
}

fn minimal_edit(old: &str, new: &str) -> Option<TextDeltaEdit> {
    if old == new {
        return None;
    }

    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let prefix = old_chars
        .iter()
        .zip(&new_chars)
        .take_while(|(a, b)| a == b)
        .count();

    // The suffix must not run into the shared prefix on either side.
    let max_suffix = old_chars.len().min(new_chars.len()) - prefix;
    let suffix = old_chars
        .iter()
        .rev()
        .zip(new_chars.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    Some(TextDeltaEdit {
        start: prefix,
        deleted_text: old_chars[prefix..old_chars.len() - suffix].iter().collect(),
        inserted_text: new_chars[prefix..new_chars.len() - suffix].iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_diff_trims_prefix_and_suffix() {
        let delta = TextDelta::between("hello world", "hello brave world", EditPolicy::MinimalDiff);
        assert_eq!(delta.before_char_count, 11);
        assert_eq!(delta.after_char_count, 17);
        assert_eq!(
            delta.edits,
            vec![TextDeltaEdit {
                start: 6,
                deleted_text: String::new(),
                inserted_text: "brave ".to_string(),
            }]
        );
        assert_eq!(delta.apply_to("hello world"), "hello brave world");
    }

    #[test]
    fn test_minimal_diff_of_equal_text_is_empty() {
        let delta = TextDelta::between("same", "same", EditPolicy::MinimalDiff);
        assert!(delta.is_empty());
    }

    #[test]
    fn test_minimal_diff_repeated_characters() {
        // Prefix and suffix overlap candidates: "aaa" -> "aa" must delete exactly one char.
        let delta = TextDelta::between("aaa", "aa", EditPolicy::MinimalDiff);
        assert_eq!(delta.edits.len(), 1);
        assert_eq!(delta.edits[0].deleted_len(), 1);
        assert_eq!(delta.edits[0].inserted_len(), 0);
        assert_eq!(delta.apply_to("aaa"), "aa");
    }

    #[test]
    fn test_non_minimal_replaces_everything() {
        let delta = TextDelta::between("abc", "abd", EditPolicy::NonMinimal);
        assert_eq!(delta.edits.len(), 1);
        assert_eq!(delta.edits[0].start, 0);
        assert_eq!(delta.edits[0].deleted_text, "abc");
        assert_eq!(delta.edits[0].inserted_text, "abd");
        assert_eq!(delta.policy, EditPolicy::NonMinimal);

        let empty = TextDelta::between("", "", EditPolicy::NonMinimal);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let delta = TextDelta::between("你好世界", "你好, 世界", EditPolicy::MinimalDiff);
        assert_eq!(delta.edits[0].start, 2);
        assert_eq!(delta.edits[0].inserted_text, ", ");
        assert_eq!(delta.edits[0].end(), 2);
    }
}
