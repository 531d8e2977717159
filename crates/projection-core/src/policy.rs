//! Edit policies for span replacement.
//!
//! Replacing the span list of a buffer can report its text change either as a narrow diff or
//! as one whole-buffer replacement. Diffing is only worth it when the old and new span lists
//! are similar; large rewrites switch to the cheap policy.

/// Largest difference in segment count that still uses [`EditPolicy::MinimalDiff`].
pub const MINIMAL_DIFF_SEGMENT_DELTA: usize = 10;

/// Largest difference in total character length that still uses [`EditPolicy::MinimalDiff`].
pub const MINIMAL_DIFF_LENGTH_DELTA: usize = 10_000;

/// How much diffing work a span replacement performs when reporting its text change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPolicy {
    /// Trim the common prefix and suffix and report only the changed region.
    #[default]
    MinimalDiff,
    /// Report a single replacement of the whole buffer without comparing text.
    NonMinimal,
}

impl EditPolicy {
    /// Pick the policy for replacing a span list.
    ///
    /// `MinimalDiff` unless the segment counts differ by more than
    /// [`MINIMAL_DIFF_SEGMENT_DELTA`] or the total lengths differ by more than
    /// [`MINIMAL_DIFF_LENGTH_DELTA`].
    pub fn for_span_replacement(
        old_segments: usize,
        new_segments: usize,
        old_len: usize,
        new_len: usize,
    ) -> Self {
        if old_segments.abs_diff(new_segments) > MINIMAL_DIFF_SEGMENT_DELTA
            || old_len.abs_diff(new_len) > MINIMAL_DIFF_LENGTH_DELTA
        {
            EditPolicy::NonMinimal
        } else {
            EditPolicy::MinimalDiff
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_count_threshold() {
        assert_eq!(
            EditPolicy::for_span_replacement(0, 10, 0, 0),
            EditPolicy::MinimalDiff
        );
        assert_eq!(
            EditPolicy::for_span_replacement(0, 11, 0, 0),
            EditPolicy::NonMinimal
        );
        assert_eq!(
            EditPolicy::for_span_replacement(25, 14, 0, 0),
            EditPolicy::NonMinimal
        );
        assert_eq!(
            EditPolicy::for_span_replacement(25, 15, 0, 0),
            EditPolicy::MinimalDiff
        );
    }

    #[test]
    fn test_length_threshold() {
        assert_eq!(
            EditPolicy::for_span_replacement(3, 3, 100, 10_100),
            EditPolicy::MinimalDiff
        );
        assert_eq!(
            EditPolicy::for_span_replacement(3, 3, 100, 10_101),
            EditPolicy::NonMinimal
        );
        assert_eq!(
            EditPolicy::for_span_replacement(3, 3, 10_001, 0),
            EditPolicy::NonMinimal
        );
    }
}
