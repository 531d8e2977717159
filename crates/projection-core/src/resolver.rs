//! Allocation of edits that straddle span boundaries.
//!
//! When an edit touches more than one tile of the composed view, the inserted text has to be
//! split between the buffers owning those tiles. An [`EditResolver`] decides the split:
//!
//! - **insertions** at a boundary go to exactly one candidate;
//! - **replacements** are partitioned so that the concatenation of the per-span pieces is the
//!   inserted text, in order.
//!
//! [`LanguageEditResolver`] favours the disk buffer: text typed at a boundary stays in the host
//! document, and when a replacement rewrites both sides of a boundary the disk text is located
//! in the new text by its leading and trailing delimiters (e.g. `</style>`).

use crate::span::{SnapshotPoint, SnapshotSpan};
use std::ops::Range;

/// Splits boundary edits between the buffers of a composed view.
pub trait EditResolver {
    /// Decide how many characters of `text` go to each of the candidate insertion points.
    ///
    /// The sizes must sum to the character count of `text`.
    fn resolve_insertion_sizes(
        &self,
        insertion_point: usize,
        source_points: &[SnapshotPoint],
        text: &str,
    ) -> Vec<usize>;

    /// Partition `text` among the spans replaced by an edit of `replacement_span`.
    ///
    /// Returns one non-negative size per span; the sizes must sum to the character count of
    /// `text`.
    fn resolve_replacement_sizes(
        &self,
        replacement_span: Range<usize>,
        source_spans: &[SnapshotSpan],
        text: &str,
    ) -> Vec<usize>;

    /// Index of the candidate a caret at `insertion_point` maps to by default.
    fn typical_insertion_position(
        &self,
        insertion_point: usize,
        source_points: &[SnapshotPoint],
    ) -> usize;
}

/// Default resolver for contained-language documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageEditResolver;

impl LanguageEditResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }
}

impl EditResolver for LanguageEditResolver {
    fn resolve_insertion_sizes(
        &self,
        insertion_point: usize,
        source_points: &[SnapshotPoint],
        text: &str,
    ) -> Vec<usize> {
        let total = text.chars().count();
        let mut sizes = vec![0; source_points.len()];
        let target = source_points
            .iter()
            .position(|point| point.owner.is_disk())
            .or_else(|| source_points.len().checked_sub(1));
        if let Some(target) = target {
            sizes[target] = total;
        }
        tracing::trace!(insertion_point, ?target, total, "resolved insertion");
        sizes
    }

    fn resolve_replacement_sizes(
        &self,
        replacement_span: Range<usize>,
        source_spans: &[SnapshotSpan],
        text: &str,
    ) -> Vec<usize> {
        let sizes = replacement_sizes(source_spans, text);
        tracing::trace!(?replacement_span, ?sizes, "resolved replacement");
        debug_assert_eq!(sizes.len(), source_spans.len());
        debug_assert_eq!(sizes.iter().sum::<usize>(), text.chars().count());
        sizes
    }

    fn typical_insertion_position(
        &self,
        _insertion_point: usize,
        source_points: &[SnapshotPoint],
    ) -> usize {
        source_points
            .iter()
            .position(|point| point.owner.is_disk())
            .unwrap_or_else(|| source_points.len().saturating_sub(1))
    }
}

fn replacement_sizes(spans: &[SnapshotSpan], text: &str) -> Vec<usize> {
    let total = text.chars().count();
    match spans.len() {
        0 => return Vec::new(),
        1 => return vec![total],
        _ => {}
    }

    let first_disk = spans.iter().position(|span| span.owner.is_disk());

    // Nothing of a language buffer is being replaced: the edit belongs to the disk text.
    if spans
        .iter()
        .all(|span| span.owner.is_disk() || span.is_empty())
        && let Some(disk) = first_disk
    {
        return route_all(spans.len(), disk, total);
    }

    // A single boundary with an empty disk side: the edit belongs to the language.
    if spans.len() == 2
        && let [a, b] = spans
        && a.owner.is_disk() != b.owner.is_disk()
    {
        let (disk, other) = if a.owner.is_disk() { (0, 1) } else { (1, 0) };
        if spans[disk].is_empty() {
            return route_all(2, other, total);
        }
    }

    let Some(disk) = spans
        .iter()
        .position(|span| span.owner.is_disk() && !span.is_empty())
        .or(first_disk)
    else {
        return proportional(spans, total);
    };

    let haystack = lowered(text);
    let range = match_delimiters(spans, disk, &haystack)
        .or_else(|| match_neighbours(spans, disk, &haystack))
        .unwrap_or_else(|| proportional_range(spans, disk, total));
    tracing::trace!(disk, ?range, "located disk text in replacement");

    allocate(spans.len(), disk, range, total)
}

fn route_all(len: usize, target: usize, total: usize) -> Vec<usize> {
    let mut sizes = vec![0; len];
    sizes[target] = total;
    sizes
}

/// Spans before `disk` share `[0, start)`, `disk` gets `[start, end)`, the rest get the tail.
fn allocate(len: usize, disk: usize, range: Range<usize>, total: usize) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(len);
    let mut consumed = 0usize;
    for index in 0..len {
        let target = match index.cmp(&disk) {
            std::cmp::Ordering::Less => range.start,
            std::cmp::Ordering::Equal => range.end,
            std::cmp::Ordering::Greater => total,
        };
        let size = target.min(total).saturating_sub(consumed);
        sizes.push(size);
        consumed += size;
    }
    if let Some(last) = sizes.last_mut() {
        *last += total - consumed;
    }
    sizes
}

/// Old lengths, clamped to the new text; the last span takes the rest.
fn proportional(spans: &[SnapshotSpan], total: usize) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(spans.len());
    let mut consumed = 0usize;
    for span in spans {
        let size = span.len().min(total - consumed);
        sizes.push(size);
        consumed += size;
    }
    if let Some(last) = sizes.last_mut() {
        *last += total - consumed;
    }
    sizes
}

/// The disk text starts after as many characters as the span right before it held.
fn proportional_range(spans: &[SnapshotSpan], disk: usize, total: usize) -> Range<usize> {
    let start = disk
        .checked_sub(1)
        .map_or(0, |previous| spans[previous].len())
        .min(total);
    let end = if disk + 1 == spans.len() {
        total
    } else {
        (start + spans[disk].len()).min(total)
    };
    start..end
}

fn lowered(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

#[derive(Debug)]
struct Delimiters {
    core: Vec<char>,
    start: Vec<char>,
    end: Vec<char>,
    leading_whitespace: usize,
    trailing_whitespace: usize,
}

impl Delimiters {
    /// Split `text` into surrounding whitespace, the first and the last non-whitespace runs.
    fn of(text: &str) -> Option<Self> {
        let chars = lowered(text);
        let leading_whitespace = chars.iter().take_while(|c| c.is_whitespace()).count();
        if leading_whitespace == chars.len() {
            return None;
        }
        let trailing_whitespace = chars.iter().rev().take_while(|c| c.is_whitespace()).count();
        let core = chars[leading_whitespace..chars.len() - trailing_whitespace].to_vec();
        let start_len = core.iter().take_while(|c| !c.is_whitespace()).count();
        let end_len = core.iter().rev().take_while(|c| !c.is_whitespace()).count();

        Some(Self {
            start: core[..start_len].to_vec(),
            end: core[core.len() - end_len..].to_vec(),
            core,
            leading_whitespace,
            trailing_whitespace,
        })
    }

    fn is_single_token(&self) -> bool {
        self.start.len() == self.core.len()
    }
}

/// Non-overlapping occurrences of `needle` in `haystack`.
fn count_occurrences(haystack: &[char], needle: &[char]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut pos = 0;
    while pos + needle.len() <= haystack.len() {
        if haystack[pos..pos + needle.len()] == *needle {
            count += 1;
            pos += needle.len();
        } else {
            pos += 1;
        }
    }
    count
}

/// Start of the occurrence of `needle` found after skipping `skip` earlier ones, searching
/// from `from`.
fn find_nth(haystack: &[char], needle: &[char], from: usize, skip: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let mut remaining = skip;
    let mut pos = from;
    while pos + needle.len() <= haystack.len() {
        if haystack[pos..pos + needle.len()] == *needle {
            if remaining == 0 {
                return Some(pos);
            }
            remaining -= 1;
            pos += needle.len();
        } else {
            pos += 1;
        }
    }
    None
}

fn match_delimiters(
    spans: &[SnapshotSpan],
    disk: usize,
    haystack: &[char],
) -> Option<Range<usize>> {
    let delimiters = Delimiters::of(&spans[disk].text)?;
    let skip = disk
        .checked_sub(1)
        .map_or(0, |prev| count_occurrences(&lowered(&spans[prev].text), &delimiters.start));

    let start = find_nth(haystack, &delimiters.start, 0, skip)?;
    let end = if delimiters.is_single_token() {
        start + delimiters.start.len()
    } else {
        let nth = count_occurrences(&delimiters.core, &delimiters.end).saturating_sub(1);
        find_nth(haystack, &delimiters.end, start, nth)? + delimiters.end.len()
    };

    let mut expanded_start = start;
    for _ in 0..delimiters.leading_whitespace {
        match expanded_start.checked_sub(1) {
            Some(prev) if haystack[prev].is_whitespace() => expanded_start = prev,
            _ => break,
        }
    }
    let mut expanded_end = end;
    for _ in 0..delimiters.trailing_whitespace {
        match haystack.get(expanded_end) {
            Some(c) if c.is_whitespace() => expanded_end += 1,
            _ => break,
        }
    }

    Some(expanded_start..expanded_end)
}

/// Locate the disk text between the nearest delimited spans on either side.
fn match_neighbours(
    spans: &[SnapshotSpan],
    disk: usize,
    haystack: &[char],
) -> Option<Range<usize>> {
    let start = if disk == 0 {
        0
    } else {
        let (index, delimiters) = (0..disk)
            .rev()
            .find_map(|index| Delimiters::of(&spans[index].text).map(|d| (index, d)))?;
        let before = lowered(&concat(&spans[..=index]));
        let nth = count_occurrences(&before, &delimiters.end).saturating_sub(1);
        find_nth(haystack, &delimiters.end, 0, nth)? + delimiters.end.len()
    };

    let end = if disk + 1 == spans.len() {
        haystack.len()
    } else {
        let (index, delimiters) = (disk + 1..spans.len())
            .find_map(|index| Delimiters::of(&spans[index].text).map(|d| (index, d)))?;
        let before = lowered(&concat(&spans[..index]));
        let skip = count_occurrences(&before, &delimiters.start);
        find_nth(haystack, &delimiters.start, 0, skip)?
    };

    (start <= end).then_some(start..end)
}

fn concat(spans: &[SnapshotSpan]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{LanguageBufferId, SpanOwner};

    const CSS: SpanOwner = SpanOwner::Language(LanguageBufferId(0));

    fn disk(start: usize, text: &str) -> SnapshotSpan {
        SnapshotSpan::new(SpanOwner::Disk, start..start + text.chars().count(), text)
    }

    fn css(start: usize, text: &str) -> SnapshotSpan {
        SnapshotSpan::new(CSS, start..start + text.chars().count(), text)
    }

    fn sizes(spans: &[SnapshotSpan], text: &str) -> Vec<usize> {
        LanguageEditResolver.resolve_replacement_sizes(0..0, spans, text)
    }

    #[test]
    fn test_insertion_goes_to_first_disk_candidate() {
        let points = [
            SnapshotPoint::new(CSS, 13),
            SnapshotPoint::new(SpanOwner::Disk, 20),
            SnapshotPoint::new(SpanOwner::Disk, 20),
        ];
        assert_eq!(
            LanguageEditResolver.resolve_insertion_sizes(20, &points, "abc"),
            vec![0, 3, 0]
        );
        assert_eq!(
            LanguageEditResolver.typical_insertion_position(20, &points),
            1
        );
    }

    #[test]
    fn test_insertion_without_disk_candidate_goes_to_last() {
        let other = SpanOwner::Language(LanguageBufferId(1));
        let points = [SnapshotPoint::new(CSS, 4), SnapshotPoint::new(other, 0)];
        assert_eq!(
            LanguageEditResolver.resolve_insertion_sizes(4, &points, "xy"),
            vec![0, 2]
        );
        assert_eq!(
            LanguageEditResolver.typical_insertion_position(4, &points),
            1
        );
        assert_eq!(LanguageEditResolver.typical_insertion_position(4, &[]), 0);
    }

    #[test]
    fn test_trivial_replacements() {
        assert_eq!(sizes(&[], "abc"), Vec::<usize>::new());
        assert_eq!(sizes(&[css(0, "x")], "abc"), vec![3]);
    }

    #[test]
    fn test_empty_language_spans_route_to_disk() {
        let spans = [css(4, ""), disk(10, "abc"), css(4, "")];
        assert_eq!(sizes(&spans, "xyz"), vec![0, 3, 0]);
    }

    #[test]
    fn test_empty_disk_span_routes_to_language() {
        let spans = [disk(5, ""), css(5, "foo")];
        assert_eq!(sizes(&spans, "barfoo"), vec![0, 6]);

        let spans = [css(2, "foo"), disk(5, "")];
        assert_eq!(sizes(&spans, "foobar"), vec![6, 0]);
    }

    #[test]
    fn test_locates_closing_tag() {
        let spans = [css(0, ".a{}"), disk(11, "</style>")];
        assert_eq!(sizes(&spans, ".b{}</style>"), vec![4, 8]);
        assert_eq!(sizes(&spans, ".bb{}</STYLE>"), vec![5, 8]);
    }

    #[test]
    fn test_skips_occurrences_in_preceding_span() {
        let spans = [css(0, "x</b>y"), disk(6, "</b>"), css(6, "z")];
        assert_eq!(sizes(&spans, "x</b>yy</b>zz"), vec![7, 4, 2]);
    }

    #[test]
    fn test_expands_over_surrounding_whitespace() {
        let spans = [css(0, "a"), disk(1, " <hr> "), css(1, "b")];
        assert_eq!(sizes(&spans, "aa <hr> bb"), vec![2, 6, 2]);

        // Only as much whitespace as the old disk text had.
        assert_eq!(sizes(&spans, "aa   <hr>bb"), vec![4, 5, 2]);
    }

    #[test]
    fn test_multi_token_disk_text() {
        let spans = [css(0, "x"), disk(1, "</style>\n<p>")];
        assert_eq!(sizes(&spans, "xy</style>\n<p>"), vec![2, 12]);

        let spans = [css(0, "x"), disk(1, "<p> a <p>"), css(1, "y")];
        assert_eq!(sizes(&spans, "xx<p> b <p>yy"), vec![2, 9, 2]);
    }

    #[test]
    fn test_falls_back_to_neighbour_delimiters() {
        let spans = [css(0, "a;"), disk(2, "  "), css(2, "b;")];
        assert_eq!(sizes(&spans, "a;\n\nb;"), vec![2, 2, 2]);
    }

    #[test]
    fn test_falls_back_to_proportional_split() {
        let spans = [css(0, "abc"), disk(3, "<x>"), css(3, "def")];
        assert_eq!(sizes(&spans, "123456789"), vec![3, 3, 3]);
        assert_eq!(sizes(&spans, "1234"), vec![3, 1, 0]);
    }

    #[test]
    fn test_proportional_split_starts_after_the_previous_span() {
        let other = SpanOwner::Language(LanguageBufferId(1));
        let spans = [
            css(0, "ab"),
            SnapshotSpan::new(other, 0..2, "cd"),
            disk(2, "<x>"),
            css(2, "ef"),
        ];
        assert_eq!(sizes(&spans, "12345678"), vec![2, 0, 3, 3]);
        assert_eq!(sizes(&spans, "1"), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_without_disk_spans_splits_by_old_length() {
        let other = SpanOwner::Language(LanguageBufferId(1));
        let spans = [
            css(0, "ab"),
            SnapshotSpan::new(other, 0..3, "cde"),
        ];
        assert_eq!(sizes(&spans, "1234567"), vec![2, 5]);
        assert_eq!(sizes(&spans, "1"), vec![1, 0]);
    }
}
