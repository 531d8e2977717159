mod common;

use pretty_assertions::assert_eq;
use projection_core::{
    EditResolver, LanguageEditResolver, ProjectionBufferManager, SnapshotSpan, SpanOwner,
};
use projection_lang::ContentType;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn css_owner() -> SpanOwner {
    let mut manager = ProjectionBufferManager::new("", ContentType::HTML);
    SpanOwner::Language(manager.create_language_buffer(ContentType::CSS).unwrap())
}

fn random_text(rng: &mut StdRng, max_len: usize) -> String {
    const PIECES: &[&str] = &[
        "a", "B", " ", "\n", "<", "/", ">", "{", "}", "</style>", "é",
    ];
    let len = rng.gen_range(0..=max_len);
    (0..len).map(|_| *PIECES.choose(rng).unwrap()).collect()
}

fn random_spans(rng: &mut StdRng, css: SpanOwner) -> Vec<SnapshotSpan> {
    let count = rng.gen_range(1..6);
    let mut offset = 0;
    (0..count)
        .map(|_| {
            let owner = if rng.gen_bool(0.5) {
                SpanOwner::Disk
            } else {
                css
            };
            let text = random_text(rng, 4);
            let len = text.chars().count();
            let span = SnapshotSpan::new(owner, offset..offset + len, text);
            offset += len;
            span
        })
        .collect()
}

#[test]
fn test_replacement_sizes_partition_the_text() {
    common::init_tracing();
    let resolver = LanguageEditResolver::new();
    let css = css_owner();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..5_000 {
        let spans = random_spans(&mut rng, css);
        let text = random_text(&mut rng, 12);
        let sizes = resolver.resolve_replacement_sizes(0..0, &spans, &text);

        assert_eq!(sizes.len(), spans.len(), "spans: {spans:?} text: {text:?}");
        assert_eq!(
            sizes.iter().sum::<usize>(),
            text.chars().count(),
            "spans: {spans:?} text: {text:?}"
        );
    }
}

#[test]
fn test_pure_disk_edits_go_to_the_first_disk_span() {
    let resolver = LanguageEditResolver::new();
    let css = css_owner();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let mut spans = random_spans(&mut rng, css);
        // Empty every language span and make sure there is a disk span.
        for span in &mut spans {
            if !span.owner.is_disk() {
                span.range = span.range.start..span.range.start;
                span.text.clear();
            }
        }
        if !spans.iter().any(|span| span.owner.is_disk()) {
            spans.push(SnapshotSpan::new(SpanOwner::Disk, 0..1, "x"));
        }
        let text = random_text(&mut rng, 10);
        let total = text.chars().count();

        let first_disk = spans.iter().position(|span| span.owner.is_disk()).unwrap();
        let mut expected = vec![0; spans.len()];
        expected[first_disk] = total;
        assert_eq!(
            resolver.resolve_replacement_sizes(0..0, &spans, &text),
            expected
        );
    }
}

#[test]
fn test_empty_disk_boundary_goes_to_the_language() {
    let resolver = LanguageEditResolver::new();
    let css = css_owner();

    let spans = [
        SnapshotSpan::new(SpanOwner::Disk, 5..5, ""),
        SnapshotSpan::new(css, 5..8, "foo"),
    ];
    assert_eq!(
        resolver.resolve_replacement_sizes(5..8, &spans, "barfoo"),
        vec![0, 6]
    );

    let spans = [
        SnapshotSpan::new(css, 0..3, "foo"),
        SnapshotSpan::new(SpanOwner::Disk, 3..3, ""),
    ];
    assert_eq!(
        resolver.resolve_replacement_sizes(0..3, &spans, "fooba"),
        vec![5, 0]
    );
}

#[test]
fn test_closing_tag_is_found_case_insensitively() {
    let resolver = LanguageEditResolver::new();
    let css = css_owner();

    // `.a{}</style>` selected and retyped.
    let spans = [
        SnapshotSpan::new(css, 0..4, ".a{}"),
        SnapshotSpan::new(SpanOwner::Disk, 11..19, "</style>"),
    ];
    assert_eq!(
        resolver.resolve_replacement_sizes(7..19, &spans, ".b { }\n</STYLE>"),
        vec![7, 8]
    );
}
