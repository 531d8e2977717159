mod common;

use pretty_assertions::assert_eq;
use projection_core::{
    BufferTarget, EditOrigin, EditResolver, LanguageBufferId, ProjectionBufferManager,
    ProjectionEvent, ProjectionMapping, SnapshotPoint, SnapshotSpan, SpanOwner,
    TrailingInclusion, ViewTile,
};
use projection_lang::ContentType;
use std::ops::Range;

fn style(
    css_text: &str,
    disk: &str,
    mapping: ProjectionMapping,
) -> (ProjectionBufferManager, LanguageBufferId) {
    common::init_tracing();
    let mut manager = ProjectionBufferManager::new(disk, ContentType::HTML);
    let css = manager.create_language_buffer(ContentType::CSS).unwrap();
    manager
        .set_text_and_mappings(css, css_text, &[mapping])
        .unwrap();
    (manager, css)
}

#[test]
fn test_typing_at_an_exclusive_boundary_stays_in_the_disk_buffer() {
    let (mut manager, css) = style("a", "<style>a</style>", ProjectionMapping::new(7, 0, 1));

    // Right after the chunk.
    manager.edit_view(8..8, "X").unwrap();
    assert_eq!(manager.disk_text(), "<style>aX</style>");
    assert_eq!(manager.language_text(css).unwrap(), "a");
    assert_eq!(
        manager.mappings(css).unwrap(),
        vec![ProjectionMapping::new(7, 0, 1)]
    );

    // Right before the chunk: the chunk moves.
    manager.edit_view(7..7, "Y").unwrap();
    assert_eq!(manager.disk_text(), "<style>YaX</style>");
    assert_eq!(manager.language_text(css).unwrap(), "a");
    assert_eq!(
        manager.mappings(css).unwrap(),
        vec![ProjectionMapping::new(8, 0, 1)]
    );
    assert_eq!(manager.view_text(), manager.disk_text());
}

#[test]
fn test_inclusive_mapping_grows_at_its_end() {
    let mapping =
        ProjectionMapping::new(7, 0, 1).with_trailing_inclusion(TrailingInclusion::Inclusive);
    let (mut manager, css) = style("a", "<style>a</style>", mapping.clone());

    manager.edit_view(8..8, "X").unwrap();

    assert_eq!(manager.disk_text(), "<style>aX</style>");
    assert_eq!(manager.language_text(css).unwrap(), "aX");
    assert_eq!(
        manager.mappings(css).unwrap(),
        vec![ProjectionMapping {
            length: 2,
            ..mapping
        }]
    );
}

#[test]
fn test_replacement_across_a_boundary_is_split_by_delimiters() {
    let (mut manager, css) = style(
        ".a{}",
        "<style>.a{}</style>",
        ProjectionMapping::new(7, 0, 4),
    );

    manager.edit_view(7..19, ".bb{}</style>").unwrap();

    assert_eq!(manager.disk_text(), "<style>.bb{}</style>");
    assert_eq!(manager.language_text(css).unwrap(), ".bb{}");
    assert_eq!(
        manager.mappings(css).unwrap(),
        vec![ProjectionMapping::new(7, 0, 5)]
    );
}

#[test]
fn test_deleting_across_a_chunk_disconnects_it() {
    let (mut manager, css) = style("a", "<style>a</style>", ProjectionMapping::new(7, 0, 1));

    manager.edit_view(6..9, "").unwrap();

    assert_eq!(manager.disk_text(), "<style/style>");
    assert_eq!(manager.view_text(), "<style/style>");
    assert!(manager.mappings(css).unwrap().is_empty());
    assert_eq!(manager.language_text(css).unwrap(), "");
    assert!(!manager.composer().contains_language(css));
    assert_eq!(manager.composer().tiles(), &[ViewTile::Disk { len: 13 }]);
    // Losing the last span unregisters the buffer from inside the running pass.
    assert_eq!(manager.composer().reentrant_reset_count(), 1);
}

#[test]
fn test_deleting_a_whole_chunk_keeps_an_empty_mapping() {
    let (mut manager, css) = style("a", "<style>a</style>", ProjectionMapping::new(7, 0, 1));

    manager.edit_view(7..8, "").unwrap();

    assert_eq!(manager.disk_text(), "<style></style>");
    assert_eq!(
        manager.mappings(css).unwrap(),
        vec![ProjectionMapping::new(7, 0, 0)]
    );
    assert!(manager.composer().contains_language(css));
}

#[test]
fn test_edits_report_deltas_for_every_buffer() {
    let (mut manager, css) = style(
        "/* */a",
        "<style>a</style>",
        ProjectionMapping::new(7, 5, 1),
    );
    let events = common::record_events(&mut manager);

    let delta = manager.edit_view(8..8, "b").unwrap();
    // Exclusive boundary: only the disk buffer and the view change.
    assert_eq!(delta.edits.len(), 1);
    assert_eq!(delta.edits[0].start, 8);
    let targets: Vec<_> = common::take(&events)
        .into_iter()
        .filter_map(|event| match event {
            ProjectionEvent::BufferChanged { target, origin, .. } => Some((target, origin)),
            _ => None,
        })
        .collect();
    assert_eq!(
        targets,
        vec![
            (BufferTarget::Disk, EditOrigin::View),
            (BufferTarget::View, EditOrigin::View),
        ]
    );

    let delta = manager.edit_disk(7..8, "zz").unwrap();
    assert_eq!(delta.before_char_count, 17);
    assert_eq!(delta.after_char_count, 18);
    assert_eq!(manager.language_text(css).unwrap(), "/* */zz");

    let events = common::take(&events);
    let language_delta = events
        .iter()
        .find_map(|event| match event {
            ProjectionEvent::BufferChanged {
                target: BufferTarget::Language(buffer),
                origin: EditOrigin::Disk,
                delta,
            } if *buffer == css => Some(delta.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(language_delta.edits.len(), 1);
    assert_eq!(language_delta.edits[0].start, 5);
    assert_eq!(language_delta.edits[0].deleted_text, "a");
    assert_eq!(language_delta.edits[0].inserted_text, "zz");
    assert_eq!(language_delta.apply_to("/* */a"), "/* */zz");
}

#[test]
fn test_noop_edit_reports_nothing() {
    let (mut manager, _) = style("a", "<style>a</style>", ProjectionMapping::new(7, 0, 1));
    let events = common::record_events(&mut manager);
    assert!(manager.edit_view(3..3, "").unwrap().is_empty());
    assert!(common::take(&events).is_empty());
}

#[test]
fn test_caret_mapping_between_view_and_language() {
    let mut manager =
        ProjectionBufferManager::new("# T\n```{r}\nx <- 1\n```\n", ContentType::RMARKDOWN);
    let r = manager.create_language_buffer(ContentType::R).unwrap();
    manager
        .set_text_and_mappings(r, "#'\nx <- 1\n#'\n", &[ProjectionMapping::new(11, 3, 7)])
        .unwrap();

    assert_eq!(manager.map_view_to_language(13), Some((r, 5)));
    assert_eq!(manager.map_language_to_view(r, 5), Some(13));
    // Boundaries prefer the disk buffer.
    assert_eq!(manager.map_view_to_language(11), None);
    assert_eq!(manager.map_view_to_language(18), None);
    assert_eq!(manager.map_view_to_language(2), None);
    assert_eq!(manager.map_view_to_language(99), None);
    // Language boundaries are closed.
    assert_eq!(manager.map_language_to_view(r, 3), Some(11));
    assert_eq!(manager.map_language_to_view(r, 10), Some(18));
    assert_eq!(manager.map_language_to_view(r, 1), None);
}

/// Sends boundary insertions into the language buffer.
struct PreferLanguage;

impl EditResolver for PreferLanguage {
    fn resolve_insertion_sizes(
        &self,
        _insertion_point: usize,
        source_points: &[SnapshotPoint],
        text: &str,
    ) -> Vec<usize> {
        source_points
            .iter()
            .map(|point| match point.owner {
                SpanOwner::Language(_) => text.chars().count(),
                SpanOwner::Disk => 0,
            })
            .collect()
    }

    fn resolve_replacement_sizes(
        &self,
        _replacement_span: Range<usize>,
        source_spans: &[SnapshotSpan],
        text: &str,
    ) -> Vec<usize> {
        let mut sizes = vec![0; source_spans.len()];
        sizes[0] = text.chars().count();
        sizes
    }

    fn typical_insertion_position(
        &self,
        _insertion_point: usize,
        source_points: &[SnapshotPoint],
    ) -> usize {
        source_points
            .iter()
            .position(|point| !point.owner.is_disk())
            .unwrap_or(0)
    }
}

#[test]
fn test_custom_resolver() {
    let mut manager = ProjectionBufferManager::new("<style>a</style>", ContentType::HTML)
        .with_resolver(PreferLanguage);
    let css = manager.create_language_buffer(ContentType::CSS).unwrap();
    manager
        .set_text_and_mappings(css, "a", &[ProjectionMapping::new(7, 0, 1)])
        .unwrap();

    manager.edit_view(8..8, "X").unwrap();
    assert_eq!(manager.language_text(css).unwrap(), "aX");
    assert_eq!(manager.map_view_to_language(7), Some((css, 0)));
}

/// Returns sizes that do not add up.
struct Broken;

impl EditResolver for Broken {
    fn resolve_insertion_sizes(&self, _: usize, _: &[SnapshotPoint], _: &str) -> Vec<usize> {
        vec![1_000]
    }

    fn resolve_replacement_sizes(
        &self,
        _: Range<usize>,
        _: &[SnapshotSpan],
        _: &str,
    ) -> Vec<usize> {
        Vec::new()
    }

    fn typical_insertion_position(&self, _: usize, source_points: &[SnapshotPoint]) -> usize {
        source_points.len() - 1
    }
}

#[test]
fn test_invalid_partitions_fall_back_to_the_typical_position() {
    let mut manager = ProjectionBufferManager::new("<style>a</style>", ContentType::HTML)
        .with_resolver(Broken);
    let css = manager.create_language_buffer(ContentType::CSS).unwrap();
    manager
        .set_text_and_mappings(css, "a", &[ProjectionMapping::new(7, 0, 1)])
        .unwrap();

    // Candidates [css, disk]: the last one wins.
    manager.edit_view(8..8, "X").unwrap();
    assert_eq!(manager.disk_text(), "<style>aX</style>");
    assert_eq!(manager.language_text(css).unwrap(), "a");

    // Candidates [css, disk] for a replacement: the disk tile takes the text.
    manager.edit_view(7..9, "bc").unwrap();
    assert_eq!(manager.disk_text(), "<style>bc</style>");
    assert_eq!(manager.language_text(css).unwrap(), "");
    assert_eq!(
        manager.mappings(css).unwrap(),
        vec![ProjectionMapping::new(7, 0, 0)]
    );
    assert_eq!(manager.view_text(), manager.disk_text());
}
