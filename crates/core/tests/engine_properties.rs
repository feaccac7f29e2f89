use std::sync::Arc;

use backref_core::clock::ManualClock;
use backref_core::engine::{EngineSettings, ReferenceEngine};
use backref_core::host::{MemoryDocument, MemoryHost, RawReference};
use backref_core::index::RebuildMode;
use chrono::Duration;
use rstest::rstest;

fn scenario_host() -> MemoryHost {
    let mut host = MemoryHost::new();
    host.write_note("A.md", "Links to [[B]] and [[NoSuchPage]].\n");
    host.write_note("B.md", "See [[C#Heading1]].\n");
    host.write_note("C.md", "# Heading1\n\nSome text.\n");
    host
}

fn engine_with(host: MemoryHost) -> ReferenceEngine<MemoryHost, ManualClock> {
    ReferenceEngine::with_clock(host, EngineSettings::default(), ManualClock::default())
}

fn snapshot(engine: &ReferenceEngine<MemoryHost, ManualClock>) -> Vec<(String, Vec<String>)> {
    engine
        .reference_groups()
        .iter()
        .map(|(key, records)| {
            (key.to_string(), records.iter().map(|r| format!("{}@{}", r.source, r.raw_link)).collect())
        })
        .collect()
}

#[test]
fn scenario_backlinks_and_heading_view() {
    let mut engine = engine_with(scenario_host());
    engine.rebuild_index(RebuildMode::Full);

    let groups = engine.reference_groups();
    assert_eq!(groups.get("B").len(), 1);
    assert_eq!(groups.get("B")[0].source, "A.md");
    assert_eq!(groups.get("C#Heading1").len(), 1);
    assert_eq!(groups.get("C#Heading1")[0].source, "B.md");

    let view = engine.document_view("C.md");
    assert_eq!(view.headings[0].references.len(), 1);
}

#[test]
fn scenario_ghost_link() {
    let mut engine = engine_with(scenario_host());
    engine.rebuild_index(RebuildMode::Full);

    let ghosts = engine.reference_groups().get("NoSuchPage");
    assert_eq!(ghosts.len(), 1);
    assert!(ghosts[0].resolved.is_none());
    assert_eq!(ghosts[0].ghost_path, "NoSuchPage");
    assert!(!ghosts[0].excluded);
}

#[test]
fn full_rebuild_is_idempotent() {
    let mut engine = engine_with(scenario_host());

    let first_stats = engine.rebuild_index(RebuildMode::Full);
    let first = snapshot(&engine);
    let second_stats = engine.rebuild_index(RebuildMode::Full);
    let second = snapshot(&engine);

    assert_eq!(first, second);
    assert_eq!(first_stats.records_indexed, second_stats.records_indexed);
    assert_eq!(first_stats.groups, second_stats.groups);
}

#[test]
fn partial_rebuild_reuses_unchanged_records() {
    let mut engine = engine_with(scenario_host());
    engine.rebuild_index(RebuildMode::Full);
    let from_a = Arc::clone(&engine.reference_groups().get("B")[0]);
    let from_b = Arc::clone(&engine.reference_groups().get("C#Heading1")[0]);

    engine.host_mut().write_note("B.md", "See [[C#Heading1]] again, and [[A]].\n");
    let stats = engine.rebuild_index(RebuildMode::Partial);

    assert_eq!(stats.sources_rescanned, 1);
    assert_eq!(stats.sources_unchanged, 1);
    assert!(Arc::ptr_eq(&from_a, &engine.reference_groups().get("B")[0]));
    assert!(!Arc::ptr_eq(&from_b, &engine.reference_groups().get("C#Heading1")[0]));
    assert_eq!(engine.reference_groups().count("A"), 1);
}

#[test]
fn partial_rebuild_matches_full_rebuild() {
    let mut engine = engine_with(scenario_host());
    engine.rebuild_index(RebuildMode::Full);

    engine.host_mut().write_note("D.md", "[[C#Heading1]] ![[B]]\n");
    engine.host_mut().remove("A.md");
    engine.rebuild_index(RebuildMode::Partial);
    let partial = snapshot(&engine);

    engine.rebuild_index(RebuildMode::Full);
    let full = snapshot(&engine);

    assert_eq!(partial, full);
}

#[test]
fn touched_but_identical_source_is_rescanned() {
    let mut engine = engine_with(scenario_host());
    engine.rebuild_index(RebuildMode::Full);
    let before = Arc::clone(&engine.reference_groups().get("B")[0]);

    engine.host_mut().touch("A.md");
    let stats = engine.rebuild_index(RebuildMode::Partial);

    assert_eq!(stats.sources_rescanned, 1);
    let after = &engine.reference_groups().get("B")[0];
    assert!(!Arc::ptr_eq(&before, after));
    assert_eq!(before.as_ref(), after.as_ref());
}

#[test]
fn self_reference_falls_back_to_source() {
    let mut host = MemoryHost::new();
    host.write_note("Notes/Self.md", "# Intro\n\nBack to [[#Intro]] and ![[#^tag]].\n\nLine ^tag\n");
    host.write_note("Other.md", "# Intro\n\n[[#Intro]]\n");
    let mut engine = engine_with(host);
    engine.rebuild_index(RebuildMode::Full);

    let groups = engine.reference_groups();
    assert_eq!(groups.sources_of("Notes/Self#Intro"), vec!["Notes/Self.md"]);
    assert_eq!(groups.sources_of("Other#Intro"), vec!["Other.md"]);
    assert_eq!(groups.count("Notes/Self#^tag"), 1);

    let view = engine.document_view("Notes/Self.md");
    assert_eq!(view.headings[0].count(), 1);
    assert_eq!(view.blocks[0].count(), 1);
}

#[rstest]
#[case("[[C]]", "C")]
#[case("[[C.md]]", "C")]
#[case("[[C|an alias]]", "C")]
#[case("[[C#Heading1]]", "C#Heading1")]
#[case("[[C#Heading1|alias]]", "C#Heading1")]
#[case("[[C#heading#Heading1]]", "C#Heading1")]
#[case("[[C#Heading1?]]", "C#Heading1")]
#[case("[[C#^blk]]", "C#^blk")]
#[case("[text](C.md)", "C")]
#[case("[text](C.md#Heading1)", "C#Heading1")]
#[case("![[C]]", "C")]
#[case("[[c]]", "C")]
#[case("[[c#Heading1]]", "C#Heading1")]
fn grouping_key_equivalence(#[case] markup: &str, #[case] key: &str) {
    let mut host = MemoryHost::new();
    host.write_note("C.md", "# Heading1\n\nText ^blk\n");
    host.write_note("Src.md", &format!("{markup}\n"));
    let mut engine = engine_with(host);
    engine.rebuild_index(RebuildMode::Full);

    assert_eq!(engine.reference_groups().sources_of(key), vec!["Src.md"], "{markup}");
}

#[test]
fn different_headings_group_separately() {
    let mut host = MemoryHost::new();
    host.write_note("C.md", "# One\n# Two\n");
    host.write_note("A.md", "[[C#One]] [[C#Two]]\n");
    host.write_note("B.md", "[[C#One]]\n");
    let mut engine = engine_with(host);
    engine.rebuild_index(RebuildMode::Full);

    assert_eq!(engine.reference_groups().sources_of("C#One"), vec!["A.md", "B.md"]);
    assert_eq!(engine.reference_groups().sources_of("C#Two"), vec!["A.md"]);
}

#[test]
fn content_excluded_target_is_flagged_present_and_counted() {
    let mut host = scenario_host();
    host.insert(
        "Private.md",
        MemoryDocument::new().excluded().with_heading("Secret", 1),
    );
    host.write_note("D.md", "[[Private]] [[Private#Secret]] [[B]]\n");
    let mut engine = engine_with(host);

    let stats = engine.rebuild_index(RebuildMode::Full);

    let groups = engine.reference_groups();
    assert_eq!(groups.count("Private"), 1);
    assert!(groups.get("Private")[0].excluded);
    assert!(groups.get("Private#Secret")[0].excluded);
    assert_eq!(groups.count_included("Private"), 0);
    assert_eq!(stats.records_excluded, 2);
    assert!(groups.get("B").iter().all(|r| !r.excluded));
}

#[test]
fn excluded_folders_drop_both_directions() {
    let mut host = scenario_host();
    host.write_note("templates/Daily.md", "[[B]] [[C]]\n");
    host.write_note("archive/Old.md", "# Old\n");
    host.write_note("E.md", "[[Old]] [[C]]\n");
    host.exclude_folder("templates");
    host.exclude_folder("archive");
    let mut engine = engine_with(host);

    let stats = engine.rebuild_index(RebuildMode::Full);

    assert_eq!(stats.dropped_from_excluded_source, 2);
    assert_eq!(stats.dropped_to_excluded_target, 1);
    assert_eq!(engine.reference_groups().sources_of("B"), vec!["A.md"]);
    assert_eq!(engine.reference_groups().sources_of("C"), vec!["E.md"]);
    assert!(!engine.reference_groups().contains_key("archive/Old"));
}

#[test]
fn view_is_cached_within_ttl() {
    let clock = ManualClock::default();
    let mut engine =
        ReferenceEngine::with_clock(scenario_host(), EngineSettings::default(), clock.clone());
    engine.rebuild_index(RebuildMode::Full);

    let first = engine.document_view("C.md");
    clock.advance(Duration::milliseconds(999));
    let second = engine.document_view("C.md");

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn view_expires_after_ttl() {
    let clock = ManualClock::default();
    let mut engine =
        ReferenceEngine::with_clock(scenario_host(), EngineSettings::default(), clock.clone());
    engine.rebuild_index(RebuildMode::Full);

    let first = engine.document_view("C.md");
    clock.advance(Duration::milliseconds(1000));
    let second = engine.document_view("C.md");

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.created_at > first.created_at);
}

#[test]
fn view_is_stale_after_rebuild_even_within_ttl() {
    let clock = ManualClock::default();
    let mut engine =
        ReferenceEngine::with_clock(scenario_host(), EngineSettings::default(), clock.clone());
    engine.rebuild_index(RebuildMode::Full);
    let first = engine.document_view("C.md");
    assert_eq!(first.headings[0].count(), 1);

    engine.host_mut().write_note("A.md", "[[C#Heading1]]\n");
    engine.rebuild_index(RebuildMode::Partial);
    let second = engine.document_view("C.md");

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.created_at > first.created_at);
    assert_eq!(second.version, engine.version());
    assert_eq!(second.headings[0].count(), 2);
}

#[test]
fn view_links_reuse_builder_resolution() {
    let mut host = scenario_host();
    host.insert(
        "Hand.md",
        MemoryDocument::new()
            .with_reference(RawReference::link("C#Heading1"))
            .with_reference(RawReference::embed("B")),
    );
    let mut engine = engine_with(host);
    engine.rebuild_index(RebuildMode::Full);
    let misses = engine.state().resolutions().misses();

    let view = engine.document_view("Hand.md");

    assert_eq!(engine.state().resolutions().misses(), misses);
    assert_eq!(view.links[0].key, "C#Heading1");
    assert_eq!(view.links[0].count(), 2);
    assert_eq!(view.links[0].display_label.as_deref(), Some("Heading1"));
    assert_eq!(view.embeds[0].key, "B");
    assert_eq!(view.embeds[0].count(), 2);
}
