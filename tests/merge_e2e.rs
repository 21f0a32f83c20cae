use scribe::{
    cluster, prepare_entries, reconcile, ConceptId, MergeGroup, MergeResolver, NameGraph, PageId,
    SourcePage, Suggestion,
};

fn suggestion(name: &str, concept: Option<i64>, pages: &[i64], targets: &[&str]) -> Suggestion {
    let mut s = Suggestion::new(name);
    s.concept_id = concept.map(ConceptId::new);
    s.source_pages = pages
        .iter()
        .map(|&id| SourcePage::new(id, format!("page-{id}")))
        .collect();
    for t in targets {
        s.add_merge_target(*t);
    }
    s
}

fn names(group: &MergeGroup) -> Vec<&str> {
    group.iter().collect()
}

#[test]
fn empty_input_yields_nothing() {
    assert!(cluster(&[]).is_empty());
    assert!(prepare_entries(&[]).is_empty());
    assert!(!reconcile(&[]).has_ambiguous_concepts());
}

#[test]
fn unrelated_suggestions_are_singletons() {
    let suggestions = vec![
        suggestion("Aurelia", Some(1), &[1], &[]),
        suggestion("Keep", Some(2), &[2], &[]),
    ];
    let groups = cluster(&suggestions);
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(MergeGroup::is_singleton));

    let entries = prepare_entries(&suggestions);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Aurelia");
    assert_eq!(entries[1].source_page_ids, vec![PageId::new(2)]);
}

#[test]
fn chain_of_targets_forms_one_group() {
    let suggestions = vec![
        suggestion("A", None, &[1], &["B"]),
        suggestion("B", None, &[2], &["C"]),
        suggestion("C", None, &[3], &[]),
        suggestion("D", None, &[4], &[]),
    ];
    let groups = cluster(&suggestions);
    assert_eq!(groups.len(), 2);
    assert_eq!(names(&groups[0]), vec!["A", "B", "C"]);
    assert_eq!(names(&groups[1]), vec!["D"]);
}

#[test]
fn one_sided_declaration_still_merges() {
    let suggestions = vec![
        suggestion("Aurelia", Some(1), &[10], &[]),
        suggestion("Aurel", Some(1), &[11], &["Aurelia"]),
    ];
    let entries = prepare_entries(&suggestions);
    assert_eq!(entries.len(), 1);
    // The first record with merge targets is canonical.
    assert_eq!(entries[0].name, "Aurel");
    assert_eq!(entries[0].source_page_ids, vec![PageId::new(10), PageId::new(11)]);
}

#[test]
fn without_merge_targets_first_record_is_canonical() {
    let resolver_input = vec![
        suggestion("Second", Some(5), &[2], &[]),
        suggestion("First", Some(6), &[1], &[]),
    ];
    let group = MergeGroup::new(vec!["First".to_string(), "Second".to_string()]);
    let resolution = MergeResolver::new(&resolver_input)
        .resolve_group(&group)
        .unwrap();
    // Array order decides, not group order.
    assert_eq!(resolution.entry.name, "Second");
    assert_eq!(resolution.entry.concept_id, Some(ConceptId::new(5)));
    assert_eq!(resolution.members, vec!["Second".to_string(), "First".to_string()]);
}

#[test]
fn dangling_targets_vanish_from_output() {
    let suggestions = vec![suggestion("Keep", None, &[1], &["Ghost", "Phantom"])];
    let groups = cluster(&suggestions);
    assert_eq!(groups.len(), 1);
    assert_eq!(names(&groups[0]), vec!["Keep", "Ghost", "Phantom"]);

    let entries = prepare_entries(&suggestions);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Keep");
}

#[test]
fn group_of_only_dangling_names_is_skipped() {
    let resolver_input = vec![suggestion("Keep", None, &[1], &[])];
    let resolver = MergeResolver::new(&resolver_input);
    let ghost = MergeGroup::new(vec!["Ghost".to_string()]);
    assert!(resolver.resolve_group(&ghost).is_none());
    assert!(resolver.resolve(&[ghost]).is_empty());
}

#[test]
fn self_reference_is_absorbed() {
    let suggestions = vec![suggestion("Keep", None, &[1], &["Keep"])];
    let graph = NameGraph::from_suggestions(&suggestions);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(prepare_entries(&suggestions).len(), 1);
}

#[test]
fn mutual_declarations_do_not_duplicate_edges() {
    let suggestions = vec![
        suggestion("A", None, &[], &["B"]),
        suggestion("B", None, &[], &["A"]),
    ];
    let graph = NameGraph::from_suggestions(&suggestions);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.neighbors("A"), Some(vec!["B"]));
}

#[test]
fn source_pages_union_last_write_wins() {
    let mut first = suggestion("A", None, &[], &["B"]);
    first.source_pages = vec![SourcePage::new(1, "old title"), SourcePage::new(2, "two")];
    let mut second = suggestion("B", None, &[], &[]);
    second.source_pages = vec![
        SourcePage::new(3, "three"),
        SourcePage::new(1, "new title").with_extra("excerpt", serde_json::json!("...")),
    ];

    let suggestions = vec![first, second];
    let reconciliation = reconcile(&suggestions);
    let resolution = &reconciliation.resolutions[0];

    assert_eq!(
        resolution.entry.source_page_ids,
        vec![PageId::new(1), PageId::new(2), PageId::new(3)]
    );
    assert_eq!(resolution.source_pages[0].name, "new title");
    assert!(resolution.source_pages[0].extra.contains_key("excerpt"));
}

#[test]
fn conflicting_concepts_are_flagged_not_resolved() {
    let suggestions = vec![
        suggestion("Aurel", Some(1), &[1], &["Aurelia"]),
        suggestion("Aurelia", Some(2), &[2], &["Aurel"]),
    ];
    let reconciliation = reconcile(&suggestions);
    assert!(reconciliation.has_ambiguous_concepts());
    let entry = reconciliation.entries().next().unwrap();
    assert_eq!(entry.name, "Aurel");
    assert_eq!(entry.concept_id, Some(ConceptId::new(1)));
}

#[test]
fn agreeing_concepts_are_not_flagged() {
    let suggestions = vec![
        suggestion("Aurel", Some(1), &[1], &["Aurelia"]),
        suggestion("Aurelia", Some(1), &[2], &["Aurel"]),
        suggestion("Aurelie", Some(9), &[3], &[]),
    ];
    let reconciliation = reconcile(&suggestions);
    assert_eq!(reconciliation.groups.len(), 2);
    assert!(!reconciliation.has_ambiguous_concepts());
}

#[test]
fn repeated_passes_are_identical() {
    let suggestions = vec![
        suggestion("C", None, &[3], &["A"]),
        suggestion("B", None, &[2], &[]),
        suggestion("A", None, &[1], &["B"]),
        suggestion("E", None, &[5], &["D"]),
    ];
    let first = reconcile(&suggestions);
    let second = reconcile(&suggestions);
    assert_eq!(first, second);

    let keys: Vec<_> = first.groups.iter().map(MergeGroup::key).collect();
    let reordered = MergeGroup::new(vec!["B".to_string(), "A".to_string(), "C".to_string()]);
    assert_eq!(keys[0], reordered.key());
    assert_ne!(keys[0], keys[1]);
}

#[test]
fn prepared_entries_serialize_for_submission() {
    let suggestions = vec![suggestion("Keep", Some(4), &[7, 8], &[])];
    let json = serde_json::to_value(prepare_entries(&suggestions)).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{"name": "Keep", "concept_id": 4, "source_page_ids": [7, 8]}])
    );
}
