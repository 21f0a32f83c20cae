use std::fs;
use std::sync::Arc;

use scribe::{
    EntityCandidate, GenerationRequest, InMemoryGenerationSink, InMemoryPageDirectory,
    InMemorySuggestionSource, JobDocument, JobFileSource, JobId, LinkContext, LinkJob, PageId,
    Pipeline, ScribeConfig, ScribeError, SourcePage, Suggestion, SuggestionMode, TransportError,
    ValidationError, WorldId,
};

struct Harness {
    pipeline: Pipeline,
    sink: Arc<InMemoryGenerationSink>,
}

fn suggestion(name: &str, concept: i64, page: i64, targets: &[&str]) -> Suggestion {
    let mut builder = Suggestion::builder(name)
        .concept(concept, "Place")
        .source_page(SourcePage::new(page, format!("source {page}")));
    for t in targets {
        builder = builder.merge_target(*t);
    }
    builder.build().unwrap()
}

fn harness() -> Harness {
    let jobs = Arc::new(InMemorySuggestionSource::new());
    jobs.put(
        JobId::from("analysis-1"),
        JobDocument::done(vec![
            suggestion("Aurelia", 2, 100, &[]),
            suggestion("Aurel", 2, 101, &["Aurelia"]),
            suggestion("Old Keep", 3, 102, &[]),
            suggestion("Moat", 3, 103, &["Ditch"]),
        ])
        .with_page(PageId::new(1)),
    )
    .unwrap();

    let directory = Arc::new(InMemoryPageDirectory::with_pages(vec![
        EntityCandidate::new(50, "Old Keep", 3, 1),
        EntityCandidate::new(51, "Aurelia", 2, 1),
        EntityCandidate::new(52, "Far Shore", 2, 2),
    ]));
    let sink = Arc::new(InMemoryGenerationSink::new());
    let pipeline = Pipeline::new(ScribeConfig::default(), jobs, directory, sink.clone()).unwrap();
    Harness { pipeline, sink }
}

#[test]
fn review_prepare_and_submit() {
    let h = harness();
    let mut session = h.pipeline.open_session(&JobId::from("analysis-1")).unwrap();
    assert_eq!(session.suggestions().len(), 4);

    let existing = h.pipeline.refresh_existing(&mut session, WorldId::new(1)).unwrap();
    assert_eq!(existing, 2);
    assert_eq!(session.suggestion("Old Keep").unwrap().mode, SuggestionMode::Update);
    assert_eq!(session.suggestion("Moat").unwrap().mode, SuggestionMode::Create);

    let request = h.pipeline.prepare(&session, None).unwrap();
    assert_eq!(request.base_page_id, PageId::new(1));
    let names: Vec<&str> = request.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Aurel", "Old Keep", "Moat"]);
    assert_eq!(request.entries[0].source_page_ids, vec![PageId::new(100), PageId::new(101)]);
    assert_eq!(request.groups.len(), 3);
    assert_eq!(request.suggestions.len(), 4);

    let receipt = h.pipeline.submit(&request).unwrap();
    assert!(!receipt.job_id.as_str().is_empty());
    assert_eq!(h.sink.submitted(), vec![request]);
}

#[test]
fn empty_selection_outcome_is_not_submitted() {
    let jobs = Arc::new(InMemorySuggestionSource::new());
    jobs.put(JobId::from("empty"), JobDocument::done(Vec::new()).with_page(PageId::new(1)))
        .unwrap();
    let sink = Arc::new(InMemoryGenerationSink::new());
    let pipeline = Pipeline::new(
        ScribeConfig::default(),
        jobs,
        Arc::new(InMemoryPageDirectory::new()),
        sink.clone(),
    )
    .unwrap();

    let session = pipeline.open_session(&JobId::from("empty")).unwrap();
    let err = pipeline.prepare_and_submit(&session, None).unwrap_err();
    assert!(matches!(
        err,
        ScribeError::Validation(ValidationError::NothingToSubmit)
    ));
    assert!(sink.submitted().is_empty());
}

#[test]
fn failed_submission_is_surfaced_once_and_retry_recomputes() {
    let h = harness();
    let mut session = h.pipeline.open_session(&JobId::from("analysis-1")).unwrap();
    session.select("Old Keep").unwrap();
    session.select("Moat").unwrap();

    h.sink.fail_next(TransportError::ConnectionFailed {
        message: "endpoint unreachable".to_string(),
    })
    .unwrap();
    let err = h.pipeline.prepare_and_submit(&session, Some(PageId::new(9))).unwrap_err();
    assert!(err.is_transport());
    assert!(err.is_retryable());
    assert!(h.sink.submitted().is_empty());
    assert_eq!(session.selected_count(), 2);

    h.pipeline.prepare_and_submit(&session, Some(PageId::new(9))).unwrap();
    let sent = h.sink.submitted();
    assert_eq!(sent.len(), 1);
    let names: Vec<&str> = sent[0].entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Old Keep", "Moat"]);
    assert_eq!(sent[0].base_page_id, PageId::new(9));
}

#[test]
fn server_rejection_is_not_retryable() {
    let h = harness();
    let session = h.pipeline.open_session(&JobId::from("analysis-1")).unwrap();
    h.sink.fail_next(TransportError::ServerError {
        code: 422,
        message: "bad payload".to_string(),
    })
    .unwrap();
    let err = h.pipeline.prepare_and_submit(&session, None).unwrap_err();
    assert!(!err.is_retryable());
}

#[test]
fn render_respects_world_scope() {
    let h = harness();
    let text = "From Aurelia to the Far Shore.";

    let local = h.pipeline.render(text, &LinkContext::new(WorldId::new(1))).unwrap();
    assert!(local.contains(r#"href="/worlds/1/concept/2/page/51">Aurelia</a>"#));
    assert!(local.ends_with("the Far Shore."));

    let cross = h
        .pipeline
        .render(text, &LinkContext::new(WorldId::new(1)).cross_world(true))
        .unwrap();
    assert!(cross.contains(r#"href="/worlds/2/concept/2/page/52">Far Shore</a>"#));
}

#[test]
fn relink_pages_in_parallel() {
    let h = harness();
    let jobs = (0..8)
        .map(|i| LinkJob {
            page_id: PageId::new(50 + i),
            content: "Old Keep overlooks Aurelia".to_string(),
            context: LinkContext::new(WorldId::new(1)),
        })
        .collect();
    let results = h.pipeline.relink_pages(jobs).unwrap();
    assert_eq!(results.len(), 8);
    // Page 50 is the Old Keep itself and page 51 is Aurelia.
    assert_eq!(results[0].outcome.total(), 1);
    assert_eq!(results[1].outcome.total(), 1);
    assert!(results[2..].iter().all(|r| r.outcome.total() == 2));
}

#[test]
fn job_file_round_trip_through_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let doc = serde_json::json!({
        "status": "finished",
        "page_id": 7,
        "suggestions": [
            {"name": "Aurelia", "concept_id": 2, "source_pages": [{"id": 1, "name": "Log", "excerpt": "..."}]},
            {"name": "Aurel", "concept_id": 2, "source_pages": [{"id": 2, "name": "Map"}], "merge_targets": ["Aurelia"]}
        ]
    });
    fs::write(dir.path().join("job-7.json"), doc.to_string()).unwrap();
    fs::write(dir.path().join("job-8.json"), r#"{"status": "processing"}"#).unwrap();

    let pipeline = Pipeline::new(
        ScribeConfig::default(),
        Arc::new(JobFileSource::new(dir.path())),
        Arc::new(InMemoryPageDirectory::new()),
        Arc::new(InMemoryGenerationSink::new()),
    )
    .unwrap();

    let session = pipeline.open_session(&JobId::from("job-7")).unwrap();
    let request = pipeline.prepare(&session, None).unwrap();
    assert_eq!(request.base_page_id, PageId::new(7));
    assert_eq!(request.entries.len(), 1);
    assert_eq!(request.suggestions[0].source_pages[0].extra["excerpt"], "...");

    let decoded = GenerationRequest::from_json(&request.to_json().unwrap()).unwrap();
    assert_eq!(decoded, request);

    let err = pipeline.open_session(&JobId::from("job-8")).unwrap_err();
    assert!(matches!(
        err,
        ScribeError::Validation(ValidationError::JobNotReady { .. })
    ));
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = ScribeConfig::default();
    config.batch.workers = 0;
    let result = Pipeline::new(
        config,
        Arc::new(InMemorySuggestionSource::new()),
        Arc::new(InMemoryPageDirectory::new()),
        Arc::new(InMemoryGenerationSink::new()),
    );
    assert!(matches!(result, Err(e) if e.is_validation()));
}
