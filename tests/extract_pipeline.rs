//! End-to-end pipeline scenarios with a scripted oracle

mod common;

use anaphora::{
    load_resume_set, load_segments, ContextInPrompt, ExtractionPipeline, FactGrounded,
    FactSink, InMemorySet, MockOracle, PipelineConfig, RewriteThenReextract,
};
use common::{ledger_ids, read_ledger, write_segment_table};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn ledger_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join("facts.psv"), dir.join("quarantine/bad_facts.psv"))
}

// --- Scenario: Pronoun-bearing extraction escalates and resolves ---

#[tokio::test]
async fn pronouns_escalate_and_resolve_to_named_entities() {
    let dir = tempfile::tempdir().unwrap();
    let (accepted, quarantine) = ledger_paths(dir.path());
    let table = write_segment_table(
        dir.path(),
        &[(
            1,
            "conv-a",
            "Mary met John at the office. She thanked him for the report.",
        )],
    );

    let oracle = Arc::new(
        MockOracle::new()
            .with_response(
                "Text:\nMary met John",
                "\"Mary\"|\"met\"|\"John\"\n\"She\"|\"thanked\"|\"him\"",
            )
            .with_response(
                "EARLIER CONTEXT",
                "\"Mary\"|\"met\"|\"John\"\n\"Mary\"|\"thanked\"|\"John\"",
            ),
    );

    let pipeline = ExtractionPipeline::new(oracle.clone(), Arc::new(ContextInPrompt));
    let segments = load_segments(&table).unwrap();
    let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
    let mut resume = InMemorySet::new();

    let summary = pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.escalated, 1);
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.quarantined, 0);

    let rows = read_ledger(&accepted);
    assert_eq!(rows.len(), 3, "header plus two facts");
    assert_eq!(rows[1][2], "\"Mary\"|\"met\"|\"John\"");
    assert_eq!(rows[2][2], "\"Mary\"|\"thanked\"|\"John\"");

    // first segment of the conversation: escalation ran without context
    let escalation_prompt = oracle
        .prompts()
        .into_iter()
        .find(|p| p.contains("EARLIER CONTEXT"))
        .expect("escalation call happened");
    assert!(escalation_prompt.contains("(no prior context)"));

    // clean quarantine: header only
    assert_eq!(read_ledger(&quarantine).len(), 1);
}

// --- Scenario: Clean extraction commits without escalation ---

#[tokio::test]
async fn clean_extraction_skips_escalation() {
    let dir = tempfile::tempdir().unwrap();
    let (accepted, quarantine) = ledger_paths(dir.path());
    let table = write_segment_table(dir.path(), &[(1, "a", "Mary met John at the office.")]);

    let oracle = Arc::new(
        MockOracle::new().with_response("Text:\nMary met John", "\"Mary\"|\"met\"|\"John\""),
    );
    let pipeline = ExtractionPipeline::new(oracle.clone(), Arc::new(RewriteThenReextract));

    let segments = load_segments(&table).unwrap();
    let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
    let mut resume = InMemorySet::new();
    let summary = pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();

    assert_eq!(summary.escalated, 0);
    assert_eq!(summary.accepted, 1);
    assert_eq!(oracle.call_count(), 1, "one base extraction, nothing else");
}

// --- Scenario: Resume idempotence — a second run adds no rows ---

#[tokio::test]
async fn second_run_over_same_input_adds_no_duplicate_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (accepted, quarantine) = ledger_paths(dir.path());
    let table = write_segment_table(
        dir.path(),
        &[
            (1, "a", "Mary met John at the office."),
            (2, "a", "The report was finished on Friday."),
        ],
    );
    let segments = load_segments(&table).unwrap();

    let first_oracle = Arc::new(
        MockOracle::new()
            .with_response("Text:\nMary met John", "\"Mary\"|\"met\"|\"John\"")
            .with_response("Text:\nThe report", "\"report\"|\"finished on\"|\"Friday\""),
    );
    {
        let pipeline = ExtractionPipeline::new(first_oracle, Arc::new(RewriteThenReextract));
        let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
        let mut resume = load_resume_set(&accepted);
        let summary = pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();
        assert_eq!(summary.processed, 2);
    }

    // second run resumes from the persisted ledger; oracle untouched
    let second_oracle = Arc::new(MockOracle::new());
    {
        let pipeline =
            ExtractionPipeline::new(second_oracle.clone(), Arc::new(RewriteThenReextract));
        let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
        let mut resume = load_resume_set(&accepted);
        let summary = pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.skipped, 2);
    }
    assert_eq!(second_oracle.call_count(), 0, "skips happen before oracle calls");

    let mut ids = ledger_ids(&accepted);
    ids.sort();
    ids.dedup();
    assert_eq!(ids, vec!["1", "2"], "no duplicate segment ids");
    assert_eq!(read_ledger(&accepted).len(), 3, "header plus one row per segment");
}

// --- Scenario: A failed oracle call aborts; the rerun picks up cleanly ---

#[tokio::test]
async fn aborted_run_resumes_where_it_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let (accepted, quarantine) = ledger_paths(dir.path());
    let table = write_segment_table(
        dir.path(),
        &[
            (1, "a", "Mary met John at the office."),
            (2, "a", "The report was finished on Friday."),
        ],
    );
    let segments = load_segments(&table).unwrap();

    let failing = Arc::new(
        MockOracle::new()
            .with_response("Text:\nMary met John", "\"Mary\"|\"met\"|\"John\"")
            .with_failure("Text:\nThe report"),
    );
    {
        let pipeline = ExtractionPipeline::new(failing, Arc::new(RewriteThenReextract));
        let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
        let mut resume = load_resume_set(&accepted);
        let result = pipeline.run(&segments, &mut sink, &mut resume).await;
        assert!(result.is_err(), "oracle failure aborts the run");
    }
    assert_eq!(ledger_ids(&accepted), vec!["1"], "segment 1 committed before the abort");

    let recovered = Arc::new(
        MockOracle::new().with_response("Text:\nThe report", "\"report\"|\"finished on\"|\"Friday\""),
    );
    {
        let pipeline = ExtractionPipeline::new(recovered.clone(), Arc::new(RewriteThenReextract));
        let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
        let mut resume = load_resume_set(&accepted);
        let summary = pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.processed, 1);
    }
    assert_eq!(recovered.call_count(), 1, "only the unfinished segment is redone");

    let mut ids = ledger_ids(&accepted);
    ids.sort();
    assert_eq!(ids, vec!["1", "2"]);
}

// --- Scenario: Quarantine completeness for empty output ---

#[tokio::test]
async fn zero_accepted_facts_leave_exactly_one_quarantine_row() {
    let dir = tempfile::tempdir().unwrap();
    let (accepted, quarantine) = ledger_paths(dir.path());
    let table = write_segment_table(dir.path(), &[(1, "a", "Nothing extractable here.")]);

    let oracle = Arc::new(MockOracle::new().with_default(""));
    let pipeline = ExtractionPipeline::new(oracle, Arc::new(RewriteThenReextract));

    let segments = load_segments(&table).unwrap();
    let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
    let mut resume = InMemorySet::new();
    let summary = pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();

    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.quarantined, 1);

    let rows = read_ledger(&quarantine);
    assert_eq!(rows.len(), 2, "header plus exactly one trace row");
    assert_eq!(rows[1][0], "1");
    assert_eq!(rows[1][2], "(empty)");

    assert_eq!(read_ledger(&accepted).len(), 1, "accepted holds only the header");
}

#[tokio::test]
async fn malformed_lines_are_quarantined_alongside_the_trace_row() {
    let dir = tempfile::tempdir().unwrap();
    let (accepted, quarantine) = ledger_paths(dir.path());
    let table = write_segment_table(dir.path(), &[(1, "a", "Some text.")]);

    let oracle = Arc::new(
        MockOracle::new().with_default("\"A\"|\"B\"\nI cannot extract a triplet here."),
    );
    let pipeline = ExtractionPipeline::new(oracle, Arc::new(RewriteThenReextract));

    let segments = load_segments(&table).unwrap();
    let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
    let mut resume = InMemorySet::new();
    pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();

    let rows = read_ledger(&quarantine);
    // two malformed lines, then the whole-output trace row
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1][2], "\"A\"|\"B\"");
    assert_eq!(rows[2][2], "I cannot extract a triplet here.");
    assert!(rows[3][2].contains("\"A\"|\"B\""));
}

// --- Scenario: Fact-grounded escalation sees this run's accepted facts ---

#[tokio::test]
async fn fact_grounded_escalation_reads_prior_facts_from_this_run() {
    let dir = tempfile::tempdir().unwrap();
    let (accepted, quarantine) = ledger_paths(dir.path());
    let table = write_segment_table(
        dir.path(),
        &[
            (1, "conv-a", "Mary met John at the office."),
            (2, "conv-a", "She thanked him for the report."),
        ],
    );

    let oracle = Arc::new(
        MockOracle::new()
            .with_response("Text:\nMary met John", "\"Mary\"|\"met\"|\"John\"")
            .with_response("Text:\nShe thanked him", "\"She\"|\"thanked\"|\"him\"")
            .with_response("PRIOR TRIPLETS", "\"Mary\"|\"thanked\"|\"John\""),
    );
    let pipeline = ExtractionPipeline::new(oracle.clone(), Arc::new(FactGrounded));

    let segments = load_segments(&table).unwrap();
    let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
    let mut resume = InMemorySet::new();
    let summary = pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();

    assert_eq!(summary.escalated, 1);

    let grounded_prompt = oracle
        .prompts()
        .into_iter()
        .find(|p| p.contains("PRIOR TRIPLETS"))
        .expect("fact-grounded call happened");
    assert!(
        grounded_prompt.contains("\"Mary\"|\"met\"|\"John\""),
        "segment 1's accepted fact grounds segment 2's escalation"
    );

    let rows = read_ledger(&accepted);
    assert_eq!(rows[2][2], "\"Mary\"|\"thanked\"|\"John\"");
}

// --- Scenario: Minimum segment id filters earlier segments entirely ---

#[tokio::test]
async fn segments_below_the_minimum_id_are_never_touched() {
    let dir = tempfile::tempdir().unwrap();
    let (accepted, quarantine) = ledger_paths(dir.path());
    let table = write_segment_table(
        dir.path(),
        &[
            (1, "a", "Mary met John at the office."),
            (2, "a", "The report was finished on Friday."),
        ],
    );

    let oracle = Arc::new(
        MockOracle::new().with_response("Text:\nThe report", "\"report\"|\"finished on\"|\"Friday\""),
    );
    let pipeline = ExtractionPipeline::new(oracle.clone(), Arc::new(RewriteThenReextract))
        .with_config(PipelineConfig {
            context_window: 2,
            min_segment_id: Some(2),
        });

    let segments = load_segments(&table).unwrap();
    let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
    let mut resume = InMemorySet::new();
    let summary = pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();

    assert_eq!(summary.filtered, 1);
    assert_eq!(summary.processed, 1);
    assert_eq!(oracle.call_count(), 1, "no oracle call for the filtered segment");
    assert_eq!(ledger_ids(&accepted), vec!["2"]);
}

// --- Scenario: Context bundle is conversation-scoped across a run ---

#[tokio::test]
async fn escalation_context_stays_within_the_conversation() {
    let dir = tempfile::tempdir().unwrap();
    let (accepted, quarantine) = ledger_paths(dir.path());
    let table = write_segment_table(
        dir.path(),
        &[
            (1, "conv-a", "Mary met John at the office."),
            (2, "conv-b", "Liam bought a camera downtown."),
            (3, "conv-a", "She thanked him for the report."),
        ],
    );

    let oracle = Arc::new(
        MockOracle::new()
            .with_response("Text:\nMary met John", "\"Mary\"|\"met\"|\"John\"")
            .with_response("Text:\nLiam bought", "\"Liam\"|\"bought\"|\"camera\"")
            .with_response("Text:\nShe thanked him", "\"She\"|\"thanked\"|\"him\"")
            .with_response("EARLIER CONTEXT", "\"Mary\"|\"thanked\"|\"John\""),
    );
    let pipeline = ExtractionPipeline::new(oracle.clone(), Arc::new(ContextInPrompt));

    let segments = load_segments(&table).unwrap();
    let mut sink = FactSink::open(&accepted, &quarantine).unwrap();
    let mut resume = InMemorySet::new();
    pipeline.run(&segments, &mut sink, &mut resume).await.unwrap();

    let escalation_prompt = oracle
        .prompts()
        .into_iter()
        .find(|p| p.contains("EARLIER CONTEXT"))
        .expect("escalation call happened");
    assert!(escalation_prompt.contains("[Prev 1] Mary met John at the office."));
    assert!(
        !escalation_prompt.contains("Liam bought a camera"),
        "other conversations never leak into the bundle"
    );
}
