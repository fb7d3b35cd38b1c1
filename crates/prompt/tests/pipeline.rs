//! End-to-end tests for dataset construction.
//!
//! Each test lays out a miniature benchmark directory (instruction table,
//! EHR timelines, reference table) and runs the full pipeline with the
//! cl100k_base tokenizer.

use std::fs;
use std::path::Path;

use medalign_config::{MissingEhrPolicy, PrepConfig, EHR_DIR, INSTRUCTIONS_FILE, REFERENCES_FILE};
use medalign_core::{Error, RecordError, TokenCodec, TruncationStrategy};
use medalign_prompt::{build_dataset, build_dataset_with, PromptSettings, PromptTemplate};
use medalign_tokenizer::TokenizerSet;

// ── Fixtures ─────────────────────────────────────────────────────────────

/// Words that cl100k_base encodes as one token each (with a leading space).
fn timeline(words: usize) -> String {
    const WORDS: [&str; 6] = ["the", "patient", "was", "seen", "today", "again"];
    (0..words)
        .map(|i| WORDS[i % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

struct Benchmark {
    dir: tempfile::TempDir,
}

impl Benchmark {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(EHR_DIR)).unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn instructions(&self, rows: &[(i64, &str, i64)]) -> &Self {
        let mut content = String::from("instruction_id\tquestion\tperson_id\tis_selected_ehr\n");
        for (id, question, person) in rows {
            content.push_str(&format!("{id}\t{question}\t{person}\tyes\n"));
        }
        fs::write(self.root().join(INSTRUCTIONS_FILE), content).unwrap();
        self
    }

    fn ehr(&self, file_name: &str, text: &str) -> &Self {
        fs::write(self.root().join(EHR_DIR).join(file_name), text).unwrap();
        self
    }

    fn references(&self, rows: &[(i64, &str, &str)]) -> &Self {
        let mut content = String::from("instruction_id\tannotator_num\tclinician_response\n");
        for (id, annotator, response) in rows {
            content.push_str(&format!("{id}\t{annotator}\t{response}\n"));
        }
        fs::write(self.root().join(REFERENCES_FILE), content).unwrap();
        self
    }

    fn config(&self) -> PrepConfig {
        let mut config = PrepConfig::default();
        config.data.root = self.root().to_path_buf();
        config
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[test]
fn long_timeline_is_cut_to_exact_budget() {
    let bench = Benchmark::new();
    bench
        .instructions(&[(1, "What is the diagnosis?", 42)])
        .ehr("42.xml", &timeline(10_000))
        .references(&[(1, "Annotator_1", "Community-acquired pneumonia.")]);

    let config = bench.config();
    let dataset = build_dataset(&config).unwrap();
    assert_eq!(dataset.rows.len(), 1);

    let tokenizers = TokenizerSet::resolve("tiktoken").unwrap();
    let codec = tokenizers.target.as_ref();
    let template = PromptTemplate::default();
    let expected_budget = 4096
        - 256
        - codec.count(template.source()).unwrap() as i64
        - codec.count("What is the diagnosis?").unwrap() as i64;

    let row = &dataset.rows[0];
    assert_eq!(row.clinician_response, "Community-acquired pneumonia.");
    assert_eq!(row.prompt.ehr_budget, expected_budget);
    assert!(expected_budget > 0 && expected_budget < 10_000);
    assert_eq!(row.prompt.strategy, TruncationStrategy::Coarse);
    assert_eq!(
        codec.count(&row.prompt.truncated_ehr).unwrap() as i64,
        expected_budget
    );
    assert!(row.prompt.ehr.ends_with(&row.prompt.truncated_ehr));
    assert_eq!(row.prompt.ehr, timeline(10_000));
    assert!(codec.count(&row.prompt.prompt).unwrap() <= 4096 - 256 + 2);
}

#[test]
fn instruction_larger_than_window_omits_ehr() {
    let bench = Benchmark::new();
    let question = timeline(60);
    bench
        .instructions(&[(1, &question, 42)])
        .ehr("42.xml", "<visit>chest pain</visit>")
        .references(&[(1, "Annotator_1", "Angina.")]);

    let mut config = bench.config();
    config.context_length = 50;
    config.generation_length = 0;

    let dataset = build_dataset(&config).unwrap();
    let row = &dataset.rows[0];
    assert!(row.prompt.ehr_budget <= 0);
    assert_eq!(row.prompt.strategy, TruncationStrategy::Omitted);
    assert_eq!(row.prompt.prompt, PromptTemplate::default().fill(&question, ""));
    assert_eq!(dataset.summary.strategies.omitted, 1);
}

#[test]
fn no_ehr_mode_omits_every_timeline() {
    let bench = Benchmark::new();
    bench
        .instructions(&[(1, "Diagnosis?", 42)])
        .ehr("42.xml", "<visit>flu</visit>")
        .references(&[(1, "Annotator_1", "Influenza.")]);

    let mut config = bench.config();
    config.include_ehr = false;

    let dataset = build_dataset(&config).unwrap();
    assert_eq!(dataset.rows[0].prompt.ehr_budget, 0);
    assert!(dataset.rows[0].prompt.truncated_ehr.is_empty());
}

#[test]
fn missing_timeline_is_fatal_by_default() {
    let bench = Benchmark::new();
    bench
        .instructions(&[(1, "Diagnosis?", 42), (2, "Allergies?", 404)])
        .ehr("42.xml", "<visit>flu</visit>")
        .references(&[(1, "Annotator_1", "Influenza.")]);

    let err = build_dataset(&bench.config()).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingTimeline {
            instruction_id: 2,
            patient_id: 404
        }
    ));
}

#[test]
fn missing_timeline_skipped_under_skip_policy() {
    let bench = Benchmark::new();
    bench
        .instructions(&[(1, "Diagnosis?", 42), (2, "Allergies?", 404)])
        .ehr("42.xml", "<visit>flu</visit>")
        .ehr("summary.txt", "not a patient file")
        .references(&[
            (1, "Annotator_1", "Influenza."),
            (2, "Annotator_1", "Penicillin."),
        ]);

    let mut config = bench.config();
    config.missing_ehr = MissingEhrPolicy::Skip;

    let dataset = build_dataset(&config).unwrap();
    assert_eq!(dataset.rows.len(), 1);
    assert_eq!(dataset.rows[0].instruction_id(), 1);
    assert_eq!(dataset.summary.skipped_instructions, 1);
    assert_eq!(dataset.summary.skipped_files, 1);
    assert_eq!(dataset.summary.instructions, 2);
    assert_eq!(dataset.summary.timelines, 1);
}

#[test]
fn only_first_annotator_rows_are_joined() {
    let bench = Benchmark::new();
    bench
        .instructions(&[(1, "Diagnosis?", 42), (2, "Medications?", 42), (3, "Labs?", 42)])
        .ehr("42.xml", "<visit>flu</visit>")
        .references(&[
            (2, "Annotator_1", "Oseltamivir."),
            (1, "Annotator_2", "Influenza B."),
            (1, "Annotator_1", "Influenza A."),
            (7, "Annotator_1", "No such instruction."),
        ]);

    let dataset = build_dataset(&bench.config()).unwrap();
    let joined: Vec<_> = dataset
        .rows
        .iter()
        .map(|r| (r.instruction_id(), r.clinician_response.as_str()))
        .collect();
    assert_eq!(joined, vec![(2, "Oseltamivir."), (1, "Influenza A.")]);
    assert_eq!(dataset.summary.prompts, 3);
    assert_eq!(dataset.summary.references, 4);
}

#[test]
fn missing_instructions_file_is_not_found() {
    let bench = Benchmark::new();
    bench.references(&[(1, "Annotator_1", "x")]);

    match build_dataset(&bench.config()).unwrap_err() {
        Error::Record(RecordError::NotFound { what, .. }) => assert_eq!(what, "Instructions file"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn missing_ehr_directory_is_not_found() {
    let bench = Benchmark::new();
    bench
        .instructions(&[(1, "Diagnosis?", 42)])
        .references(&[(1, "Annotator_1", "x")]);
    fs::remove_dir(bench.root().join(EHR_DIR)).unwrap();

    assert!(matches!(
        build_dataset(&bench.config()).unwrap_err(),
        Error::Record(RecordError::NotFound { .. })
    ));
}

#[test]
fn prebuilt_tokenizers_are_reused() {
    let bench = Benchmark::new();
    bench
        .instructions(&[(1, "Diagnosis?", 42)])
        .ehr("42.xml", &timeline(500))
        .references(&[(1, "Annotator_1", "Influenza.")]);

    let config = bench.config();
    let settings = PromptSettings::from_config(&config).unwrap();
    let tokenizers = TokenizerSet::resolve(&config.tokenizer).unwrap();

    let dataset = build_dataset_with(&config, &settings, &tokenizers).unwrap();
    let row = &dataset.rows[0];
    assert_eq!(row.prompt.strategy, TruncationStrategy::Refined);
    assert_eq!(row.prompt.truncated_ehr, timeline(500));
    assert_eq!(dataset.summary.tokenizer, "cl100k_base");
}
