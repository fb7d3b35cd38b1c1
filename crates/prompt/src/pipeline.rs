//! End-to-end dataset construction: load inputs, resolve the tokenizer once,
//! build prompts, attach gold responses.

use crate::assemble::{PreparedPrompts, PromptAssembler, PromptSettings, StrategyCounts};
use crate::merge::merge_with_references;
use crate::truncate::BudgetTruncator;
use medalign_config::{DataLayout, PrepConfig};
use medalign_core::{EvaluationRow, RecordError, Result, SkippedFile};
use medalign_records::{load_instructions, load_references, load_timelines};
use medalign_tokenizer::TokenizerSet;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Prompts built from the instruction table and EHR directory.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub prompts: PreparedPrompts,
    pub instruction_count: usize,
    pub timeline_count: usize,
    pub skipped_files: Vec<SkippedFile>,
}

/// Load instructions and timelines and assemble one prompt per instruction.
pub fn preprocess_prompts(
    layout: &DataLayout,
    settings: &PromptSettings,
    tokenizers: &TokenizerSet,
) -> Result<Preprocessed> {
    info!(
        context_length = settings.limits.context_length,
        generation_length = settings.limits.generation_length,
        include_ehr = settings.limits.include_ehr,
        "Preprocessing prompts"
    );

    let instructions = load_instructions(&layout.instructions)?;
    let timelines = load_timelines(&layout.ehr_dir)?;

    let assembler = PromptAssembler::new(
        settings.clone(),
        BudgetTruncator::new(tokenizers.target.clone(), tokenizers.fast.clone()),
    );
    let prompts = assembler.assemble(&instructions, &timelines.timelines)?;

    Ok(Preprocessed {
        prompts,
        instruction_count: instructions.len(),
        timeline_count: timelines.len(),
        skipped_files: timelines.skipped,
    })
}

/// Counts describing one run.
#[derive(Debug, Clone, Serialize)]
pub struct PrepSummary {
    pub tokenizer: String,
    pub context_length: usize,
    pub generation_length: usize,
    pub instructions: usize,
    pub timelines: usize,
    pub skipped_files: usize,
    pub prompts: usize,
    pub skipped_instructions: usize,
    pub references: usize,
    pub rows: usize,
    pub strategies: StrategyCounts,
}

/// Evaluation rows ready for scoring.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub rows: Vec<EvaluationRow>,
    pub summary: PrepSummary,
}

/// Build the evaluation dataset described by `config`.
///
/// Resolves the tokenizer named in the config. Use
/// [`build_dataset_with`] to reuse an already-resolved tokenizer.
pub fn build_dataset(config: &PrepConfig) -> Result<Dataset> {
    let settings = PromptSettings::from_config(config)?;
    let layout = config.layout();
    require_file(&layout.instructions, "Instructions file")?;
    require_file(&layout.references, "Clinician responses file")?;

    info!(tokenizer = %config.tokenizer, "Loading tokenizer");
    let tokenizers = TokenizerSet::resolve(&config.tokenizer)?;
    build_dataset_with(config, &settings, &tokenizers)
}

/// Build the evaluation dataset with a pre-resolved tokenizer.
pub fn build_dataset_with(
    config: &PrepConfig,
    settings: &PromptSettings,
    tokenizers: &TokenizerSet,
) -> Result<Dataset> {
    let layout = config.layout();
    let preprocessed = preprocess_prompts(&layout, settings, tokenizers)?;

    let references = load_references(&layout.references)?;
    let rows = merge_with_references(
        &preprocessed.prompts.table,
        &references,
        &config.references.annotator,
    );

    let summary = PrepSummary {
        tokenizer: tokenizers.target.name().to_string(),
        context_length: settings.limits.context_length,
        generation_length: settings.limits.generation_length,
        instructions: preprocessed.instruction_count,
        timelines: preprocessed.timeline_count,
        skipped_files: preprocessed.skipped_files.len(),
        prompts: preprocessed.prompts.table.len(),
        skipped_instructions: preprocessed.prompts.skipped.len(),
        references: references.len(),
        rows: rows.len(),
        strategies: preprocessed.prompts.table.strategy_counts(),
    };

    info!(rows = summary.rows, prompts = summary.prompts, "Dataset ready");
    Ok(Dataset { rows, summary })
}

fn require_file(path: &Path, what: &'static str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RecordError::NotFound {
            what,
            path: path.to_path_buf(),
        }
        .into())
    }
}
