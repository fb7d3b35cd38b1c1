//! Prompt assembly — runs the truncator over every instruction and collects
//! the results into a table keyed by instruction id.

use crate::template::PromptTemplate;
use crate::truncate::{BudgetTruncator, ContextLimits};
use medalign_config::{MissingEhrPolicy, PrepConfig};
use medalign_core::{
    Error, Instruction, InstructionId, PatientId, PromptRecord, Result, SkipReason,
    SkippedInstruction, TruncationStrategy,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Everything that shapes a prompt, independent of the tokenizer.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub limits: ContextLimits,
    pub template: PromptTemplate,
    pub missing_ehr: MissingEhrPolicy,
}

impl PromptSettings {
    pub fn from_config(config: &PrepConfig) -> Result<Self> {
        config.validate().map_err(|e| Error::Config {
            message: e.to_string(),
        })?;

        Ok(Self {
            limits: ContextLimits {
                context_length: config.context_length,
                generation_length: config.generation_length,
                include_ehr: config.include_ehr,
            },
            template: PromptTemplate::parse(&config.template)?,
            missing_ehr: config.missing_ehr,
        })
    }
}

/// Prompt records keyed by instruction id.
#[derive(Debug, Clone, Default)]
pub struct PromptTable {
    records: BTreeMap<InstructionId, PromptRecord>,
}

/// Per-strategy prompt counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrategyCounts {
    pub omitted: usize,
    pub refined: usize,
    pub coarse: usize,
}

impl PromptTable {
    pub fn insert(&mut self, record: PromptRecord) {
        self.records.insert(record.instruction_id, record);
    }

    pub fn get(&self, instruction_id: InstructionId) -> Option<&PromptRecord> {
        self.records.get(&instruction_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in instruction id order.
    pub fn iter(&self) -> impl Iterator<Item = &PromptRecord> {
        self.records.values()
    }

    pub fn strategy_counts(&self) -> StrategyCounts {
        let mut counts = StrategyCounts::default();
        for record in self.records.values() {
            match record.strategy {
                TruncationStrategy::Omitted => counts.omitted += 1,
                TruncationStrategy::Refined => counts.refined += 1,
                TruncationStrategy::Coarse => counts.coarse += 1,
            }
        }
        counts
    }
}

impl FromIterator<PromptRecord> for PromptTable {
    fn from_iter<I: IntoIterator<Item = PromptRecord>>(iter: I) -> Self {
        let mut table = Self::default();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

/// The assembled table plus instructions that were left out.
#[derive(Debug, Clone, Default)]
pub struct PreparedPrompts {
    pub table: PromptTable,
    pub skipped: Vec<SkippedInstruction>,
}

/// Builds one prompt per instruction. Stateless between calls.
pub struct PromptAssembler {
    settings: PromptSettings,
    truncator: BudgetTruncator,
}

impl PromptAssembler {
    pub fn new(settings: PromptSettings, truncator: BudgetTruncator) -> Self {
        Self {
            settings,
            truncator,
        }
    }

    /// Assemble prompts for every instruction, in id order.
    ///
    /// Fails with [`Error::EmptyResult`] when no prompt was produced, and
    /// with [`Error::MissingTimeline`] under [`MissingEhrPolicy::Fail`].
    pub fn assemble(
        &self,
        instructions: &BTreeMap<InstructionId, Instruction>,
        timelines: &BTreeMap<PatientId, String>,
    ) -> Result<PreparedPrompts> {
        let limits = self.settings.limits;
        let template = &self.settings.template;
        let template_tokens = self.truncator.target().count(template.source())?;

        info!(
            context_length = limits.context_length,
            generation_length = limits.generation_length,
            template_tokens,
            instructions = instructions.len(),
            "Constructing prompts"
        );

        let mut prepared = PreparedPrompts::default();
        for instruction in instructions.values() {
            let Some(ehr) = timelines.get(&instruction.patient_id) else {
                match self.settings.missing_ehr {
                    MissingEhrPolicy::Fail => {
                        return Err(Error::MissingTimeline {
                            instruction_id: instruction.id,
                            patient_id: instruction.patient_id,
                        });
                    }
                    MissingEhrPolicy::Skip => {
                        warn!(
                            instruction_id = instruction.id,
                            patient_id = instruction.patient_id,
                            "No EHR timeline for patient, skipping instruction"
                        );
                        prepared.skipped.push(SkippedInstruction {
                            instruction_id: instruction.id,
                            patient_id: instruction.patient_id,
                            reason: SkipReason::MissingTimeline,
                        });
                        continue;
                    }
                }
            };

            let instruction_tokens = self.truncator.target().count(&instruction.question)?;
            let ehr_budget = limits.ehr_budget(template_tokens, instruction_tokens);
            let truncation = self.truncator.truncate(ehr, ehr_budget)?;
            let prompt = template.fill(&instruction.question, &truncation.text);

            debug!(
                instruction_id = instruction.id,
                patient_id = instruction.patient_id,
                instruction_tokens,
                ehr_budget,
                strategy = %truncation.strategy,
                prompt_chars = prompt.len(),
                "Prompt assembled"
            );

            prepared.table.insert(PromptRecord {
                instruction_id: instruction.id,
                patient_id: instruction.patient_id,
                instruction: instruction.question.clone(),
                ehr: ehr.clone(),
                prompt,
                context_length: limits.context_length,
                generation_length: limits.generation_length,
                ehr_budget,
                strategy: truncation.strategy,
                truncated_ehr: truncation.text,
            });
        }

        if prepared.table.is_empty() {
            return Err(Error::EmptyResult {
                context_length: limits.context_length,
            });
        }

        info!(
            prompts = prepared.table.len(),
            skipped = prepared.skipped.len(),
            "Prompt construction complete"
        );
        Ok(prepared)
    }
}
