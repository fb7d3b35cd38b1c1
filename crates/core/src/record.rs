//! Domain records: instructions, prompts, references, and evaluation rows.

use serde::{Deserialize, Serialize};

/// Identifier of a clinical instruction.
pub type InstructionId = i64;

/// Identifier of a patient (the `person_id` column of the instruction table).
pub type PatientId = i64;

/// A clinical question paired with a target patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: InstructionId,
    pub question: String,
    pub patient_id: PatientId,
}

impl Instruction {
    pub fn new(id: InstructionId, question: impl Into<String>, patient_id: PatientId) -> Self {
        Self {
            id,
            question: question.into(),
            patient_id,
        }
    }
}

/// How the EHR section of a prompt was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationStrategy {
    /// The EHR budget was zero or negative; the EHR section is empty.
    Omitted,
    /// Coarse pass with the fast codec, then an exact pass with the target codec.
    Refined,
    /// The document exceeded the budget in fast tokens; only the coarse pass ran.
    Coarse,
}

impl TruncationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Omitted => "omitted",
            Self::Refined => "refined",
            Self::Coarse => "coarse",
        }
    }
}

impl std::fmt::Display for TruncationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One assembled prompt, derived from an instruction whose patient has a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub instruction_id: InstructionId,
    pub patient_id: PatientId,
    /// The instruction text.
    pub instruction: String,
    /// The full, untruncated source timeline.
    pub ehr: String,
    /// The filled template sent to the model.
    pub prompt: String,
    pub context_length: usize,
    pub generation_length: usize,
    /// Token allowance computed for the EHR section. May be negative.
    pub ehr_budget: i64,
    pub strategy: TruncationStrategy,
    /// The part of the timeline that made it into `prompt`.
    pub truncated_ehr: String,
}

/// A row of the gold reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceResponse {
    pub instruction_id: InstructionId,
    pub annotator_num: String,
    pub clinician_response: String,
}

/// A prompt joined with its gold clinician response, ready for scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub clinician_response: String,
    #[serde(flatten)]
    pub prompt: PromptRecord,
}

impl EvaluationRow {
    pub fn instruction_id(&self) -> InstructionId {
        self.prompt.instruction_id
    }
}
