//! Non-fatal conditions surfaced to the caller alongside results.
//!
//! Loaders and the assembler emit a `warn!` event for each of these and also
//! return them, so callers can report or assert on them without scraping logs.

use crate::record::{InstructionId, PatientId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file in the EHR directory that was not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Why an instruction produced no prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingTimeline,
}

/// An instruction that was left out of the prompt table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedInstruction {
    pub instruction_id: InstructionId,
    pub patient_id: PatientId,
    pub reason: SkipReason,
}
