//! # MedAlign Core
//!
//! Domain types, traits, and error definitions for preparing MedAlign
//! evaluation inputs. This crate has **zero framework dependencies**: it
//! defines the domain model every other crate builds against.
//!
//! ## Design Philosophy
//!
//! The tokenizer seam is a trait here ([`TokenCodec`]). Concrete codecs live
//! in `medalign-tokenizer`. This keeps the truncation algorithm testable with
//! small in-process codecs and keeps the dependency graph pointing inward.

pub mod codec;
pub mod diagnostics;
pub mod error;
pub mod record;

// Re-export key types at crate root for ergonomics
pub use codec::{SharedCodec, TokenCodec, TokenId};
pub use diagnostics::{SkipReason, SkippedFile, SkippedInstruction};
pub use error::{Error, RecordError, Result, TokenizerError};
pub use record::{
    EvaluationRow, Instruction, InstructionId, PatientId, PromptRecord, ReferenceResponse,
    TruncationStrategy,
};
