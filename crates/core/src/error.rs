//! Error types for the MedAlign domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all preparation operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Record store errors ---
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    // --- Tokenizer errors ---
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    // --- Template errors ---
    #[error("Template error: {0}")]
    Template(String),

    // --- Lookup errors ---
    #[error("Instruction {instruction_id} references patient {patient_id}, which has no EHR timeline")]
    MissingTimeline {
        instruction_id: i64,
        patient_id: i64,
    },

    // --- Pipeline errors ---
    #[error("No prompts were produced for context length {context_length}. Try again with a larger length.")]
    EmptyResult { context_length: usize },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("{} is missing required column(s): {}", path.display(), missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("Malformed row {line} in {}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Failed to read {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum TokenizerError {
    #[error("Failed to load tokenizer '{name}': {reason}")]
    Load { name: String, reason: String },

    #[error("Encoding failed with {codec}: {reason}")]
    Encode { codec: String, reason: String },

    #[error("Decoding failed with {codec}: {reason}")]
    Decode { codec: String, reason: String },

    #[error("Tokenizer '{0}' requires the `hf` feature")]
    Unavailable(String),
}
