//! Token-budget-aware prompt construction for MedAlign.
//!
//! Joins clinical instructions with patient EHR timelines, trims each
//! timeline so instruction + EHR + generation reserve fit the model's context
//! window, and attaches gold clinician responses.
//!
//! # Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Template | [`template`] | [`PromptTemplate`] |
//! | Truncation | [`truncate`] | [`Truncation`] per instruction |
//! | Assembly | [`assemble`] | [`PromptTable`] keyed by instruction id |
//! | Merge | [`merge`] | [`EvaluationRow`](medalign_core::EvaluationRow)s |
//! | End to end | [`pipeline`] | [`Dataset`] |

pub mod assemble;
pub mod merge;
pub mod pipeline;
pub mod template;
pub mod truncate;

pub use assemble::{PreparedPrompts, PromptAssembler, PromptSettings, PromptTable, StrategyCounts};
pub use merge::merge_with_references;
pub use pipeline::{
    build_dataset, build_dataset_with, preprocess_prompts, Dataset, PrepSummary, Preprocessed,
};
pub use template::PromptTemplate;
pub use truncate::{BudgetTruncator, ContextLimits, FittedPrompt, Truncation};
