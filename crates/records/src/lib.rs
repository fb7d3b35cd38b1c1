//! Record store: loads the benchmark's tabular and per-patient inputs into
//! in-memory maps.
//!
//! - [`load_instructions`] — instruction table (TSV) keyed by instruction id
//! - [`load_timelines`] — EHR directory keyed by patient id
//! - [`load_references`] — gold clinician responses (TSV)

pub mod instructions;
pub mod references;
mod table;
pub mod timelines;

pub use instructions::load_instructions;
pub use references::load_references;
pub use timelines::{load_timelines, patient_id_from_file_name, TimelineSet};
