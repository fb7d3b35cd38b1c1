//! Join prompts with gold clinician responses.

use crate::assemble::PromptTable;
use medalign_core::{EvaluationRow, ReferenceResponse};
use std::collections::HashSet;
use tracing::info;

/// Inner-join `table` with the references written by `annotator`.
///
/// Only the first matching reference per instruction is used. Rows keep the
/// reference table's order. References without a prompt and prompts without
/// a reference are dropped.
pub fn merge_with_references(
    table: &PromptTable,
    references: &[ReferenceResponse],
    annotator: &str,
) -> Vec<EvaluationRow> {
    let mut seen = HashSet::new();
    let mut canonical = 0usize;

    let rows: Vec<EvaluationRow> = references
        .iter()
        .filter(|r| r.annotator_num == annotator)
        .filter(|r| seen.insert(r.instruction_id))
        .inspect(|_| canonical += 1)
        .filter_map(|r| {
            table.get(r.instruction_id).map(|record| EvaluationRow {
                clinician_response: r.clinician_response.clone(),
                prompt: record.clone(),
            })
        })
        .collect();

    info!(
        annotator,
        references = canonical,
        prompts = table.len(),
        rows = rows.len(),
        "Merged reference responses"
    );
    rows
}
