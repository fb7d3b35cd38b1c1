//! Evaluation row writers: JSON Lines and TSV.

use medalign_config::OutputFormat;
use medalign_core::EvaluationRow;
use std::io::Write;

const TSV_HEADER: [&str; 11] = [
    "instruction_id",
    "patient_id",
    "instruction",
    "ehr",
    "prompt",
    "context_length",
    "generation_length",
    "ehr_budget",
    "strategy",
    "truncated_ehr",
    "clinician_response",
];

pub fn write_rows<W: Write>(
    writer: &mut W,
    rows: &[EvaluationRow],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Jsonl => {
            for row in rows {
                serde_json::to_writer(&mut *writer, row)?;
                writer.write_all(b"\n")?;
            }
        }
        OutputFormat::Tsv => {
            let mut tsv = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .from_writer(&mut *writer);
            tsv.write_record(TSV_HEADER)?;
            for row in rows {
                let p = &row.prompt;
                tsv.write_record([
                    p.instruction_id.to_string(),
                    p.patient_id.to_string(),
                    p.instruction.clone(),
                    p.ehr.clone(),
                    p.prompt.clone(),
                    p.context_length.to_string(),
                    p.generation_length.to_string(),
                    p.ehr_budget.to_string(),
                    p.strategy.to_string(),
                    p.truncated_ehr.clone(),
                    row.clinician_response.clone(),
                ])?;
            }
            tsv.flush()?;
        }
    }
    Ok(())
}
