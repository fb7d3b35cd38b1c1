//! Instruction table loader.
//!
//! The table is tab-separated with a header row and must carry at least
//! `instruction_id`, `question`, and `person_id`. Other columns are ignored.

use crate::table::Table;
use medalign_core::{Instruction, InstructionId, RecordError};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

const REQUIRED: [&str; 3] = ["instruction_id", "question", "person_id"];

/// Build a map from instruction id to instruction.
///
/// A repeated id replaces the earlier row and logs a warning.
pub fn load_instructions(
    path: &Path,
) -> Result<BTreeMap<InstructionId, Instruction>, RecordError> {
    let mut table = Table::open(path, "Instructions file", &REQUIRED)?;
    let mut instructions = BTreeMap::new();

    for mut row in table.rows()? {
        let id = row.parse_id(0, REQUIRED[0], table.path())?;
        let patient_id = row.parse_id(2, REQUIRED[2], table.path())?;
        let question = row.take(1);

        if instructions
            .insert(id, Instruction::new(id, question, patient_id))
            .is_some()
        {
            warn!(
                instruction_id = id,
                line = row.line,
                "Duplicate instruction id, keeping the later row"
            );
        }
    }

    info!(path = %path.display(), count = instructions.len(), "Loaded instructions");
    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("instructions.tsv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_required_columns_and_ignores_extras() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "instruction_id\tquestion\tperson_id\tis_selected_ehr\n\
             1\tWhat is the diagnosis?\t42\tyes\n\
             2\tList current medications.\t7\tno\n",
        );

        let map = load_instructions(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1], Instruction::new(1, "What is the diagnosis?", 42));
        assert_eq!(map[&2].patient_id, 7);
    }

    #[test]
    fn column_order_does_not_matter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "person_id\tquestion\tinstruction_id\n42\tWhy?\t9\n");
        let map = load_instructions(&path).unwrap();
        assert_eq!(map[&9], Instruction::new(9, "Why?", 42));
    }

    #[test]
    fn quoted_question_keeps_tabs_and_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "instruction_id\tquestion\tperson_id\n3\t\"Line one\nline\ttwo\"\t5\n",
        );
        let map = load_instructions(&path).unwrap();
        assert_eq!(map[&3].question, "Line one\nline\ttwo");
    }

    #[test]
    fn duplicate_id_keeps_last_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "instruction_id\tquestion\tperson_id\n1\tfirst\t1\n1\tsecond\t2\n",
        );
        let map = load_instructions(&path).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&1].question, "second");
        assert_eq!(map[&1].patient_id, 2);
    }

    #[test]
    fn missing_columns_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "instruction_id\tprompt\n1\thello\n");
        match load_instructions(&path).unwrap_err() {
            RecordError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["question".to_string(), "person_id".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_instructions(Path::new("/nonexistent/instructions.tsv")).unwrap_err();
        assert!(matches!(err, RecordError::NotFound { .. }));
    }

    #[test]
    fn non_integer_person_id_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "instruction_id\tquestion\tperson_id\n1\tWhy?\tabc\n");
        match load_instructions(&path).unwrap_err() {
            RecordError::Malformed { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("person_id"));
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }
}
