//! Gold reference response loader.

use crate::table::Table;
use medalign_core::{RecordError, ReferenceResponse};
use std::path::Path;
use tracing::info;

const REQUIRED: [&str; 3] = ["instruction_id", "annotator_num", "clinician_response"];

/// Read every row of the reference table, in file order.
///
/// Annotator filtering happens at merge time.
pub fn load_references(path: &Path) -> Result<Vec<ReferenceResponse>, RecordError> {
    let mut table = Table::open(path, "Clinician responses file", &REQUIRED)?;
    let mut references = Vec::new();

    for mut row in table.rows()? {
        let instruction_id = row.parse_id(0, REQUIRED[0], table.path())?;
        references.push(ReferenceResponse {
            instruction_id,
            annotator_num: row.take(1).trim().to_string(),
            clinician_response: row.take(2),
        });
    }

    info!(path = %path.display(), count = references.len(), "Loaded reference responses");
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_rows_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.tsv");
        fs::write(
            &path,
            "instruction_id\tannotator_num\tclinician_response\tnotes\n\
             2\tAnnotator_1\tNo acute findings.\t\n\
             1\tAnnotator_2\tPneumonia.\tsecond read\n\
             1\tAnnotator_1\t\"Community-acquired\npneumonia.\"\t\n",
        )
        .unwrap();

        let refs = load_references(&path).unwrap();
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].instruction_id, 2);
        assert_eq!(refs[1].annotator_num, "Annotator_2");
        assert_eq!(refs[2].clinician_response, "Community-acquired\npneumonia.");
    }

    #[test]
    fn missing_annotator_column_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.tsv");
        fs::write(&path, "instruction_id\tclinician_response\n1\tyes\n").unwrap();
        match load_references(&path).unwrap_err() {
            RecordError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["annotator_num".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_references(Path::new("/nonexistent/responses.tsv")).unwrap_err();
        assert!(err.to_string().contains("Clinician responses file not found"));
    }
}
