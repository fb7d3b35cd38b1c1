//! EHR timeline directory loader.
//!
//! One file per patient. The patient id is the file name up to its first
//! `.`, so `42.xml` and `42.tar.xml` both belong to patient 42. Files whose
//! stem is not an integer are skipped, never fatal. Entries are read in file
//! name order; when several files name the same patient the first one wins.

use medalign_core::{PatientId, RecordError, SkippedFile};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Timelines keyed by patient id, plus the files that were passed over.
#[derive(Debug, Clone, Default)]
pub struct TimelineSet {
    pub timelines: BTreeMap<PatientId, String>,
    pub skipped: Vec<SkippedFile>,
}

impl TimelineSet {
    pub fn get(&self, patient_id: PatientId) -> Option<&str> {
        self.timelines.get(&patient_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}

/// Extract the patient id from a timeline file name.
pub fn patient_id_from_file_name(name: &str) -> Option<PatientId> {
    let stem = name.split('.').next()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Read every timeline file in `dir`.
pub fn load_timelines(dir: &Path) -> Result<TimelineSet, RecordError> {
    if !dir.is_dir() {
        return Err(RecordError::NotFound {
            what: "EHR directory",
            path: dir.to_path_buf(),
        });
    }

    let mut entries = std::fs::read_dir(dir)
        .and_then(|entries| entries.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| RecordError::Io {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut set = TimelineSet::default();
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(patient_id) = file_name.to_str().and_then(patient_id_from_file_name) else {
            warn!(
                file = %path.display(),
                "File does not match the expected <patient_id>.<ext> format and will be skipped"
            );
            set.skipped.push(SkippedFile {
                path,
                reason: "file name stem is not an integer patient id".into(),
            });
            continue;
        };

        if set.timelines.contains_key(&patient_id) {
            warn!(
                patient_id,
                file = %path.display(),
                "Another file already holds this patient's timeline, skipping"
            );
            set.skipped.push(SkippedFile {
                path,
                reason: format!("duplicate timeline for patient {patient_id}"),
            });
            continue;
        }

        let text = std::fs::read_to_string(&path).map_err(|e| RecordError::Io {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        set.timelines.insert(patient_id, text);
    }

    info!(
        dir = %dir.display(),
        count = set.timelines.len(),
        skipped = set.skipped.len(),
        "Loaded EHR timelines"
    );
    Ok(set)
}
