//! Cross-file validation findings.
//!
//! A prefix mismatch is a finding, not an error: the validator always
//! completes the batch and hands back one [`FileValidation`] per curated file.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cohort::Cohort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MismatchReason {
    /// The row's `SubjectUID` is not in the subject registry.
    UnknownSubject,
    /// The stored `Participant_ID` does not start with the expected cohort.
    WrongPrefix { expected: Cohort },
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::UnknownSubject => f.write_str("unknown SubjectUID"),
            MismatchReason::WrongPrefix { expected } => {
                write!(f, "wrong prefix, expected {}", expected.prefix())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// 1-based data row (header excluded).
    pub row: usize,
    pub subject_uid: String,
    pub participant_id: Option<String>,
    pub reason: MismatchReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Rows were compared against the registry.
    Checked {
        rows_checked: usize,
        rows_without_subject: usize,
    },
    /// The table lacks an identity column, so there is nothing to assert.
    Vacuous { missing_columns: Vec<String> },
    /// The curated file does not exist.
    Missing,
    /// The curated file exists but could not be parsed.
    Unreadable { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileValidation {
    pub entity: String,
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub mismatches: Vec<Mismatch>,
}

impl FileValidation {
    /// A file passes iff it was readable and produced no mismatches.
    ///
    /// Vacuous files pass.
    pub fn passed(&self) -> bool {
        matches!(
            self.outcome,
            FileOutcome::Checked { .. } | FileOutcome::Vacuous { .. }
        ) && self.mismatches.is_empty()
    }

    pub fn is_vacuous(&self) -> bool {
        matches!(self.outcome, FileOutcome::Vacuous { .. })
    }
}

/// Aggregate result of one validation run, registry excluded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub registry_entity: String,
    pub registry_subjects: usize,
    pub control_subjects: usize,
    pub catalog_fingerprint: String,
    pub files: Vec<FileValidation>,
}

impl ValidationReport {
    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn passed_count(&self) -> usize {
        self.files.iter().filter(|file| file.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total_files() - self.passed_count()
    }

    pub fn vacuous_count(&self) -> usize {
        self.files.iter().filter(|file| file.is_vacuous()).count()
    }

    pub fn mismatch_count(&self) -> usize {
        self.files.iter().map(|file| file.mismatches.len()).sum()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }
}
