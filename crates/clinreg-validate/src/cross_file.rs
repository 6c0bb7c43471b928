//! Cohort consistency of `Participant_ID` against the subject registry.
//!
//! The expected cohort is recomputed from the registry on every run; nothing
//! produced by curation is trusted.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::DataFrame;

use clinreg_ingest::{SubjectRegistry, column_values};
use clinreg_model::fields::{PARTICIPANT_ID, SUBJECT_UID};
use clinreg_model::{
    Cohort, FileOutcome, FileValidation, Mismatch, MismatchReason, ParticipantId,
};

/// Expected cohort per registry subject.
#[derive(Debug, Clone, Default)]
pub struct CohortIndex {
    cohorts: BTreeMap<String, Cohort>,
}

impl CohortIndex {
    pub fn from_registry(registry: &SubjectRegistry, control_code: i64) -> Self {
        let cohorts = registry
            .entries
            .iter()
            .map(|entry| (entry.subject_uid.clone(), entry.cohort(control_code)))
            .collect();
        Self { cohorts }
    }

    /// `None` when the subject is not in the registry.
    pub fn expected(&self, subject_uid: &str) -> Option<Cohort> {
        self.cohorts.get(subject_uid.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }

    pub fn control_count(&self) -> usize {
        self.cohorts
            .values()
            .filter(|cohort| **cohort == Cohort::Ctrl)
            .count()
    }
}

/// Check every row of one curated table.
///
/// A table lacking either identity column passes vacuously. Rows with an
/// absent `SubjectUID` are counted but never checked.
pub fn validate_table(
    entity: &str,
    path: &Path,
    df: &DataFrame,
    index: &CohortIndex,
) -> FileValidation {
    let mut validation = FileValidation {
        entity: entity.to_string(),
        path: path.to_path_buf(),
        outcome: FileOutcome::Missing,
        mismatches: Vec::new(),
    };

    let (Ok(uid_column), Ok(pid_column)) = (df.column(SUBJECT_UID), df.column(PARTICIPANT_ID))
    else {
        let missing_columns = [PARTICIPANT_ID, SUBJECT_UID]
            .into_iter()
            .filter(|name| df.column(name).is_err())
            .map(str::to_string)
            .collect();
        validation.outcome = FileOutcome::Vacuous { missing_columns };
        return validation;
    };

    let uids = column_values(uid_column);
    let pids = column_values(pid_column);
    let mut rows_checked = 0;
    let mut rows_without_subject = 0;
    for (idx, (uid, pid)) in uids.into_iter().zip(pids).enumerate() {
        let Some(uid) = uid.map(|uid| uid.trim().to_string()).filter(|u| !u.is_empty()) else {
            rows_without_subject += 1;
            continue;
        };
        rows_checked += 1;
        let reason = match index.expected(&uid) {
            None => Some(MismatchReason::UnknownSubject),
            Some(expected) => {
                let matches = pid
                    .as_deref()
                    .and_then(|pid| ParticipantId::parse(pid).ok())
                    .is_some_and(|id| id.cohort == expected);
                (!matches).then_some(MismatchReason::WrongPrefix { expected })
            }
        };
        if let Some(reason) = reason {
            validation.mismatches.push(Mismatch {
                row: idx + 1,
                subject_uid: uid,
                participant_id: pid,
                reason,
            });
        }
    }

    validation.outcome = FileOutcome::Checked {
        rows_checked,
        rows_without_subject,
    };
    validation
}
