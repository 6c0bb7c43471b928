//! Participant identifier assignment and cohort reclassification.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::DataFrame;

use clinreg_ingest::{SubjectRegistry, column_values, string_column};
use clinreg_model::fields::{PARTICIPANT_ID, SUBJECT_UID};
use clinreg_model::{AssignmentOutcome, Cohort, ParticipantId};

/// Add `Participant_ID = CASE-<SubjectUID>` to a table keyed by subject.
///
/// A table that already carries `Participant_ID` is left alone, as is one
/// without `SubjectUID`. Rows with an absent `SubjectUID` get an absent
/// identifier.
pub fn assign_participant_ids(df: &mut DataFrame) -> Result<AssignmentOutcome> {
    let Ok(uids) = df.column(SUBJECT_UID) else {
        return Ok(AssignmentOutcome::NoSubjectKey);
    };
    if df.column(PARTICIPANT_ID).is_ok() {
        return Ok(AssignmentOutcome::AlreadyPresent);
    }
    let ids: Vec<Option<String>> = column_values(uids)
        .into_iter()
        .map(|uid| {
            uid.map(|uid| uid.trim().to_string())
                .filter(|uid| !uid.is_empty())
                .map(|uid| ParticipantId::initial(uid).to_string())
        })
        .collect();
    let rows = ids.iter().filter(|id| id.is_some()).count();
    df.with_column(string_column(PARTICIPANT_ID, ids))?;
    Ok(AssignmentOutcome::Assigned { rows })
}

/// Initial identifiers of control subjects, mapped to their reclassified form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    replacements: BTreeMap<String, String>,
}

impl ReplacementMap {
    /// `CASE-<uid> -> CTRL-<uid>` for every registry subject whose group code
    /// equals `control_code`.
    pub fn from_registry(registry: &SubjectRegistry, control_code: i64) -> Self {
        let replacements = registry
            .controls(control_code)
            .map(|entry| {
                let initial = ParticipantId::initial(entry.subject_uid.as_str());
                let control = initial.with_cohort(Cohort::Ctrl);
                (initial.to_string(), control.to_string())
            })
            .collect();
        Self { replacements }
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    pub fn get(&self, participant_id: &str) -> Option<&str> {
        self.replacements.get(participant_id).map(String::as_str)
    }
}

/// Rewrite `Participant_ID` cells through `map` by exact match.
///
/// Returns the number of cells rewritten; a table without the column is a
/// no-op. Values already in their control form are not map keys, so a second
/// pass rewrites nothing.
pub fn reclassify(df: &mut DataFrame, map: &ReplacementMap) -> Result<usize> {
    let Ok(column) = df.column(PARTICIPANT_ID) else {
        return Ok(0);
    };
    let mut values = column_values(column);
    let mut rewritten = 0;
    for value in values.iter_mut() {
        let Some(current) = value.as_deref() else {
            continue;
        };
        if let Some(replacement) = map.get(current) {
            *value = Some(replacement.to_string());
            rewritten += 1;
        }
    }
    if rewritten > 0 {
        df.with_column(string_column(PARTICIPANT_ID, values))?;
    }
    Ok(rewritten)
}
