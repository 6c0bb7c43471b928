//! Loading the subject registry.
//!
//! Curation and validation both classify subjects from this table; each builds
//! its own view over the entries returned here.

use std::collections::BTreeSet;
use std::path::Path;

use polars::prelude::DataFrame;
use tracing::warn;

use clinreg_model::fields::{SUBJECT_GROUP_ID, SUBJECT_UID};
use clinreg_model::{Cohort, RegistryError, parse_group_code};

use crate::csv_table::read_table;
use crate::frame::column_values;

/// One subject as recorded in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Trimmed `SubjectUID`.
    pub subject_uid: String,
    /// Parsed `subject_group_id`, `None` when absent or not integer-like.
    pub group_code: Option<i64>,
}

impl RegistryEntry {
    pub fn cohort(&self, control_code: i64) -> Cohort {
        Cohort::from_group_code(self.group_code, control_code)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubjectRegistry {
    /// Unique subjects in file order.
    pub entries: Vec<RegistryEntry>,
    /// Rows whose `SubjectUID` repeats an earlier row; the first row wins.
    pub duplicate_rows: usize,
    /// Rows with an absent `SubjectUID`.
    pub rows_without_subject: usize,
}

impl SubjectRegistry {
    /// Extract subjects from an already-read registry frame.
    pub fn from_frame(df: &DataFrame) -> Result<Self, RegistryError> {
        let uids = registry_column(df, SUBJECT_UID)?;
        let codes = registry_column(df, SUBJECT_GROUP_ID)?;

        let mut registry = SubjectRegistry::default();
        let mut seen = BTreeSet::new();
        for (uid, code) in uids.into_iter().zip(codes) {
            let Some(uid) = uid.map(|uid| uid.trim().to_string()).filter(|u| !u.is_empty())
            else {
                registry.rows_without_subject += 1;
                continue;
            };
            if !seen.insert(uid.clone()) {
                registry.duplicate_rows += 1;
                continue;
            }
            registry.entries.push(RegistryEntry {
                subject_uid: uid,
                group_code: code.as_deref().and_then(parse_group_code),
            });
        }

        if registry.entries.is_empty() {
            return Err(RegistryError::Empty);
        }
        if registry.duplicate_rows > 0 {
            warn!(
                duplicates = registry.duplicate_rows,
                "subject registry repeats SubjectUIDs, keeping first occurrence"
            );
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subjects classified as controls under `control_code`.
    pub fn controls(&self, control_code: i64) -> impl Iterator<Item = &RegistryEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.cohort(control_code) == Cohort::Ctrl)
    }
}

/// Read and parse the registry table at `path`.
pub fn load_registry(path: &Path) -> Result<SubjectRegistry, RegistryError> {
    let df = read_table(path).map_err(|e| {
        if e.is_not_found() {
            RegistryError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            RegistryError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
    })?;
    SubjectRegistry::from_frame(&df)
}

fn registry_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, RegistryError> {
    let column = df.column(name).map_err(|_| RegistryError::MissingColumn {
        column: name.to_string(),
    })?;
    Ok(column_values(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::string_column;

    fn registry_frame(rows: &[(Option<&str>, Option<&str>)]) -> DataFrame {
        let uids = rows.iter().map(|(uid, _)| uid.map(str::to_string)).collect();
        let codes = rows
            .iter()
            .map(|(_, code)| code.map(str::to_string))
            .collect();
        DataFrame::new(vec![
            string_column(SUBJECT_UID, uids),
            string_column(SUBJECT_GROUP_ID, codes),
        ])
        .expect("frame")
    }

    #[test]
    fn first_occurrence_wins() {
        let df = registry_frame(&[
            (Some("1001"), Some("5")),
            (Some("1002"), Some("2")),
            (Some("1001"), Some("2")),
            (None, Some("5")),
        ]);
        let registry = SubjectRegistry::from_frame(&df).expect("registry");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.duplicate_rows, 1);
        assert_eq!(registry.rows_without_subject, 1);
        let controls: Vec<_> = registry
            .controls(5)
            .map(|entry| entry.subject_uid.as_str())
            .collect();
        assert_eq!(controls, vec!["1001"]);
    }

    #[test]
    fn missing_group_column_is_reported() {
        let df = DataFrame::new(vec![string_column(SUBJECT_UID, vec![Some("1".into())])])
            .expect("frame");
        let err = SubjectRegistry::from_frame(&df).expect_err("missing column");
        assert!(
            matches!(err, RegistryError::MissingColumn { ref column } if column == SUBJECT_GROUP_ID)
        );
    }

    #[test]
    fn registry_without_subjects_is_unusable() {
        let df = registry_frame(&[(None, Some("5"))]);
        assert!(matches!(
            SubjectRegistry::from_frame(&df),
            Err(RegistryError::Empty)
        ));
    }
}
