use serde::{Deserialize, Serialize};

use crate::fields::{PARTICIPANT_ID, SUBJECT_UID};

/// One table kind of the registry's data catalog.
///
/// Pairs the name the extract tool gives the file with the curated name, and
/// fixes the ordered column schema a curated table must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub legacy_name: String,
    pub canonical_name: String,
    pub columns: Vec<String>,
}

impl EntityDescriptor {
    pub fn new(
        legacy_name: impl Into<String>,
        canonical_name: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            legacy_name: legacy_name.into(),
            canonical_name: canonical_name.into(),
            columns,
        }
    }

    /// Canonical name without its file extension (`subjects.csv` -> `subjects`).
    pub fn stem(&self) -> &str {
        match self.canonical_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.canonical_name,
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Whether rows of this entity carry a subject identity.
    pub fn is_subject_keyed(&self) -> bool {
        self.has_column(SUBJECT_UID) && self.has_column(PARTICIPANT_ID)
    }

    /// Match against the legacy name, the canonical name or its stem.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.legacy_name.eq_ignore_ascii_case(name)
            || self.canonical_name.eq_ignore_ascii_case(name)
            || self.stem().eq_ignore_ascii_case(name)
    }
}
