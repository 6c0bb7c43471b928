//! Per-entity outcomes of a curation run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MaterializeStatus {
    /// The legacy file was relocated under its canonical name.
    Moved,
    /// No legacy file, but the canonical file exists from an earlier run.
    AlreadyPresent,
    /// Neither the legacy nor the canonical file exists.
    Missing,
    Failed { message: String },
}

/// One catalog entry's materialization attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializedFile {
    pub entity: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub status: MaterializeStatus,
}

impl MaterializedFile {
    /// Whether the canonical file is in place for the next steps.
    pub fn is_available(&self) -> bool {
        matches!(
            self.status,
            MaterializeStatus::Moved | MaterializeStatus::AlreadyPresent
        )
    }
}

/// Column changes made while conforming a table to its canonical schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaChanges {
    pub added: Vec<String>,
    pub dropped: Vec<String>,
    pub reordered: bool,
}

impl SchemaChanges {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.dropped.is_empty() && !self.reordered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    Assigned { rows: usize },
    AlreadyPresent,
    NoSubjectKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCuration {
    pub entity: String,
    pub path: PathBuf,
    pub materialized: MaterializeStatus,
    pub rows: Option<usize>,
    pub schema: Option<SchemaChanges>,
    pub sentinels_cleaned: usize,
    pub assignment: Option<AssignmentOutcome>,
    pub reclassified: usize,
    pub errors: Vec<String>,
}

impl EntityCuration {
    pub fn new(file: &MaterializedFile) -> Self {
        Self {
            entity: file.entity.clone(),
            path: file.destination.clone(),
            materialized: file.status.clone(),
            rows: None,
            schema: None,
            sentinels_cleaned: 0,
            assignment: None,
            reclassified: 0,
            errors: Vec::new(),
        }
    }

    pub fn is_curated(&self) -> bool {
        self.schema.is_some() && self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReclassificationOutcome {
    Applied { controls: usize, rewritten: usize },
    Abandoned { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationReport {
    pub source_dir: PathBuf,
    pub clinical_dir: PathBuf,
    pub catalog_fingerprint: String,
    pub entities: Vec<EntityCuration>,
    pub reclassification: ReclassificationOutcome,
}

impl CurationReport {
    pub fn materialized_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|entity| {
                matches!(
                    entity.materialized,
                    MaterializeStatus::Moved | MaterializeStatus::AlreadyPresent
                )
            })
            .count()
    }

    pub fn curated_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|entity| entity.is_curated())
            .count()
    }

    pub fn has_errors(&self) -> bool {
        matches!(
            self.reclassification,
            ReclassificationOutcome::Abandoned { .. }
        ) || self
            .entities
            .iter()
            .any(|entity| !entity.errors.is_empty())
    }
}
