//! Relocation of legacy extracts to their canonical names.
//!
//! Each catalog entry is attempted independently: a missing or unmovable file
//! is recorded and the batch moves on. The report keeps one entry per
//! descriptor in catalog order, which is the only correlation available for
//! tables that carry no subject key.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use clinreg_model::{EntityDescriptor, MaterializeStatus, MaterializedFile};

use crate::discovery::{ensure_directory, list_csv_files};
use crate::error::{IngestError, Result};

/// Name of the curated output directory inside the source directory.
pub const CLINICAL_DIR_NAME: &str = "Clinical";

pub fn default_clinical_dir(source_dir: &Path) -> PathBuf {
    source_dir.join(CLINICAL_DIR_NAME)
}

#[derive(Debug, Clone)]
pub struct MaterializeReport {
    pub clinical_dir: PathBuf,
    /// One entry per descriptor, in catalog order.
    pub files: Vec<MaterializedFile>,
    /// CSV files left in the source directory that no descriptor names.
    pub unrecognized: Vec<PathBuf>,
}

impl MaterializeReport {
    /// Canonical locations attempted, whether or not they now exist.
    pub fn destinations(&self) -> Vec<&Path> {
        self.files
            .iter()
            .map(|file| file.destination.as_path())
            .collect()
    }

    pub fn available_count(&self) -> usize {
        self.files.iter().filter(|file| file.is_available()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.count(|status| matches!(status, MaterializeStatus::Missing))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|status| matches!(status, MaterializeStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&MaterializeStatus) -> bool) -> usize {
        self.files
            .iter()
            .filter(|file| predicate(&file.status))
            .count()
    }
}

/// Move `source_dir/<legacy_name>` to `clinical_dir/<canonical_name>` for
/// every entity.
///
/// Only an absent source directory or an uncreatable destination directory
/// fails the call; per-file problems are recorded on the report.
pub fn materialize(
    source_dir: &Path,
    clinical_dir: &Path,
    entities: &[EntityDescriptor],
) -> Result<MaterializeReport> {
    ensure_directory(source_dir)?;
    fs::create_dir_all(clinical_dir).map_err(|e| IngestError::DirectoryCreate {
        path: clinical_dir.to_path_buf(),
        source: e,
    })?;

    let listing = match list_csv_files(source_dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "could not list source directory");
            Vec::new()
        }
    };
    let sources: Vec<PathBuf> = entities
        .iter()
        .map(|entity| resolve_source(source_dir, &listing, &entity.legacy_name))
        .collect();

    let files = entities
        .iter()
        .zip(&sources)
        .map(|(entity, source)| materialize_entity(source.clone(), clinical_dir, entity))
        .collect();

    let claimed: BTreeSet<&PathBuf> = sources.iter().collect();
    let unrecognized: Vec<PathBuf> = listing
        .into_iter()
        .filter(|path| !claimed.contains(path))
        .collect();
    for path in &unrecognized {
        warn!(path = %path.display(), "source file is not in the entity catalog");
    }

    Ok(MaterializeReport {
        clinical_dir: clinical_dir.to_path_buf(),
        files,
        unrecognized,
    })
}

/// The file in `listing` named `legacy_name`, an exact match before one that
/// differs only in ASCII case.
fn resolve_source(source_dir: &Path, listing: &[PathBuf], legacy_name: &str) -> PathBuf {
    let file_name = |path: &&PathBuf| {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
    };
    listing
        .iter()
        .find(|path| file_name(path).is_some_and(|name| name == legacy_name))
        .or_else(|| {
            listing.iter().find(|path| {
                file_name(path).is_some_and(|name| name.eq_ignore_ascii_case(legacy_name))
            })
        })
        .cloned()
        .unwrap_or_else(|| source_dir.join(legacy_name))
}

fn materialize_entity(
    source: PathBuf,
    clinical_dir: &Path,
    entity: &EntityDescriptor,
) -> MaterializedFile {
    let destination = clinical_dir.join(&entity.canonical_name);
    let status = match fs::rename(&source, &destination) {
        Ok(()) => {
            info!(
                source = %source.display(),
                destination = %destination.display(),
                "moved and renamed"
            );
            MaterializeStatus::Moved
        }
        Err(e) if e.kind() == ErrorKind::NotFound && destination.is_file() => {
            info!(
                entity = %entity.canonical_name,
                "legacy file absent, canonical file already in place"
            );
            MaterializeStatus::AlreadyPresent
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(source = %source.display(), "file not found, skipping");
            MaterializeStatus::Missing
        }
        Err(e) => {
            error!(
                source = %source.display(),
                destination = %destination.display(),
                error = %e,
                "failed to move file"
            );
            MaterializeStatus::Failed {
                message: e.to_string(),
            }
        }
    };
    MaterializedFile {
        entity: entity.canonical_name.clone(),
        source,
        destination,
        status,
    }
}
