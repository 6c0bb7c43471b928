//! Cross-file validation of a curated clinical directory.

pub mod cross_file;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, info_span, warn};

use clinreg_ingest::{load_registry, read_declared_table};
use clinreg_model::{FileOutcome, FileValidation, ValidationReport};
use clinreg_standards::Catalog;

pub use cross_file::{CohortIndex, validate_table};

const REPORT_SCHEMA: &str = "clinreg.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

/// Validate every non-registry entity of `catalog` found under `clinical_dir`.
///
/// Fails only when the subject registry cannot serve as ground truth. Missing
/// and unreadable tables are recorded as failed files and the batch goes on.
pub fn validate_batch(clinical_dir: &Path, catalog: &Catalog) -> Result<ValidationReport> {
    let span = info_span!("validate", dir = %clinical_dir.display());
    let _guard = span.enter();

    let registry_entity = catalog.registry();
    let registry_path = clinical_dir.join(&registry_entity.canonical_name);
    let registry = load_registry(&registry_path).context("subject registry unavailable")?;
    let index = CohortIndex::from_registry(&registry, catalog.control_group_code());
    info!(
        subjects = index.len(),
        controls = index.control_count(),
        "cohort index built"
    );

    let mut report = ValidationReport {
        registry_entity: registry_entity.canonical_name.clone(),
        registry_subjects: index.len(),
        control_subjects: index.control_count(),
        catalog_fingerprint: catalog.fingerprint().to_string(),
        files: Vec::new(),
    };

    for entity in catalog.all_descriptors() {
        if catalog.is_registry(entity) {
            continue;
        }
        let path = clinical_dir.join(&entity.canonical_name);
        let validation = if path.is_file() {
            match read_declared_table(&path, &entity.columns) {
                Ok(df) => validate_table(&entity.canonical_name, &path, &df, &index),
                Err(e) => unchecked(
                    &entity.canonical_name,
                    &path,
                    FileOutcome::Unreadable {
                        message: e.to_string(),
                    },
                ),
            }
        } else {
            unchecked(&entity.canonical_name, &path, FileOutcome::Missing)
        };
        log_file_result(&validation);
        report.files.push(validation);
    }

    info!(
        passed = report.passed_count(),
        failed = report.failed_count(),
        vacuous = report.vacuous_count(),
        "validation finished"
    );
    Ok(report)
}

fn unchecked(entity: &str, path: &Path, outcome: FileOutcome) -> FileValidation {
    FileValidation {
        entity: entity.to_string(),
        path: path.to_path_buf(),
        outcome,
        mismatches: Vec::new(),
    }
}

fn log_file_result(validation: &FileValidation) {
    let entity = validation.entity.as_str();
    match &validation.outcome {
        FileOutcome::Missing => error!(entity, "curated file not found"),
        FileOutcome::Unreadable { message } => {
            error!(entity, message = %message, "curated file unreadable");
        }
        FileOutcome::Vacuous { missing_columns } => warn!(
            entity,
            missing = ?missing_columns,
            "nothing to check, passing vacuously"
        ),
        FileOutcome::Checked { rows_checked, .. } if validation.mismatches.is_empty() => {
            info!(entity, rows = rows_checked, "all Participant_ID prefixes match");
        }
        FileOutcome::Checked { rows_checked, .. } => error!(
            entity,
            rows = rows_checked,
            mismatches = validation.mismatches.len(),
            "Participant_ID prefixes do not match the registry"
        ),
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationReportPayload<'a> {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: String,
    pub catalog_fingerprint: &'a str,
    pub registry_entity: &'a str,
    pub registry_subjects: usize,
    pub control_subjects: usize,
    pub totals: ValidationTotals,
    pub files: &'a [FileValidation],
}

#[derive(Debug, Serialize)]
pub struct ValidationTotals {
    pub files: usize,
    pub passed: usize,
    pub failed: usize,
    pub vacuous: usize,
    pub mismatches: usize,
}

pub fn write_validation_report_json(path: &Path, report: &ValidationReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let payload = ValidationReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        catalog_fingerprint: &report.catalog_fingerprint,
        registry_entity: &report.registry_entity,
        registry_subjects: report.registry_subjects,
        control_subjects: report.control_subjects,
        totals: ValidationTotals {
            files: report.total_files(),
            passed: report.passed_count(),
            failed: report.failed_count(),
            vacuous: report.vacuous_count(),
            mismatches: report.mismatch_count(),
        },
        files: &report.files,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
