use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use clinreg_core::curate;
use clinreg_ingest::default_clinical_dir;
use clinreg_model::{CurationReport, ValidationReport};
use clinreg_standards::{Catalog, load_catalog_from, resolve_catalog_source};
use clinreg_validate::{validate_batch, write_validation_report_json};

use crate::cli::{CurateArgs, ValidateArgs};
use crate::logging::redact_value;
use crate::summary::print_catalog;

/// Resolve and load the catalog from flag, environment or the embedded default.
pub fn resolve_catalog(flag: Option<&Path>) -> Result<Catalog> {
    let source = resolve_catalog_source(flag);
    let catalog = load_catalog_from(&source).context("load entity catalog")?;
    info!(
        entities = catalog.len(),
        fingerprint = catalog.fingerprint(),
        "entity catalog loaded"
    );
    Ok(catalog)
}

pub fn run_entities(catalog: &Catalog) -> Result<()> {
    print_catalog(catalog);
    Ok(())
}

pub fn run_curate(args: &CurateArgs, catalog: &Catalog) -> Result<CurationReport> {
    let clinical_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_clinical_dir(&args.source_dir));
    let report = curate(&args.source_dir, &clinical_dir, catalog)?;
    if let Some(path) = &args.report_json {
        write_json(path, &report)?;
        info!(path = %path.display(), "curation report written");
    }
    Ok(report)
}

pub fn run_validate(args: &ValidateArgs, catalog: &Catalog) -> Result<ValidationReport> {
    let report = validate_batch(&args.clinical_dir, catalog)?;
    for file in &report.files {
        for mismatch in &file.mismatches {
            debug!(
                entity = %file.entity,
                row = mismatch.row,
                subject_uid = redact_value(&mismatch.subject_uid),
                participant_id = redact_value(mismatch.participant_id.as_deref().unwrap_or("")),
                reason = %mismatch.reason,
                "identifier mismatch"
            );
        }
    }
    if report.vacuous_count() > 0 {
        warn!(
            files = report.vacuous_count(),
            "some files passed only because they carry no identity columns"
        );
    }
    if let Some(path) = &args.report_json {
        write_validation_report_json(path, &report)?;
        info!(path = %path.display(), "validation report written");
    }
    Ok(report)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
