//! Batch curation: materialize, curate each entity, then reclassify.
//!
//! Every entity is handled in its own read-modify-write scope and failures are
//! recorded on that entity's report entry. Only an unusable source or
//! destination directory aborts the run.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, info_span, warn};

use clinreg_ingest::{
    TableEdit, load_registry, materialize, update_declared_table, update_table,
};
use clinreg_model::{
    CurationReport, EntityCuration, EntityDescriptor, MaterializeStatus, ReclassificationOutcome,
};
use clinreg_standards::Catalog;

use crate::identifiers::{ReplacementMap, reclassify};
use crate::pipeline::{EntityPipeline, build_default_pipeline};

/// Curate `source_dir` into `clinical_dir` with the default pipeline.
pub fn curate(source_dir: &Path, clinical_dir: &Path, catalog: &Catalog) -> Result<CurationReport> {
    curate_with_pipeline(source_dir, clinical_dir, catalog, &build_default_pipeline())
}

pub fn curate_with_pipeline(
    source_dir: &Path,
    clinical_dir: &Path,
    catalog: &Catalog,
    pipeline: &EntityPipeline,
) -> Result<CurationReport> {
    let span = info_span!("curate", source = %source_dir.display());
    let _guard = span.enter();

    let materialized = materialize(source_dir, clinical_dir, catalog.all_descriptors())
        .with_context(|| format!("materialize {}", source_dir.display()))?;
    info!(
        available = materialized.available_count(),
        missing = materialized.missing_count(),
        failed = materialized.failed_count(),
        "materialization finished"
    );

    let mut entities = Vec::with_capacity(catalog.len());
    for (descriptor, file) in catalog.all_descriptors().iter().zip(&materialized.files) {
        let mut record = EntityCuration::new(file);
        if let MaterializeStatus::Failed { message } = &file.status {
            record.errors.push(message.clone());
        }
        if file.is_available() {
            curate_entity(pipeline, descriptor, &mut record);
        }
        entities.push(record);
    }

    let reclassification = reclassify_batch(clinical_dir, catalog, &mut entities);

    Ok(CurationReport {
        source_dir: source_dir.to_path_buf(),
        clinical_dir: clinical_dir.to_path_buf(),
        catalog_fingerprint: catalog.fingerprint().to_string(),
        entities,
        reclassification,
    })
}

fn curate_entity(pipeline: &EntityPipeline, entity: &EntityDescriptor, record: &mut EntityCuration) {
    let span = info_span!("entity", name = %entity.canonical_name);
    let _guard = span.enter();

    let path = record.path.clone();
    let result = update_declared_table(
        &path,
        &entity.columns,
        |df| -> Result<TableEdit<()>> {
            record.rows = Some(df.height());
            let changed = pipeline.execute(entity, df, record)?;
            Ok(TableEdit {
                outcome: (),
                changed,
            })
        },
    );
    match result {
        Ok(()) => {
            if let Some(schema) = &record.schema {
                if !schema.added.is_empty() {
                    info!(columns = ?schema.added, "added missing columns as empty");
                }
                if !schema.dropped.is_empty() {
                    info!(columns = ?schema.dropped, "dropped undeclared columns");
                }
            }
            info!(rows = record.rows.unwrap_or(0), "entity curated");
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "entity skipped");
            record.errors.push(format!("{e:#}"));
        }
    }
}

/// Rewrite control subjects' identifiers across every available table.
///
/// Needs the curated registry; when its curation failed or it cannot be
/// loaded the phase is abandoned and tables keep their initial identifiers.
pub fn reclassify_batch(
    clinical_dir: &Path,
    catalog: &Catalog,
    entities: &mut [EntityCuration],
) -> ReclassificationOutcome {
    let span = info_span!("reclassify");
    let _guard = span.enter();

    let registry_name = &catalog.registry().canonical_name;
    if let Some(record) = entities
        .iter()
        .find(|record| &record.entity == registry_name && !record.errors.is_empty())
    {
        let reason = format!(
            "subject registry was not curated: {}",
            record.errors.join("; ")
        );
        error!(reason = %reason, "reclassification abandoned");
        return ReclassificationOutcome::Abandoned { reason };
    }

    let registry_path = clinical_dir.join(registry_name);
    let registry = match load_registry(&registry_path) {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "reclassification abandoned");
            return ReclassificationOutcome::Abandoned {
                reason: e.to_string(),
            };
        }
    };
    let map = ReplacementMap::from_registry(&registry, catalog.control_group_code());
    info!(
        subjects = registry.len(),
        controls = map.len(),
        "replacement map built"
    );

    let mut rewritten = 0;
    for record in entities.iter_mut() {
        // Tables that failed curation are left as they are.
        if !record.errors.is_empty() || !record.path.is_file() {
            continue;
        }
        let result = update_table(&record.path, |df| -> Result<TableEdit<usize>> {
            let count = reclassify(df, &map)?;
            Ok(TableEdit {
                outcome: count,
                changed: count > 0,
            })
        });
        match result {
            Ok(count) => {
                if count > 0 {
                    info!(entity = %record.entity, rewritten = count, "identifiers reclassified");
                }
                record.reclassified = count;
                rewritten += count;
            }
            Err(e) => {
                warn!(entity = %record.entity, error = %format!("{e:#}"), "reclassification failed");
                record.errors.push(format!("reclassification: {e:#}"));
            }
        }
    }

    ReclassificationOutcome::Applied {
        controls: map.len(),
        rewritten,
    }
}
