//! Curate then validate against the built-in catalog.

use std::fs;
use std::path::Path;

use clinreg_cli::cli::{CurateArgs, ValidateArgs};
use clinreg_cli::commands::{resolve_catalog, run_curate, run_validate};
use clinreg_model::{FileOutcome, ReclassificationOutcome};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write file");
}

#[test]
fn curated_directory_validates_clean() {
    let dir = tempfile::tempdir().expect("temp dir");
    let catalog_path = dir.path().join("no-such-catalog.toml");
    assert!(resolve_catalog(Some(&catalog_path)).is_err());

    let catalog = resolve_catalog(None).expect("embedded catalog");
    let source = dir.path().join("extract");
    fs::create_dir_all(&source).expect("source dir");
    write(
        &source,
        "v_NB_IATI_subjects.csv",
        "SubjectUID,subject_group_id\n1001,5\n1002,2\n",
    );
    write(
        &source,
        "v_NB_IATI_Vital_Signs.csv",
        "SubjectUID,Height\n1001,170\n1002,.\n",
    );

    let curate_json = dir.path().join("reports").join("curation.json");
    let report = run_curate(
        &CurateArgs {
            source_dir: source.clone(),
            output_dir: None,
            report_json: Some(curate_json.clone()),
        },
        &catalog,
    )
    .expect("curate");
    assert_eq!(report.materialized_count(), 2);
    assert_eq!(report.entities.len(), catalog.len());
    assert_eq!(
        report.reclassification,
        ReclassificationOutcome::Applied {
            controls: 1,
            rewritten: 2
        }
    );
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&curate_json).expect("read")).expect("parse");
    assert_eq!(json["catalog_fingerprint"], catalog.fingerprint());

    let clinical = source.join("Clinical");
    let validate_json = dir.path().join("reports").join("validation.json");
    let validation = run_validate(
        &ValidateArgs {
            clinical_dir: clinical,
            report_json: Some(validate_json.clone()),
        },
        &catalog,
    )
    .expect("validate");

    let vitals = validation
        .files
        .iter()
        .find(|file| file.entity == "Vital_Signs.csv")
        .expect("vitals validated");
    assert!(vitals.passed());
    assert!(matches!(vitals.outcome, FileOutcome::Checked { rows_checked: 2, .. }));
    // Every other entity is missing from the extract.
    assert_eq!(validation.failed_count(), catalog.len() - 2);
    assert!(validate_json.is_file());
}
