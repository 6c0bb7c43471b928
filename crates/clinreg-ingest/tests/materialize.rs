use std::fs;
use std::path::Path;

use clinreg_ingest::{CLINICAL_DIR_NAME, IngestError, default_clinical_dir, materialize};
use clinreg_model::{EntityDescriptor, MaterializeStatus};

fn entity(legacy: &str, canonical: &str, columns: &[&str]) -> EntityDescriptor {
    EntityDescriptor::new(
        legacy,
        canonical,
        columns.iter().map(|c| (*c).to_string()).collect(),
    )
}

fn entities() -> Vec<EntityDescriptor> {
    vec![
        entity(
            "v_NB_IATI_subjects.csv",
            "subjects.csv",
            &["Participant_ID", "SubjectUID", "subject_group_id"],
        ),
        entity(
            "v_NB_IATI_Vital_Signs.csv",
            "Vital_Signs.csv",
            &["Participant_ID", "SubjectUID", "Height"],
        ),
        entity(
            "v_NB_IATI_Labs.csv",
            "Labs.csv",
            &["Participant_ID", "SubjectUID", "Result"],
        ),
    ]
}

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), "SubjectUID\n101\n").expect("write file");
}

#[test]
fn default_destination_is_clinical_subdirectory() {
    let source = Path::new("/data/extract");
    assert_eq!(
        default_clinical_dir(source),
        source.join(CLINICAL_DIR_NAME)
    );
}

#[test]
fn missing_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path();
    touch(source, "v_NB_IATI_subjects.csv");
    touch(source, "v_NB_IATI_Labs.csv");
    let clinical = default_clinical_dir(source);

    let report = materialize(source, &clinical, &entities()).expect("materialize");

    assert_eq!(report.files.len(), 3);
    assert_eq!(report.files[0].status, MaterializeStatus::Moved);
    assert_eq!(report.files[1].status, MaterializeStatus::Missing);
    assert_eq!(report.files[2].status, MaterializeStatus::Moved);
    assert_eq!(report.available_count(), 2);
    assert_eq!(report.missing_count(), 1);

    assert!(clinical.join("subjects.csv").is_file());
    assert!(clinical.join("Labs.csv").is_file());
    assert!(!clinical.join("Vital_Signs.csv").exists());
    assert!(!source.join("v_NB_IATI_subjects.csv").exists());
}

#[test]
fn destinations_follow_catalog_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let clinical = dir.path().join("out");
    let report = materialize(dir.path(), &clinical, &entities()).expect("materialize");
    let names: Vec<_> = report
        .destinations()
        .iter()
        .map(|path| path.file_name().and_then(|n| n.to_str()).unwrap_or(""))
        .collect();
    assert_eq!(names, vec!["subjects.csv", "Vital_Signs.csv", "Labs.csv"]);
}

#[test]
fn second_run_reports_already_present() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path();
    touch(source, "v_NB_IATI_subjects.csv");
    let clinical = default_clinical_dir(source);

    materialize(source, &clinical, &entities()).expect("first run");
    let report = materialize(source, &clinical, &entities()).expect("second run");

    assert_eq!(report.files[0].status, MaterializeStatus::AlreadyPresent);
    assert!(report.files[0].is_available());
}

#[test]
fn unrecognized_source_files_are_listed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path();
    touch(source, "v_NB_IATI_subjects.csv");
    touch(source, "notes.csv");
    fs::write(source.join("readme.txt"), "x").expect("write");

    let report =
        materialize(source, &default_clinical_dir(source), &entities()).expect("materialize");
    assert_eq!(report.unrecognized.len(), 1);
    assert!(report.unrecognized[0].ends_with("notes.csv"));
}

#[test]
fn legacy_name_differing_in_case_is_moved() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path();
    touch(source, "V_NB_IATI_LABS.csv");
    let clinical = default_clinical_dir(source);

    let report = materialize(source, &clinical, &entities()).expect("materialize");

    assert_eq!(report.files[2].status, MaterializeStatus::Moved);
    assert!(report.files[2].source.ends_with("V_NB_IATI_LABS.csv"));
    assert!(clinical.join("Labs.csv").is_file());
    assert!(report.unrecognized.is_empty());
}

#[test]
fn absent_source_directory_is_fatal() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("nope");
    let err = materialize(&source, &source.join("Clinical"), &entities())
        .expect_err("missing source");
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
}

#[test]
fn uncreatable_destination_is_fatal() {
    let dir = tempfile::tempdir().expect("temp dir");
    let blocker = dir.path().join("Clinical");
    fs::write(&blocker, "not a directory").expect("write");
    let err = materialize(dir.path(), &blocker, &entities()).expect_err("blocked");
    assert!(matches!(err, IngestError::DirectoryCreate { .. }));
}
