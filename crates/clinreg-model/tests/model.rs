//! Tests for clinreg-model types.

use std::path::PathBuf;

use clinreg_model::{
    Cohort, FileOutcome, FileValidation, Mismatch, MismatchReason, ReclassificationOutcome,
    ValidationReport,
};

fn file(entity: &str, outcome: FileOutcome, mismatches: Vec<Mismatch>) -> FileValidation {
    FileValidation {
        entity: entity.to_string(),
        path: PathBuf::from(entity),
        outcome,
        mismatches,
    }
}

fn checked(rows: usize) -> FileOutcome {
    FileOutcome::Checked {
        rows_checked: rows,
        rows_without_subject: 0,
    }
}

#[test]
fn mismatch_reasons_render_for_reports() {
    assert_eq!(MismatchReason::UnknownSubject.to_string(), "unknown SubjectUID");
    assert_eq!(
        MismatchReason::WrongPrefix {
            expected: Cohort::Ctrl
        }
        .to_string(),
        "wrong prefix, expected CTRL-"
    );
}

#[test]
fn vacuous_files_pass_but_are_counted_apart() {
    let report = ValidationReport {
        files: vec![
            file("Vital_Signs.csv", checked(2), Vec::new()),
            file(
                "NEUROLOG.csv",
                FileOutcome::Vacuous {
                    missing_columns: vec!["Participant_ID".to_string()],
                },
                Vec::new(),
            ),
        ],
        ..ValidationReport::default()
    };
    assert_eq!(report.passed_count(), 2);
    assert_eq!(report.vacuous_count(), 1);
    assert!(report.all_passed());
}

#[test]
fn missing_and_unreadable_files_fail() {
    let mismatch = Mismatch {
        row: 1,
        subject_uid: "1001".to_string(),
        participant_id: Some("CASE-1001".to_string()),
        reason: MismatchReason::WrongPrefix {
            expected: Cohort::Ctrl,
        },
    };
    let report = ValidationReport {
        files: vec![
            file("Mortality.csv", FileOutcome::Missing, Vec::new()),
            file(
                "Reflexes.csv",
                FileOutcome::Unreadable {
                    message: "bad quote".to_string(),
                },
                Vec::new(),
            ),
            file("Vital_Signs.csv", checked(1), vec![mismatch]),
            file("Demographics.csv", checked(3), Vec::new()),
        ],
        ..ValidationReport::default()
    };
    assert_eq!(report.total_files(), 4);
    assert_eq!(report.passed_count(), 1);
    assert_eq!(report.failed_count(), 3);
    assert_eq!(report.mismatch_count(), 1);
    assert!(!report.all_passed());
}

#[test]
fn outcomes_serialize_with_status_tags() {
    let json = serde_json::to_value(FileOutcome::Missing).expect("serialize outcome");
    assert_eq!(json["status"], "missing");

    let reason = serde_json::to_value(MismatchReason::WrongPrefix {
        expected: Cohort::Case,
    })
    .expect("serialize reason");
    assert_eq!(reason["kind"], "wrong_prefix");
    assert_eq!(reason["expected"], "CASE");

    let outcome = ReclassificationOutcome::Applied {
        controls: 1,
        rewritten: 4,
    };
    let json = serde_json::to_string(&outcome).expect("serialize reclassification");
    let round: ReclassificationOutcome = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(round, outcome);
}
