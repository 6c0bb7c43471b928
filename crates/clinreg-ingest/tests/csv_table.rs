use std::fs;
use std::path::{Path, PathBuf};

use clinreg_ingest::{
    IngestError, column_names, column_values, read_csv_table, read_declared_table, read_table,
};

fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn empty_fields_read_as_absent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(
        dir.path(),
        "vitals.csv",
        b"SubjectUID,Participant_ID,Height\n101,,172\n102,CASE-102,\n",
    );
    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.headers, vec!["SubjectUID", "Participant_ID", "Height"]);
    assert_eq!(
        table.rows[0],
        vec![Some("101".to_string()), None, Some("172".to_string())]
    );
    assert_eq!(
        table.rows[1],
        vec![
            Some("102".to_string()),
            Some("CASE-102".to_string()),
            None
        ]
    );
}

#[test]
fn short_rows_are_padded_and_blank_lines_skipped() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(dir.path(), "short.csv", b"A,B,C\n1,2\n\n3,4,5\n");
    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][2], None);
    assert_eq!(table.rows[1][2].as_deref(), Some("5"));
}

#[test]
fn unnamed_index_column_gets_a_placeholder() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(dir.path(), "indexed.csv", b",SubjectUID\n0,101\n1,102\n");
    let df = read_table(&path).expect("read table");
    assert_eq!(column_names(&df), vec!["Unnamed: 0", "SubjectUID"]);
    assert_eq!(df.height(), 2);
}

#[test]
fn latin1_extract_is_decoded() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(dir.path(), "notes.csv", b"SubjectUID,Note\n101,caf\xe9\n");
    let df = read_table(&path).expect("read table");
    let note = df.column("Note").expect("Note column");
    assert_eq!(column_values(note), vec![Some("café".to_string())]);
}

#[test]
fn repeated_headers_are_renamed_on_read() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(dir.path(), "dup.csv", b"A,B,A\n1,2,3\n");
    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.headers, vec!["A", "B", "A.1"]);
    assert_eq!(table.duplicate_headers, vec!["A"]);
    let df = read_table(&path).expect("read table");
    assert_eq!(
        column_values(df.column("A.1").expect("renamed column")),
        vec![Some("3".to_string())]
    );
}

#[test]
fn repeated_declared_header_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(dir.path(), "dup.csv", b"A,B,A,B\n1,2,3,4\n");
    let declared = vec!["B".to_string()];
    let err = read_declared_table(&path, &declared).expect_err("duplicate header");
    assert!(matches!(err, IngestError::DuplicateColumn { ref column, .. } if column == "B"));

    let undeclared = vec!["C".to_string()];
    let df = read_declared_table(&path, &undeclared).expect("read table");
    assert_eq!(column_names(&df), vec!["A", "B", "A.1", "B.1"]);
}

#[test]
fn delimiter_only_line_is_an_empty_row() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(dir.path(), "gaps.csv", b"SubjectUID,result\n1001,7\n,\n1001,.\n");
    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[1], vec![None, None]);
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = read_table(&dir.path().join("absent.csv")).expect_err("missing file");
    assert!(err.is_not_found());
}

#[test]
fn header_only_file_has_no_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write(dir.path(), "empty.csv", b"SubjectUID,Participant_ID\n");
    let df = read_table(&path).expect("read table");
    assert_eq!(df.height(), 0);
    assert_eq!(column_names(&df), vec!["SubjectUID", "Participant_ID"]);
}
