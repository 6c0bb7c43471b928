//! Table writes and scoped read-modify-write.
//!
//! Rewrites go to a temp file next to the target and are renamed over it only
//! once fully written and synced, so an interrupted or failed write never
//! leaves a half-written table behind.

use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use polars::prelude::DataFrame;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::csv_table::{read_declared_table, read_table};
use crate::error::{IngestError, Result};
use crate::frame::{column_names, column_values};

/// Result of an edit applied through [`update_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEdit<T> {
    pub outcome: T,
    pub changed: bool,
}

impl<T> TableEdit<T> {
    pub fn changed(outcome: T) -> Self {
        Self {
            outcome,
            changed: true,
        }
    }

    pub fn unchanged(outcome: T) -> Self {
        Self {
            outcome,
            changed: false,
        }
    }
}

/// Atomically replace `path` with the frame's contents.
pub fn write_table(path: &Path, df: &DataFrame) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| IngestError::io("create temp file in", parent, e))?;

    let headers = column_names(df);
    let columns: Vec<Vec<Option<String>>> = df.get_columns().iter().map(column_values).collect();
    {
        let mut writer = WriterBuilder::new().from_writer(temp.as_file_mut());
        let csv_error = |e: csv::Error| IngestError::Csv {
            path: path.to_path_buf(),
            source: e,
        };
        writer.write_record(&headers).map_err(csv_error)?;
        for row in 0..df.height() {
            let record = columns
                .iter()
                .map(|values| values[row].as_deref().unwrap_or(""));
            writer.write_record(record).map_err(csv_error)?;
        }
        writer
            .flush()
            .map_err(|e| IngestError::io("write", path, e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| IngestError::io("sync", temp.path(), e))?;
    if let Ok(metadata) = fs::metadata(path) {
        let _ = temp.as_file().set_permissions(metadata.permissions());
    }
    temp.persist(path).map_err(|e| IngestError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    debug!(path = %path.display(), rows = df.height(), "table written");
    Ok(())
}

/// Read the table at `path`, hand it to `edit`, and write it back if the edit
/// reports a change.
///
/// The file is held for exactly one read and at most one write. An error from
/// `edit` leaves the file untouched.
pub fn update_table<T, E, F>(path: &Path, edit: F) -> std::result::Result<T, E>
where
    F: FnOnce(&mut DataFrame) -> std::result::Result<TableEdit<T>, E>,
    E: From<IngestError>,
{
    let df = read_table(path)?;
    apply_edit(path, df, edit)
}

/// [`update_table`] for an entity whose schema declares `declared`.
///
/// A repeated header is only fatal when it names a declared column; other
/// repeats reach `edit` under their renamed form.
pub fn update_declared_table<T, E, F>(
    path: &Path,
    declared: &[String],
    edit: F,
) -> std::result::Result<T, E>
where
    F: FnOnce(&mut DataFrame) -> std::result::Result<TableEdit<T>, E>,
    E: From<IngestError>,
{
    let df = read_declared_table(path, declared)?;
    apply_edit(path, df, edit)
}

fn apply_edit<T, E, F>(path: &Path, mut df: DataFrame, edit: F) -> std::result::Result<T, E>
where
    F: FnOnce(&mut DataFrame) -> std::result::Result<TableEdit<T>, E>,
    E: From<IngestError>,
{
    let TableEdit { outcome, changed } = edit(&mut df)?;
    if changed {
        write_table(path, &df)?;
    }
    Ok(outcome)
}
