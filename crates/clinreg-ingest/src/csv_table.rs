use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use polars::prelude::DataFrame;
use tracing::warn;

use crate::error::{IngestError, Result};
use crate::frame::string_column;

/// A delimited extract as read from disk, before it becomes a frame.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    /// Unique header names; repeats are renamed `name.1`, `name.2`, ...
    pub headers: Vec<String>,
    /// Header names that appeared more than once in the file.
    pub duplicate_headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl CsvTable {
    /// Fail if any column in `declared` was repeated in the file.
    ///
    /// Repeats of undeclared columns are left to schema conformance to drop.
    pub fn check_declared(&self, path: &Path, declared: &[String]) -> Result<()> {
        match self
            .duplicate_headers
            .iter()
            .find(|header| declared.contains(header))
        {
            Some(header) => Err(IngestError::DuplicateColumn {
                path: path.to_path_buf(),
                column: header.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Convert to a frame of nullable string columns.
    ///
    /// `path` only names the source in errors.
    pub fn to_frame(&self, path: &Path) -> Result<DataFrame> {
        let columns = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let values = self
                    .rows
                    .iter()
                    .map(|row| row.get(idx).cloned().flatten())
                    .collect();
                string_column(header, values)
            })
            .collect();
        DataFrame::new(columns).map_err(|e| IngestError::Frame {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Rename repeated headers the way pandas does: the first occurrence keeps
/// its name, later ones get `.1`, `.2`, ... skipping names already taken.
fn dedupe_headers(headers: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut duplicates = Vec::new();
    let originals: BTreeSet<String> = headers.iter().cloned().collect();
    let mut unique = Vec::with_capacity(headers.len());
    for header in headers {
        if taken.insert(header.clone()) {
            unique.push(header);
            continue;
        }
        if !duplicates.contains(&header) {
            duplicates.push(header.clone());
        }
        let count = counts.entry(header.clone()).or_insert(0);
        let renamed = loop {
            *count += 1;
            let candidate = format!("{header}.{count}");
            if !originals.contains(&candidate) && !taken.contains(&candidate) {
                break candidate;
            }
        };
        taken.insert(renamed.clone());
        unique.push(renamed);
    }
    (unique, duplicates)
}

fn normalize_header(raw: &str, idx: usize) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    if normalized.is_empty() {
        // Extract tools emit an unnamed index column; keep it addressable so
        // schema conformance can drop it.
        return format!("Unnamed: {idx}");
    }
    normalized
}

/// Decode a field, falling back to Latin-1 for extracts that are not UTF-8.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}

fn decode_cell(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(decode_field(bytes))
    }
}

pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let file = File::open(path).map_err(|e| IngestError::io("open", path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    let mut record = ByteRecord::new();
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    loop {
        let more = reader
            .read_byte_record(&mut record)
            .map_err(|e| IngestError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;
        if !more {
            break;
        }
        // A line of bare delimiters is a row of absent cells, not a blank line.
        if record.is_empty() {
            continue;
        }
        match &headers {
            None => {
                headers = Some(
                    record
                        .iter()
                        .enumerate()
                        .map(|(idx, field)| normalize_header(&decode_field(field), idx))
                        .collect(),
                );
            }
            Some(headers) => {
                let row = (0..headers.len())
                    .map(|idx| record.get(idx).and_then(decode_cell))
                    .collect();
                rows.push(row);
            }
        }
    }
    let (headers, duplicate_headers) = dedupe_headers(headers.unwrap_or_default());
    for header in &duplicate_headers {
        warn!(path = %path.display(), column = %header, "header repeated, later copies renamed");
    }
    Ok(CsvTable {
        headers,
        duplicate_headers,
        rows,
    })
}

/// Read an entity table from disk into a frame.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    read_csv_table(path)?.to_frame(path)
}

/// Read an entity table, rejecting it if a `declared` column is repeated.
pub fn read_declared_table(path: &Path, declared: &[String]) -> Result<DataFrame> {
    let table = read_csv_table(path)?;
    table.check_declared(path, declared)?;
    table.to_frame(path)
}
