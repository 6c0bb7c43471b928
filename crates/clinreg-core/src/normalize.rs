//! Schema conformance and sentinel cleanup.
//!
//! Both operations are idempotent and touch disjoint concerns (column shape vs.
//! cell values), so they commute.

use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::DataFrame;

use clinreg_ingest::{column_names, column_values, string_column};
use clinreg_model::SchemaChanges;
use clinreg_model::fields::MISSING_SENTINEL;

/// Rewrite `df` so its columns are exactly `schema`, in that order.
///
/// Declared columns the frame lacks are added as all-null; undeclared columns
/// are dropped. Cell values of kept columns are not touched.
pub fn conform_to_schema(df: &mut DataFrame, schema: &[String]) -> Result<SchemaChanges> {
    let current = column_names(df);
    let present: BTreeSet<&str> = current.iter().map(String::as_str).collect();
    let declared: BTreeSet<&str> = schema.iter().map(String::as_str).collect();

    let added: Vec<String> = schema
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .cloned()
        .collect();
    let dropped: Vec<String> = current
        .iter()
        .filter(|name| !declared.contains(name.as_str()))
        .cloned()
        .collect();
    let kept_in_frame_order: Vec<&String> = current
        .iter()
        .filter(|name| declared.contains(name.as_str()))
        .collect();
    let kept_in_schema_order: Vec<&String> = schema
        .iter()
        .filter(|name| present.contains(name.as_str()))
        .collect();
    let reordered = kept_in_frame_order != kept_in_schema_order;

    if current.as_slice() == schema {
        return Ok(SchemaChanges::default());
    }

    let height = df.height();
    let mut columns = Vec::with_capacity(schema.len());
    for name in schema {
        let column = match df.column(name) {
            Ok(column) => column.clone(),
            Err(_) => string_column(name, vec![None; height]),
        };
        columns.push(column);
    }
    *df = DataFrame::new(columns)?;

    Ok(SchemaChanges {
        added,
        dropped,
        reordered,
    })
}

/// Replace every cell holding exactly the missing-value sentinel with an
/// absent value. Returns the number of cells rewritten.
///
/// Only exact matches count: `"abc.def"` and `" . "` stay as they are.
pub fn clean_sentinels(df: &mut DataFrame) -> Result<usize> {
    let mut cleaned = 0;
    for name in column_names(df) {
        let mut values = column_values(df.column(&name)?);
        let mut hits = 0;
        for value in &mut values {
            if value.as_deref() == Some(MISSING_SENTINEL) {
                *value = None;
                hits += 1;
            }
        }
        if hits > 0 {
            df.with_column(string_column(&name, values))?;
            cleaned += hits;
        }
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: &[(&str, &[Option<&str>])]) -> DataFrame {
        DataFrame::new(
            columns
                .iter()
                .map(|(name, values)| {
                    string_column(name, values.iter().map(|v| v.map(str::to_string)).collect())
                })
                .collect(),
        )
        .expect("frame")
    }

    fn schema(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn conforming_table_is_untouched() {
        let mut df = frame(&[("a", &[Some("1")]), ("b", &[None])]);
        let changes = conform_to_schema(&mut df, &schema(&["a", "b"])).expect("conform");
        assert!(changes.is_noop());
    }

    #[test]
    fn pure_reorder_is_flagged() {
        let mut df = frame(&[("b", &[Some("2")]), ("a", &[Some("1")])]);
        let changes = conform_to_schema(&mut df, &schema(&["a", "b"])).expect("conform");
        assert!(changes.reordered);
        assert!(changes.added.is_empty());
        assert!(changes.dropped.is_empty());
        assert_eq!(column_names(&df), vec!["a", "b"]);
    }

    #[test]
    fn sentinel_inside_text_is_kept() {
        let mut df = frame(&[("note", &[Some("."), Some("abc.def"), Some(".."), None])]);
        let cleaned = clean_sentinels(&mut df).expect("clean");
        assert_eq!(cleaned, 1);
        assert_eq!(
            column_values(df.column("note").expect("note")),
            vec![None, Some("abc.def".into()), Some("..".into()), None]
        );
    }
}
