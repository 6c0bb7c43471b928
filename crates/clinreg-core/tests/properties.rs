//! Idempotence and commutation of the table normalizer.

use polars::prelude::DataFrame;
use proptest::prelude::*;

use clinreg_core::{clean_sentinels, conform_to_schema};
use clinreg_ingest::{column_names, column_values, string_column};

const NAMES: [&str; 6] = ["Participant_ID", "SubjectUID", "height", "weight", "note", "extra"];

fn cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(".".to_string())),
        Just(Some("abc.def".to_string())),
        "[a-z0-9]{1,4}".prop_map(Some),
    ]
}

/// A frame over a shuffled subset of `NAMES`, plus a schema drawn the same way.
fn table_and_schema() -> impl Strategy<Value = (DataFrame, Vec<String>)> {
    let names = Just(NAMES.to_vec()).prop_shuffle();
    let schema = Just(NAMES.to_vec()).prop_shuffle();
    (names, 1..=NAMES.len(), schema, 1..=NAMES.len(), 0usize..6).prop_flat_map(
        |(names, width, schema, schema_width, height)| {
            let columns = names[..width].to_vec();
            let schema: Vec<String> = schema[..schema_width]
                .iter()
                .map(|name| (*name).to_string())
                .collect();
            proptest::collection::vec(proptest::collection::vec(cell(), height), width).prop_map(
                move |cells| {
                    let frame = DataFrame::new(
                        columns
                            .iter()
                            .zip(cells)
                            .map(|(name, values)| string_column(name, values))
                            .collect(),
                    )
                    .expect("frame");
                    (frame, schema.clone())
                },
            )
        },
    )
}

fn snapshot(df: &DataFrame) -> Vec<(String, Vec<Option<String>>)> {
    column_names(df)
        .into_iter()
        .zip(df.get_columns().iter().map(column_values))
        .collect()
}

proptest! {
    #[test]
    fn conformance_yields_exact_schema((df, schema) in table_and_schema()) {
        let mut df = df;
        conform_to_schema(&mut df, &schema).expect("conform");
        prop_assert_eq!(column_names(&df), schema);
    }

    #[test]
    fn normalizing_twice_changes_nothing((df, schema) in table_and_schema()) {
        let mut df = df;
        conform_to_schema(&mut df, &schema).expect("conform");
        clean_sentinels(&mut df).expect("clean");
        let once = snapshot(&df);

        let changes = conform_to_schema(&mut df, &schema).expect("conform again");
        let cleaned = clean_sentinels(&mut df).expect("clean again");
        prop_assert!(changes.is_noop());
        prop_assert_eq!(cleaned, 0);
        prop_assert_eq!(snapshot(&df), once);
    }

    #[test]
    fn cleanup_commutes_with_conformance((df, schema) in table_and_schema()) {
        let mut conform_first = df.clone();
        conform_to_schema(&mut conform_first, &schema).expect("conform");
        clean_sentinels(&mut conform_first).expect("clean");

        let mut clean_first = df;
        clean_sentinels(&mut clean_first).expect("clean");
        conform_to_schema(&mut clean_first, &schema).expect("conform");

        prop_assert_eq!(snapshot(&conform_first), snapshot(&clean_first));
    }
}
