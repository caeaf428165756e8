use super::*;

#[test]
fn rejects_ragged_columns() {
    let err = DatasetView::new(vec![
        Column::numeric("a", vec![1.0, 2.0]),
        Column::numeric("b", vec![1.0]),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("has 1 rows, expected 2"));
}

#[test]
fn rejects_duplicate_names() {
    assert!(
        DatasetView::new(vec![
            Column::numeric("a", vec![1.0]),
            Column::numeric("a", vec![2.0]),
        ])
        .is_err()
    );
}

#[test]
fn parses_json_boundary_form() {
    let json = r#"{
        "columns": [
            { "name": "day", "kind": "temporal", "values": [0, 86400000] },
            { "name": "region", "kind": "categorical", "values": ["north", "south"] },
            { "name": "sales", "kind": "numeric", "values": [1.5, null] }
        ]
    }"#;
    let ds = DatasetView::from_reader(json.as_bytes()).unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.column("day").unwrap().kind(), ColumnKind::Temporal);
    assert_eq!(ds.column_index("sales"), Some(2));
    let sales = ds.column("sales").unwrap().as_numeric().unwrap();
    assert_eq!(sales[0], 1.5);
    assert!(sales[1].is_nan());
}

#[test]
fn json_type_mismatch_names_row() {
    let json = r#"{ "columns": [ { "name": "x", "kind": "numeric", "values": [1, "two"] } ] }"#;
    let err = DatasetView::from_reader(json.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("row 1"));
}
