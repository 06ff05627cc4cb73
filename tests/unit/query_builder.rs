//! Unit tests for query building and size estimation

use crate::support::{population_variables, values};
use scb_client::query::{estimate, QueryBuilder, QueryDocument, QueryEntry, QueryError};
use scb_client::{QuerySelection, ResponseFormat, Selection, Variable};

fn two_variable_table() -> Vec<Variable> {
    vec![
        Variable::new("first_code", "first", values(&["one", "two", "three"])),
        Variable::new("second_code", "second", values(&["four", "five", "six"])),
    ]
}

#[test]
fn test_estimate_is_product_of_value_counts() {
    let doc = QueryDocument::new(
        vec![
            QueryEntry::item("A", values(&["1", "2", "3"])),
            QueryEntry::item("B", values(&["1", "2"])),
            QueryEntry::item("C", values(&["1", "2", "3", "4"])),
        ],
        ResponseFormat::Json,
    )
    .unwrap();
    assert_eq!(estimate(&doc), 24);
}

#[test]
fn test_estimate_of_empty_document_is_one() {
    let doc = QueryDocument::new(vec![], ResponseFormat::Json).unwrap();
    assert_eq!(estimate(&doc), 1);
}

#[test]
fn test_explicit_and_wildcard_scenario() {
    let vars = two_variable_table();
    let builder = QueryBuilder::new(&vars);

    let selection = QuerySelection::new()
        .with("first_code", Selection::Explicit(values(&["two"])))
        .with("second_code", Selection::All);
    let doc = builder.build(Some(&selection), ResponseFormat::Json, 0).unwrap();

    let expected = QueryDocument::new(
        vec![
            QueryEntry::item("first_code", values(&["two"])),
            QueryEntry::item("second_code", values(&["four", "five", "six"])),
        ],
        ResponseFormat::Json,
    )
    .unwrap();
    assert_eq!(doc, expected);
    assert_eq!(estimate(&doc), 3);

    let everything = builder.build(None, ResponseFormat::Json, 0).unwrap();
    assert_eq!(estimate(&everything), 9);
}

#[test]
fn test_merge_removes_variable() {
    let vars = two_variable_table();
    let selection = QuerySelection::new().with("first_code", Selection::Merge);
    let doc = QueryBuilder::new(&vars)
        .build(Some(&selection), ResponseFormat::Json, 0)
        .unwrap();
    assert!(doc.entry("first_code").is_none());
    assert_eq!(estimate(&doc), 3);

    let merged_all = QuerySelection::new()
        .with("first_code", Selection::Merge)
        .with("second_code", Selection::Merge);
    let doc = QueryBuilder::new(&vars)
        .build(Some(&merged_all), ResponseFormat::Json, 0)
        .unwrap();
    assert!(doc.entries().is_empty());
    assert_eq!(estimate(&doc), 1);
}

#[test]
fn test_no_selection_selects_everything_in_catalog_order() {
    let vars = population_variables();
    let doc = QueryBuilder::new(&vars)
        .build(None, ResponseFormat::Csv, 0)
        .unwrap();

    let codes: Vec<&str> = doc.entries().iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["Region", "Kon", "Tid"]);
    assert_eq!(estimate(&doc), 3 * 2 * 6);
    assert_eq!(doc.format(), ResponseFormat::Csv);
}

#[test]
fn test_explicit_values_keep_caller_order() {
    let vars = population_variables();
    let selection = QuerySelection::new().with(
        "Region",
        Selection::Explicit(values(&["03", "00"])),
    );
    let doc = QueryBuilder::new(&vars)
        .build(Some(&selection), ResponseFormat::Json, 0)
        .unwrap();
    assert_eq!(doc.entry("Region").unwrap().values(), values(&["03", "00"]).as_slice());
}

#[test]
fn test_time_top_keeps_latest_values() {
    let vars = population_variables();
    let doc = QueryBuilder::new(&vars)
        .build(None, ResponseFormat::Json, 3)
        .unwrap();
    assert_eq!(
        doc.entry("Tid").unwrap().values(),
        values(&["2003", "2004", "2005"]).as_slice()
    );
}

#[test]
fn test_time_top_larger_than_domain_keeps_everything() {
    let vars = population_variables();
    let doc = QueryBuilder::new(&vars)
        .build(None, ResponseFormat::Json, 50)
        .unwrap();
    assert_eq!(doc.entry("Tid").unwrap().values().len(), 6);
}

#[test]
fn test_time_top_without_time_variable() {
    let vars = two_variable_table();
    let result = QueryBuilder::new(&vars).build(None, ResponseFormat::Json, 2);
    assert!(matches!(result, Err(QueryError::NoTimeVariable)));
}

#[test]
fn test_time_top_conflicts_with_time_selection() {
    let vars = population_variables();
    let selection = QuerySelection::new().with("Tid", Selection::All);
    let result = QueryBuilder::new(&vars).build(Some(&selection), ResponseFormat::Json, 2);
    assert!(matches!(result, Err(QueryError::ConflictingTimeSelection(code)) if code == "Tid"));
}

#[test]
fn test_unknown_code_rejected() {
    let vars = population_variables();
    let selection = QuerySelection::new().with("Bogus", Selection::All);
    let result = QueryBuilder::new(&vars).build(Some(&selection), ResponseFormat::Json, 0);
    match result {
        Err(QueryError::InvalidVariable { code, valid }) => {
            assert_eq!(code, "Bogus");
            assert_eq!(valid, values(&["Region", "Kon", "Tid"]));
        }
        other => panic!("expected InvalidVariable, got {other:?}"),
    }
}

#[test]
fn test_value_outside_domain_rejected() {
    let vars = population_variables();
    let selection = QuerySelection::new().with("Region", Selection::Explicit(values(&["99"])));
    let result = QueryBuilder::new(&vars).build(Some(&selection), ResponseFormat::Json, 0);
    assert!(matches!(
        result,
        Err(QueryError::InvalidSelectionValue { code, .. }) if code == "Region"
    ));
}

#[test]
fn test_sentinels_accepted_at_boundary() {
    assert_eq!(
        Selection::from_values("Kon", values(&["%"])).unwrap(),
        Selection::Merge
    );
    assert_eq!(
        Selection::from_values("Kon", values(&["*"])).unwrap(),
        Selection::All
    );
    assert!(Selection::from_values("Kon", vec![]).is_err());
}

#[test]
fn test_wire_shape() {
    let vars = two_variable_table();
    let selection = QuerySelection::new().with("first_code", Selection::Merge);
    let doc = QueryBuilder::new(&vars)
        .build(Some(&selection), ResponseFormat::Csv, 0)
        .unwrap();

    let wire = doc.to_json();
    assert_eq!(wire["response"]["format"], "csv");
    assert_eq!(wire["query"].as_array().unwrap().len(), 1);
    assert_eq!(wire["query"][0]["code"], "second_code");
    assert_eq!(wire["query"][0]["selection"]["filter"], "item");
    assert_eq!(wire["query"][0]["selection"]["values"][2], "six");
}
