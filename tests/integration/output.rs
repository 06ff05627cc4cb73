//! Integration tests for writing partitioned results to CSV

use crate::support::{fast_config, json_data_body, population_variables, table, StubTransport};
use scb_client::output::csv::write_results;
use scb_client::{QuerySelection, ResponseFormat, Selection, StatsClient};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_partitioned_results_written_as_one_table() {
    let stub = Arc::new(
        StubTransport::new()
            .on_post(200, json_data_body(&[&["00", "2003"], &["00", "2004"]]))
            .on_post(200, json_data_body(&[&["00", "2005"]])),
    );
    let client = StatsClient::with_variables(
        table(),
        stub,
        fast_config().with_size_limit(0).with_server_limit(2),
        population_variables(),
    );

    let selection = QuerySelection::new()
        .with("Region", Selection::Explicit(vec!["00".into()]))
        .with("Kon", Selection::Merge);
    // 1 region * latest 3 years, 2 cells per request
    let query = client
        .create_query(Some(&selection), ResponseFormat::Json, 3)
        .await
        .unwrap();
    let results = client.execute(&query).await.unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("folkmangd.csv");
    let rows = write_results(&path, &results).unwrap();

    assert_eq!(rows, 3);
    let written = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "Region,Tid,BE0101N1");
    assert_eq!(lines[1], "00,2003,1");
    assert_eq!(lines[3], "00,2005,1");
}
