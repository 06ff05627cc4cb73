//! Integration tests for variable metadata loading

use crate::support::{
    data_url, fast_config, metadata_body, population_variables, table, StubTransport,
};
use scb_client::query::QueryError;
use scb_client::{ClientError, ErrorKind, ResponseFormat, StatsClient};
use std::sync::Arc;

#[tokio::test]
async fn test_variables_fetched_once_and_cached() {
    let stub = Arc::new(
        StubTransport::new().on_get(&data_url(), 200, metadata_body(&population_variables())),
    );
    let client = StatsClient::new(table(), stub.clone(), fast_config());

    let variables = client.variables().await.unwrap();
    assert_eq!(variables, population_variables().as_slice());

    client
        .create_query(None, ResponseFormat::Json, 0)
        .await
        .unwrap();
    client
        .create_query(None, ResponseFormat::Csv, 2)
        .await
        .unwrap();

    assert_eq!(stub.get_count(), 1);
}

#[tokio::test]
async fn test_metadata_flags_parsed() {
    let stub = Arc::new(
        StubTransport::new().on_get(&data_url(), 200, metadata_body(&population_variables())),
    );
    let client = StatsClient::new(table(), stub, fast_config());

    let variables = client.variables().await.unwrap();
    let tid = variables.iter().find(|v| v.code == "Tid").unwrap();
    assert!(tid.is_time);
    let kon = variables.iter().find(|v| v.code == "Kon").unwrap();
    assert!(kon.is_elimination);
    assert_eq!(kon.value_texts, vec!["1", "2"]);
}

#[tokio::test]
async fn test_metadata_failure_is_reported() {
    let stub = Arc::new(StubTransport::new().on_get(&data_url(), 503, ""));
    let client = StatsClient::new(table(), stub.clone(), fast_config());

    let err = client
        .create_query(None, ResponseFormat::Json, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedStatus { status: 503, .. }));
    assert_eq!(stub.post_bodies().len(), 0);
}

#[tokio::test]
async fn test_garbled_metadata_is_payload_error() {
    let stub = Arc::new(StubTransport::new().on_get(&data_url(), 200, "not json"));
    let client = StatsClient::new(table(), stub, fast_config());

    let err = client.variables().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Payload);
}

#[tokio::test]
async fn test_invalid_preferred_partition_variable() {
    let stub = Arc::new(
        StubTransport::new().on_get(&data_url(), 200, metadata_body(&population_variables())),
    );
    let mut client = StatsClient::new(table(), stub, fast_config());

    let err = client
        .set_preferred_partition_variable("Alder")
        .await
        .unwrap_err();
    match err {
        ClientError::Query(QueryError::InvalidVariable { code, valid }) => {
            assert_eq!(code, "Alder");
            assert_eq!(valid, vec!["Region", "Kon", "Tid"]);
        }
        other => panic!("expected InvalidVariable, got {other:?}"),
    }
    assert_eq!(client.preferred_partition_variable(), None);

    client.set_preferred_partition_variable("Tid").await.unwrap();
    assert_eq!(client.preferred_partition_variable(), Some("Tid"));
    client.clear_preferred_partition_variable();
    assert_eq!(client.preferred_partition_variable(), None);
}
