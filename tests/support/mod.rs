//! Shared test fixtures: a recording transport and canned tables

#![allow(dead_code)]

use async_trait::async_trait;
use scb_client::client::ClientConfig;
use scb_client::transport::{RawResponse, Transport, TransportError, TransportResult};
use scb_client::{TablePath, Variable};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub const BASE_URL: &str = "http://stub.test/api";
pub const TABLE: &str = "BE/BE0101/BE0101A/BefolkningNy";

/// A request the stub received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    Post(String, Value),
}

/// Transport that answers from queues and records every call
///
/// GETs are answered per URL (404 when nothing is queued). POSTs are answered
/// in sequence regardless of URL.
#[derive(Default)]
pub struct StubTransport {
    gets: Mutex<HashMap<String, VecDeque<RawResponse>>>,
    posts: Mutex<VecDeque<RawResponse>>,
    calls: Mutex<Vec<Call>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.gets
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(RawResponse::new(status, body.into()));
        self
    }

    pub fn on_post(self, status: u16, body: impl Into<String>) -> Self {
        self.posts
            .lock()
            .unwrap()
            .push_back(RawResponse::new(status, body.into()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn post_bodies(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Post(_, body) => Some(body),
                Call::Get(_) => None,
            })
            .collect()
    }

    pub fn get_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Get(_)))
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &str) -> TransportResult<RawResponse> {
        self.calls.lock().unwrap().push(Call::Get(url.to_string()));
        let response = self
            .gets
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        Ok(response.unwrap_or_else(|| RawResponse::new(404, "")))
    }

    async fn post(&self, url: &str, body: &Value) -> TransportResult<RawResponse> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Post(url.to_string(), body.clone()));
        self.posts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Network("no stubbed POST response left".to_string()))
    }
}

pub fn table() -> TablePath {
    TablePath::parse(TABLE).unwrap()
}

pub fn data_url() -> String {
    format!("{BASE_URL}/{TABLE}")
}

/// Config with no delays so retry and partition paths run instantly
pub fn fast_config() -> ClientConfig {
    ClientConfig::default()
        .with_base_url(BASE_URL)
        .with_rate_limit_backoff(Duration::ZERO)
        .with_partition_delay(Duration::ZERO)
}

pub fn values(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Region (3 values), Kon (2 values, eliminable) and Tid (2000..=2005, time)
pub fn population_variables() -> Vec<Variable> {
    vec![
        Variable::new("Region", "region", values(&["00", "01", "03"])),
        Variable::new("Kon", "kön", values(&["1", "2"])).with_elimination(true),
        Variable::new(
            "Tid",
            "år",
            values(&["2000", "2001", "2002", "2003", "2004", "2005"]),
        )
        .with_time(true),
    ]
}

/// Metadata body as the server sends it, BOM included
pub fn metadata_body(variables: &[Variable]) -> String {
    let body = json!({ "title": "Folkmängd", "variables": variables });
    format!("\u{feff}{body}")
}

/// JSON data body with one record per key
pub fn json_data_body(keys: &[&[&str]]) -> String {
    let data: Vec<Value> = keys
        .iter()
        .map(|key| json!({ "key": key, "values": ["1"] }))
        .collect();
    let body = json!({
        "columns": [
            { "code": "Region", "text": "region", "type": "d" },
            { "code": "Tid", "text": "år", "type": "t" },
            { "code": "BE0101N1", "text": "Folkmängd", "type": "c" }
        ],
        "comments": [],
        "data": data,
    });
    format!("\u{feff}{body}")
}

/// Values of `code` in a posted query body
pub fn posted_values(body: &Value, code: &str) -> Vec<String> {
    body["query"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["code"] == code)
        .map(|entry| {
            entry["selection"]["values"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap().to_string())
                .collect()
        })
        .unwrap_or_default()
}
