#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header::CONTENT_TYPE};
use axum::response::Response;
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::Value;
use stowage_cache::{CacheConfig, CacheError, CacheStore};
use tower::ServiceExt;

/// Store that fails every operation, counting the attempts.
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    fn fail<T>(&self) -> Result<T, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("store offline".into()))
    }
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        self.fail()
    }

    async fn get(&self, _key: &str) -> Result<Bytes, CacheError> {
        self.fail()
    }

    async fn delete(&self, _keys: &[String]) -> Result<(), CacheError> {
        self.fail()
    }

    async fn delete_wildcard(&self, _pattern: &str) -> Result<u64, CacheError> {
        self.fail()
    }
}

/// Collects the labels passed to the cache logger.
#[derive(Clone, Default)]
pub struct LoggedLabels(Arc<Mutex<Vec<String>>>);

impl LoggedLabels {
    pub fn attach(&self, config: CacheConfig) -> CacheConfig {
        let sink = self.0.clone();
        config.with_logger(move |label, _error| sink.lock().unwrap().push(label.to_string()))
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Counts handler invocations per request path.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<HashMap<String, usize>>>);

impl Calls {
    /// Records a call and returns how many calls `path` has seen, this one
    /// included.
    pub fn record(&self, path: &str) -> usize {
        let mut calls = self.0.lock().unwrap();
        let count = calls.entry(path.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, path: &str) -> usize {
        self.0.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

pub async fn send(app: &Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn read_body(response: Response) -> (StatusCode, Bytes) {
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let (status, body) = read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}
