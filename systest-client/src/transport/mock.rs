//! Mock transport for testing.
//!
//! Allows queueing responses per endpoint and capturing requests for
//! verification.

use super::{RawResponse, Service, Transport, TransportError};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// A request seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Target service.
    pub service: Service,
    /// Request path.
    pub path: String,
    /// Query pairs.
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

type Endpoint = (Service, String);

/// Mock transport for testing.
///
/// Queued responses are returned first, in order. Once an endpoint's queue is
/// empty its fixed response (if any) is returned on every call; otherwise the
/// mock answers 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    queued: HashMap<Endpoint, VecDeque<RawResponse>>,
    fixed: HashMap<Endpoint, RawResponse>,
    requests: Vec<RecordedRequest>,
    fail_next_get: Option<String>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next call to `service` + `path`.
    pub fn queue_response(&self, service: Service, path: &str, response: RawResponse) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .queued
            .entry((service, path.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Queue a 200 response with a JSON body.
    pub fn queue_json<T: Serialize>(&self, service: Service, path: &str, body: &T) {
        let body = serde_json::to_string(body).unwrap();
        self.queue_response(service, path, RawResponse::ok(body));
    }

    /// Answer every call to `service` + `path` with `response` once the queue
    /// is drained.
    pub fn set_response(&self, service: Service, path: &str, response: RawResponse) {
        let mut inner = self.inner.lock().unwrap();
        inner.fixed.insert((service, path.to_string()), response);
    }

    /// Fixed 200 response with a JSON body.
    pub fn set_json<T: Serialize>(&self, service: Service, path: &str, body: &T) {
        let body = serde_json::to_string(body).unwrap();
        self.set_response(service, path, RawResponse::ok(body));
    }

    /// Get all requests that were issued.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Get the last request that was issued.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.last().cloned()
    }

    /// Number of requests issued to `path`.
    pub fn request_count(&self, path: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.requests.iter().filter(|r| r.path == path).count()
    }

    /// Cause the next get() to fail with the given error.
    pub fn fail_next_get(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_get = Some(error.to_string());
    }

    /// Clear all state (responses, requests, failures).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockTransportInner::default();
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        service: Service,
        path: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, TransportError> {
        let mut inner = self.inner.lock().unwrap();

        inner.requests.push(RecordedRequest {
            service,
            path: path.to_string(),
            query: query.to_vec(),
        });

        // Check for forced failure
        if let Some(error) = inner.fail_next_get.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        let key = (service, path.to_string());
        if let Some(response) = inner.queued.get_mut(&key).and_then(VecDeque::pop_front) {
            return Ok(response);
        }
        Ok(inner
            .fixed
            .get(&key)
            .cloned()
            .unwrap_or_else(|| RawResponse::new(404, format!("no mock response for {path}"))))
    }
}
