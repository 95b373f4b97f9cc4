//! Mock transport implementation for testing
//!
//! Serves scripted replies per URL without any network access and records
//! every call so tests can assert on what was sent.

use super::transport::{HttpResponse, SeedTransport, TransportError};
use crate::instance::Credentials;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// Scripted result of one request
pub type Reply = Result<HttpResponse, TransportError>;

/// HTTP method of a recorded call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

/// One request observed by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub credentials: Option<Credentials>,
}

#[derive(Debug)]
struct MockState {
    gets: HashMap<String, VecDeque<Reply>>,
    puts: HashMap<String, VecDeque<Reply>>,
    default_get: Reply,
    default_put: Reply,
    calls: Vec<RecordedCall>,
}

/// In-memory transport.
///
/// Replies queued for a URL are served in order; the last queued reply
/// repeats forever. URLs with nothing queued get the default reply
/// (`201 {"ok":true}` for PUT, unreachable for GET).
///
/// Clones share state, so a test can keep a handle after giving one away.
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                gets: HashMap::new(),
                puts: HashMap::new(),
                default_get: Err(TransportError::Unreachable {
                    url: String::new(),
                    message: "connection refused".to_string(),
                }),
                default_put: Ok(HttpResponse::new(201, r#"{"ok":true}"#)),
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a reply for GET `url`
    pub fn on_get(&self, url: impl Into<String>, reply: Reply) -> &Self {
        self.lock()
            .gets
            .entry(url.into())
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a reply for PUT `url`
    pub fn on_put(&self, url: impl Into<String>, reply: Reply) -> &Self {
        self.lock()
            .puts
            .entry(url.into())
            .or_default()
            .push_back(reply);
        self
    }

    /// Reply for GETs to URLs with nothing queued
    pub fn default_get(&self, reply: Reply) -> &Self {
        self.lock().default_get = reply;
        self
    }

    /// All calls so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Number of GETs issued to `url`
    pub fn get_count(&self, url: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.method == Method::Get && c.url == url)
            .count()
    }

    fn next_reply(queue: Option<&mut VecDeque<Reply>>, fallback: &Reply) -> Reply {
        match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| fallback.clone()),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| fallback.clone()),
            None => fallback.clone(),
        }
    }
}

impl SeedTransport for MockTransport {
    fn put_json(
        &self,
        url: &str,
        body: Option<&serde_json::Value>,
        credentials: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError> {
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            method: Method::Put,
            url: url.to_string(),
            body: body.cloned(),
            credentials: credentials.cloned(),
        });
        let fallback = state.default_put.clone();
        Self::next_reply(state.puts.get_mut(url), &fallback)
    }

    fn get(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError> {
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            method: Method::Get,
            url: url.to_string(),
            body: None,
            credentials: credentials.cloned(),
        });
        let fallback = state.default_get.clone();
        Self::next_reply(state.gets.get_mut(url), &fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_replies_then_last_repeats() {
        let mock = MockTransport::new();
        mock.on_get("http://x/a", Ok(HttpResponse::new(503, "")))
            .on_get("http://x/a", Ok(HttpResponse::new(200, "{}")));

        assert_eq!(mock.get("http://x/a", None).unwrap().status, 503);
        assert_eq!(mock.get("http://x/a", None).unwrap().status, 200);
        assert_eq!(mock.get("http://x/a", None).unwrap().status, 200);
        assert_eq!(mock.get_count("http://x/a"), 3);
    }

    #[test]
    fn test_defaults() {
        let mock = MockTransport::new();
        assert!(mock.get("http://x/unknown", None).is_err());
        assert_eq!(mock.put_json("http://x/db", None, None).unwrap().status, 201);
    }

    #[test]
    fn test_clones_share_state() {
        let mock = MockTransport::new();
        let handle = mock.clone();
        mock.put_json("http://x/db", Some(&serde_json::json!({"a": 1})), None)
            .unwrap();

        let calls = handle.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::Put);
        assert_eq!(calls[0].body, Some(serde_json::json!({"a": 1})));
    }
}
