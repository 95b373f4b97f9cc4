//! HTTP transport used for seeding and endpoint checks
//!
//! Defines an abstraction over the handful of HTTP calls the harness makes.
//! `HttpTransport` is the blocking `reqwest` implementation; tests use
//! [`MockTransport`](super::mock::MockTransport).

use crate::instance::Credentials;
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection refused, reset, timed out, or the body could not be read.
    /// The service may simply not be up yet.
    #[error("{url} unreachable: {message}")]
    Unreachable { url: String, message: String },

    /// The request itself is malformed and will never succeed
    #[error("Invalid request to {url}: {message}")]
    InvalidRequest { url: String, message: String },
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 401 or 403
    pub fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Body parsed as JSON, if it is JSON
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// The HTTP operations the harness needs
pub trait SeedTransport {
    /// PUT `url`, with an optional JSON body
    fn put_json(
        &self,
        url: &str,
        body: Option<&serde_json::Value>,
        credentials: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError>;

    /// GET `url`
    fn get(&self, url: &str, credentials: Option<&Credentials>)
    -> Result<HttpResponse, TransportError>;
}

/// Blocking `reqwest` transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Build a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    fn send(
        &self,
        url: &str,
        request: reqwest::blocking::RequestBuilder,
        credentials: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = request.header(ACCEPT, "text/json");
        if let Some(creds) = credentials {
            request = request.basic_auth(&creds.user, Some(&creds.password));
        }

        let response = request.send().map_err(|e| classify_error(url, e))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| TransportError::Unreachable {
            url: url.to_string(),
            message: format!("failed to read body: {e}"),
        })?;

        Ok(HttpResponse { status, body })
    }
}

impl SeedTransport for HttpTransport {
    fn put_json(
        &self,
        url: &str,
        body: Option<&serde_json::Value>,
        credentials: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.put(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(url, request, credentials)
    }

    fn get(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<HttpResponse, TransportError> {
        self.send(url, self.client.get(url), credentials)
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_builder() {
        TransportError::InvalidRequest {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        TransportError::Unreachable {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
