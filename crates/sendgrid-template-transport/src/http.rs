// crates/sendgrid-template-transport/src/http.rs
// ============================================================================
// Module: HTTP Client Seam
// Description: Minimal HTTP interface used by the transport, plus a reqwest adapter.
// Purpose: Issue JSON POST requests with bearer authentication.
// Dependencies: reqwest, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! The transport only needs to POST a JSON body with a bearer token and read
//! back a status code, headers and body. [`HttpClient`] captures exactly that,
//! so tests can substitute a stub and deployments can share one
//! [`ReqwestHttpClient`] across transports.
//! Invariants:
//! - A returned [`HttpResponse`] means the server answered; any status is possible.
//! - Response header names are lower-cased; values keep their order.
//! - Response bodies are capped at [`MAX_RESPONSE_BYTES`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum response body size read from the provider, in bytes.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default user agent for outbound requests.
const DEFAULT_USER_AGENT: &str = concat!("sendgrid-template-transport/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by HTTP clients before a response is available.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The client could not be constructed.
    #[error("http client build failed: {0}")]
    Build(String),
    /// The request could not be completed.
    #[error("http request failed: {0}")]
    Request(String),
    /// The response body could not be read.
    #[error("http response read failed: {0}")]
    Body(String),
}

// ============================================================================
// SECTION: Request and Response
// ============================================================================

/// JSON POST request issued by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Target URL.
    pub url: Url,
    /// Bearer token for the `Authorization` header.
    pub bearer_token: String,
    /// JSON request body.
    pub body: Value,
}

/// Response returned by an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    status: u16,
    /// Header values keyed by lower-cased name.
    headers: BTreeMap<String, Vec<String>>,
    /// Raw body bytes.
    body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response from its parts.
    pub fn new<N, V>(
        status: u16,
        headers: impl IntoIterator<Item = (N, V)>,
        body: impl Into<Vec<u8>>,
    ) -> Self
    where
        N: AsRef<str>,
        V: Into<String>,
    {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in headers {
            grouped.entry(name.as_ref().to_ascii_lowercase()).or_default().push(value.into());
        }
        Self {
            status,
            headers: grouped,
            body: body.into(),
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns every value of a header, case-insensitively.
    #[must_use]
    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers.get(&name.to_ascii_lowercase()).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the first value of a header, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().map(String::as_str)
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the body is not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

// ============================================================================
// SECTION: Client Trait
// ============================================================================

/// Issues JSON POST requests with bearer authentication.
pub trait HttpClient: Send + Sync {
    /// Sends the request and returns the server response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] when no response could be obtained.
    fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, HttpClientError>;
}

// ============================================================================
// SECTION: Reqwest Client
// ============================================================================

/// Settings for [`ReqwestHttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientSettings {
    /// Timeout covering the full request lifecycle.
    pub timeout: Duration,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// [`HttpClient`] backed by a blocking reqwest client.
///
/// # Invariants
/// - Redirects are not followed.
pub struct ReqwestHttpClient {
    /// Underlying reqwest client.
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client from settings.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::Build`] when the client cannot be created.
    pub fn new(settings: &HttpClientSettings) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| HttpClientError::Build(err.to_string()))?;
        Ok(Self {
            client,
        })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, HttpClientError> {
        let body =
            serde_json::to_vec(&request.body).map_err(|err| HttpClientError::Request(err.to_string()))?;
        let response = self
            .client
            .post(request.url.as_str())
            .bearer_auth(&request.bearer_token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| HttpClientError::Request(err.to_string()))?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let limit = u64::try_from(MAX_RESPONSE_BYTES)
            .map_err(|err| HttpClientError::Body(err.to_string()))?;
        let mut bytes = Vec::new();
        response
            .take(limit)
            .read_to_end(&mut bytes)
            .map_err(|err| HttpClientError::Body(err.to_string()))?;
        Ok(HttpResponse::new(status, headers, bytes))
    }
}
