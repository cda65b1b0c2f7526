//! # Request/response model and the [`Transport`] trait.
//!
//! The runtime never talks to a concrete HTTP client. Every schema, prefill,
//! submission and asset request is expressed as an [`HttpRequest`] and handed to
//! an injected [`Transport`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::TransportError;

/// HTTP method subset used by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
        }
    }
}

/// Outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// JSON body (POST only).
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Creates a `GET` request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    /// Creates a `HEAD` request.
    pub fn head(url: Url) -> Self {
        Self::new(Method::Head, url)
    }

    /// Creates a `POST` request with a JSON body.
    pub fn post(url: Url, body: Value) -> Self {
        let mut req = Self::new(Method::Post, url);
        req.body = Some(body);
        req
    }

    fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Appends headers.
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Returns the first header value with the given (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Response as seen by the runtime.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Creates a `200` response carrying `value` as JSON.
    pub fn json_ok(value: &Value) -> Self {
        Self::new(200, value.to_string()).with_header("content-type", "application/json")
    }

    /// Appends one header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// `true` for 2xx statuses.
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the first header value with the given (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Returns the `Content-Type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::Decode {
            reason: e.to_string(),
        })
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// # Network transport.
///
/// Implementations perform exactly one request per call and must not retry on
/// their own: the runtime owns timeout and fallback policy.
///
/// A non-2xx status is a successful transport call (`Ok(HttpResponse)`);
/// `Err` is reserved for failures that produced no response.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends `req` and returns the response.
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}
