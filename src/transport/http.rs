//! # reqwest-backed [`Transport`].

use async_trait::async_trait;

use super::request::{HttpRequest, HttpResponse, Method, Transport};
use crate::error::TransportError;

/// [`Transport`] over a shared [`reqwest::Client`].
///
/// The client is cheap to clone; one instance may serve many widgets.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing client (custom TLS roots, proxies, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match req.method {
            Method::Get => self.client.get(req.url),
            Method::Head => self.client.head(req.url),
            Method::Post => self.client.post(req.url),
        };
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(request_error)?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = resp.bytes().await.map_err(request_error)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn request_error(e: reqwest::Error) -> TransportError {
    TransportError::Request {
        reason: e.to_string(),
    }
}
