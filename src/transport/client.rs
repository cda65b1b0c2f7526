//! JSON calls against the forms backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time;
use url::Url;

use super::auth::Credentials;
use super::request::{HttpRequest, HttpResponse, Transport};
use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{TransportError, WidgetError};

/// Credentialed JSON client over a [`Transport`].
///
/// Every call is bounded by a timeout; an expired call is a
/// [`TransportError::Timeout`].
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replaces the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `GET url`, expecting a 2xx JSON body.
    pub async fn get_json(&self, url: &Url) -> Result<Value, WidgetError> {
        let req = HttpRequest::get(url.clone()).with_headers(self.credentials.headers_for(url));
        let resp = self.send(req).await?;
        decode(url, &resp)
    }

    /// `POST url` with a JSON body, expecting a 2xx response.
    ///
    /// An empty response body decodes as `null`.
    pub async fn post_json(&self, url: &Url, body: Value) -> Result<Value, WidgetError> {
        let req = HttpRequest::post(url.clone(), body).with_headers(self.credentials.headers_for(url));
        let resp = self.send(req).await?;
        if resp.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        decode(url, &resp)
    }

    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, WidgetError> {
        let url = req.url.to_string();
        let method = req.method;
        let resp = match time::timeout(self.timeout, self.transport.send(req)).await {
            Ok(res) => res?,
            Err(_elapsed) => {
                tracing::warn!(method = method.as_str(), %url, timeout = ?self.timeout, "backend request timed out");
                return Err(WidgetError::Transport(TransportError::Timeout {
                    timeout: self.timeout,
                }));
            }
        };
        if !resp.is_success() {
            tracing::warn!(method = method.as_str(), %url, status = resp.status, "backend request failed");
            return Err(WidgetError::Http {
                status: resp.status,
                url,
            });
        }
        Ok(resp)
    }
}

fn decode(url: &Url, resp: &HttpResponse) -> Result<Value, WidgetError> {
    resp.json::<Value>().map_err(|e| {
        tracing::warn!(%url, error = %e, "undecodable backend response");
        WidgetError::Transport(e)
    })
}
