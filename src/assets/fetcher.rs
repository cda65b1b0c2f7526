//! # Load one asset.
//!
//! [`AssetFetcher::load`] turns an [`AssetDescriptor`] into a [`LoadResult`]:
//!
//! ```text
//! validate() true? ──► success (no network)
//! key present?     ──► success (no network)
//! primary:  parse url ─► classify ─► GET (timeout) ─► insert
//!              │ fail
//!              ▼
//! fallback: parse url ─► classify ─► GET (timeout) ─► insert   (used_fallback = true)
//!              │ fail
//!              ▼
//!          failure result (never an Err)
//! ```
//!
//! ## Rules
//! - Never panics, never returns `Err`: every failure is recorded in the result.
//! - Exactly one `GET` per attempted source; at most one extra `HEAD` probe
//!   when the resource type is ambiguous.
//! - An invalid URL is not retried; the fallback (if any) is still tried.
//! - Hints (`Preconnect`/`Preload`) are declarations and never hit the network.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use url::Url;

use super::descriptor::{AssetDescriptor, AssetKind};
use super::registry::ResourceRegistry;
use super::scope::{Resource, ResourceKind};
use super::state::LoadResult;
use crate::error::FetchError;
use crate::transport::{Credentials, HttpRequest, HttpResponse, Transport};

/// Loads single assets into the registry's scope.
#[derive(Clone)]
pub struct AssetFetcher {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    registry: Arc<ResourceRegistry>,
    timeout: Duration,
}

impl AssetFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Credentials,
        registry: Arc<ResourceRegistry>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            credentials,
            registry,
            timeout,
        }
    }

    /// Loads `d`, trying its fallback once if the primary fails.
    pub async fn load(&self, d: &AssetDescriptor) -> LoadResult {
        if let Some(validate) = &d.validate {
            if validate(self.registry.scope()) {
                tracing::debug!(asset = %d.key, "already satisfied by host; skipping fetch");
                return LoadResult::ok(&d.key, d.required, None, false);
            }
        }
        if self.registry.is_present(&d.key) {
            tracing::debug!(asset = %d.key, "already present in scope");
            return LoadResult::ok(&d.key, d.required, None, false);
        }

        let primary_err = match self.try_source(d, &d.primary_url).await {
            Ok(()) => return LoadResult::ok(&d.key, d.required, Some(d.primary_url.clone()), false),
            Err(e) => e,
        };
        tracing::warn!(asset = %d.key, url = %d.primary_url, error = %primary_err, "primary source failed");

        let Some(fallback) = d.fallback_url.as_deref() else {
            return LoadResult::failed(&d.key, d.required, Some(d.primary_url.clone()), primary_err);
        };

        match self.try_source(d, fallback).await {
            Ok(()) => {
                tracing::info!(asset = %d.key, url = %fallback, "loaded from fallback");
                LoadResult::ok(&d.key, d.required, Some(fallback.to_string()), true)
            }
            Err(e) => {
                tracing::warn!(asset = %d.key, url = %fallback, error = %e, "fallback source failed");
                LoadResult::failed(&d.key, d.required, Some(fallback.to_string()), e)
            }
        }
    }

    /// Inserts generated CSS rules under `key`.
    pub fn inline_style(&self, key: &str, css: &str) -> LoadResult {
        let res = Resource {
            key: key.to_string(),
            kind: ResourceKind::InlineStyle,
            url: None,
            content: css.as_bytes().to_vec(),
            provides: None,
        };
        match self.registry.insert(res) {
            Ok(_) => LoadResult::ok(key, false, None, false),
            Err(e) => LoadResult::failed(key, false, None, e),
        }
    }

    async fn try_source(&self, d: &AssetDescriptor, raw: &str) -> Result<(), FetchError> {
        let url = parse_asset_url(raw)?;
        let kind = self.classify(d.kind, &url).await?;

        let content = match kind {
            ResourceKind::Preconnect | ResourceKind::Preload | ResourceKind::InlineStyle => Vec::new(),
            ResourceKind::Stylesheet | ResourceKind::Script | ResourceKind::Font => {
                self.get(&url).await?.body
            }
        };
        let url = match kind {
            ResourceKind::Preconnect => Url::parse(&url.origin().ascii_serialization()).unwrap_or(url),
            _ => url,
        };

        self.registry.insert(Resource {
            key: d.key.clone(),
            kind,
            url: Some(url),
            content,
            provides: d.provides.clone(),
        })?;
        Ok(())
    }

    async fn classify(&self, kind: AssetKind, url: &Url) -> Result<ResourceKind, FetchError> {
        match kind {
            AssetKind::Style => return Ok(ResourceKind::Stylesheet),
            AssetKind::Script => return Ok(ResourceKind::Script),
            AssetKind::Font => return Ok(ResourceKind::Font),
            AssetKind::Preconnect => return Ok(ResourceKind::Preconnect),
            AssetKind::Preload => return Ok(ResourceKind::Preload),
            AssetKind::Auto => {}
        }

        if let Some(k) = kind_from_extension(url) {
            return Ok(k);
        }
        match self.probe(url).await {
            Ok(Some(k)) => return Ok(k),
            Ok(None) => tracing::debug!(url = %url, "probe returned no usable content type"),
            Err(e) => tracing::debug!(url = %url, error = %e, "type probe failed"),
        }
        kind_from_path_hint(url).ok_or_else(|| FetchError::Unclassified {
            url: url.to_string(),
        })
    }

    async fn probe(&self, url: &Url) -> Result<Option<ResourceKind>, FetchError> {
        let req = HttpRequest::head(url.clone()).with_headers(self.credentials.headers_for(url));
        let resp = self.send(req).await?;
        Ok(resp.content_type().and_then(kind_from_content_type))
    }

    async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        let req = HttpRequest::get(url.clone()).with_headers(self.credentials.headers_for(url));
        self.send(req).await
    }

    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, FetchError> {
        let resp = match time::timeout(self.timeout, self.transport.send(req)).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                return Err(FetchError::Transport {
                    reason: e.to_string(),
                })
            }
            Err(_elapsed) => {
                return Err(FetchError::Timeout {
                    timeout: self.timeout,
                })
            }
        };
        if !resp.is_success() {
            return Err(FetchError::Status {
                status: resp.status,
            });
        }
        Ok(resp)
    }
}

fn parse_asset_url(raw: &str) -> Result<Url, FetchError> {
    let invalid = || FetchError::InvalidUrl {
        url: raw.to_string(),
    };
    let url = Url::parse(raw).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => {
            tracing::warn!(url = %raw, "rejecting asset url with unsupported scheme");
            Err(invalid())
        }
    }
}

fn kind_from_extension(url: &Url) -> Option<ResourceKind> {
    let path = url.path().to_ascii_lowercase();
    let ext = path.rsplit_once('.').map(|(_, ext)| ext)?;
    match ext {
        "css" => Some(ResourceKind::Stylesheet),
        "js" | "mjs" => Some(ResourceKind::Script),
        "woff2" | "woff" | "ttf" | "otf" => Some(ResourceKind::Font),
        _ => None,
    }
}

fn kind_from_content_type(ct: &str) -> Option<ResourceKind> {
    let ct = ct.to_ascii_lowercase();
    if ct.contains("text/css") {
        Some(ResourceKind::Stylesheet)
    } else if ct.contains("javascript") || ct.contains("ecmascript") {
        Some(ResourceKind::Script)
    } else if ct.starts_with("font/") || ct.contains("font-woff") {
        Some(ResourceKind::Font)
    } else {
        None
    }
}

// Last resort for extension-less URLs such as `/assets/css?v=3` or `/js/bundle`.
// Only the last two segments count; the base path must not decide the kind.
fn kind_from_path_hint(url: &Url) -> Option<ResourceKind> {
    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    let tail = segments[segments.len().saturating_sub(2)..].join("/");
    let hay = format!("/{tail}?{}", url.query().unwrap_or_default()).to_ascii_lowercase();
    if hay.contains("css") {
        Some(ResourceKind::Stylesheet)
    } else if hay.contains(".js") || hay.contains("/js") || hay.contains("script") {
        Some(ResourceKind::Script)
    } else {
        None
    }
}
