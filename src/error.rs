//! Error types used by the widget runtime.
//!
//! This module defines the error enums raised along the required paths:
//!
//! - [`WidgetError`] failures surfaced to the caller of `load`/`submit`/`draft`.
//! - [`ConfigError`] invalid or missing configuration.
//! - [`TransportError`] network failures below the HTTP layer.
//! - [`FetchError`] why a single asset load failed (recorded, not always fatal).
//! - [`RendererError`] the third-party renderer refused an operation.
//!
//! All types provide `as_label` (stable snake_case, for logs/metrics) and
//! `as_message` helpers.

use std::time::Duration;
use thiserror::Error;

/// # Errors returned by the public widget actions.
///
/// Cancellation and gate contention are **not** errors; they are reported
/// through [`Outcome`](crate::Outcome).
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum WidgetError {
    /// Configuration is missing a required element or is malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend answered with a non-success status.
    #[error("http {status} from {url}")]
    Http {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The schema payload did not contain a usable schema.
    #[error("invalid schema payload: {reason}")]
    Schema {
        /// What was wrong with the payload.
        reason: String,
    },

    /// A required asset could not be loaded from primary nor fallback.
    #[error("required asset '{key}' failed: {reason}")]
    Asset {
        /// Asset key (e.g. `formio-js`).
        key: String,
        /// Last failure reason.
        reason: String,
    },

    /// The renderer rejected instantiation or an operation.
    #[error("renderer error: {0}")]
    Renderer(#[from] RendererError),

    /// The action needs a rendered form but none exists.
    #[error("form is not rendered")]
    NotReady,
}

impl WidgetError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use formview::WidgetError;
    ///
    /// let err = WidgetError::Http { status: 404, url: "https://x/schema".into() };
    /// assert_eq!(err.as_label(), "widget_http");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WidgetError::Config(_) => "widget_config",
            WidgetError::Http { .. } => "widget_http",
            WidgetError::Transport(_) => "widget_transport",
            WidgetError::Schema { .. } => "widget_schema",
            WidgetError::Asset { .. } => "widget_asset",
            WidgetError::Renderer(_) => "widget_renderer",
            WidgetError::NotReady => "widget_not_ready",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WidgetError::Config(e) => format!("config: {e}"),
            WidgetError::Http { status, url } => format!("status {status} from {url}"),
            WidgetError::Transport(e) => e.as_message(),
            WidgetError::Schema { reason } => format!("schema: {reason}"),
            WidgetError::Asset { key, reason } => format!("asset {key}: {reason}"),
            WidgetError::Renderer(e) => format!("renderer: {e}"),
            WidgetError::NotReady => "form is not rendered".to_string(),
        }
    }
}

/// # Configuration errors.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The form identifier was not supplied.
    #[error("form id is required")]
    MissingFormId,

    /// No transport was supplied and the `http` feature is disabled.
    #[error("no transport configured")]
    MissingTransport,

    /// An identifier cannot be used as a URL path segment.
    #[error("invalid identifier '{id}'")]
    InvalidId {
        /// Offending identifier.
        id: String,
    },

    /// A URL (base, endpoint override) could not be parsed.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl {
        /// Offending input.
        url: String,
        /// Parser message.
        reason: String,
    },
}

/// # Network errors below the HTTP status layer.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// The request did not complete within the allotted time.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// Connection, TLS or protocol failure.
    #[error("request failed: {reason}")]
    Request {
        /// Underlying error message.
        reason: String,
    },

    /// Response body could not be decoded.
    #[error("decode failed: {reason}")]
    Decode {
        /// Underlying error message.
        reason: String,
    },
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::Timeout { .. } => "transport_timeout",
            TransportError::Request { .. } => "transport_request",
            TransportError::Decode { .. } => "transport_decode",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TransportError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TransportError::Request { reason } => format!("request: {reason}"),
            TransportError::Decode { reason } => format!("decode: {reason}"),
        }
    }
}

/// # Why a single asset load failed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// URL did not parse or used a scheme other than http/https.
    #[error("invalid asset url '{url}'")]
    InvalidUrl {
        /// Offending input.
        url: String,
    },

    /// The load exceeded the asset timeout.
    #[error("asset load timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// Non-success HTTP status.
    #[error("asset responded {status}")]
    Status {
        /// Response status code.
        status: u16,
    },

    /// Transport failure.
    #[error("asset transport failed: {reason}")]
    Transport {
        /// Underlying message.
        reason: String,
    },

    /// Neither probe nor extension told script from stylesheet.
    #[error("cannot classify resource '{url}'")]
    Unclassified {
        /// The resource URL.
        url: String,
    },

    /// The scope refused the resource.
    #[error("scope rejected resource: {reason}")]
    Rejected {
        /// Scope-provided reason.
        reason: String,
    },
}

impl FetchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "fetch_invalid_url",
            FetchError::Timeout { .. } => "fetch_timeout",
            FetchError::Status { .. } => "fetch_status",
            FetchError::Transport { .. } => "fetch_transport",
            FetchError::Unclassified { .. } => "fetch_unclassified",
            FetchError::Rejected { .. } => "fetch_rejected",
        }
    }
}

/// # Errors raised by the third-party renderer.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RendererError {
    /// The renderer could not be created from the schema.
    #[error("instantiation failed: {reason}")]
    Create {
        /// Renderer-provided reason.
        reason: String,
    },

    /// The renderer rejected a set-submission call.
    #[error("set submission failed: {reason}")]
    SetSubmission {
        /// Renderer-provided reason.
        reason: String,
    },
}
