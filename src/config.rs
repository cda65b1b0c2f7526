//! # Widget configuration.
//!
//! Provides [`WidgetConfig`], the declarative settings of one widget instance.
//!
//! Config is used in three ways:
//! 1. **Construction**: `Widget::builder(config, factory)`
//! 2. **Endpoint resolution**: `schema_url()`, `submit_url()`, `submission_url(id)`
//! 3. **Asset resolution**: `asset_url(path)` plus [`AssetSwitches`] and per-key [`AssetOverride`]s
//!
//! Caller-supplied overrides always take precedence over the built-in defaults.
//!
//! ## Declarative attributes
//! Hosts that configure the widget from markup can feed `(name, value)` pairs to
//! [`WidgetConfig::from_attributes`]. Malformed values of non-critical attributes
//! (JSON blobs, numbers) are logged and ignored.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::ConfigError;
use crate::transport::HeaderHook;

/// Default backend location when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/app";

/// Backend API call bound used when `request_timeout` is zero.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix of the widget-facing API and static assets.
pub const WEBCOMPONENTS_PREFIX: &str = "webcomponents/v1";

/// Per-endpoint URL overrides.
///
/// Values may be absolute (`https://...`) or base-relative (`/custom/...`) and
/// may contain the `{formId}` / `{submissionId}` placeholders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoints {
    /// Schema fetch URL.
    pub schema: Option<String>,
    /// Submission POST URL.
    pub submit: Option<String>,
    /// Prior-submission (prefill) GET URL.
    pub read_submission: Option<String>,
}

/// Enable/disable switches for optional asset groups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetSwitches {
    /// Preconnect/preload hints.
    pub hints: bool,
    /// Icon font stylesheet.
    pub icons: bool,
    /// Theme stylesheet.
    pub theme: bool,
    /// Preload of the primary font file.
    pub font_preload: bool,
}

impl Default for AssetSwitches {
    fn default() -> Self {
        Self {
            hints: true,
            icons: true,
            theme: true,
            font_preload: true,
        }
    }
}

/// Caller override for one asset key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetOverride {
    /// Replaces the primary URL.
    pub primary: Option<String>,
    /// Replaces (or adds) the fallback URL.
    pub fallback: Option<String>,
}

/// Configuration of one widget instance.
///
/// ## Field semantics
/// - `base_url`: backend root every default endpoint/asset is resolved against
/// - `form_id`: required before `load()`; missing id is a hard configuration error
/// - `api_key`: paired with `form_id` in the default `Authorization` header
/// - `submission_id`: enables prefill from a prior submission
/// - `asset_timeout`: bound for each asset fetch (`0s` = default of 10s)
/// - `request_timeout`: bound for each schema, prefill and submit call (`0s` = default of 30s)
/// - `renderer_options`: merged into the options handed to the renderer
/// - `headers`: replaces the default credential header builder
#[derive(Clone)]
pub struct WidgetConfig {
    /// Backend root, e.g. `https://forms.example.org/app`.
    pub base_url: String,
    /// Form identifier.
    pub form_id: Option<String>,
    /// Access key paired with the form identifier.
    pub api_key: Option<String>,
    /// Prior submission used for prefill.
    pub submission_id: Option<String>,
    /// Render the form without submit capability.
    pub read_only: bool,
    /// Renderer locale, e.g. `en` or `fr`.
    pub language: Option<String>,
    /// Endpoint overrides.
    pub endpoints: Endpoints,
    /// Optional asset groups.
    pub assets: AssetSwitches,
    /// Per-asset URL overrides keyed by asset key.
    pub asset_overrides: HashMap<String, AssetOverride>,
    /// Extra renderer options.
    pub renderer_options: Map<String, Value>,
    /// Per-asset load timeout.
    pub asset_timeout: Duration,
    /// Per-call timeout of backend API requests.
    pub request_timeout: Duration,
    /// Custom header builder for same-origin requests.
    pub headers: Option<HeaderHook>,
}

impl fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("base_url", &self.base_url)
            .field("form_id", &self.form_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("submission_id", &self.submission_id)
            .field("read_only", &self.read_only)
            .field("language", &self.language)
            .field("endpoints", &self.endpoints)
            .field("assets", &self.assets)
            .field("asset_overrides", &self.asset_overrides)
            .field("asset_timeout", &self.asset_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("headers", &self.headers.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl Default for WidgetConfig {
    /// Default configuration:
    ///
    /// - `base_url = DEFAULT_BASE_URL`
    /// - no form id / api key / submission id
    /// - all optional asset groups enabled
    /// - `asset_timeout = 10s`
    /// - `request_timeout = 30s`
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            form_id: None,
            api_key: None,
            submission_id: None,
            read_only: false,
            language: None,
            endpoints: Endpoints::default(),
            assets: AssetSwitches::default(),
            asset_overrides: HashMap::new(),
            renderer_options: Map::new(),
            asset_timeout: Duration::from_secs(10),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            headers: None,
        }
    }
}

impl WidgetConfig {
    /// Creates a config for `form_id` against `base_url`.
    pub fn new(base_url: impl Into<String>, form_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            form_id: Some(form_id.into()),
            ..Self::default()
        }
    }

    /// Sets the access key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the prefill submission id.
    pub fn with_submission(mut self, id: impl Into<String>) -> Self {
        self.submission_id = Some(id.into());
        self
    }

    /// Replaces the credential header builder.
    pub fn with_headers(mut self, hook: HeaderHook) -> Self {
        self.headers = Some(hook);
        self
    }

    /// Returns the parsed base URL.
    pub fn base(&self) -> Result<Url, ConfigError> {
        parse_url(&self.base_url)
    }

    /// Returns the form id or [`ConfigError::MissingFormId`].
    pub fn require_form_id(&self) -> Result<&str, ConfigError> {
        self.form_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingFormId)
    }

    /// Returns the effective asset timeout (`0s` means the 10s default).
    #[inline]
    pub fn effective_asset_timeout(&self) -> Duration {
        if self.asset_timeout == Duration::ZERO {
            Duration::from_secs(10)
        } else {
            self.asset_timeout
        }
    }

    /// Returns the effective backend call timeout (`0s` means the 30s default).
    #[inline]
    pub fn effective_request_timeout(&self) -> Duration {
        if self.request_timeout == Duration::ZERO {
            DEFAULT_REQUEST_TIMEOUT
        } else {
            self.request_timeout
        }
    }

    /// `GET {base}/webcomponents/v1/form-viewer/{formId}/schema` unless overridden.
    ///
    /// Identifiers are always encoded as a single path segment.
    pub fn schema_url(&self) -> Result<Url, ConfigError> {
        self.require_form_id()?;
        let default = format!("{WEBCOMPONENTS_PREFIX}/form-viewer/{{formId}}/schema");
        self.endpoint(self.endpoints.schema.as_deref(), &default, None)
    }

    /// `POST {base}/webcomponents/v1/form-viewer/{formId}/submit` unless overridden.
    pub fn submit_url(&self) -> Result<Url, ConfigError> {
        self.require_form_id()?;
        let default = format!("{WEBCOMPONENTS_PREFIX}/form-viewer/{{formId}}/submit");
        self.endpoint(self.endpoints.submit.as_deref(), &default, None)
    }

    /// `GET {base}/api/v1/submissions/{submissionId}` unless overridden.
    pub fn submission_url(&self, submission_id: &str) -> Result<Url, ConfigError> {
        self.endpoint(
            self.endpoints.read_submission.as_deref(),
            "api/v1/submissions/{submissionId}",
            Some(submission_id),
        )
    }

    /// Resolves a static asset path under `{base}/webcomponents/v1/assets/`.
    pub fn asset_url(&self, path: &str) -> String {
        format!(
            "{}/{WEBCOMPONENTS_PREFIX}/assets/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // Placeholders are substituted after parsing, in the path only, so an id
    // can never add segments, a query or a fragment.
    fn endpoint(
        &self,
        custom: Option<&str>,
        default: &str,
        submission_id: Option<&str>,
    ) -> Result<Url, ConfigError> {
        let raw = custom.filter(|s| !s.trim().is_empty()).unwrap_or(default);
        let mut url = if raw.starts_with("http://") || raw.starts_with("https://") {
            parse_url(raw)?
        } else {
            parse_url(&format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                raw.trim_start_matches('/')
            ))?
        };

        let vars = [("formId", self.form_id.as_deref()), ("submissionId", submission_id)];
        let mut path = url.path().to_string();
        for (name, value) in vars {
            let Some(value) = value else { continue };
            let marker = format!("%7B{name}%7D");
            if path.contains(&marker) {
                path = path.replace(&marker, &encode_segment(&url, value)?);
            }
        }
        url.set_path(&path);
        Ok(url)
    }

    /// Builds a config from declarative `(name, value)` attributes.
    ///
    /// Unknown attributes are ignored; see [`WidgetConfig::apply_attribute`].
    pub fn from_attributes<I, K, V>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cfg = Self::default();
        for (name, value) in attrs {
            cfg.apply_attribute(name.as_ref(), value.as_ref());
        }
        cfg
    }

    /// Applies one declarative attribute.
    ///
    /// Boolean attributes are true when present with an empty value or `"true"`.
    pub fn apply_attribute(&mut self, name: &str, value: &str) {
        match name {
            "form-id" => self.form_id = non_empty(value),
            "api-key" => self.api_key = non_empty(value),
            "submission-id" => self.submission_id = non_empty(value),
            "language" => self.language = non_empty(value),
            "base-url" => {
                if let Some(v) = non_empty(value) {
                    self.base_url = v;
                }
            }
            "read-only" => self.read_only = flag(value),
            "no-icons" => self.assets.icons = !flag(value),
            "no-theme" => self.assets.theme = !flag(value),
            "no-hints" => self.assets.hints = !flag(value),
            "no-font-preload" => self.assets.font_preload = !flag(value),
            "asset-timeout-ms" => match value.trim().parse::<u64>() {
                Ok(ms) => self.asset_timeout = Duration::from_millis(ms),
                Err(e) => tracing::warn!(attribute = name, %value, error = %e, "ignoring invalid attribute"),
            },
            "request-timeout-ms" => match value.trim().parse::<u64>() {
                Ok(ms) => self.request_timeout = Duration::from_millis(ms),
                Err(e) => tracing::warn!(attribute = name, %value, error = %e, "ignoring invalid attribute"),
            },
            "endpoints" => match serde_json::from_str::<Endpoints>(value) {
                Ok(ep) => self.endpoints = ep,
                Err(e) => tracing::warn!(attribute = name, error = %e, "ignoring invalid JSON attribute"),
            },
            "asset-overrides" => {
                match serde_json::from_str::<HashMap<String, AssetOverride>>(value) {
                    Ok(map) => self.asset_overrides = map,
                    Err(e) => tracing::warn!(attribute = name, error = %e, "ignoring invalid JSON attribute"),
                }
            }
            "renderer-options" => match serde_json::from_str::<Value>(value) {
                Ok(Value::Object(map)) => self.renderer_options = map,
                Ok(_) => tracing::warn!(attribute = name, "ignoring non-object renderer options"),
                Err(e) => tracing::warn!(attribute = name, error = %e, "ignoring invalid JSON attribute"),
            },
            other => tracing::debug!(attribute = other, "unknown attribute"),
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

// Percent-encodes `id` as one path segment, `/ ? # %` included.
fn encode_segment(base: &Url, id: &str) -> Result<String, ConfigError> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(ConfigError::InvalidId { id: id.to_string() });
    }
    let mut scratch = base.clone();
    scratch
        .path_segments_mut()
        .map_err(|()| ConfigError::InvalidUrl {
            url: base.to_string(),
            reason: "url cannot carry path segments".to_string(),
        })?
        .clear()
        .push(id);
    Ok(scratch.path().trim_start_matches('/').to_string())
}

fn non_empty(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn flag(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("true") || v == "1"
}
