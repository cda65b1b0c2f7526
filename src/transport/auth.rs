//! # Credential headers for backend requests.
//!
//! Same-origin requests (scheme, host and port equal to the configured base)
//! carry `Authorization: Basic base64(formId:apiKey)`. Cross-origin requests
//! (CDN fallbacks, external fonts) carry nothing.
//!
//! A caller-supplied [`HeaderHook`] replaces this policy entirely: it is called
//! for every request and its headers are used as-is.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::config::WidgetConfig;
use crate::error::ConfigError;

/// Caller-supplied header builder, called with the request URL.
pub type HeaderHook = Arc<dyn Fn(&Url) -> Vec<(String, String)> + Send + Sync>;

/// Resolved credential policy for one widget instance.
#[derive(Clone)]
pub struct Credentials {
    base: Url,
    basic: Option<String>,
    hook: Option<HeaderHook>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base", &self.base.as_str())
            .field("basic", &self.basic.as_ref().map(|_| "***"))
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Credentials {
    /// Resolves credentials from config.
    ///
    /// The Basic header is only built when both form id and api key are present.
    pub fn from_config(cfg: &WidgetConfig) -> Result<Self, ConfigError> {
        let base = cfg.base()?;
        let basic = match (cfg.form_id.as_deref(), cfg.api_key.as_deref()) {
            (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => {
                Some(format!("Basic {}", STANDARD.encode(format!("{id}:{key}"))))
            }
            _ => None,
        };
        Ok(Self {
            base,
            basic,
            hook: cfg.headers.clone(),
        })
    }

    /// Returns the headers to attach to a request for `url`.
    pub fn headers_for(&self, url: &Url) -> Vec<(String, String)> {
        if let Some(hook) = &self.hook {
            return hook(url);
        }
        match &self.basic {
            Some(value) if self.is_same_origin(url) => {
                vec![("Authorization".to_string(), value.clone())]
            }
            _ => Vec::new(),
        }
    }

    /// `true` when `url` shares scheme, host and port with the base URL.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base.origin()
    }
}
