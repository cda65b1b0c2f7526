use serde_json::{Map, Value};

use crate::config::WidgetConfig;

/// Options handed to [`RendererFactory::create`](super::RendererFactory::create).
///
/// [`to_value`](Self::to_value) is what the `beforeInit` event carries:
/// `{ "readOnly": false, "language": "en", ...extra }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RendererOptions {
    pub read_only: bool,
    pub language: Option<String>,
    /// Caller-supplied options; keys here override the typed fields above.
    pub extra: Map<String, Value>,
}

impl RendererOptions {
    pub fn from_config(cfg: &WidgetConfig) -> Self {
        Self {
            read_only: cfg.read_only,
            language: cfg.language.clone(),
            extra: cfg.renderer_options.clone(),
        }
    }

    /// JSON form of the options.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("readOnly".into(), Value::Bool(self.read_only));
        if let Some(lang) = &self.language {
            map.insert("language".into(), Value::String(lang.clone()));
        }
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extra_options_override_typed_fields() {
        let mut cfg = WidgetConfig::new("https://h.org", "f");
        cfg.read_only = true;
        cfg.language = Some("fr".into());
        cfg.renderer_options.insert("noAlerts".into(), json!(true));
        cfg.renderer_options.insert("language".into(), json!("en"));

        let v = RendererOptions::from_config(&cfg).to_value();
        assert_eq!(v["readOnly"], json!(true));
        assert_eq!(v["language"], json!("en"));
        assert_eq!(v["noAlerts"], json!(true));
    }

    #[test]
    fn language_is_omitted_when_unset() {
        let v = RendererOptions::from_config(&WidgetConfig::new("https://h.org", "f")).to_value();
        assert!(v.get("language").is_none());
        assert_eq!(v["readOnly"], json!(false));
    }
}
