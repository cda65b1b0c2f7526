//! # Schema payload.
//!
//! The schema endpoint answers with the form metadata and the renderer schema.
//! Two shapes are accepted:
//!
//! ```text
//! { "form": {...}, "schema": {...} }
//! { "form": { ..., "versions": [ { "schema": {...} }, ... ] } }
//! ```
//!
//! The first shape wins when both are present.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::WidgetError;

/// Normalized schema payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Form metadata (name, description, ...). Empty when absent.
    #[serde(default)]
    pub form: Map<String, Value>,
    /// Renderer schema; always a JSON object.
    pub schema: Map<String, Value>,
}

impl FormSchema {
    /// Parses a schema endpoint body.
    pub fn from_payload(payload: Value) -> Result<Self, WidgetError> {
        let Value::Object(mut root) = payload else {
            return Err(schema_err("payload is not an object"));
        };

        let form = match root.remove("form") {
            Some(Value::Object(form)) => form,
            Some(Value::Null) | None => Map::new(),
            Some(_) => return Err(schema_err("'form' is not an object")),
        };

        let schema = match root.remove("schema") {
            Some(Value::Object(schema)) => schema,
            Some(Value::Null) | None => versioned_schema(&form)
                .ok_or_else(|| schema_err("no schema in payload"))?,
            Some(_) => return Err(schema_err("'schema' is not an object")),
        };

        Ok(Self { form, schema })
    }

    /// Form display name, if the backend sent one.
    pub fn name(&self) -> Option<&str> {
        self.form.get("name").and_then(Value::as_str)
    }

    /// `true` when the schema renders as a multi-page wizard.
    pub fn is_wizard(&self) -> bool {
        self.schema.get("display").and_then(Value::as_str) == Some("wizard")
    }

    /// Payload for the `loadSchema` event.
    pub fn to_detail(&self) -> Value {
        serde_json::json!({ "form": self.form, "schema": self.schema })
    }
}

fn versioned_schema(form: &Map<String, Value>) -> Option<Map<String, Value>> {
    form.get("versions")?
        .as_array()?
        .first()?
        .get("schema")?
        .as_object()
        .cloned()
}

fn schema_err(reason: &str) -> WidgetError {
    WidgetError::Schema {
        reason: reason.to_string(),
    }
}
