//! Page decoder implementation

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::types::{ContinuationToken, JsonValue, RecordId};

/// Decodes one response body into one page
#[derive(Debug, Clone)]
pub struct PageDecoder {
    /// Dot path of the record id
    id_path: String,
    /// Dot path of the next token
    token_path: String,
    /// Dot paths that must be present and non-null
    required_fields: Vec<String>,
    /// Dot paths that must hold a number when present
    numeric_fields: Vec<String>,
}

impl Default for PageDecoder {
    fn default() -> Self {
        Self::from_config(&SourceConfig::default())
    }
}

impl PageDecoder {
    /// Create a decoder with no required fields beyond the id
    pub fn new(id_path: impl Into<String>, token_path: impl Into<String>) -> Self {
        Self {
            id_path: id_path.into(),
            token_path: token_path.into(),
            required_fields: Vec::new(),
            numeric_fields: Vec::new(),
        }
    }

    /// Create a decoder from the source configuration
    pub fn from_config(source: &SourceConfig) -> Self {
        Self {
            id_path: source.id_field.clone(),
            token_path: source.token_field.clone(),
            required_fields: source.required_fields.clone(),
            numeric_fields: source.numeric_fields.clone(),
        }
    }

    /// Require an additional field on every page
    #[must_use]
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required_fields.push(field.into());
        self
    }

    /// Reject pages where `field` is present but not a number
    #[must_use]
    pub fn require_number(mut self, field: impl Into<String>) -> Self {
        self.numeric_fields.push(field.into());
        self
    }

    /// Decode a response body
    pub fn decode(&self, body: &str) -> Result<Page> {
        let value: JsonValue = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
        self.decode_value(value)
    }

    /// Decode an already parsed JSON value
    pub fn decode_value(&self, value: JsonValue) -> Result<Page> {
        if !value.is_object() {
            return Err(Error::decode(format!(
                "expected a JSON object, got {}",
                json_type_name(&value)
            )));
        }

        let id = match extract_path(&value, &self.id_path) {
            Some(JsonValue::String(s)) if !s.is_empty() => RecordId::new(s.as_str()),
            Some(JsonValue::Number(n)) => RecordId::new(n.to_string()),
            Some(JsonValue::Null) | None => {
                return Err(Error::decode(format!(
                    "missing record id field '{}'",
                    self.id_path
                )))
            }
            Some(other) => {
                return Err(Error::decode(format!(
                    "record id field '{}' must be a non-empty string or a number, got {}",
                    self.id_path,
                    json_type_name(other)
                )))
            }
        };

        for field in &self.required_fields {
            match extract_path(&value, field) {
                Some(JsonValue::Null) | None => {
                    return Err(Error::decode(format!(
                        "record {id} is missing required field '{field}'"
                    )))
                }
                Some(_) => {}
            }
        }

        for field in &self.numeric_fields {
            match extract_path(&value, field) {
                Some(JsonValue::Null) | Some(JsonValue::Number(_)) | None => {}
                Some(other) => {
                    return Err(Error::decode(format!(
                        "field '{field}' of record {id} must be a number, got {}",
                        json_type_name(other)
                    )))
                }
            }
        }

        let next_token = match extract_path(&value, &self.token_path) {
            Some(JsonValue::Null) | None => None,
            Some(JsonValue::String(s)) => ContinuationToken::parse(s.as_str()),
            Some(other) => {
                return Err(Error::decode(format!(
                    "next token field '{}' must be a string, got {}",
                    self.token_path,
                    json_type_name(other)
                )))
            }
        };

        Ok(Page::new(id, value, next_token))
    }
}

/// Follow a dot path (optionally prefixed with `$.`) through nested objects
pub fn extract_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            JsonValue::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Extract a scalar at a dot path as text
pub fn extract_string(value: &JsonValue, path: &str) -> Option<String> {
    match extract_path(value, path)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
