use std::collections::HashMap;

use rulex_lang::Value;

// ---------------------------------------------------------------------------
// FieldSource: read-only field lookup
// ---------------------------------------------------------------------------

/// Field lookup used by the evaluator.
///
/// Implementations must be read-only for the duration of an evaluation.
/// `path` is the dotted path exactly as written in the expression.
pub trait FieldSource {
    fn lookup(&self, path: &str) -> Option<&Value>;
}

impl FieldSource for HashMap<String, Value> {
    fn lookup(&self, path: &str) -> Option<&Value> {
        self.get(path)
    }
}

// ---------------------------------------------------------------------------
// EventError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventError {
    #[error("event payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("event payload must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

impl EventError {
    pub fn code(&self) -> i32 {
        1401
    }
}

// ---------------------------------------------------------------------------
// EventContext
// ---------------------------------------------------------------------------

/// Flat view of one event record.
///
/// Nested objects flatten to dotted keys and arrays to index segments:
/// `{"properties": {"plan": "pro"}, "tags": ["a"]}` yields `properties.plan`
/// and `tags.0`. Containers themselves have no value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventContext {
    fields: HashMap<String, Value>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(path.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode a JSON object payload. A blank payload is an empty event.
    pub fn from_json(payload: &str) -> Result<Self, EventError> {
        if payload.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| EventError::InvalidJson(e.to_string()))?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, EventError> {
        let serde_json::Value::Object(map) = value else {
            return Err(EventError::NotAnObject(json_kind(value)));
        };
        let mut ctx = Self::new();
        for (key, v) in map {
            ctx.flatten(key.clone(), v);
        }
        Ok(ctx)
    }

    fn flatten(&mut self, path: String, value: &serde_json::Value) {
        use serde_json::Value as Json;
        match value {
            Json::Null => self.insert(path, Value::Null),
            Json::Bool(b) => self.insert(path, *b),
            Json::Number(n) => self.insert(path, n.as_f64().map_or(Value::Null, Value::Number)),
            Json::String(s) => self.insert(path, s.as_str()),
            Json::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.flatten(format!("{path}.{i}"), item);
                }
            }
            Json::Object(map) => {
                for (key, item) in map {
                    self.flatten(format!("{path}.{key}"), item);
                }
            }
        }
    }
}

impl FieldSource for EventContext {
    fn lookup(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for EventContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value as Json;
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
