//! The subject capability interface.
//!
//! A *subject* is the record a template renders: a mapping of named
//! fields to values. The engine only ever reads fields through
//! [`Subject::get`]; it never mutates the subject. Field values are a
//! tagged union so the engine's resolution logic stays generic: plain
//! text, numbers, nested structured data, a callable computed on demand,
//! or null.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A field whose value is computed when read. Receives the optional
/// extra settings passed to the resolution call.
pub type SubjectFn = dyn Fn(Option<&serde_json::Value>) -> FieldValue + Send + Sync;

/// The value of a single subject field.
#[derive(Clone)]
pub enum FieldValue {
    /// Plain text, substituted verbatim.
    Text(String),
    /// A number; integral values render without a decimal point.
    Number(f64),
    /// Nested structured data, rendered as JSON text (bare for strings,
    /// empty for null).
    Data(serde_json::Value),
    /// A computed field, invoked with the caller's extra settings.
    Callable(Arc<SubjectFn>),
    /// An absent value; renders as the empty string.
    Null,
}

impl FieldValue {
    /// Coerces the value to the text substituted into a template.
    /// Callables are invoked (and their result coerced in turn).
    pub fn into_text(self, settings: Option<&serde_json::Value>) -> String {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Number(n) => format_number(n),
            FieldValue::Data(v) => json_text(&v),
            FieldValue::Callable(f) => f(settings).into_text(settings),
            FieldValue::Null => String::new(),
        }
    }

    /// Wraps a closure as a computed field value.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(Option<&serde_json::Value>) -> FieldValue + Send + Sync + 'static,
    {
        FieldValue::Callable(Arc::new(f))
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            FieldValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            FieldValue::Data(v) => f.debug_tuple("Data").field(v).finish(),
            FieldValue::Callable(_) => f.write_str("Callable(..)"),
            FieldValue::Null => f.write_str("Null"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Data(v)
    }
}

/// Read access to a record's named fields.
pub trait Subject {
    /// Returns the value of the named field, or `None` if the subject
    /// has no such field.
    fn get(&self, name: &str) -> Option<FieldValue>;
}

impl Subject for HashMap<String, FieldValue> {
    fn get(&self, name: &str) -> Option<FieldValue> {
        HashMap::get(self, name).cloned()
    }
}

/// JSON objects act as subjects directly; every field is [`FieldValue::Data`].
impl Subject for serde_json::Value {
    fn get(&self, name: &str) -> Option<FieldValue> {
        self.as_object()
            .and_then(|map| map.get(name))
            .cloned()
            .map(FieldValue::Data)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
