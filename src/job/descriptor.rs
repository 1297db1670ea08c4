//! Loosely-typed command descriptors, as they arrive from callers.
//!
//! A descriptor is a JSON object with one operation key plus optional
//! modifier keys:
//!
//! ```json
//! {"appendBarcode": "{BA1234", "BarcodeSymbology": "Code128", "height": 60, "alignment": "Center"}
//! ```
//!
//! Values keep their primitive JSON type. Conversions follow lenient rules:
//! booleans accept `true`/`"true"` (case-insensitive), integers accept numbers
//! or numeric strings, and arrays of numbers double as byte buffers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::encoding::TextEncoding;
use crate::error::CometaError;

/// A single descriptor value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Byte buffers and integer arrays (tab stops).
    List(Vec<i64>),
    /// Anything else (`null`, nested objects). Never matches a conversion.
    Other(serde_json::Value),
}

impl Value {
    /// String form, the way a caller would print the value.
    pub fn to_text(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(","),
            Value::Other(v) => v.to_string(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Int(i) => Some(*i as f32),
            Value::Float(f) => Some(*f as f32),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// `true` only for boolean true or the string "true" in any case.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Str(s) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Byte buffer view. Only arrays whose elements all fit in a byte qualify.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Value::List(items) => items.iter().map(|&b| u8::try_from(b).ok()).collect(),
            _ => None,
        }
    }

    pub fn as_int_list(&self) -> Option<Vec<i64>> {
        match self {
            Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

/// Text or raw bytes carried by an append-family descriptor.
///
/// Text is converted with the encoding active *when the descriptor is
/// compiled*; raw buffers are emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    /// Arrays become raw bytes, anything else its text form. `None` for an
    /// array holding values outside `0..=255`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(_) => value.as_bytes().map(Payload::Bytes),
            other => Some(Payload::Text(other.to_text())),
        }
    }

    pub fn encode(&self, encoding: &TextEncoding) -> Vec<u8> {
        match self {
            Payload::Text(text) => encoding.encode(text),
            Payload::Bytes(bytes) => bytes.clone(),
        }
    }
}

/// One loosely-typed print instruction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandDescriptor(HashMap<String, Value>);

impl CommandDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and programmatic jobs.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// An ordered list of descriptors submitted as one print call.
pub type PrintJob = Vec<CommandDescriptor>;

/// Parse a print job from JSON text (`[{...}, {...}]`).
pub fn parse_job(json: &str) -> Result<PrintJob, CometaError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(CometaError::InvalidJob(
            "expected a JSON array of command objects".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::List(bytes.into_iter().map(i64::from).collect())
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::List(bytes.iter().map(|&b| i64::from(b)).collect())
    }
}
