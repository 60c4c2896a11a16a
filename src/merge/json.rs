//! JSON codec
//!
//! Parses JSON fragments into [`Value`] trees and renders the merged tree in
//! compact (`json`) or indented (`json-pretty`) form. Object key order is kept
//! as written, so re-rendering parsed output is byte-identical.

use serde_json::Value as JsonValue;

use super::value::{Mapping, Value};
use super::Codec;
use crate::error::Result;

/// JSON codec, compact or pretty-printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    /// Render with two-space indentation instead of compact form.
    pub pretty: bool,
}

impl JsonCodec {
    pub const COMPACT: JsonCodec = JsonCodec { pretty: false };
    pub const PRETTY: JsonCodec = JsonCodec { pretty: true };
}

impl Codec for JsonCodec {
    fn parse(&self, text: &str) -> std::result::Result<Value, String> {
        let raw: JsonValue = serde_json::from_str(text).map_err(|err| err.to_string())?;
        Ok(from_json_value(raw))
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(rendered)
    }
}

/// Convert a parsed `serde_json::Value` into the shared value model.
pub fn from_json_value(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => Value::Number(n),
        JsonValue::String(s) => Value::String(s),
        JsonValue::Array(items) => Value::Sequence(items.into_iter().map(from_json_value).collect()),
        JsonValue::Object(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, value) in map {
                out.insert(key, from_json_value(value));
            }
            Value::Mapping(out)
        }
    }
}
