//! YAML codec
//!
//! Parses YAML fragments into [`Value`] trees and renders the merged tree as a
//! single YAML document.
//!
//! YAML is richer than the shared value model, so a few things are folded
//! down on the way in:
//!
//! - Non-string scalar keys (`1:`, `true:`) become their string form.
//! - Tags (`!Custom value`) are dropped and the tagged value is kept.
//! - Non-finite floats (`.inf`, `.nan`) are rejected.
//!
//! ## Example
//!
//! ```
//! use datafile::merge::{Codec, yaml::YamlCodec};
//!
//! let value = YamlCodec.parse("name: app\nports: [80, 443]\n").unwrap();
//! let rendered = YamlCodec.serialize(&value).unwrap();
//! assert!(rendered.starts_with("---\n"));
//! ```

use log::debug;
use serde_yaml::Value as YamlValue;

use super::value::{Mapping, Value};
use super::Codec;
use crate::error::Result;

/// Document marker emitted at the top of rendered YAML.
const DOCUMENT_START: &str = "---\n";

/// Block-style YAML codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn parse(&self, text: &str) -> std::result::Result<Value, String> {
        let raw: YamlValue = serde_yaml::from_str(text).map_err(|err| err.to_string())?;
        from_yaml_value(raw)
    }

    fn serialize(&self, value: &Value) -> Result<String> {
        let body = serde_yaml::to_string(value)?;
        Ok(format!("{}{}", DOCUMENT_START, body))
    }
}

/// Convert a parsed `serde_yaml::Value` into the shared value model.
pub fn from_yaml_value(value: YamlValue) -> std::result::Result<Value, String> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => Value::Number(convert_number(&n)?),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(seq) => Value::Sequence(
            seq.into_iter()
                .map(from_yaml_value)
                .collect::<std::result::Result<_, _>>()?,
        ),
        YamlValue::Mapping(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, value) in map {
                out.insert(key_to_string(key)?, from_yaml_value(value)?);
            }
            Value::Mapping(out)
        }
        YamlValue::Tagged(tagged) => {
            debug!("Dropping YAML tag {} during merge", tagged.tag);
            from_yaml_value(tagged.value)?
        }
    })
}

fn convert_number(n: &serde_yaml::Number) -> std::result::Result<serde_json::Number, String> {
    if let Some(u) = n.as_u64() {
        Ok(u.into())
    } else if let Some(i) = n.as_i64() {
        Ok(i.into())
    } else {
        let f = n.as_f64().unwrap_or(f64::NAN);
        serde_json::Number::from_f64(f)
            .ok_or_else(|| format!("Non-finite number '{}' is not supported", n))
    }
}

fn key_to_string(key: YamlValue) -> std::result::Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Tagged(tagged) => key_to_string(tagged.value),
        other => Err(format!(
            "Unsupported mapping key of type {}",
            type_name(&other)
        )),
    }
}

/// Get a human-readable type name for a YAML value
fn type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "Null",
        YamlValue::Bool(_) => "Bool",
        YamlValue::Number(_) => "Number",
        YamlValue::String(_) => "String",
        YamlValue::Sequence(_) => "Sequence",
        YamlValue::Mapping(_) => "Mapping",
        YamlValue::Tagged(_) => "Tagged",
    }
}
