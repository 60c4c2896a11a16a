//! Merge engine
//!
//! Combines the ordered, resolved contents of a target's fragments into the
//! target's final content.
//!
//! ## Supported Formats
//!
//! - `plain` - Byte-for-byte concatenation in fragment order
//! - `yaml` (yaml.rs) - Each fragment is a YAML mapping; output is block YAML
//! - `json` (json.rs) - Each fragment is a JSON object; output is compact JSON
//! - `json-pretty` (json.rs) - As `json`, rendered with indentation
//!
//! Structured formats parse every fragment into the shared [`value::Value`]
//! model, fold the documents together with [`nested::nested_merge`], and render
//! the result with the format's [`Codec`].

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

pub mod json;
pub mod nested;
pub mod value;
pub mod yaml;

use crate::error::{Error, Result};
use json::JsonCodec;
use value::{Mapping, Value};
use yaml::YamlCodec;

/// Output format of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    #[default]
    Plain,
    Yaml,
    Json,
    JsonPretty,
}

/// Parse/serialize capability of a structured format.
pub trait Codec {
    /// Parse one fragment's text. The error is a human-readable message.
    fn parse(&self, text: &str) -> std::result::Result<Value, String>;

    /// Render the merged document.
    fn serialize(&self, value: &Value) -> Result<String>;
}

static YAML: YamlCodec = YamlCodec;

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Plain => "plain",
            Format::Yaml => "yaml",
            Format::Json => "json",
            Format::JsonPretty => "json-pretty",
        }
    }

    /// The codec for structured formats, `None` for `plain`.
    pub fn codec(self) -> Option<&'static dyn Codec> {
        match self {
            Format::Plain => None,
            Format::Yaml => Some(&YAML),
            Format::Json => Some(&JsonCodec::COMPACT),
            Format::JsonPretty => Some(&JsonCodec::PRETTY),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge already-ordered fragment contents into final content.
///
/// `documents` yields `(fragment name, content)` pairs in merge order; the name
/// is only used to identify the fragment in errors.
///
/// With no documents, `plain` yields empty content and the structured formats
/// yield an empty mapping.
///
/// # Errors
///
/// - `Error::Format` if a fragment is not valid UTF-8, does not parse, or is
///   not a mapping at its root.
/// - `Error::MergeConflict` if two fragments collide and `force` is false.
///
/// # Examples
///
/// ```
/// use datafile::merge::{merge, Format};
///
/// let docs: Vec<(&str, &[u8])> = vec![("a", &b"{\"x\":1}"[..]), ("b", &b"{\"y\":[2]}"[..])];
/// let out = merge(docs, Format::Json, false).unwrap();
/// assert_eq!(out, br#"{"x":1,"y":[2]}"#);
/// ```
pub fn merge<'a, I>(documents: I, format: Format, force: bool) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let Some(codec) = format.codec() else {
        return Ok(documents
            .into_iter()
            .flat_map(|(_, content)| content.iter().copied())
            .collect());
    };

    let mut accumulator = Mapping::new();
    for (name, content) in documents {
        match parse_document(codec, format, name, content)? {
            Value::Mapping(map) => nested::merge_into(&mut accumulator, map, force)?,
            Value::Null => debug!("Fragment '{}' is an empty document, skipping", name),
            other => {
                return Err(format_error(
                    name,
                    format,
                    format!("expected a mapping at the document root, found {}", other.type_name()),
                ))
            }
        }
    }

    Ok(codec.serialize(&Value::Mapping(accumulator))?.into_bytes())
}

fn parse_document(codec: &dyn Codec, format: Format, name: &str, content: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(content)
        .map_err(|err| format_error(name, format, format!("content is not valid UTF-8: {}", err)))?;
    codec
        .parse(text)
        .map_err(|message| format_error(name, format, message))
}

fn format_error(fragment: &str, format: Format, message: String) -> Error {
    Error::Format {
        fragment: fragment.to_string(),
        format: format.to_string(),
        message,
    }
}
