//! Nested merge with conflict detection
//!
//! Documents are folded left to right in fragment order. The accumulator holds
//! everything merged so far and the incoming document is layered on top:
//!
//! - Keys missing from the accumulator are adopted.
//! - Two mappings under the same key are merged recursively.
//! - Two sequences under the same key are concatenated and then deduplicated,
//!   keeping the first occurrence of each item.
//! - Equal values are kept.
//! - Anything else is a collision. Without `force` it fails the merge; with
//!   `force` the accumulator's value wins, so lower-ordered fragments take
//!   precedence over higher-ordered ones.

use log::debug;

use super::value::{Mapping, Value};
use crate::error::{Error, Result};

/// Merge `incoming` into `accumulator` and return the result.
///
/// # Errors
///
/// Returns `Error::MergeConflict` naming the dotted key path and both values
/// when two values collide and `force` is false.
pub fn nested_merge(mut accumulator: Mapping, incoming: Mapping, force: bool) -> Result<Mapping> {
    merge_into(&mut accumulator, incoming, force)?;
    Ok(accumulator)
}

/// In-place form of [`nested_merge`].
pub fn merge_into(accumulator: &mut Mapping, incoming: Mapping, force: bool) -> Result<()> {
    merge_mappings(accumulator, incoming, force, "")
}

fn merge_mappings(target: &mut Mapping, source: Mapping, force: bool, path: &str) -> Result<()> {
    for (key, value) in source {
        let key_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };

        match target.get_mut(&key) {
            Some(existing) => merge_values(existing, value, force, &key_path)?,
            None => {
                target.insert(key, value);
            }
        }
    }
    Ok(())
}

fn merge_values(existing: &mut Value, incoming: Value, force: bool, path: &str) -> Result<()> {
    match (existing, incoming) {
        (Value::Mapping(target), Value::Mapping(source)) => {
            merge_mappings(target, source, force, path)
        }
        (Value::Sequence(target), Value::Sequence(source)) => {
            concat_unique(target, source);
            Ok(())
        }
        (existing, incoming) => {
            if *existing != incoming {
                if !force {
                    return Err(Error::MergeConflict {
                        key: path.to_string(),
                        existing: existing.to_string(),
                        incoming: incoming.to_string(),
                    });
                }
                debug!(
                    "Key '{}': replacing '{}' with '{}'.",
                    path, incoming, existing
                );
            }
            Ok(())
        }
    }
}

fn concat_unique(target: &mut Vec<Value>, source: Vec<Value>) {
    let combined = std::mem::take(target).into_iter().chain(source);
    for item in combined {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
