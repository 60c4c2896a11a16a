//! Fragment records
//!
//! A fragment is one tagged, ordered piece of content destined for a target
//! file. Fragments are validated once when they are declared and never change
//! afterwards.

use crate::config::FragmentDecl;
use crate::error::{Error, Result};

/// Order value used when a fragment does not declare one.
pub const DEFAULT_ORDER: &str = "10";

/// Separator between the order and name components of a displayed sort key.
pub const SORT_KEY_DELIMITER: &str = "___";

const FORBIDDEN_ORDER_CHARS: [char; 3] = ['/', ':', '\n'];

/// Where a fragment's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentBody {
    /// Inline content, used verbatim.
    Content(Vec<u8>),
    /// Source identifiers, tried in order until one exists.
    Source(Vec<String>),
}

/// A validated fragment declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    name: String,
    target: String,
    tag: String,
    order: String,
    body: FragmentBody,
}

impl Fragment {
    /// Validate a raw declaration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when the name, target, or tag is missing,
    /// when neither or both of `content` and `source` are set, or when `order`
    /// is not a valid order value (see [`validate_order`]).
    pub fn from_decl(decl: FragmentDecl) -> Result<Self> {
        let resource = format!("Fragment[{}]", decl.name);

        if decl.name.trim().is_empty() {
            return Err(Error::validation(resource, "Name not set"));
        }
        let target = decl
            .target
            .ok_or_else(|| Error::validation(&resource, "Target not set"))?;
        let tag = decl
            .tag
            .ok_or_else(|| Error::validation(&resource, "Tag not set"))?;

        let order = match &decl.order {
            Some(value) => {
                validate_order(value).map_err(|message| Error::validation(&resource, message))?
            }
            None => DEFAULT_ORDER.to_string(),
        };

        let body = match (decl.content, decl.source) {
            (Some(_), Some(_)) => {
                return Err(Error::validation(
                    &resource,
                    "Can't use 'source' and 'content' at the same time",
                ))
            }
            (Some(content), None) => FragmentBody::Content(content.into_bytes()),
            (None, Some(source)) => {
                let candidates = source.into_vec();
                if candidates.is_empty() {
                    return Err(Error::validation(&resource, "Set either 'source' or 'content'"));
                }
                FragmentBody::Source(candidates)
            }
            (None, None) => {
                return Err(Error::validation(&resource, "Set either 'source' or 'content'"))
            }
        };

        Ok(Self {
            name: decl.name,
            target,
            tag,
            order,
            body,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path or title of the target this fragment was declared for.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn order(&self) -> &str {
        &self.order
    }

    pub fn body(&self) -> &FragmentBody {
        &self.body
    }
}

/// Normalize and check a declared `order` value.
///
/// Strings and integers are accepted; integers are used in their decimal
/// form. The value must not contain `/`, `:`, a newline, or the sort key
/// delimiter `___`.
///
/// # Examples
///
/// ```
/// use datafile::fragment::validate_order;
///
/// assert_eq!(validate_order(&serde_yaml::Value::from(5)).unwrap(), "5");
/// assert!(validate_order(&serde_yaml::Value::from("a/b")).is_err());
/// ```
pub fn validate_order(value: &serde_yaml::Value) -> std::result::Result<String, String> {
    let order = match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
        _ => return Err("$order is not a string or integer.".to_string()),
    };

    if order.contains(FORBIDDEN_ORDER_CHARS) {
        return Err("Order cannot contain '/', ':', or '\\n'.".to_string());
    }
    if order.contains(SORT_KEY_DELIMITER) {
        return Err(format!("Order cannot contain '{}'.", SORT_KEY_DELIMITER));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceList;

    fn decl(name: &str) -> FragmentDecl {
        FragmentDecl {
            name: name.to_string(),
            target: Some("/etc/app.conf".to_string()),
            tag: Some("app".to_string()),
            content: Some("line\n".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_decl_defaults_order() {
        let fragment = Fragment::from_decl(decl("base")).unwrap();
        assert_eq!(fragment.name(), "base");
        assert_eq!(fragment.target(), "/etc/app.conf");
        assert_eq!(fragment.tag(), "app");
        assert_eq!(fragment.order(), DEFAULT_ORDER);
        assert_eq!(fragment.body(), &FragmentBody::Content(b"line\n".to_vec()));
    }

    #[test]
    fn test_integer_order_is_stringified() {
        let mut d = decl("base");
        d.order = Some(serde_yaml::Value::from(42));
        assert_eq!(Fragment::from_decl(d).unwrap().order(), "42");
    }

    #[test]
    fn test_missing_target_and_tag() {
        let mut d = decl("base");
        d.target = None;
        let err = Fragment::from_decl(d).unwrap_err();
        assert!(err.to_string().contains("Target not set"));

        let mut d = decl("base");
        d.tag = None;
        let err = Fragment::from_decl(d).unwrap_err();
        assert!(err.to_string().contains("Tag not set"));
    }

    #[test]
    fn test_content_and_source_are_exclusive() {
        let mut d = decl("both");
        d.source = Some(SourceList::One("a.txt".to_string()));
        let err = Fragment::from_decl(d).unwrap_err();
        assert!(err.to_string().contains("at the same time"));

        let mut d = decl("neither");
        d.content = None;
        let err = Fragment::from_decl(d).unwrap_err();
        assert!(err.to_string().contains("Set either 'source' or 'content'"));

        let mut d = decl("empty-list");
        d.content = None;
        d.source = Some(SourceList::Many(vec![]));
        assert!(Fragment::from_decl(d).is_err());
    }

    #[test]
    fn test_source_list_is_kept_in_order() {
        let mut d = decl("remote");
        d.content = None;
        d.source = Some(SourceList::Many(vec!["first".into(), "second".into()]));
        let fragment = Fragment::from_decl(d).unwrap();
        assert_eq!(
            fragment.body(),
            &FragmentBody::Source(vec!["first".to_string(), "second".to_string()])
        );
    }

    #[test]
    fn test_validate_order_rejects_bad_values() {
        use serde_yaml::Value;

        for bad in ["a/b", "a:b", "a\nb", "1___x"] {
            assert!(validate_order(&Value::from(bad)).is_err(), "{:?}", bad);
        }
        assert!(validate_order(&Value::from(1.5)).is_err());
        assert!(validate_order(&Value::Bool(true)).is_err());
        assert!(validate_order(&Value::Null).is_err());
        assert_eq!(validate_order(&Value::from("a_b__c")).unwrap(), "a_b__c");
        assert_eq!(validate_order(&Value::from(-3)).unwrap(), "-3");
    }

    #[test]
    fn test_error_names_the_fragment() {
        let mut d = decl("broken");
        d.order = Some(serde_yaml::Value::from("x:y"));
        let err = Fragment::from_decl(d).unwrap_err();
        assert!(err.to_string().contains("Fragment[broken]"));
    }
}
