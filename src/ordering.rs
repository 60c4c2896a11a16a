//! Fragment ordering
//!
//! Every fragment gets a [`SortKey`] made of its `order` value and its name.
//! The name breaks ties between equal `order` values, and since fragment names
//! are unique within a catalog the result is a total, reproducible order.
//!
//! ## Modes
//!
//! - **Numeric** (default): each component is classified on its own. A
//!   component made only of ASCII digits compares by integer value; anything
//!   else compares as a string. Numbers sort before non-numeric strings.
//! - **Alpha**: both components compare as plain strings, so `"10"` sorts
//!   before `"9"`.
//!
//! Keys are compared structurally. The composite `"<order>___<name>"` form is
//! only produced for display.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fragment::{Fragment, SORT_KEY_DELIMITER};

/// How a target orders its fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    #[default]
    Numeric,
    Alpha,
}

/// Order component plus name component of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub order: String,
    pub name: String,
}

impl SortKey {
    pub fn new(order: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            order: order.into(),
            name: name.into(),
        }
    }

    pub fn of(fragment: &Fragment) -> Self {
        Self::new(fragment.order(), fragment.name())
    }

    /// Compare two keys under the given mode.
    pub fn compare(&self, other: &SortKey, mode: OrderMode) -> Ordering {
        match mode {
            OrderMode::Numeric => compare_numeric(&self.order, &other.order)
                .then_with(|| compare_numeric(&self.name, &other.name)),
            OrderMode::Alpha => self
                .order
                .cmp(&other.order)
                .then_with(|| self.name.cmp(&other.name)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.order, SORT_KEY_DELIMITER, self.name)
    }
}

/// Sort fragments and pair each one with its key.
pub fn order<'a>(fragments: Vec<&'a Fragment>, mode: OrderMode) -> Vec<(SortKey, &'a Fragment)> {
    order_by(fragments, mode, |fragment| *fragment)
}

/// Sort arbitrary items that each carry a fragment.
///
/// Lets callers order resolved fragments without separating them from their
/// content.
pub fn order_by<T, F>(items: Vec<T>, mode: OrderMode, fragment_of: F) -> Vec<(SortKey, T)>
where
    F: Fn(&T) -> &Fragment,
{
    let mut keyed: Vec<(SortKey, T)> = items
        .into_iter()
        .map(|item| (SortKey::of(fragment_of(&item)), item))
        .collect();
    keyed.sort_by(|a, b| a.0.compare(&b.0, mode));
    keyed
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    match (is_digits(a), is_digits(b)) {
        (true, true) => compare_digit_strings(a, b),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// Integer comparison of arbitrarily long digit strings. `"007"` and `"7"`
/// are the same number; the raw strings decide between them.
fn compare_digit_strings(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.cmp(b))
}
