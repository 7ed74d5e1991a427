//! Generic decoded document tree.
//!
//! [`Value`] is what YAML and JSON documents decode into before expansion
//! and what the expander hands back afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A decoded configuration tree.
///
/// Mapping keys are kept in key order, so serialization is deterministic
/// but does not preserve the order of the source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value (`null`, `~`).
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Integer(i64),
    /// Floating-point scalar (also holds integers outside the `i64` range).
    Float(f64),
    /// String scalar, the only kind that is ever expanded.
    String(String),
    /// Ordered sequence.
    Sequence(Vec<Value>),
    /// String-keyed mapping.
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the string contents if this is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Look up a mapping entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Canonical text of a scalar, as spliced into surrounding text.
    ///
    /// Containers have no textual form and return `None`.
    pub(crate) fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Null => Some(String::new()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Float(x) => Some(x.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Sequence(_) | Self::Mapping(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self::Mapping(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Mapping(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
