//! Tree expansion.
//!
//! Walks a [`Value`] tree and replaces placeholders in every string. Errors
//! never stop the walk: the offending placeholder is kept as text and the
//! error is collected, so one pass reports every problem in the document.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ExpandError, ExpandErrors};
use crate::placeholder::{self, Placeholder};
use crate::resolver::{EnvResolver, FnResolver, Resolved, Resolver};
use crate::value::Value;

/// Result of expanding a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    /// The rewritten tree. Unresolvable placeholders are left as text.
    pub value: Value,
    /// Errors in traversal order.
    pub errors: Vec<ExpandError>,
}

impl Expansion {
    /// Whether every placeholder was resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Aggregate error, if any placeholder failed.
    #[must_use]
    pub fn error(&self) -> Option<ExpandErrors> {
        (!self.errors.is_empty())
            .then(|| ExpandErrors::new(self.errors.clone(), self.value.clone()))
    }

    /// Convert into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns every collected error when expansion was incomplete; the
    /// error still carries the partial tree.
    pub fn into_result(self) -> Result<Value, ExpandErrors> {
        if self.errors.is_empty() {
            Ok(self.value)
        } else {
            Err(ExpandErrors::new(self.errors, self.value))
        }
    }
}

/// Expand every placeholder in `value` using `resolver`.
///
/// The input tree is not modified.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use expandenv_core::{Value, expand};
///
/// let vars = HashMap::from([("PORT".to_owned(), "8080".to_owned())]);
/// let expansion = expand(&Value::from("${PORT:number}"), &vars);
/// assert_eq!(expansion.value, Value::Integer(8080));
/// assert!(expansion.is_complete());
/// ```
pub fn expand<R: Resolver + ?Sized>(value: &Value, resolver: &R) -> Expansion {
    let mut errors = Vec::new();
    let value = expand_value(value, resolver, &mut errors);

    if errors.is_empty() {
        tracing::debug!("Expansion completed");
    } else {
        tracing::debug!(error_count = errors.len(), "Expansion completed with errors");
    }

    Expansion { value, errors }
}

/// Expand using a lookup function.
///
/// See [`FnResolver`] for the meaning of the function's return values.
pub fn expand_with<F, E>(value: &Value, lookup: F) -> Expansion
where
    F: Fn(&str) -> Result<Option<String>, E>,
    E: fmt::Display,
{
    expand(value, &FnResolver(lookup))
}

/// Expand using a static name/value table.
pub fn expand_map<S: std::hash::BuildHasher>(
    value: &Value,
    vars: &HashMap<String, String, S>,
) -> Expansion {
    expand(value, vars)
}

/// Expand using the process environment, captured when called.
pub fn expand_env(value: &Value) -> Expansion {
    expand(value, &EnvResolver::snapshot())
}

/// Expand placeholders in a single string, always producing text.
///
/// Typed results of a whole-string placeholder are rendered back to text.
///
/// # Errors
///
/// Returns the collected errors if any placeholder fails.
pub fn expand_str<R: Resolver + ?Sized>(text: &str, resolver: &R) -> Result<String, ExpandErrors> {
    let value = expand(&Value::from(text), resolver).into_result()?;
    Ok(value.scalar_text().unwrap_or_default())
}

fn expand_value<R: Resolver + ?Sized>(
    value: &Value,
    resolver: &R,
    errors: &mut Vec<ExpandError>,
) -> Value {
    match value {
        Value::String(text) => expand_string(text, resolver, errors),
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| expand_value(item, resolver, errors))
                .collect(),
        ),
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(key, item)| (key.clone(), expand_value(item, resolver, errors)))
                .collect(),
        ),
        Value::Null | Value::Bool(_) | Value::Integer(_) | Value::Float(_) => value.clone(),
    }
}

fn expand_string<R: Resolver + ?Sized>(
    text: &str,
    resolver: &R,
    errors: &mut Vec<ExpandError>,
) -> Value {
    // Fast path: nothing to expand
    if !text.contains("${") {
        return Value::String(text.to_owned());
    }

    // A lone placeholder keeps the coerced type
    if placeholder::is_whole_placeholder(text) {
        return match resolve_token(text, resolver) {
            Ok(Some(value)) => value,
            Ok(None) => Value::String(text.to_owned()),
            Err(e) => {
                errors.push(e);
                Value::String(text.to_owned())
            }
        };
    }

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for occurrence in placeholder::scan(text) {
        result.push_str(&text[last_end..occurrence.span.start]);

        if occurrence.escaped {
            result.push_str(occurrence.token);
        } else {
            match resolve_token(occurrence.token, resolver) {
                Ok(Some(value)) => match value.scalar_text() {
                    Some(rendered) => result.push_str(&rendered),
                    None => result.push_str(occurrence.token),
                },
                Ok(None) => result.push_str(occurrence.token),
                Err(e) => {
                    errors.push(e);
                    result.push_str(occurrence.token);
                }
            }
        }

        last_end = occurrence.span.end;
    }

    result.push_str(&text[last_end..]);
    Value::String(result)
}

/// Resolve and coerce one token. `Ok(None)` means keep it verbatim.
fn resolve_token<R: Resolver + ?Sized>(
    token: &str,
    resolver: &R,
) -> Result<Option<Value>, ExpandError> {
    let placeholder = Placeholder::parse(token)?;

    let text = match resolver.resolve(&placeholder.name) {
        Ok(Resolved::Value(text)) => text,
        Ok(Resolved::Verbatim) => return Ok(None),
        Err(e) => match placeholder.fallback {
            Some(fallback) => fallback,
            None => {
                tracing::debug!(variable = %placeholder.name, error = %e, "Placeholder left unresolved");
                return Err(e);
            }
        },
    };

    placeholder.format.coerce(text).map(Some)
}
