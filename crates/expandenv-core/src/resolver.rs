//! Variable resolvers.
//!
//! A [`Resolver`] maps a variable name to a value. Provided flavors:
//! - `HashMap` / `BTreeMap` of names to values (static table)
//! - [`EnvResolver`] - snapshot of the process environment
//! - [`FnResolver`] - arbitrary lookup function
//! - [`Chain`] - several resolvers tried in order

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{ExpandError, VariableScope};

/// Successful lookup outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Text to substitute for the placeholder.
    Value(String),
    /// Leave the placeholder in the output untouched. Not an error.
    Verbatim,
}

/// Maps variable names to values.
///
/// `Err` means "not found": the expander uses the placeholder's fallback if
/// one exists and records the error otherwise.
pub trait Resolver {
    /// Look up a single variable.
    fn resolve(&self, name: &str) -> Result<Resolved, ExpandError>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, name: &str) -> Result<Resolved, ExpandError> {
        (**self).resolve(name)
    }
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn resolve(&self, name: &str) -> Result<Resolved, ExpandError> {
        (**self).resolve(name)
    }
}

fn missing(name: &str, scope: VariableScope) -> ExpandError {
    ExpandError::MissingVariable {
        name: name.to_owned(),
        scope,
    }
}

impl<S: std::hash::BuildHasher> Resolver for HashMap<String, String, S> {
    fn resolve(&self, name: &str) -> Result<Resolved, ExpandError> {
        self.get(name)
            .map(|value| Resolved::Value(value.clone()))
            .ok_or_else(|| missing(name, VariableScope::Table))
    }
}

impl Resolver for BTreeMap<String, String> {
    fn resolve(&self, name: &str) -> Result<Resolved, ExpandError> {
        self.get(name)
            .map(|value| Resolved::Value(value.clone()))
            .ok_or_else(|| missing(name, VariableScope::Table))
    }
}

/// Process environment captured at construction time.
///
/// Later changes to the environment are not observed; take a new snapshot
/// for every expansion that should see them.
#[derive(Debug, Clone, Default)]
pub struct EnvResolver {
    vars: HashMap<String, String>,
}

impl EnvResolver {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn snapshot() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect::<HashMap<_, _>>();
        tracing::trace!(count = vars.len(), "Captured environment snapshot");
        Self { vars }
    }

    /// Build an environment resolver from explicit pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of a captured variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl Resolver for EnvResolver {
    fn resolve(&self, name: &str) -> Result<Resolved, ExpandError> {
        self.vars
            .get(name)
            .map(|value| Resolved::Value(value.clone()))
            .ok_or_else(|| missing(name, VariableScope::Environment))
    }
}

/// Resolver backed by a lookup function.
///
/// The function returns `Ok(Some(value))` to substitute, `Ok(None)` to leave
/// the placeholder verbatim, and `Err(e)` when the name is unknown; the
/// error's message is reported as-is.
///
/// # Examples
///
/// ```
/// use expandenv_core::resolver::{FnResolver, Resolved, Resolver};
///
/// let resolver = FnResolver(|name: &str| match name {
///     "USER" => Ok(Some("admin".to_owned())),
///     "SKIP" => Ok(None),
///     _ => Err("unknown"),
/// });
/// assert_eq!(resolver.resolve("USER").unwrap(), Resolved::Value("admin".to_owned()));
/// assert_eq!(resolver.resolve("SKIP").unwrap(), Resolved::Verbatim);
/// assert_eq!(resolver.resolve("OTHER").unwrap_err().to_string(), "unknown");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnResolver<F>(pub F);

impl<F, E> Resolver for FnResolver<F>
where
    F: Fn(&str) -> Result<Option<String>, E>,
    E: fmt::Display,
{
    fn resolve(&self, name: &str) -> Result<Resolved, ExpandError> {
        match (self.0)(name) {
            Ok(Some(value)) => Ok(Resolved::Value(value)),
            Ok(None) => Ok(Resolved::Verbatim),
            Err(e) => Err(ExpandError::Lookup {
                name: name.to_owned(),
                message: e.to_string(),
            }),
        }
    }
}

/// Resolvers tried in order.
///
/// The first one that returns a value (or asks for verbatim output) wins.
/// When all of them miss, the error of the last one is reported.
#[derive(Default)]
pub struct Chain<'a> {
    resolvers: Vec<Box<dyn Resolver + 'a>>,
}

impl<'a> Chain<'a> {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver with lower precedence than those already added.
    #[must_use]
    pub fn with(mut self, resolver: impl Resolver + 'a) -> Self {
        self.push(resolver);
        self
    }

    /// Append a resolver with lower precedence than those already added.
    pub fn push(&mut self, resolver: impl Resolver + 'a) {
        self.resolvers.push(Box::new(resolver));
    }

    /// Number of resolvers in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns `true` if the chain has no resolvers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl Resolver for Chain<'_> {
    fn resolve(&self, name: &str) -> Result<Resolved, ExpandError> {
        let mut last_error = None;
        for resolver in &self.resolvers {
            match resolver.resolve(name) {
                Ok(resolved) => return Ok(resolved),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| missing(name, VariableScope::Table)))
    }
}

impl fmt::Debug for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.resolvers.len())
            .finish()
    }
}
