//! Expansion error types.

use std::fmt;

use crate::value::Value;

/// Where a missing variable was looked up.
///
/// Controls the wording of [`ExpandError::MissingVariable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableScope {
    /// A static name/value table.
    Table,
    /// The process environment.
    Environment,
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("variable"),
            Self::Environment => f.write_str("environment variable"),
        }
    }
}

/// Error raised while resolving a single placeholder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    /// The token does not match the placeholder grammar.
    #[error("could not parse {0}")]
    MalformedPlaceholder(String),

    /// The format tag is not one of `number`, `boolean`, `string`.
    #[error("format {0} is not supported")]
    UnsupportedFormat(String),

    /// The resolver has no value for the name and no fallback was given.
    #[error("{scope} {name} is missing")]
    MissingVariable {
        /// Variable name.
        name: String,
        /// Lookup source, used for the message wording.
        scope: VariableScope,
    },

    /// `number` format requested but the text is not numeric.
    #[error("{0} is not a valid number")]
    InvalidNumber(String),

    /// `boolean` format requested but the text is not a boolean literal.
    #[error("{0} is not a valid boolean")]
    InvalidBoolean(String),

    /// Resolver-specific failure, displayed verbatim.
    #[error("{message}")]
    Lookup {
        /// Variable name.
        name: String,
        /// Message reported by the resolver.
        message: String,
    },
}

impl ExpandError {
    /// Variable name the error refers to, if any.
    #[must_use]
    pub fn variable(&self) -> Option<&str> {
        match self {
            Self::MissingVariable { name, .. } | Self::Lookup { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Every error collected during one expansion, with the best-effort tree.
///
/// Displays as the individual messages joined by `", "`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandErrors {
    errors: Vec<ExpandError>,
    partial: Value,
}

impl ExpandErrors {
    pub(crate) fn new(errors: Vec<ExpandError>, partial: Value) -> Self {
        Self { errors, partial }
    }

    /// Individual errors in traversal order.
    #[must_use]
    pub fn errors(&self) -> &[ExpandError] {
        &self.errors
    }

    /// The expanded tree, with unresolvable placeholders left as text.
    #[must_use]
    pub fn partial(&self) -> &Value {
        &self.partial
    }

    /// Consume the error and return the best-effort tree.
    #[must_use]
    pub fn into_partial(self) -> Value {
        self.partial
    }
}

impl fmt::Display for ExpandErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ExpandErrors {}
