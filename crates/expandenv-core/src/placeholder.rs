//! Placeholder grammar.
//!
//! A placeholder is `${NAME[:FORMAT][:-FALLBACK]}`:
//! - `NAME` - one or more characters other than `:` and `}`
//! - `FORMAT` - one of `string`, `number`, `boolean`
//! - `FALLBACK` - any text without `}`, possibly empty
//!
//! A single backslash directly before `${` escapes the placeholder.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExpandError;
use crate::value::Value;

/// Placeholder token, optionally preceded by its escaping backslash.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\?\$\{[^}]+\}").unwrap());

/// A string consisting of exactly one placeholder.
static WHOLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\$\{[^}]+\}$").unwrap());

/// Post-resolution coercion requested by the format tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// No tag: the resolved text is used as a string.
    #[default]
    Unspecified,
    /// `:string`
    String,
    /// `:number`
    Number,
    /// `:boolean`
    Boolean,
}

impl Format {
    /// Coerce resolved text into a typed value.
    ///
    /// Numbers are parsed as `i64` first, then as a finite `f64`.
    /// Booleans accept exactly `0`, `1`, `false`, `true`, `no`, `yes`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` or `InvalidBoolean` when the text does not fit.
    pub fn coerce(self, text: String) -> Result<Value, ExpandError> {
        match self {
            Self::Unspecified | Self::String => Ok(Value::String(text)),
            Self::Number => {
                if let Ok(n) = text.parse::<i64>() {
                    return Ok(Value::Integer(n));
                }
                match text.parse::<f64>() {
                    Ok(x) if x.is_finite() => Ok(Value::Float(x)),
                    _ => Err(ExpandError::InvalidNumber(text)),
                }
            }
            Self::Boolean => match text.as_str() {
                "0" | "no" | "false" => Ok(Value::Bool(false)),
                "1" | "yes" | "true" => Ok(Value::Bool(true)),
                _ => Err(ExpandError::InvalidBoolean(text)),
            },
        }
    }
}

impl FromStr for Format {
    type Err = ExpandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            other => Err(ExpandError::UnsupportedFormat(other.to_owned())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => Ok(()),
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Boolean => f.write_str("boolean"),
        }
    }
}

/// A parsed `${...}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Variable name.
    pub name: String,
    /// Requested coercion.
    pub format: Format,
    /// Literal used when the variable is not found.
    ///
    /// `Some("")` is an explicit empty fallback, `None` means no `:-` clause.
    pub fallback: Option<String>,
}

impl Placeholder {
    /// Parse a single token spanning `${` to the closing `}`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPlaceholder` if the token is not `${...}` or has an
    /// empty name, and `UnsupportedFormat` for an unknown format tag.
    pub fn parse(token: &str) -> Result<Self, ExpandError> {
        let malformed = || ExpandError::MalformedPlaceholder(token.to_owned());

        let inner = token
            .strip_prefix("${")
            .and_then(|t| t.strip_suffix('}'))
            .ok_or_else(malformed)?;
        if inner.contains('}') {
            return Err(malformed());
        }

        let (name, rest) = inner.split_at(inner.find(':').unwrap_or(inner.len()));
        if name.is_empty() {
            return Err(malformed());
        }

        let (tag, fallback) = match rest.strip_prefix(':') {
            None => (None, None),
            Some(clause) => match clause.strip_prefix('-') {
                Some(fallback) => (None, Some(fallback)),
                None => match clause.split_once(":-") {
                    Some((tag, fallback)) => (Some(tag), Some(fallback)),
                    None => (Some(clause), None),
                },
            },
        };

        let format = match tag {
            Some(tag) => tag.parse()?,
            None => Format::Unspecified,
        };

        Ok(Self {
            name: name.to_owned(),
            format,
            fallback: fallback.map(str::to_owned),
        })
    }
}

/// One placeholder occurrence found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Occurrence<'a> {
    /// Byte range of the whole match, including an escaping backslash.
    pub span: Range<usize>,
    /// The `${...}` token without the backslash.
    pub token: &'a str,
    /// Whether a backslash escaped the token.
    pub escaped: bool,
}

/// Scan a string for placeholders, escaped or not, in order.
pub(crate) fn scan(text: &str) -> impl Iterator<Item = Occurrence<'_>> {
    TOKEN_PATTERN.find_iter(text).map(|m| {
        let matched = m.as_str();
        match matched.strip_prefix('\\') {
            Some(token) => Occurrence {
                span: m.range(),
                token,
                escaped: true,
            },
            None => Occurrence {
                span: m.range(),
                token: matched,
                escaped: false,
            },
        }
    })
}

/// Returns true if the whole string is exactly one placeholder.
#[must_use]
pub fn is_whole_placeholder(text: &str) -> bool {
    WHOLE_PATTERN.is_match(text)
}

/// Unescaped placeholder tokens in a string, in order of appearance.
///
/// # Examples
///
/// ```
/// use expandenv_core::placeholder::find_placeholders;
///
/// let tokens = find_placeholders(r"${HOST}:${PORT:number} \${LITERAL}");
/// assert_eq!(tokens, vec!["${HOST}", "${PORT:number}"]);
/// ```
#[must_use]
pub fn find_placeholders(text: &str) -> Vec<&str> {
    scan(text)
        .filter(|occurrence| !occurrence.escaped)
        .map(|occurrence| occurrence.token)
        .collect()
}
