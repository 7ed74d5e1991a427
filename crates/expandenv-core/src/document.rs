//! YAML and JSON document codec.
//!
//! Decodes document text into a [`Value`] tree and encodes it back. The
//! expander itself never sees text formats.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::value::Value;

/// Supported document formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// YAML (also accepts JSON input, being a superset).
    #[default]
    Yaml,
    /// JSON.
    Json,
}

impl Format {
    /// Detect the format from a file extension.
    ///
    /// Returns `None` for unknown or missing extensions.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl FromStr for Format {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(DocumentError::UnknownFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => f.write_str("yaml"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Document codec error.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// YAML decoding or encoding failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON decoding or encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unrecognized format name.
    #[error("unknown document format: {0} (expected yaml or json)")]
    UnknownFormat(String),
}

/// Decode document text.
///
/// Empty or whitespace-only YAML decodes to [`Value::Null`].
///
/// # Errors
///
/// Returns an error if the text is not valid in the given format, or if a
/// YAML mapping has non-string keys.
pub fn decode(text: &str, format: Format) -> Result<Value, DocumentError> {
    match format {
        Format::Yaml => {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            Ok(serde_yaml::from_str(text)?)
        }
        Format::Json => Ok(serde_json::from_str(text)?),
    }
}

/// Encode a tree as document text.
///
/// JSON output is pretty-printed; both formats end with a newline.
///
/// # Errors
///
/// Returns an error if the serializer fails.
pub fn encode(value: &Value, format: Format) -> Result<String, DocumentError> {
    match format {
        Format::Yaml => Ok(serde_yaml::to_string(value)?),
        Format::Json => {
            let mut text = serde_json::to_string_pretty(value)?;
            text.push('\n');
            Ok(text)
        }
    }
}
