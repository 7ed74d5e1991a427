//! CLI command implementations.

pub(crate) mod expand;
pub(crate) mod list;

pub(crate) use expand::ExpandArgs;
pub(crate) use list::ListArgs;

use std::io::{Read, Write};
use std::path::Path;

use expandenv_core::Value;
use expandenv_core::document::{self, Format};

use crate::error::CliError;

/// Read and decode the input document.
///
/// Reads stdin when `path` is `None`. The format is taken from `format`,
/// then the file extension, then defaults to YAML.
pub(crate) fn read_document(
    path: Option<&Path>,
    format: Option<Format>,
) -> Result<(Value, Format), CliError> {
    let format = format
        .or_else(|| path.and_then(Format::from_path))
        .unwrap_or_default();

    let text = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let value = document::decode(&text, format)?;
    let source = path.map_or_else(|| "stdin".to_owned(), |p| p.display().to_string());
    tracing::info!(%format, %source, "Decoded document");
    Ok((value, format))
}

/// Encode and write a document to `path`, or stdout when `None`.
pub(crate) fn write_document(
    value: &Value,
    format: Format,
    path: Option<&Path>,
) -> Result<(), CliError> {
    let text = document::encode(value, format)?;
    match path {
        Some(path) => std::fs::write(path, text)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
