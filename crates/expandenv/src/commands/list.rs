//! `expandenv list` command implementation.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use expandenv_core::document::Format;
use expandenv_core::placeholder::find_placeholders;
use expandenv_core::{Placeholder, Value};

use super::read_document;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Input document (default: stdin).
    input: Option<PathBuf>,

    /// Input format (default: detect from extension, else yaml).
    #[arg(short, long)]
    format: Option<Format>,
}

impl ListArgs {
    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or decoded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let (document, _) = read_document(self.input.as_deref(), self.format)?;

        let mut names = BTreeSet::new();
        let mut invalid = Vec::new();
        collect_references(&document, &mut names, &mut invalid);

        for token in &invalid {
            output.warning(&format!("Invalid placeholder: {token}"));
        }

        let mut stdout = std::io::stdout().lock();
        for name in &names {
            writeln!(stdout, "{name}")?;
        }
        Ok(())
    }
}

/// Collect variable names referenced anywhere in the tree.
///
/// Escaped placeholders are not references. Tokens that fail to parse are
/// collected into `invalid`.
fn collect_references(value: &Value, names: &mut BTreeSet<String>, invalid: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            for token in find_placeholders(text) {
                match Placeholder::parse(token) {
                    Ok(placeholder) => {
                        names.insert(placeholder.name);
                    }
                    Err(_) => invalid.push(token.to_owned()),
                }
            }
        }
        Value::Sequence(items) => {
            for item in items {
                collect_references(item, names, invalid);
            }
        }
        Value::Mapping(map) => {
            for item in map.values() {
                collect_references(item, names, invalid);
            }
        }
        Value::Null | Value::Bool(_) | Value::Integer(_) | Value::Float(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expandenv_core::document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_references() {
        let yaml = r"
host: ${HOST}
url: https://${HOST}:${PORT:number:-443}/
list:
  - ${REGION:-eu}
  - \${ESCAPED}
  - 42
bad: ${BAD:date}
";
        let value = document::decode(yaml, Format::Yaml).unwrap();
        let mut names = BTreeSet::new();
        let mut invalid = Vec::new();

        collect_references(&value, &mut names, &mut invalid);

        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["HOST", "PORT", "REGION"]
        );
        assert_eq!(invalid, vec!["${BAD:date}"]);
    }
}
