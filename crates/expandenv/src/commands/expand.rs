//! `expandenv expand` command implementation.

use std::path::PathBuf;

use clap::Args;
use expandenv_config::{CliSettings, Config};
use expandenv_core::document::Format;
use expandenv_core::{ExpandErrors, Value, expand};

use super::{read_document, write_document};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the expand command.
#[derive(Args)]
pub(crate) struct ExpandArgs {
    /// Input document (default: stdin).
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover expandenv.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input format (default: detect from extension, else yaml).
    #[arg(short, long)]
    format: Option<Format>,

    /// Output format (overrides config, default: input format).
    #[arg(long)]
    to: Option<Format>,

    /// Set a variable, taking precedence over config and environment.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Do not fall back to process environment variables.
    #[arg(long)]
    no_env: bool,

    /// Write the best-effort document even when placeholders fail.
    #[arg(long)]
    lenient: bool,
}

impl ExpandArgs {
    /// Execute the expand command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or I/O fails, or if any placeholder
    /// fails to expand in strict mode.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            environment: self.no_env.then_some(false),
            strict: self.lenient.then_some(false),
            output_format: self.to,
            variables: self.vars,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let (document, input_format) = read_document(self.input.as_deref(), self.format)?;
        let expansion = expand(&document, &config.resolver());

        let value = settle(expansion.into_result(), config.resolve.strict, &output)?;

        let format = config.output.format.unwrap_or(input_format);
        write_document(&value, format, self.output.as_deref())?;

        if let Some(path) = &self.output {
            output.info(&format!("Wrote {}", path.display()));
        }

        Ok(())
    }
}

/// Decide what to do with a failed expansion.
///
/// Strict mode fails with every message; lenient mode reports each error
/// as a warning and keeps the partial tree.
fn settle(
    result: Result<Value, ExpandErrors>,
    strict: bool,
    output: &Output,
) -> Result<Value, CliError> {
    match result {
        Ok(value) => Ok(value),
        Err(errors) if strict => Err(CliError::Expand(errors)),
        Err(errors) => {
            for err in errors.errors() {
                output.warning(&format!("Warning: {err}"));
            }
            Ok(errors.into_partial())
        }
    }
}

/// Parse a `KEY=VALUE` argument.
fn parse_var(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    if key.is_empty() {
        return Err(format!("empty variable name in '{arg}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
