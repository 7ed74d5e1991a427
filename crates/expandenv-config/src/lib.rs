//! Configuration management for expandenv.
//!
//! Parses `expandenv.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Variables
//!
//! The `[variables]` table is a static name/value table consulted before the
//! process environment. Values may reference environment variables
//! themselves (`HOME_DIR = "${HOME}"`); those references are expanded once,
//! at load time.
//!
//! ```toml
//! [variables]
//! REGION = "eu-west-1"
//!
//! [resolve]
//! environment = true
//! strict = true
//!
//! [output]
//! format = "json"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use expandenv_core::document::Format;
use expandenv_core::{Chain, EnvResolver, ExpandErrors, Resolver, expand_str};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override environment fallback.
    pub environment: Option<bool>,
    /// Override strict mode.
    pub strict: Option<bool>,
    /// Override output format.
    pub output_format: Option<Format>,
    /// Extra variables; these win over the `[variables]` table.
    pub variables: Vec<(String, String)>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "expandenv.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Static variables, consulted before the environment.
    pub variables: BTreeMap<String, String>,
    /// Resolution settings.
    pub resolve: ResolveConfig,
    /// Output settings.
    pub output: OutputConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Resolution settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Fall back to the process environment for names not in `[variables]`.
    pub environment: bool,
    /// Treat any expansion error as fatal.
    pub strict: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            environment: true,
            strict: true,
        }
    }
}

/// Output settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output document format. Defaults to the input format.
    pub format: Option<Format>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion of a config value.
    #[error("Environment variable error in {field}: {source}")]
    Expand {
        /// Config field path (e.g., "`variables.HOME_DIR`").
        field: String,
        /// Every expansion failure in the value.
        source: ExpandErrors,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `expandenv.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(environment) = settings.environment {
            self.resolve.environment = environment;
        }
        if let Some(strict) = settings.strict {
            self.resolve.strict = strict;
        }
        if let Some(format) = settings.output_format {
            self.output.format = Some(format);
        }
        for (name, value) in &settings.variables {
            self.variables.insert(name.clone(), value.clone());
        }
    }

    /// Build the resolver described by this configuration.
    ///
    /// `[variables]` first, then a fresh snapshot of the process environment
    /// when `resolve.environment` is enabled.
    #[must_use]
    pub fn resolver(&self) -> Chain<'_> {
        let mut chain = Chain::new().with(&self.variables);
        if self.resolve.environment {
            chain.push(EnvResolver::snapshot());
        }
        chain
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_config_from(&cwd)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before validation
        config.expand_env_vars(&EnvResolver::snapshot())?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and expansion
        config.validate()?;

        tracing::info!(path = %path.display(), variables = config.variables.len(), "Loaded configuration");

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Variable names must be non-empty and must not contain `:` or `}`,
    /// since such names could never be referenced by a placeholder.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.variables.keys() {
            if name.is_empty() {
                return Err(ConfigError::Validation(
                    "variable names cannot be empty".to_owned(),
                ));
            }
            if name.contains([':', '}']) {
                return Err(ConfigError::Validation(format!(
                    "variables.{name}: name cannot contain ':' or '}}'"
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in variable values.
    fn expand_env_vars(&mut self, env: &impl Resolver) -> Result<(), ConfigError> {
        for (name, value) in &mut self.variables {
            *value = expand_str(value, env).map_err(|source| ConfigError::Expand {
                field: format!("variables.{name}"),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expandenv_core::{Resolved, Resolver};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.variables.is_empty());
        assert!(config.resolve.environment);
        assert!(config.resolve.strict);
        assert_eq!(config.output.format, None);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.variables.is_empty());
        assert!(config.resolve.environment);
        assert!(config.resolve.strict);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[variables]
REGION = "eu-west-1"
REPLICAS = "3"

[resolve]
environment = false
strict = false

[output]
format = "json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.variables["REGION"], "eu-west-1");
        assert_eq!(config.variables["REPLICAS"], "3");
        assert!(!config.resolve.environment);
        assert!(!config.resolve.strict);
        assert_eq!(config.output.format, Some(Format::Json));
    }

    #[test]
    fn test_parse_unknown_output_format() {
        let result = toml::from_str::<Config>("[output]\nformat = \"xml\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config: Config = toml::from_str("[variables]\nA = \"file\"\nB = \"file\"\n").unwrap();
        let overrides = CliSettings {
            environment: Some(false),
            output_format: Some(Format::Json),
            variables: vec![("A".to_owned(), "cli".to_owned())],
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert!(!config.resolve.environment);
        assert!(config.resolve.strict); // Unchanged
        assert_eq!(config.output.format, Some(Format::Json));
        assert_eq!(config.variables["A"], "cli");
        assert_eq!(config.variables["B"], "file");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert!(config.resolve.environment);
        assert!(config.resolve.strict);
        assert!(config.variables.is_empty());
    }

    #[test]
    fn test_expand_env_vars_in_variables() {
        let env = expandenv_core::EnvResolver::from_vars([("HOME", "/home/me")]);
        let mut config: Config = toml::from_str(
            "[variables]\nCACHE = \"${HOME}/.cache\"\nMODE = \"${MODE:-dev}\"\n",
        )
        .unwrap();

        config.expand_env_vars(&env).unwrap();

        assert_eq!(config.variables["CACHE"], "/home/me/.cache");
        assert_eq!(config.variables["MODE"], "dev");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let env = expandenv_core::EnvResolver::from_vars(Vec::<(String, String)>::new());
        let mut config: Config =
            toml::from_str("[variables]\nTOKEN = \"${MISSING_TOKEN_CONFIG_TEST}\"\n").unwrap();

        let err = config.expand_env_vars(&env).unwrap_err();

        assert!(matches!(err, ConfigError::Expand { .. }));
        let msg = err.to_string();
        assert!(msg.contains("variables.TOKEN"), "got: {msg}");
        assert!(msg.contains("MISSING_TOKEN_CONFIG_TEST"), "got: {msg}");
    }

    #[test]
    fn test_expand_env_vars_escaped_literal() {
        let env = expandenv_core::EnvResolver::default();
        let mut config: Config = toml::from_str(
            "[variables]\nLITERAL = '\\${NOT_EXPANDED}'\n",
        )
        .unwrap();

        config.expand_env_vars(&env).unwrap();

        assert_eq!(config.variables["LITERAL"], "${NOT_EXPANDED}");
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unreferenceable_names() {
        for name in ["", "A:B", "A}"] {
            let mut config = Config::default();
            config.variables.insert(name.to_owned(), "x".to_owned());
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, ConfigError::Validation(_)),
                "Expected ConfigError::Validation, got {err:?}"
            );
        }
    }

    #[test]
    fn test_resolver_prefers_variables() {
        let mut config = Config::default();
        config
            .variables
            .insert("PATH".to_owned(), "from-config".to_owned());

        let resolver = config.resolver();

        assert_eq!(resolver.len(), 2);
        assert_eq!(
            resolver.resolve("PATH").unwrap(),
            Resolved::Value("from-config".to_owned())
        );
    }

    #[test]
    fn test_resolver_without_environment() {
        let mut config = Config::default();
        config.resolve.environment = false;

        let resolver = config.resolver();

        assert_eq!(resolver.len(), 1);
        assert_eq!(
            resolver.resolve("EXPANDENV_NOT_SET").unwrap_err().to_string(),
            "variable EXPANDENV_NOT_SET is missing"
        );
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[variables]\nA = \"1\"\n").unwrap();

        let config = Config::load(Some(path.as_path()), None).unwrap();

        assert_eq!(config.variables["A"], "1");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_explicit_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(path.as_path()), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[variables\n").unwrap();

        let err = Config::load(Some(path.as_path()), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates_cli_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let settings = CliSettings {
            variables: vec![("BAD:NAME".to_owned(), "x".to_owned())],
            ..Default::default()
        };

        let err = Config::load(Some(path.as_path()), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_config_from(&nested).unwrap();

        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn test_discover_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_config_from(&nested).unwrap();

        assert_eq!(found, nested.join(CONFIG_FILENAME));
    }
}
