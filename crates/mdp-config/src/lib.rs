//! Configuration management for mdp.
//!
//! Parses `mdp.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [context]
//! checkbox_disabled = true
//! asset_root = "${ASSET_HOST:-}/images"
//! base_url = "https://example.com/users"
//! hostname = "example.com"
//!
//! [pipeline]
//! filters = ["mention", "task_list", "sanitize"]
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `context.asset_root`
//! - `context.base_url`

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use mdp_pipeline::{Context, FilterKind};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override checkbox disabled flag.
    pub checkbox_disabled: Option<bool>,
    /// Override emoji asset root.
    pub asset_root: Option<String>,
    /// Override mention base URL.
    pub base_url: Option<String>,
    /// Override GitHub Flavored Markdown flag.
    pub gfm: Option<bool>,
    /// Override site hostname used for external-link detection.
    pub hostname: Option<String>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "mdp.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default render context.
    pub context: Context,
    /// Filter chain configuration.
    pub pipeline: PipelineConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Filter chain configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Structural filters to run after markdown parsing, in order.
    /// The default chain is used when unset.
    filters: Option<Vec<String>>,
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
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`context.base_url`").
        field: String,
        /// Error message (e.g., "${`BASE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl PipelineConfig {
    /// Configured filters, or the default chain when unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a filter name is unknown.
    pub fn filters(&self) -> Result<Vec<FilterKind>, ConfigError> {
        let Some(names) = &self.filters else {
            return Ok(FilterKind::DEFAULT_CHAIN.to_vec());
        };
        names
            .iter()
            .map(|name| {
                name.parse::<FilterKind>()
                    .map_err(|e| ConfigError::Validation(format!("pipeline.filters: {e}")))
            })
            .collect()
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdp.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The merged result is validated.
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
        }
        config.validate()?;

        Ok(config)
    }

    /// Configured structural filters, in order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a filter name is unknown.
    pub fn filters(&self) -> Result<Vec<FilterKind>, ConfigError> {
        self.pipeline.filters()
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(disabled) = settings.checkbox_disabled {
            self.context.checkbox_disabled = disabled;
        }
        if let Some(asset_root) = &settings.asset_root {
            self.context.asset_root.clone_from(asset_root);
        }
        if let Some(base_url) = &settings.base_url {
            self.context.base_url.clone_from(base_url);
        }
        if let Some(gfm) = settings.gfm {
            self.context.gfm = gfm;
        }
        if let Some(hostname) = &settings.hostname {
            self.context.hostname = Some(hostname.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        discover_from(&current)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`] once CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_context()?;
        self.validate_pipeline()?;
        Ok(())
    }

    fn validate_context(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.context.base_url, "context.base_url")?;
        Ok(())
    }

    /// Filter names must be known and unique, and `sanitize` must run last.
    fn validate_pipeline(&self) -> Result<(), ConfigError> {
        let filters = self.pipeline.filters()?;

        let mut seen = HashSet::new();
        for kind in &filters {
            if !seen.insert(*kind) {
                return Err(ConfigError::Validation(format!(
                    "pipeline.filters lists '{kind}' more than once"
                )));
            }
        }

        if let Some(position) = filters.iter().position(|kind| *kind == FilterKind::Sanitize)
            && position + 1 != filters.len()
        {
            return Err(ConfigError::Validation(
                "pipeline.filters: 'sanitize' must be the last filter".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.context.asset_root =
            expand::expand_env(&self.context.asset_root, "context.asset_root")?;
        self.context.base_url = expand::expand_env(&self.context.base_url, "context.base_url")?;
        Ok(())
    }
}

/// Search for config file in `start` and its parents.
fn discover_from(start: &Path) -> Option<PathBuf> {
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
