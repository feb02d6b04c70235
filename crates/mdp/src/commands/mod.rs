//! CLI command implementations.

pub(crate) mod filters;
pub(crate) mod render;

pub(crate) use filters::FiltersArgs;
pub(crate) use render::RenderArgs;

use std::path::PathBuf;

use clap::Args;
use mdp_config::{CliSettings, Config};
use mdp_pipeline::Pipeline;

use crate::error::CliError;

/// Options shared by every command that builds a pipeline.
#[derive(Args)]
pub(crate) struct ContextArgs {
    /// Path to configuration file (default: auto-discover mdp.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render task-list checkboxes as disabled (overrides config).
    #[arg(long)]
    checkbox_disabled: bool,

    /// Root URL for emoji images (overrides config).
    #[arg(long, env = "MDP_ASSET_ROOT")]
    asset_root: Option<String>,

    /// Prefix for user mention links (overrides config).
    #[arg(long, env = "MDP_BASE_URL")]
    base_url: Option<String>,

    /// Site hostname; absolute links to other hosts are marked external.
    #[arg(long, env = "MDP_HOSTNAME")]
    hostname: Option<String>,

    /// Enable GitHub Flavored Markdown extensions (default: enabled).
    #[arg(long)]
    gfm: Option<bool>,

    /// Disable GitHub Flavored Markdown extensions.
    #[arg(long, conflicts_with = "gfm")]
    no_gfm: bool,

    /// Enable verbose output (render timing and filter logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ContextArgs {
    /// Load config with these arguments applied on top.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            checkbox_disabled: self.checkbox_disabled.then_some(true),
            asset_root: self.asset_root.clone(),
            base_url: self.base_url.clone(),
            gfm: self.resolve_gfm(),
            hostname: self.hostname.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Resolve `gfm` from --gfm/--no-gfm flags.
    fn resolve_gfm(&self) -> Option<bool> {
        self.no_gfm.then_some(false).or(self.gfm)
    }
}

/// Build the configured filter chain with the config's context as default.
pub(crate) fn build_pipeline(config: &Config) -> Result<Pipeline, CliError> {
    let filters = config.filters()?;
    Ok(Pipeline::with_kinds(config.context.clone(), &filters))
}
