//! `mdp filters` command implementation.

use std::io::{self, Write};

use clap::Args;

use super::{ContextArgs, build_pipeline};
use crate::error::CliError;

/// Arguments for the filters command.
#[derive(Args)]
pub(crate) struct FiltersArgs {
    #[command(flatten)]
    pub context: ContextArgs,
}

impl FiltersArgs {
    /// Print the configured filter chain, one stage per line.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let mut stdout = io::stdout().lock();
        for name in self.chain()? {
            writeln!(stdout, "{name}")?;
        }
        Ok(())
    }

    /// Stage names of the configured chain, parser first.
    fn chain(&self) -> Result<Vec<&'static str>, CliError> {
        let config = self.context.load_config()?;
        Ok(build_pipeline(&config)?.filter_names())
    }
}
