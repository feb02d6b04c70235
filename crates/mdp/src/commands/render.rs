//! `mdp render` command implementation.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use mdp_pipeline::ContextOverrides;

use super::{ContextArgs, build_pipeline};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: read stdin).
    file: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    pub context: ContextArgs,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read or
    /// a filter aborts the render.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.context.load_config()?;

        if self.context.verbose
            && let Some(path) = &config.config_path
        {
            output.info(&format!("Config: {}", path.display()));
        }

        let pipeline = build_pipeline(&config)?;
        let markdown = self.read_input()?;

        let start = Instant::now();
        let html = pipeline.render(&markdown, &ContextOverrides::default())?;
        tracing::info!(
            filters = ?pipeline.filter_names(),
            elapsed = ?start.elapsed(),
            "Rendered markdown"
        );

        match &self.output {
            Some(path) => {
                fs::write(path, with_newline(html))?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(with_newline(html).as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    fn read_input(&self) -> Result<String, CliError> {
        match &self.file {
            Some(path) => fs::read_to_string(path).map_err(|e| CliError::Input {
                path: path.display().to_string(),
                source: e,
            }),
            None => {
                let mut markdown = String::new();
                io::stdin().read_to_string(&mut markdown)?;
                Ok(markdown)
            }
        }
    }
}

fn with_newline(mut html: String) -> String {
    if !html.ends_with('\n') {
        html.push('\n');
    }
    html
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn parse(args: &[&str]) -> RenderArgs {
        TestCli::try_parse_from(std::iter::once("mdp").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_render_file_to_output() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("mdp.toml");
        fs::write(
            &config,
            concat!(
                "[context]\n",
                "checkbox_disabled = true\n",
                "base_url = \"https://example.com/users\"\n",
                "hostname = \"example.com\"\n",
            ),
        )
        .unwrap();
        let input = dir.path().join("todo.md");
        fs::write(&input, "- [x] Done\n- [ ] Ask @bob\n").unwrap();
        let out = dir.path().join("todo.html");

        parse(&[
            "--config",
            config.to_str().unwrap(),
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .execute()
        .unwrap();

        let html = fs::read_to_string(&out).unwrap();
        assert!(html.ends_with("</ul>\n"));
        assert!(html.contains(r#"data-checkbox-index="0" checked="checked" disabled="disabled">Done"#));
        assert!(html.contains(
            r#"<a href="https://example.com/users/bob" class="user-mention">@bob</a>"#
        ));
    }

    #[test]
    fn test_missing_input_file() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("mdp.toml");
        fs::write(&config, "").unwrap();
        let missing = dir.path().join("missing.md");

        let err = parse(&["--config", config.to_str().unwrap(), missing.to_str().unwrap()])
            .execute()
            .unwrap_err();
        assert!(matches!(err, CliError::Input { .. }));
    }

    #[test]
    fn test_with_newline() {
        assert_eq!(with_newline("<p>a</p>".to_owned()), "<p>a</p>\n");
        assert_eq!(with_newline("<p>a</p>\n".to_owned()), "<p>a</p>\n");
    }
}
