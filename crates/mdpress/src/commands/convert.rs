//! `mdpress convert` command implementation.

use std::path::PathBuf;

use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Input markdown file.
    input: PathBuf,

    /// Output PDF path (default: input path with a .pdf extension).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, rendering fails, or
    /// the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let markdown = std::fs::read_to_string(&self.input)?;
        let document = mdpress_renderer::render(&markdown)?;

        let target = self
            .output
            .unwrap_or_else(|| self.input.with_extension("pdf"));
        std::fs::write(&target, &document.bytes)?;

        output.success(&format!(
            "Wrote {} ({} page{}, title: {})",
            target.display(),
            document.page_count,
            if document.page_count == 1 { "" } else { "s" },
            document.title
        ));

        Ok(())
    }
}
