//! `zen completions <shell>`.

use anyhow::{Context, Result};
use clap::Args;
use clap_complete::{Shell, generate};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to this file instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Runs before config is loaded, so a broken config never blocks it.
///
/// # Errors
///
/// Returns an error if the script cannot be written.
pub fn run_completions(args: &CompletionsArgs, command: &mut clap::Command) -> Result<()> {
    let bin = command.get_name().to_string();
    let mut sink: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    generate(args.shell, command, bin, &mut sink);
    sink.flush().context("Failed to write completion script")?;
    if let Some(path) = &args.out {
        tracing::info!(shell = %args.shell, path = %path.display(), "completions written");
    }
    Ok(())
}
