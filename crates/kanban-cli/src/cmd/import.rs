//! `kb import`: load an exported board, keeping the audit history.

use anyhow::Context as _;
use clap::Args;
use kanban_core::config::EffectiveConfig;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use super::{ensure_saved, open_board};
use crate::output::{CliError, OutputMode, fail, render};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Exported JSON file, or `-` for stdin.
    pub file: PathBuf,
}

fn read_payload(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("Failed to read payload from stdin")?;
        return Ok(payload);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn run_import(
    args: &ImportArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let payload = read_payload(&args.file)?;
    let mut board = open_board(project_root, config, output)?;

    let report = board.import_payload(&payload).map_err(|err| {
        fail(
            output,
            CliError::from_code(err.code(), err.to_string())
                .with_details(err.issues.iter().map(ToString::to_string)),
        )
    })?;
    ensure_saved(&mut board, output)?;

    render(output, &report, |r, w| {
        writeln!(
            w,
            "✓ Imported {} task(s) and {} audit event(s); {} duplicate id(s) resolved",
            r.imported_tasks, r.imported_events, r.duplicates_resolved
        )
    })
}
