//! `kb export`: write the whole board (tasks, audit log, UI flags) as JSON.

use anyhow::Context as _;
use clap::Args;
use kanban_core::config::EffectiveConfig;
use kanban_core::state::default_export_file_name;
use serde_json::json;
use std::path::{Path, PathBuf};

use super::open_board;
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination file, or `-` for stdout. Defaults to
    /// `kanban-audit-export-YYYY-MM-DD.json` in the current directory.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn run_export(
    args: &ExportArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let board = open_board(project_root, config, output)?;
    let json = board.state().export_json()?;

    let target = args
        .out
        .clone()
        .unwrap_or_else(|| project_root.join(default_export_file_name()));
    if target == Path::new("-") {
        println!("{json}");
        return Ok(());
    }

    std::fs::write(&target, &json)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    tracing::info!(path = %target.display(), bytes = json.len(), "board exported");

    let value = json!({
        "path": target.display().to_string(),
        "tasks": board.tasks().len(),
        "events": board.audit().len(),
    });
    render(output, &value, |v, w| {
        writeln!(
            w,
            "✓ Exported {} task(s), {} event(s) to {}",
            v["tasks"],
            v["events"],
            v["path"].as_str().unwrap_or_default()
        )
    })
}
