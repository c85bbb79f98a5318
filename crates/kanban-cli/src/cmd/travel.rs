//! `kb travel`: rewind the board to a point in its audit log.

use clap::Args;
use kanban_core::config::EffectiveConfig;
use std::path::Path;

use super::{ensure_saved, open_board};
use crate::output::{CliError, OutputMode, fail, render};

#[derive(Args, Debug)]
pub struct TravelArgs {
    /// Audit index to rewind to, as shown by `kb log`.
    pub index: usize,
}

pub fn run_travel(
    args: &TravelArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut board = open_board(project_root, config, output)?;
    let report = board
        .time_travel(args.index)
        .map_err(|err| fail(output, CliError::from_code(err.code(), err.to_string())))?;
    ensure_saved(&mut board, output)?;

    render(output, &report, |r, w| {
        writeln!(
            w,
            "✓ Travelled to #{}: undid {} event(s), {} task(s) on the board",
            r.target_index, r.reverted_events, r.task_count
        )?;
        writeln!(w, "  The jump is logged; `kb log -n 1` shows it.")
    })
}
