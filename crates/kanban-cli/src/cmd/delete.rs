//! `kb delete`: remove a task from the board.

use clap::Args;
use kanban_core::config::EffectiveConfig;
use std::path::Path;

use super::{describe, open_board, report_outcome, resolve_task_id};
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Task id or unique id prefix.
    pub id: String,
}

pub fn run_delete(
    args: &DeleteArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut board = open_board(project_root, config, output)?;
    let id = resolve_task_id(board.state(), &args.id, output)?;
    let outcome = board.delete(&id);
    let report = report_outcome(outcome, &id, &mut board, output)?;
    render(output, &report, |r, w| writeln!(w, "{}", describe("Deleted", r)))
}
