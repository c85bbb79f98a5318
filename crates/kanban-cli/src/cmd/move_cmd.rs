//! `kb move`: move a task to another column.

use clap::Args;
use kanban_core::config::EffectiveConfig;
use kanban_core::model::Status;
use std::path::Path;

use super::{describe, open_board, report_outcome, resolve_task_id};
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Task id or unique id prefix.
    pub id: String,

    /// Target column: todo, doing, done.
    pub status: Status,
}

pub fn run_move(
    args: &MoveArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut board = open_board(project_root, config, output)?;
    let id = resolve_task_id(board.state(), &args.id, output)?;
    let outcome = board.move_task(&id, args.status);
    let report = report_outcome(outcome, &id, &mut board, output)?;
    render(output, &report, |r, w| {
        writeln!(w, "{}", describe(&format!("Moved to {}:", args.status), r))
    })
}
