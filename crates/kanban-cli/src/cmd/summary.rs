//! `kb summary`: per-action counts and the latest events.

use kanban_core::config::EffectiveConfig;
use kanban_core::event::AuditSummary;
use std::path::Path;

use super::open_board;
use crate::output::{OutputMode, render};

pub fn run_summary(
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let board = open_board(project_root, config, output)?;
    let summary = AuditSummary::from_events(board.audit());
    render(output, &summary, |s, w| writeln!(w, "{s}"))
}
