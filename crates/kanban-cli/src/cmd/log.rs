//! `kb log`: inspect the audit trail.
//!
//! Every row carries its absolute audit index, which is what `kb travel`
//! takes.

use clap::Args;
use kanban_core::config::EffectiveConfig;
use kanban_core::event::{Action, AuditEvent, AuditFilter, summarize_diff};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::open_board;
use crate::output::{OutputMode, Renderable, render_list};

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Only this action (e.g. move, RESOLVE_DUPLICATE_ID).
    #[arg(short, long)]
    pub action: Option<Action>,

    /// Only events whose task id contains this text.
    #[arg(short, long)]
    pub task: Option<String>,

    /// Case-insensitive search over notes and before/after snapshots.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Show only the newest N matching events.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

impl LogArgs {
    fn filter(&self) -> AuditFilter {
        AuditFilter {
            action: self.action,
            task_id_contains: self.task.clone(),
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogRow<'a> {
    pub index: usize,
    #[serde(flatten)]
    pub event: &'a AuditEvent,
}

impl Renderable for LogRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "#{:<4} {}  {:<20} {:<36}  {}",
            self.index,
            self.event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.event.action.as_str(),
            self.event.task_id,
            summarize_diff(&self.event.diff)
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self).map_err(io::Error::other)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}\t{}", self.index, self.event)
    }

    fn table_headers() -> &'static [&'static str] {
        &["INDEX", "TIMESTAMP", "ACTION", "TASK", "CHANGES"]
    }
}

/// Matching rows, oldest first, keeping only the newest `limit`.
fn select<'a>(audit: &'a [AuditEvent], filter: &AuditFilter, limit: Option<usize>) -> Vec<LogRow<'a>> {
    let mut rows: Vec<LogRow<'a>> = audit
        .iter()
        .enumerate()
        .filter(|(_, event)| filter.matches(event))
        .map(|(index, event)| LogRow { index, event })
        .collect();
    if let Some(limit) = limit {
        let skip = rows.len().saturating_sub(limit);
        rows.drain(..skip);
    }
    rows
}

pub fn run_log(
    args: &LogArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let board = open_board(project_root, config, output)?;
    let rows = select(board.audit(), &args.filter(), args.limit);
    render_list(&rows, output)?;
    if rows.is_empty() && !output.is_json() {
        println!("No audit events match.");
    }
    Ok(())
}
