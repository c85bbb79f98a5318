//! `kb list`: search the board with the query language.

use chrono::Utc;
use clap::Args;
use kanban_core::config::EffectiveConfig;
use kanban_core::model::{Status, Task};
use kanban_core::query::{apply_query, parse_query};
use std::io::{self, Write};
use std::path::Path;

use super::{open_board, short_id};
use crate::output::{CliError, OutputMode, Renderable, fail, render_list};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Query tokens: free text, tag:<v>, p:<low|medium|high>,
    /// due:<overdue|week>, est:<op><minutes>.
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Only show one column.
    #[arg(short, long)]
    pub status: Option<Status>,
}

/// One list row.
pub struct TaskRow<'a>(pub &'a Task);

impl Renderable for TaskRow<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let task = self.0;
        write!(
            w,
            "{:<6} {:<8} {:<5} {}",
            task.priority.as_str(),
            short_id(&task.id),
            task.status.as_str(),
            task.title
        )?;
        if let Some(due) = task.due_at {
            write!(w, "  due {}", due.format("%Y-%m-%d %H:%M"))?;
        }
        if task.estimate_minutes > 0 {
            write!(w, "  {}m", task.estimate_minutes)?;
        }
        for tag in &task.tags {
            write!(w, " #{tag}")?;
        }
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self.0).map_err(io::Error::other)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let task = self.0;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            task.id,
            task.status,
            task.priority,
            task.due_at.map(|d| d.to_rfc3339()).unwrap_or_default(),
            task.estimate_minutes,
            task.tags.join(","),
            task.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "STATUS", "PRIORITY", "DUE", "EST", "TAGS", "TITLE"]
    }
}

pub fn run_list(
    args: &ListArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let raw = args.query.join(" ");
    let query = parse_query(&raw)
        .map_err(|err| fail(output, CliError::from_code(err.code(), err.to_string())))?;
    let board = open_board(project_root, config, output)?;

    let rows: Vec<TaskRow<'_>> = apply_query(
        board.tasks(),
        &query,
        Utc::now(),
        config.project.query.due_window_days,
    )
    .into_iter()
    .filter(|task| args.status.is_none_or(|status| task.status == status))
    .map(TaskRow)
    .collect();
    tracing::debug!(query = %raw, matched = rows.len(), "list");

    render_list(&rows, output)?;
    if rows.is_empty() && !output.is_json() {
        println!("No tasks match.");
    }
    Ok(())
}
