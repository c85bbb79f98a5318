//! `kb show`: one task with its audit history.

use clap::Args;
use kanban_core::config::EffectiveConfig;
use kanban_core::event::{AuditEvent, AuditFilter, recently_changed_fields, summarize_diff};
use kanban_core::model::{Task, TaskField};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::{open_board, resolve_task_id};
use crate::output::{OutputMode, Renderable, pretty_kv, pretty_rule, pretty_section, render_item};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task id or unique id prefix.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct HistoryEntry<'a> {
    index: usize,
    #[serde(flatten)]
    event: &'a AuditEvent,
}

#[derive(Debug, Serialize)]
struct TaskView<'a> {
    task: &'a Task,
    /// Fields touched by the latest user edit.
    recently_changed: Vec<&'static str>,
    history: Vec<HistoryEntry<'a>>,
}

impl Renderable for TaskView<'_> {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let task = self.task;
        pretty_section(w, &task.title)?;
        pretty_kv(w, "id", task.id.as_str())?;
        pretty_kv(w, "status", task.status.as_str())?;
        pretty_kv(w, "priority", task.priority.as_str())?;
        pretty_kv(w, "created", task.created_at.to_rfc3339())?;
        if let Some(due) = task.due_at {
            pretty_kv(w, "due", due.to_rfc3339())?;
        }
        pretty_kv(w, "estimate", format!("{} min", task.estimate_minutes))?;
        if !task.tags.is_empty() {
            pretty_kv(w, "tags", task.tags.join(", "))?;
        }
        if let Some(description) = &task.description {
            pretty_kv(w, "description", description)?;
        }
        if let Some(notes) = &task.reviewer_notes {
            pretty_kv(w, "review notes", notes)?;
        }
        if let Some(rubric) = &task.rubric {
            let comment = rubric.comment.as_deref().unwrap_or_default();
            pretty_kv(w, "rubric", format!("{}/10 {comment}", rubric.score).trim_end())?;
        }
        if !self.recently_changed.is_empty() {
            pretty_kv(w, "last edit", self.recently_changed.join(", "))?;
        }

        writeln!(w)?;
        writeln!(w, "History")?;
        pretty_rule(w)?;
        for entry in &self.history {
            writeln!(
                w,
                "#{:<4} {}  {:<20} {}",
                entry.index,
                entry.event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.event.action.as_str(),
                summarize_diff(&entry.event.diff)
            )?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *w, self).map_err(io::Error::other)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let task = self.task;
        writeln!(w, "id\t{}", task.id)?;
        writeln!(w, "title\t{}", task.title)?;
        writeln!(w, "status\t{}", task.status)?;
        writeln!(w, "priority\t{}", task.priority)?;
        writeln!(w, "tags\t{}", task.tags.join(","))?;
        writeln!(w, "history\t{}", self.history.len())
    }
}

pub fn run_show(
    args: &ShowArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let board = open_board(project_root, config, output)?;
    let id = resolve_task_id(board.state(), &args.id, output)?;
    let Some(task) = board.state().task(&id) else {
        anyhow::bail!("task {id} is not on the board");
    };

    let filter = AuditFilter {
        task_id_contains: Some(id.to_string()),
        ..AuditFilter::default()
    };
    let history = filter
        .apply(board.audit())
        .map(|(index, event)| HistoryEntry { index, event })
        .collect();
    let recently_changed = recently_changed_fields(board.audit())
        .remove(id.as_str())
        .unwrap_or_default()
        .into_iter()
        .map(TaskField::as_str)
        .collect();

    let view = TaskView {
        task,
        recently_changed,
        history,
    };
    render_item(&view, output)?;
    Ok(())
}
