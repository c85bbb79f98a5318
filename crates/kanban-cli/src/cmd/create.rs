//! `kb create`: add a task to the board.

use chrono::{DateTime, Utc};
use clap::Args;
use kanban_core::config::EffectiveConfig;
use kanban_core::model::{Priority, Rubric, Status, TaskDraft, parse_tag_list};
use std::path::Path;

use super::{describe, open_board, parse_due, report_outcome};
use crate::output::{CliError, OutputMode, fail, render};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Title of the new task (3+ characters).
    #[arg(short, long)]
    pub title: String,

    /// Description text.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Priority: low, medium, high.
    #[arg(short, long, default_value = "medium")]
    pub priority: Priority,

    /// Tags, comma-separated or repeated.
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Estimate in minutes.
    #[arg(short, long, default_value_t = 0)]
    pub estimate: u32,

    /// Due date: RFC 3339, or YYYY-MM-DD for the end of that day (UTC).
    #[arg(long, value_parser = parse_due)]
    pub due: Option<DateTime<Utc>>,

    /// Starting column: todo, doing, done.
    #[arg(short, long, default_value = "todo")]
    pub status: Status,

    #[command(flatten)]
    pub review: ReviewArgs,
}

/// Reviewer fields. Only accepted while god mode is on.
#[derive(Args, Debug, Default)]
pub struct ReviewArgs {
    /// Reviewer notes.
    #[arg(long)]
    pub reviewer_notes: Option<String>,

    /// Rubric score, 0 through 10.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub score: Option<u8>,

    /// Rubric comment (requires --score).
    #[arg(long, requires = "score")]
    pub comment: Option<String>,
}

impl ReviewArgs {
    pub const fn is_empty(&self) -> bool {
        self.reviewer_notes.is_none() && self.score.is_none() && self.comment.is_none()
    }

    pub fn rubric(&self) -> Option<Rubric> {
        self.score.map(|score| Rubric {
            score,
            comment: self.comment.clone(),
        })
    }
}

/// Refuse reviewer fields unless god mode is enabled.
pub fn require_god_mode(enabled: bool, wants_review: bool, output: OutputMode) -> anyhow::Result<()> {
    if enabled || !wants_review {
        return Ok(());
    }
    let mut error = CliError::new("reviewer fields require god mode");
    error.suggestion = Some("Enable it with `kb god-mode on`.".into());
    Err(fail(output, error))
}

/// Split every `--tag` value on commas and flatten.
pub fn collect_tags(raw: &[String]) -> Vec<String> {
    raw.iter().flat_map(|value| parse_tag_list(value)).collect()
}

pub fn run_create(
    args: &CreateArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut board = open_board(project_root, config, output)?;
    require_god_mode(board.state().ui.god_mode, !args.review.is_empty(), output)?;

    let draft = TaskDraft {
        title: args.title.clone(),
        description: args.description.clone(),
        priority: args.priority,
        tags: collect_tags(&args.tags),
        estimate_minutes: args.estimate,
        due_at: args.due,
        status: args.status,
        reviewer_notes: args.review.reviewer_notes.clone(),
        rubric: args.review.rubric(),
    };
    let task = draft.into_task(Utc::now());
    let id = task.id.clone();

    let outcome = board
        .create(task)
        .map_err(|err| fail(output, CliError::from_code(err.code(), err.to_string())))?;
    let report = report_outcome(outcome, &id, &mut board, output)?;

    render(output, &report, |r, w| writeln!(w, "{}", describe("Created", r)))
}
