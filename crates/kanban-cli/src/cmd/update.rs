//! `kb update`: edit fields of an existing task.

use clap::Args;
use kanban_core::config::EffectiveConfig;
use kanban_core::model::{Priority, Rubric, Task};
use std::path::Path;

use super::create::{ReviewArgs, collect_tags, require_god_mode};
use super::{describe, open_board, parse_due, report_outcome, resolve_task_id};
use crate::output::{CliError, OutputMode, fail, render};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Task id or unique id prefix.
    pub id: String,

    #[arg(short, long)]
    pub title: Option<String>,

    /// New description; an empty string clears it.
    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Replace the tag list (comma-separated or repeated). `--tag ""` clears it.
    #[arg(long = "tag")]
    pub tags: Option<Vec<String>>,

    /// Estimate in minutes.
    #[arg(short, long)]
    pub estimate: Option<u32>,

    /// New due date (RFC 3339 or YYYY-MM-DD), or `none` to clear it.
    #[arg(long)]
    pub due: Option<String>,

    /// Drop the rubric entirely.
    #[arg(long, conflicts_with = "score")]
    pub clear_rubric: bool,

    #[command(flatten)]
    pub review: ReviewArgs,
}

/// Apply the requested edits to a copy of `current`.
fn apply_edits(current: &Task, args: &UpdateArgs) -> Result<Task, String> {
    let mut next = current.clone();
    if let Some(title) = &args.title {
        next.title = title.trim().to_string();
    }
    if let Some(description) = &args.description {
        next.description = non_blank(description);
    }
    if let Some(priority) = args.priority {
        next.priority = priority;
    }
    if let Some(tags) = &args.tags {
        next.tags = collect_tags(tags);
    }
    if let Some(estimate) = args.estimate {
        next.estimate_minutes = estimate;
    }
    if let Some(due) = &args.due {
        next.due_at = if due.trim().eq_ignore_ascii_case("none") {
            None
        } else {
            Some(parse_due(due)?)
        };
    }
    if let Some(notes) = &args.review.reviewer_notes {
        next.reviewer_notes = non_blank(notes);
    }
    if args.clear_rubric {
        next.rubric = None;
    } else if let Some(score) = args.review.score {
        let comment = args
            .review
            .comment
            .clone()
            .or_else(|| current.rubric.as_ref().and_then(|r| r.comment.clone()));
        next.rubric = Some(Rubric { score, comment });
    }
    Ok(next)
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn run_update(
    args: &UpdateArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut board = open_board(project_root, config, output)?;
    let wants_review = !args.review.is_empty() || args.clear_rubric;
    require_god_mode(board.state().ui.god_mode, wants_review, output)?;

    let id = resolve_task_id(board.state(), &args.id, output)?;
    let Some(current) = board.state().task(&id) else {
        anyhow::bail!("task {id} vanished while updating");
    };
    let next = apply_edits(current, args).map_err(|msg| fail(output, CliError::new(msg)))?;

    let outcome = board
        .update(next)
        .map_err(|err| fail(output, CliError::from_code(err.code(), err.to_string())))?;
    let report = report_outcome(outcome, &id, &mut board, output)?;

    render(output, &report, |r, w| writeln!(w, "{}", describe("Updated", r)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use clap::Parser;
    use kanban_core::model::TaskDraft;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: UpdateArgs,
    }

    fn parse(extra: &[&str]) -> UpdateArgs {
        let mut argv = vec!["test", "abc"];
        argv.extend_from_slice(extra);
        Wrapper::parse_from(argv).args
    }

    fn sample() -> Task {
        let mut draft = TaskDraft::new("Hedge FX book");
        draft.description = Some("MXN and BRL".into());
        draft.tags = vec!["fx".into()];
        draft.rubric = Some(Rubric {
            score: 4,
            comment: Some("thin".into()),
        });
        draft.into_task(Utc::now())
    }

    #[test]
    fn untouched_fields_are_kept() {
        let current = sample();
        let next = apply_edits(&current, &parse(&["--priority", "high"])).unwrap();
        assert_eq!(next.priority, Priority::High);
        assert_eq!(next.description, current.description);
        assert_eq!(next.tags, current.tags);
    }

    #[test]
    fn blank_values_clear_optionals() {
        let current = sample();
        let next = apply_edits(
            &current,
            &parse(&["--description", "  ", "--tag", "", "--due", "none"]),
        )
        .unwrap();
        assert!(next.description.is_none());
        assert!(next.tags.is_empty());
        assert!(next.due_at.is_none());
    }

    #[test]
    fn due_and_score_edits() {
        let current = sample();
        let due = (current.created_at + Duration::days(2)).to_rfc3339();
        let next = apply_edits(&current, &parse(&["--due", &due, "--score", "9"])).unwrap();
        assert!(next.due_at.is_some());
        assert_eq!(
            next.rubric,
            Some(Rubric {
                score: 9,
                comment: Some("thin".into())
            })
        );

        let cleared = apply_edits(&current, &parse(&["--clear-rubric"])).unwrap();
        assert!(cleared.rubric.is_none());
        assert!(apply_edits(&current, &parse(&["--due", "soon"])).is_err());
    }
}
