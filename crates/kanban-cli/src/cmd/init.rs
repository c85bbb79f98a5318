use anyhow::{Context as _, Result};
use clap::Args;
use kanban_core::config::{ProjectConfig, kanban_dir};
use kanban_core::store::{JsonFileStore, StateStore};
use kanban_core::{Board, FirstRun};
use serde::Serialize;
use std::path::Path;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Re-initialize even if `.kanban/` already exists. Discards the board.
    #[arg(long)]
    pub force: bool,

    /// Start with an empty board instead of the demo tasks.
    #[arg(long)]
    pub empty: bool,
}

const CONFIG_TOML: &str = "[board]\n\
    seed_on_first_run = true\n\
    \n\
    [store]\n\
    file = \"state.json\"\n\
    lock_timeout_ms = 2000\n\
    \n\
    [query]\n\
    due_window_days = 7\n";

const GITIGNORE: &str = "*.lock\n*.tmp\n";

#[derive(Debug, Serialize)]
struct InitReport {
    path: String,
    tasks: usize,
    events: usize,
}

/// Execute `kb init`. Creates the board skeleton:
///
/// ```text
/// .kanban/
///   config.toml   (default project config)
///   state.json    (seeded or empty board)
///   .gitignore    (lock and temp files)
/// ```
///
/// # Errors
///
/// Returns an error if `.kanban/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let dir = kanban_dir(project_root);
    if dir.exists() && !args.force {
        anyhow::bail!(".kanban/ already exists. Use `kb init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let config_path = dir.join("config.toml");
    std::fs::write(&config_path, CONFIG_TOML)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let store = JsonFileStore::for_project(project_root, &ProjectConfig::default());
    if store.exists() {
        std::fs::remove_file(store.path())
            .with_context(|| format!("Failed to remove {}", store.path().display()))?;
    }
    let board = Board::open(store, FirstRun::from_seed_flag(!args.empty))?;
    // Board::open only logs a failed first save; surface it here instead.
    board.store().save(board.state())?;

    let report = InitReport {
        path: board.store().path().display().to_string(),
        tasks: board.tasks().len(),
        events: board.audit().len(),
    };
    tracing::info!(path = %report.path, tasks = report.tasks, "board initialized");

    render(output, &report, |r, w| {
        writeln!(w, "✓ Initialized .kanban/ board.")?;
        writeln!(w)?;
        writeln!(w, "  State:  {}", r.path)?;
        writeln!(w, "  Config: .kanban/config.toml")?;
        writeln!(w, "  Tasks:  {}", r.tasks)?;
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  kb list")?;
        writeln!(w, "  kb create --title \"My first task\"")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_template_parses() {
        let parsed: ProjectConfig = toml::from_str(CONFIG_TOML).unwrap();
        assert_eq!(parsed, ProjectConfig::default());
    }

    #[test]
    fn init_creates_skeleton_and_refuses_twice() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            force: false,
            empty: true,
        };
        run_init(&args, OutputMode::Json, dir.path()).unwrap();
        assert!(dir.path().join(".kanban/config.toml").exists());
        assert!(dir.path().join(".kanban/state.json").exists());
        assert!(run_init(&args, OutputMode::Json, dir.path()).is_err());

        let forced = InitArgs {
            force: true,
            empty: false,
        };
        run_init(&forced, OutputMode::Json, dir.path()).unwrap();
    }
}
