use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::query::DEFAULT_DUE_WINDOW_DAYS;

/// Per-board directory holding config and state.
pub const KANBAN_DIR: &str = ".kanban";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Populate a brand-new board with the demo tasks.
    #[serde(default = "default_true")]
    pub seed_on_first_run: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            seed_on_first_run: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// State file name, relative to the `.kanban/` directory.
    #[serde(default = "default_state_file")]
    pub file: String,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: default_state_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Span of `due:week`, in days.
    #[serde(default = "default_due_window_days")]
    pub due_window_days: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            due_window_days: default_due_window_days(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Board directory under `project_root`.
#[must_use]
pub fn kanban_dir(project_root: &Path) -> PathBuf {
    project_root.join(KANBAN_DIR)
}

/// Load `.kanban/config.toml`, or defaults if it does not exist.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = kanban_dir(project_root).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the per-user config from the platform config directory.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_user_config_from(&config_dir.join("kanban/config.toml"))
}

fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge project config, user config, and environment into one view.
///
/// # Errors
///
/// Fails if either config file is present but malformed.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.as_deref(), env_format.as_deref());

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

fn resolve_output(cli_json: bool, user_output: Option<&str>, env_format: Option<&str>) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_true() -> bool {
    true
}

fn default_state_file() -> String {
    "state.json".to_string()
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}

const fn default_due_window_days() -> u32 {
    DEFAULT_DUE_WINDOW_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().unwrap();
        let cfg = load_project_config(root.path()).unwrap();
        assert!(cfg.board.seed_on_first_run);
        assert_eq!(cfg.store.file, "state.json");
        assert_eq!(cfg.store.lock_timeout(), Duration::from_secs(2));
        assert_eq!(cfg.query.due_window_days, 7);
    }

    #[test]
    fn partial_project_config_keeps_other_defaults() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(kanban_dir(root.path())).unwrap();
        std::fs::write(
            kanban_dir(root.path()).join("config.toml"),
            "[board]\nseed_on_first_run = false\n\n[query]\ndue_window_days = 14\n",
        )
        .unwrap();

        let cfg = load_project_config(root.path()).unwrap();
        assert!(!cfg.board.seed_on_first_run);
        assert_eq!(cfg.query.due_window_days, 14);
        assert_eq!(cfg.store, StoreConfig::default());
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(kanban_dir(root.path())).unwrap();
        std::fs::write(kanban_dir(root.path()).join("config.toml"), "[board\n").unwrap();
        let err = load_project_config(root.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        assert_eq!(resolve_output(true, Some("pretty"), Some("text")), "json");
    }

    #[test]
    fn env_beats_user_config_and_aliases_normalize() {
        assert_eq!(resolve_output(false, Some("json"), Some("human")), "pretty");
        assert_eq!(resolve_output(false, Some("plain"), None), "text");
        assert_eq!(resolve_output(false, Some("json"), Some("bogus")), "json");
    }

    #[test]
    fn user_config_parses_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "output = \"json\"\n").unwrap();
        let cfg = load_user_config_from(&path).unwrap();
        assert_eq!(cfg.output.as_deref(), Some("json"));

        let missing = load_user_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing, UserConfig::default());
    }
}
