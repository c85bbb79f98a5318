//! `kb god-mode`: toggle the reviewer fields.

use clap::{Args, ValueEnum};
use kanban_core::config::EffectiveConfig;
use serde_json::json;
use std::path::Path;

use super::{ensure_saved, open_board};
use crate::output::{OutputMode, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct GodModeArgs {
    pub state: Toggle,
}

pub fn run_god_mode(
    args: &GodModeArgs,
    config: &EffectiveConfig,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut board = open_board(project_root, config, output)?;
    let enabled = args.state == Toggle::On;
    board.set_god_mode(enabled);
    ensure_saved(&mut board, output)?;

    let value = json!({ "god_mode": enabled });
    render(output, &value, |_, w| {
        writeln!(w, "✓ god mode {}", if enabled { "on" } else { "off" })
    })
}
