#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use kanban_core::config::resolve_config;
use output::{CliError, OutputMode, fail};
use std::env;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "kb: a task board with a replayable audit log",
    long_about = None
)]
struct Cli {
    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a board",
        long_about = "Create .kanban/ with a default config and a seeded (or empty) board.",
        after_help = "EXAMPLES:\n    # Seeded demo board\n    kb init\n\n    # Empty board\n    kb init --empty"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Create a task",
        after_help = "EXAMPLES:\n    kb create --title \"Hedge FX book\" -p high --tag fx,risk --due 2026-03-01"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Edit a task",
        after_help = "EXAMPLES:\n    kb update 7f9b --priority low --due none"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(next_help_heading = "Tasks", about = "Delete a task")]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Move a task to another column",
        after_help = "EXAMPLES:\n    kb move 7f9b doing"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Read",
        about = "List and search tasks",
        after_help = "EXAMPLES:\n    kb list\n    kb list p:high tag:fx\n    kb list due:week 'est:<=60'"
    )]
    List(cmd::list::ListArgs),

    #[command(next_help_heading = "Read", about = "Show one task and its history")]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Audit",
        about = "Inspect the audit log",
        after_help = "EXAMPLES:\n    kb log\n    kb log --action move --search fx\n    kb log -n 5 --json"
    )]
    Log(cmd::log::LogArgs),

    #[command(next_help_heading = "Audit", about = "Summarize the audit log")]
    Summary,

    #[command(
        next_help_heading = "Audit",
        about = "Rewind the board to an audit index",
        long_about = "Rebuild the task list as it was right after the given audit event. \
                      Nothing is deleted from the log; the jump is itself logged and can be undone.",
        after_help = "EXAMPLES:\n    kb travel 3"
    )]
    Travel(cmd::travel::TravelArgs),

    #[command(next_help_heading = "Interoperability", about = "Import an exported board")]
    Import(cmd::import::ImportArgs),

    #[command(next_help_heading = "Interoperability", about = "Export the board as JSON")]
    Export(cmd::export::ExportArgs),

    #[command(next_help_heading = "Setup", about = "Toggle reviewer fields")]
    GodMode(cmd::god_mode::GodModeArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    kb completions bash\n    kb completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KANBAN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "kanban_core=debug,kb=debug,info"
        } else {
            "kanban_core=info,kb=info,warn"
        })
    });

    let format = env::var("KANBAN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let project_root = env::current_dir()?;

    let fallback = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let config = resolve_config(&project_root, cli.json).map_err(|err| {
        fail(
            fallback,
            CliError::from_code(
                kanban_core::error::ErrorCode::ConfigParseError,
                format!("{err:#}"),
            ),
        )
    })?;
    let output = OutputMode::from_resolved(&config.resolved_output);
    tracing::debug!(?output, root = %project_root.display(), "resolved config");

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &project_root),
        Commands::Create(args) => cmd::create::run_create(args, &config, output, &project_root),
        Commands::Update(args) => cmd::update::run_update(args, &config, output, &project_root),
        Commands::Delete(args) => cmd::delete::run_delete(args, &config, output, &project_root),
        Commands::Move(args) => cmd::move_cmd::run_move(args, &config, output, &project_root),
        Commands::List(args) => cmd::list::run_list(args, &config, output, &project_root),
        Commands::Show(args) => cmd::show::run_show(args, &config, output, &project_root),
        Commands::Log(args) => cmd::log::run_log(args, &config, output, &project_root),
        Commands::Summary => cmd::summary::run_summary(&config, output, &project_root),
        Commands::Travel(args) => cmd::travel::run_travel(args, &config, output, &project_root),
        Commands::Import(args) => cmd::import::run_import(args, &config, output, &project_root),
        Commands::Export(args) => cmd::export::run_export(args, &config, output, &project_root),
        Commands::GodMode(args) => {
            cmd::god_mode::run_god_mode(args, &config, output, &project_root)
        }
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
