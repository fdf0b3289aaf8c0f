//! pathquiz command-line tool.
//!
//! Replays quiz action logs through the reducer and inspects the snapshots
//! it produces.
//!
//! # Quick Start
//!
//! ```bash
//! # Replay a recorded session and keep the final snapshot
//! pathquiz replay actions.json --out snapshot.json
//!
//! # Check a snapshot and show its progress
//! pathquiz inspect snapshot.json
//!
//! # Continue a stored session with more actions
//! pathquiz replay more.json --resume session-1
//! ```

mod commands;
mod report;
mod store;
mod style;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::OutputFormat;
use commands::config::ConfigFormat;
use commands::replay::{Origin, ReplayArgs};

/// pathquiz - deterministic quiz sessions for pathology review.
#[derive(Parser)]
#[command(name = "pathquiz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Log reducer decisions to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Replay a JSON array of actions and report the resulting state.
    Replay {
        /// Path to the action log.
        actions: PathBuf,

        /// Start from this snapshot instead of an empty quiz.
        #[arg(long, conflicts_with = "resume")]
        from: Option<PathBuf>,

        /// Resume the stored session with this id.
        #[arg(long)]
        resume: Option<String>,

        /// Write the final snapshot to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Store snapshots in the configured snapshot directory.
        #[arg(long)]
        persist: bool,

        /// Fail if any action was ignored.
        #[arg(long)]
        strict: bool,

        /// Project directory to read configuration from.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Validate a snapshot and show its contents.
    Inspect {
        /// Path to the snapshot file.
        snapshot: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the merged configuration.
    Show {
        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t)]
        format: ConfigFormat,
    },

    /// Check that the configuration loads.
    Validate {
        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout stays reserved for command output
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    style::set_no_color(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Replay {
            actions,
            from,
            resume,
            out,
            persist,
            strict,
            project,
            format,
        } => {
            let origin = match (&from, &resume) {
                (Some(path), _) => Origin::Snapshot(path),
                (None, Some(id)) => Origin::Resume(id),
                (None, None) => Origin::Empty,
            };
            commands::replay::run(&ReplayArgs {
                actions: &actions,
                origin,
                out: out.as_deref(),
                persist,
                strict,
                project: &project,
                format,
            })
        }
        Commands::Inspect { snapshot, format } => commands::inspect::run(&snapshot, format),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { project, format } => commands::config::show(&project, format),
            ConfigCommands::Validate { project } => commands::config::validate(&project),
        },
    }
}
