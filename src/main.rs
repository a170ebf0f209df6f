mod apply;
mod batch;
mod commands;
mod config;
mod context;
mod detect;
mod diagnostics;
mod document;
mod error;
mod grammar;
mod info;
mod report;
mod rules;
mod tiers;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::types::TierOverrides;

#[derive(Parser)]
#[command(name = "ucfix", about = "Find and repair UnrealScript syntax defects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect syntax issues in .uc files or directories
    Check {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
        #[command(flatten)]
        tiers: TierFlags,
    },
    /// Apply all automatic fixes to a file
    Fix {
        /// The .uc file to repair
        file: PathBuf,
        /// Apply a single issue by id instead of all
        #[arg(long)]
        issue: Option<u32>,
        /// Write the fixed text here instead of in place
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        tiers: TierFlags,
    },
    /// Fix every .uc file under a directory into an output directory
    Batch {
        /// Directory to scan for .uc files
        dir: PathBuf,
        /// Directory receiving the fixed copies
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        tiers: TierFlags,
    },
    /// Re-run check whenever a watched .uc file changes
    Watch {
        /// Directory to watch recursively
        dir: PathBuf,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
        #[command(flatten)]
        tiers: TierFlags,
    },
    /// Show or persist rule activation tiers
    Tier {
        #[command(subcommand)]
        action: TierAction,
    },
    /// Print the comprehensive reference document
    Info {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TierAction {
    /// List tiers and their default activation
    List,
    /// Enable a tier by default in .ucfix.toml
    Enable {
        /// Tier name: extended or paren-fixer
        name: String,
    },
    /// Disable a tier by default in .ucfix.toml
    Disable {
        /// Tier name: extended or paren-fixer
        name: String,
    },
}

/// Tier adjustments shared by the scanning commands.
#[derive(Args)]
struct TierFlags {
    /// Also run the extended heuristics
    #[arg(long)]
    extended: bool,
    /// Also run the unmatched-( remover
    #[arg(long)]
    paren_fixer: bool,
    /// Run strict rules only, ignoring configured defaults
    #[arg(long, conflicts_with_all = ["extended", "paren_fixer"])]
    strict_only: bool,
}

impl TierFlags {
    /// Collect the flags into the override set layered over the config.
    fn overrides(&self) -> TierOverrides {
        TierOverrides {
            extended: self.extended,
            paren_fixer: self.paren_fixer,
            strict_only: self.strict_only,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { paths, format, tiers } => {
            exit_from(commands::check(&paths, tiers.overrides(), &format))
        },
        Commands::Fix { file, issue, output, tiers } => {
            exit_from(commands::fix(&file, output.as_deref(), issue, tiers.overrides()))
        },
        Commands::Batch { dir, out, tiers } => {
            exit_from(commands::batch(&dir, &out, tiers.overrides()))
        },
        Commands::Watch { dir, format, tiers } => {
            exit_from(watch::run(&dir, tiers.overrides(), &format))
        },
        Commands::Tier { action } => match action {
            TierAction::List => exit_from_unit(tiers::cmd_list()),
            TierAction::Enable { name } => exit_from_unit(tiers::cmd_enable(&name)),
            TierAction::Disable { name } => exit_from_unit(tiers::cmd_disable(&name)),
        },
        Commands::Info { json } => {
            commands::info(json);
            ExitCode::SUCCESS
        },
    }
}

/// Run a command that chooses its own exit code.
fn exit_from(result: Result<ExitCode, error::Error>) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    }
}

/// Run a unit command: success is exit 0.
fn exit_from_unit(result: Result<(), error::Error>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    }
}
