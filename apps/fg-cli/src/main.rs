//! # fg-cli
//!
//! Command-line interface for FinGuard.
//!
//! Drives governed tool calls and inspects the audit trail:
//! - `finguard call` — invoke a tool through the governance pipeline
//! - `finguard whoami` — show how an identity token resolves
//! - `finguard tools` — list the registered tool roster
//! - `finguard audit verify/tail/query/export` — inspect the audit log

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fg_gateway::GatewayConfig;
use tracing_subscriber::EnvFilter;

/// FinGuard CLI — governed tool calls for research agents.
#[derive(Parser)]
#[command(name = "finguard", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Path to a TOML config file (overrides the .finguard/ defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke a tool through the governance pipeline.
    Call {
        /// Identity token of the caller (e.g. analyst_007).
        #[arg(long)]
        user: String,
        /// Name of the registered tool to invoke.
        #[arg(long)]
        tool: String,
        /// Tool arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Show how an identity token resolves.
    Whoami {
        /// Identity token to resolve.
        #[arg(long)]
        user: String,
    },
    /// List the registered tool roster.
    Tools,
    /// Inspect the audit trail.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommands,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = match &cli.config {
        Some(path) => GatewayConfig::load(path)?,
        None => GatewayConfig::for_project(&project_root),
    };

    match &cli.command {
        Commands::Call { user, tool, args } => commands::call::execute(&config, user, tool, args),
        Commands::Whoami { user } => commands::whoami::execute(user),
        Commands::Tools => commands::call::list_tools(&config),
        Commands::Audit { command } => commands::audit::execute(command, &config),
    }
}
