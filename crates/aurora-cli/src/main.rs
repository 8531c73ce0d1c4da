//! Aurora CLI — the operator-facing binary.
//!
//! Stands in for the HTTP surface's local operator path: everything
//! `aurora run` does is exactly what would sit behind `POST
//! /cli/command`, `POST /llm/generate`, `POST /control/emergency-stop`,
//! and friends, minus the HTTP framing. Every other subcommand operates
//! directly on the data root's on-disk state (policy file, JSONL audit
//! logs, plugin directory) without requiring a running process.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod commands;
mod theme;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Aurora Pro — operator CLI.
#[derive(Parser)]
#[command(name = "aurora")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults to
    /// `./aurora.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a fresh data root: directories, a default policy file,
    /// and a default `aurora.toml`.
    Init {
        /// Data root to create. Defaults to `./aurora-data`.
        #[arg(long)]
        data_root: Option<PathBuf>,
    },

    /// Check the configuration, policy file, and data root for
    /// problems without starting anything.
    Doctor,

    /// Boot every component and run until interrupted (Ctrl-C triggers
    /// an emergency stop, `SIGHUP` on Unix triggers a restart).
    Run,

    /// Inspect and edit the operator policy file.
    Policy {
        #[command(subcommand)]
        command: commands::policy::PolicyCommand,
    },

    /// Read audit logs from the data root.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommand,
    },

    /// Manage WASM plugins.
    Plugin {
        #[command(subcommand)]
        command: commands::plugin::PluginCommand,
    },

    /// One-shot LLM Router completion.
    Llm {
        #[command(subcommand)]
        command: commands::llm::LlmCommand,
    },

    /// Submit an input-control action and inspect the queue.
    Input {
        #[command(subcommand)]
        command: commands::input::InputCommand,
    },

    /// Drive a goal through the Autonomous Planner to completion.
    Autonomous {
        /// The goal text.
        goal: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = aurora_config::AuroraConfig::load(cli.config.as_deref()).unwrap_or_default();
    let level = if cli.verbose { "debug" } else { "info" };
    let log_config = aurora_telemetry::LogConfig::new(level).with_format(aurora_telemetry::LogFormat::Compact);
    if let Err(error) = aurora_telemetry::setup_logging(&log_config) {
        eprintln!("{}", theme::Theme::warning(&format!("failed to initialize logging: {error}")));
    }

    match cli.command {
        Commands::Init { data_root } => commands::init::run(data_root),
        Commands::Doctor => commands::doctor::run(&config).await,
        Commands::Run => commands::run::run(config).await,
        Commands::Policy { command } => commands::policy::dispatch(&config, command),
        Commands::Audit { command } => commands::audit::dispatch(&config, command),
        Commands::Plugin { command } => commands::plugin::dispatch(&config, command).await,
        Commands::Llm { command } => commands::llm::dispatch(&config, command).await,
        Commands::Input { command } => commands::input::dispatch(&config, command).await,
        Commands::Autonomous { goal } => commands::autonomous::run(&config, &goal).await,
    }
}
