// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # KORRA CLI
//!
//! The `korra` binary drives a coordinator over its admin API and can run
//! the coordinator itself in the foreground.
//!
//! ## Commands
//!
//! - `korra daemon` - run the coordinator + admin API until interrupted
//! - `korra agent deploy|list` - agent catalog operations
//! - `korra node list|inspect` - node directory operations
//! - `korra job submit|list` - job operations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

mod client;
mod commands;

use commands::{AgentCommand, JobCommand, NodeCommand};

/// KORRA - coordinator for distributed agent execution
#[derive(Parser)]
#[command(name = "korra")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Coordinator host
    #[arg(short = 'H', long, global = true, env = "KORRA_HOST", default_value = "localhost")]
    host: String,

    /// Coordinator admin API port
    #[arg(short = 'p', long, global = true, env = "KORRA_PORT", default_value = "8080")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "KORRA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the coordinator and admin API in the foreground
    Daemon,

    /// Agent catalog operations
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },

    /// Node directory operations
    Node {
        #[command(subcommand)]
        command: NodeCommand,
    },

    /// Job operations
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Daemon) => commands::daemon::run(&cli.host, cli.port).await,
        Some(Commands::Agent { command }) => {
            commands::agent::handle_command(command, &cli.host, cli.port).await
        }
        Some(Commands::Node { command }) => {
            commands::node::handle_command(command, &cli.host, cli.port).await
        }
        Some(Commands::Job { command }) => {
            commands::job::handle_command(command, &cli.host, cli.port).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
