// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use crate::client::AdminClient;

#[derive(Subcommand)]
pub enum JobCommand {
    /// Submit a job for an agent
    Submit {
        /// Target agent ID
        #[arg(value_name = "AGENT_ID")]
        agent_id: String,

        /// File holding the job input bytes
        #[arg(value_name = "INPUT_FILE")]
        input_file: PathBuf,
    },

    /// List jobs known to the coordinator
    List,
}

pub async fn handle_command(command: JobCommand, host: &str, port: u16) -> Result<()> {
    let client = AdminClient::new(host, port)?;

    match command {
        JobCommand::Submit { agent_id, input_file } => submit_job(agent_id, input_file, client).await,
        JobCommand::List => list_jobs(client).await,
    }
}

async fn submit_job(agent_id: String, input_file: PathBuf, client: AdminClient) -> Result<()> {
    let input = std::fs::read(&input_file)
        .with_context(|| format!("Failed to read input file: {:?}", input_file))?;

    println!("Submitting job for agent {}", agent_id.bold());
    let job_id = client.submit_job(&agent_id, &input).await?;
    println!("{}", format!("✓ Job submitted: {}", job_id).green());

    Ok(())
}

async fn list_jobs(client: AdminClient) -> Result<()> {
    let jobs = client.list_jobs().await?;

    if jobs.is_empty() {
        println!("{}", "No jobs found".yellow());
        return Ok(());
    }

    println!("{} jobs found:", jobs.len());
    println!(
        "{:<38} {:<38} {:<10} {:<22} {}",
        "ID", "AGENT", "STATUS", "CREATED", "NODE"
    );

    for job in jobs {
        let status = match job.status.as_str() {
            "COMPLETED" => job.status.green(),
            "FAILED" | "TIMEOUT" => job.status.red(),
            "RUNNING" => job.status.cyan(),
            _ => job.status.normal(),
        };
        println!(
            "{:<38} {:<38} {:<10} {:<22} {}",
            job.job_id,
            job.agent_id,
            status,
            job.created_at.format("%Y-%m-%d %H:%M:%S"),
            job.executed_by_node_id.as_deref().unwrap_or("-")
        );
        if let Some(error) = job.error_message {
            println!("  {} {}", "error:".red(), error);
        }
    }

    Ok(())
}
