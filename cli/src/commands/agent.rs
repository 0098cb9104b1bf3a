// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use crate::client::AdminClient;

#[derive(Subcommand)]
pub enum AgentCommand {
    /// List registered agents
    List,

    /// Register an agent from a manifest file
    Deploy {
        /// Path to agent manifest JSON file
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
    },
}

pub async fn handle_command(command: AgentCommand, host: &str, port: u16) -> Result<()> {
    let client = AdminClient::new(host, port)?;

    match command {
        AgentCommand::List => list_agents(client).await,
        AgentCommand::Deploy { manifest } => deploy_agent(manifest, client).await,
    }
}

async fn list_agents(client: AdminClient) -> Result<()> {
    let agents = client.list_agents().await?;

    if agents.is_empty() {
        println!("{}", "No agents found".yellow());
        return Ok(());
    }

    println!("{} agents found:", agents.len());
    println!("{:<38} {:<20} {:<12} {:<10} {}", "ID", "NAME", "TYPE", "VERSION", "STATUS");

    for agent in agents {
        println!(
            "{:<38} {:<20} {:<12} {:<10} {}",
            agent.agent_id,
            agent.name.bold(),
            agent.kind,
            agent.version,
            agent.status
        );
    }

    Ok(())
}

async fn deploy_agent(manifest: PathBuf, client: AdminClient) -> Result<()> {
    let manifest_content = std::fs::read_to_string(&manifest)
        .with_context(|| format!("Failed to read manifest: {:?}", manifest))?;

    let manifest_json: serde_json::Value =
        serde_json::from_str(&manifest_content).context("Failed to parse manifest JSON")?;

    let name = manifest_json
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or("<unnamed>")
        .to_string();
    println!("Deploying agent: {}", name.bold());

    client.deploy_agent(manifest_json).await?;

    println!("{}", format!("✓ Agent deployed: {}", name).green());

    Ok(())
}
