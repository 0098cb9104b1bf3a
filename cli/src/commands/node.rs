// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::client::AdminClient;

#[derive(Subcommand)]
pub enum NodeCommand {
    /// List connected nodes
    List,

    /// Show details for one node
    Inspect {
        /// Node ID
        #[arg(value_name = "NODE_ID")]
        node_id: String,
    },
}

pub async fn handle_command(command: NodeCommand, host: &str, port: u16) -> Result<()> {
    let client = AdminClient::new(host, port)?;

    match command {
        NodeCommand::List => list_nodes(client).await,
        NodeCommand::Inspect { node_id } => inspect_node(node_id, client).await,
    }
}

async fn list_nodes(client: AdminClient) -> Result<()> {
    let nodes = client.list_nodes().await?;

    if nodes.is_empty() {
        println!("{}", "No nodes connected".yellow());
        return Ok(());
    }

    println!("{} nodes connected:", nodes.len());
    println!("{:<38} {:<20} {:<16} {:<6} {}", "ID", "HOSTNAME", "ADDRESS", "PORT", "STATUS");

    for node in nodes {
        println!(
            "{:<38} {:<20} {:<16} {:<6} {}",
            node.node_id,
            node.hostname.bold(),
            node.address,
            node.port,
            node.status
        );
    }

    Ok(())
}

async fn inspect_node(node_id: String, client: AdminClient) -> Result<()> {
    let nodes = client.list_nodes().await?;
    let Some(node) = nodes.into_iter().find(|n| n.node_id == node_id) else {
        anyhow::bail!("Node '{}' not found", node_id);
    };

    println!("{}:    {}", "Node".bold(), node.node_id);
    println!("Hostname:   {}", node.hostname);
    println!("Address:    {}:{}", node.address, node.port);
    println!("Status:     {}", node.status);

    let jobs = client.list_jobs().await?;
    let running: Vec<_> = jobs
        .into_iter()
        .filter(|j| j.executed_by_node_id.as_deref() == Some(node_id.as_str()))
        .filter(|j| j.status == "RUNNING")
        .collect();
    println!("Running jobs: {}", running.len());
    for job in running {
        let since = job
            .started_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {} ({}) since {}", job.job_id, job.agent_id, since);
    }

    Ok(())
}
