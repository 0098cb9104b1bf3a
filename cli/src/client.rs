// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for the coordinator admin API.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AgentSummary {
    #[serde(rename = "agentId")]
    pub agent_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct NodeSummary {
    #[serde(rename = "nodeId")]
    pub node_id: String,
    pub hostname: String,
    pub address: String,
    pub port: u16,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct JobSummary {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "agentId")]
    pub agent_id: String,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "startedAt")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "executedByNodeId")]
    pub executed_by_node_id: Option<String>,
    #[serde(rename = "errorMessage")]
    pub error_message: Option<String>,
}

impl AdminClient {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("http://{host}:{port}"),
        })
    }

    pub async fn list_agents(&self) -> Result<Vec<AgentSummary>> {
        #[derive(Deserialize)]
        struct Listing {
            agents: Vec<AgentSummary>,
        }

        let listing: Listing = self
            .get_json("/api/agents")
            .await
            .context("Failed to list agents")?;
        Ok(listing.agents)
    }

    /// Register an agent from a manifest value; the manifest shape is the
    /// admin API's registration request.
    pub async fn deploy_agent(&self, manifest: serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/api/agents", self.base_url))
            .json(&manifest)
            .send()
            .await
            .context("Failed to deploy agent")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to deploy agent: {}", error_text);
        }
        Ok(())
    }

    pub async fn list_nodes(&self) -> Result<Vec<NodeSummary>> {
        #[derive(Deserialize)]
        struct Listing {
            nodes: Vec<NodeSummary>,
        }

        let listing: Listing = self
            .get_json("/api/nodes")
            .await
            .context("Failed to list nodes")?;
        Ok(listing.nodes)
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>> {
        #[derive(Deserialize)]
        struct Listing {
            jobs: Vec<JobSummary>,
        }

        let listing: Listing = self
            .get_json("/api/jobs")
            .await
            .context("Failed to list jobs")?;
        Ok(listing.jobs)
    }

    pub async fn submit_job(&self, agent_id: &str, input: &[u8]) -> Result<String> {
        #[derive(Deserialize)]
        struct SubmitResponse {
            #[serde(rename = "jobId")]
            job_id: String,
        }

        let response = self
            .client
            .post(format!("{}/api/jobs", self.base_url))
            .json(&serde_json::json!({
                "agentId": agent_id,
                "input": STANDARD.encode(input),
            }))
            .send()
            .await
            .context("Failed to submit job")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to submit job: {}", error_text);
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .context("Failed to parse submit response")?;
        Ok(submitted.job_id)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Coordinator returned {}", response.status());
        }
        Ok(response.json().await?)
    }
}
