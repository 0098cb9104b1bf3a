// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::application::coordinator::Coordinator;
use crate::domain::agent::{AgentDefinition, AgentKind, AgentStatus};
use crate::domain::job::{Job, JobStatus};
use crate::domain::node::{NodeInfo, NodeStatus};
use crate::domain::proof::ExecutionProof;

pub fn app(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route("/api/agents", get(list_agents).post(register_agent))
        .route("/api/nodes", get(list_nodes))
        .route("/api/jobs", get(list_jobs).post(submit_job))
        .route("/api/proofs", get(list_proofs))
        .with_state(coordinator)
}

// ============================================================================
// Agents
// ============================================================================

#[derive(Debug, Serialize)]
struct AgentSummary {
    #[serde(rename = "agentId")]
    agent_id: String,
    name: String,
    #[serde(rename = "type")]
    kind: AgentKind,
    version: String,
    status: AgentStatus,
}

impl From<AgentDefinition> for AgentSummary {
    fn from(agent: AgentDefinition) -> Self {
        Self {
            agent_id: agent.agent_id,
            name: agent.name,
            kind: agent.kind,
            version: agent.version.to_string(),
            status: agent.status,
        }
    }
}

async fn list_agents(State(coordinator): State<Arc<Coordinator>>) -> impl IntoResponse {
    let agents: Vec<AgentSummary> = coordinator
        .registry()
        .all()
        .into_iter()
        .map(AgentSummary::from)
        .collect();
    Json(json!({ "agents": agents }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterAgentRequest {
    #[serde(rename = "agentId")]
    pub agent_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AgentKind,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "modulePath", default)]
    pub module_path: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

async fn register_agent(
    State(coordinator): State<Arc<Coordinator>>,
    Json(request): Json<RegisterAgentRequest>,
) -> impl IntoResponse {
    let version = match request.version.parse() {
        Ok(version) => version,
        Err(e) => {
            warn!(error = %e, "Rejecting agent registration");
            return (StatusCode::BAD_REQUEST, Json(json!({ "success": false })));
        }
    };

    let mut agent = match request.agent_id {
        Some(id) => AgentDefinition::with_id(
            id,
            request.name,
            request.kind,
            version,
            request.description,
            request.module_path,
        ),
        None => AgentDefinition::new(
            request.name,
            request.kind,
            version,
            request.description,
            request.module_path,
        ),
    };
    agent.metadata = request.metadata;

    coordinator.registry().register(agent);
    (StatusCode::OK, Json(json!({ "success": true })))
}

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Serialize)]
struct NodeSummary {
    #[serde(rename = "nodeId")]
    node_id: String,
    hostname: String,
    address: String,
    port: u16,
    status: NodeStatus,
}

impl From<NodeInfo> for NodeSummary {
    fn from(node: NodeInfo) -> Self {
        Self {
            node_id: node.node_id,
            hostname: node.hostname,
            address: node.address.to_string(),
            port: node.port,
            status: node.status,
        }
    }
}

async fn list_nodes(State(coordinator): State<Arc<Coordinator>>) -> impl IntoResponse {
    let nodes: Vec<NodeSummary> = coordinator
        .membership()
        .all()
        .into_iter()
        .map(NodeSummary::from)
        .collect();
    Json(json!({ "nodes": nodes }))
}

// ============================================================================
// Jobs
// ============================================================================

#[derive(Debug, Serialize)]
struct JobSummary {
    #[serde(rename = "jobId")]
    job_id: String,
    #[serde(rename = "agentId")]
    agent_id: String,
    status: JobStatus,
    #[serde(rename = "createdAt")]
    created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "startedAt", skip_serializing_if = "Option::is_none")]
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "completedAt", skip_serializing_if = "Option::is_none")]
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "executedByNodeId", skip_serializing_if = "Option::is_none")]
    executed_by_node_id: Option<String>,
    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl From<Job> for JobSummary {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            agent_id: job.agent_id,
            status: job.status,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            executed_by_node_id: job.executed_by_node_id,
            error_message: job.error_message,
        }
    }
}

async fn list_jobs(State(coordinator): State<Arc<Coordinator>>) -> impl IntoResponse {
    let jobs: Vec<JobSummary> = coordinator
        .router()
        .all_jobs()
        .into_iter()
        .map(JobSummary::from)
        .collect();
    Json(json!({ "jobs": jobs }))
}

#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    #[serde(rename = "agentId")]
    pub agent_id: String,
    /// Job input bytes, base64-encoded.
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

async fn submit_job(
    State(coordinator): State<Arc<Coordinator>>,
    Json(request): Json<SubmitJobRequest>,
) -> impl IntoResponse {
    let input = match STANDARD.decode(&request.input) {
        Ok(input) => input,
        Err(e) => {
            warn!(error = %e, "Rejecting job with undecodable input");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Input is not valid base64" })),
            );
        }
    };

    let mut job = Job::new(request.agent_id, input);
    for (key, value) in request.metadata {
        job.add_metadata(key, value);
    }

    match coordinator.submit_job(job) {
        Some(job_id) => (StatusCode::OK, Json(json!({ "jobId": job_id }))),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Job could not be placed" })),
        ),
    }
}

// ============================================================================
// Proofs
// ============================================================================

#[derive(Debug, Serialize)]
struct ProofSummary {
    #[serde(rename = "proofId")]
    proof_id: String,
    #[serde(rename = "agentId")]
    agent_id: String,
    timestamp: i64,
    #[serde(rename = "inputHash")]
    input_hash: String,
    #[serde(rename = "outputHash")]
    output_hash: String,
    #[serde(rename = "proofHash")]
    proof_hash: String,
}

impl From<ExecutionProof> for ProofSummary {
    fn from(proof: ExecutionProof) -> Self {
        Self {
            proof_id: proof.proof_id,
            agent_id: proof.agent_id,
            timestamp: proof.timestamp,
            input_hash: proof.input_hash,
            output_hash: proof.output_hash,
            proof_hash: proof.proof_hash,
        }
    }
}

async fn list_proofs(State(coordinator): State<Arc<Coordinator>>) -> impl IntoResponse {
    let proofs: Vec<ProofSummary> = coordinator
        .validator()
        .all()
        .into_iter()
        .map(ProofSummary::from)
        .collect();
    Json(json!({ "proofs": proofs }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::version::AgentVersion;

    #[test]
    fn test_agent_summary_shape() {
        let agent = AgentDefinition::with_id(
            "a1",
            "parser",
            AgentKind::Analyzer,
            AgentVersion::new(1, 2, 3),
            "",
            "",
        );
        let json = serde_json::to_value(AgentSummary::from(agent)).unwrap();
        assert_eq!(
            json,
            json!({
                "agentId": "a1",
                "name": "parser",
                "type": "ANALYZER",
                "version": "1.2.3",
                "status": "INACTIVE",
            })
        );
    }

    #[test]
    fn test_job_summary_omits_absent_fields() {
        let job = Job::with_id("j1", "a1", vec![]);
        let json = serde_json::to_value(JobSummary::from(job)).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object["status"], "PENDING");
        assert!(!object.contains_key("startedAt"));
        assert!(!object.contains_key("completedAt"));
        assert!(!object.contains_key("executedByNodeId"));
        assert!(!object.contains_key("errorMessage"));
    }

    #[test]
    fn test_job_summary_includes_populated_fields() {
        let mut job = Job::with_id("j1", "a1", vec![]);
        job.mark_started("n1");
        job.mark_failed("node-evicted");
        let json = serde_json::to_value(JobSummary::from(job)).unwrap();
        assert_eq!(json["executedByNodeId"], "n1");
        assert_eq!(json["errorMessage"], "node-evicted");
        assert_eq!(json["status"], "FAILED");
    }

    #[test]
    fn test_register_request_accepts_uppercase_kind() {
        let request: RegisterAgentRequest = serde_json::from_str(
            r#"{"name":"parser","type":"TRANSFORMER","version":"1.0.0"}"#,
        )
        .unwrap();
        assert_eq!(request.kind, AgentKind::Transformer);
        assert!(request.agent_id.is_none());
    }

    #[test]
    fn test_node_summary_shape() {
        let node = NodeInfo::new("n1", "edge-1", "10.1.2.3".parse().unwrap(), 9100);
        let json = serde_json::to_value(NodeSummary::from(node)).unwrap();
        assert_eq!(
            json,
            json!({
                "nodeId": "n1",
                "hostname": "edge-1",
                "address": "10.1.2.3",
                "port": 9100,
                "status": "ONLINE",
            })
        );
    }
}
