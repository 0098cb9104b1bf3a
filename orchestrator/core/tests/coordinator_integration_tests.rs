// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! End-to-end control-plane scenarios: placement, eviction cascades and
//! proof verification wired through real components.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use korra_core::application::{
    AgentRegistry, Coordinator, CoordinatorConfig, EvictionSink, JobRouter, LivenessSweep,
    ManualClock, NodeMembership, ProofValidator,
};
use korra_core::domain::agent::{AgentDefinition, AgentKind};
use korra_core::domain::job::{Job, JobStatus};
use korra_core::domain::node::NodeInfo;
use korra_core::domain::proof::{hash_payload, ExecutionProof, ValidationResult};
use korra_core::infrastructure::EventBus;
use tempfile::TempDir;

fn agent(id: &str) -> AgentDefinition {
    AgentDefinition::with_id(
        id,
        "integration-agent",
        AgentKind::Analyzer,
        "1.0.0".parse().unwrap(),
        "test fixture",
        "modules/test.wasm",
    )
}

fn node(id: &str) -> NodeInfo {
    NodeInfo::new(id, "edge-host", "10.0.0.7".parse().unwrap(), 9100)
}

fn capable_node(id: &str, agent_id: &str) -> NodeInfo {
    let mut node = node(id);
    node.add_capability(format!("agent:{agent_id}"), "");
    node
}

fn running_coordinator(dir: &TempDir) -> Coordinator {
    let coordinator = Coordinator::new(CoordinatorConfig {
        snapshot_dir: dir.path().to_path_buf(),
        ..CoordinatorConfig::default()
    });
    coordinator.start();
    coordinator
}

// ── S1: happy-path placement ─────────────────────────────────────────────

#[tokio::test]
async fn test_happy_path_placement() {
    let dir = TempDir::new().unwrap();
    let coordinator = running_coordinator(&dir);

    coordinator.registry().register(agent("a1"));
    assert!(coordinator.register_node(capable_node("n1", "a1")));

    let job_id = coordinator
        .submit_job(Job::new("a1", b"hello".to_vec()))
        .expect("job should be placed");

    let job = coordinator.router().get(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Running);
    assert_eq!(job.executed_by_node_id.as_deref(), Some("n1"));
    assert!(coordinator.router().node_jobs("n1").contains(&job_id));

    coordinator.stop().await;
}

// ── S2: no capable node ──────────────────────────────────────────────────

#[tokio::test]
async fn test_no_capable_node_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let coordinator = running_coordinator(&dir);

    coordinator.registry().register(agent("a1"));
    coordinator.register_node(node("n1")); // no capabilities

    assert_eq!(coordinator.submit_job(Job::new("a1", vec![])), None);
    assert!(coordinator.router().active_jobs().is_empty());

    coordinator.stop().await;
}

// ── S3: version monotonicity ─────────────────────────────────────────────

#[tokio::test]
async fn test_latest_version_survives_downgrade_registration() {
    let dir = TempDir::new().unwrap();
    let coordinator = running_coordinator(&dir);
    let registry = coordinator.registry();

    for version in ["1.2.0", "1.3.0", "1.2.5"] {
        let mut def = agent("x");
        def.version = version.parse().unwrap();
        registry.register(def);
    }

    assert_eq!(registry.latest_version("x"), Some("1.3.0".parse().unwrap()));
    coordinator.stop().await;
}

// ── S4: proof verification ───────────────────────────────────────────────

#[tokio::test]
async fn test_proof_round_trip_and_mismatch() {
    let dir = TempDir::new().unwrap();
    let coordinator = running_coordinator(&dir);
    let validator = coordinator.validator();

    let input_hash = hash_payload(b"in");
    let output_hash = hash_payload(b"out");
    let proof_hash =
        korra_core::domain::proof::combined_hash("a1", 1_700_000_000, &input_hash, &output_hash);
    let proof = ExecutionProof::with_id(
        "the-proof-id",
        "a1",
        1_700_000_000,
        input_hash,
        output_hash,
        proof_hash,
    );
    validator.register(proof).unwrap();

    assert_eq!(
        validator.validate("the-proof-id", b"in", b"out"),
        ValidationResult::Valid
    );
    assert_eq!(
        validator.validate("the-proof-id", b"IN", b"out"),
        ValidationResult::InputMismatch
    );

    coordinator.stop().await;
}

// ── S5: eviction cascades to jobs ────────────────────────────────────────

struct RouterSink(Arc<JobRouter>);

impl EvictionSink for RouterSink {
    fn node_evicted(&self, node_id: &str) {
        self.0.on_node_evicted(node_id);
    }
}

#[tokio::test]
async fn test_silent_node_eviction_fails_its_jobs() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let events = EventBus::new(64);
    let registry = Arc::new(AgentRegistry::new());
    let membership = Arc::new(NodeMembership::with_clock(events.clone(), clock.clone()));
    let router = Arc::new(JobRouter::new(events));
    router.initialize(registry.clone(), membership.clone());

    let sweep = LivenessSweep::new(
        membership.clone(),
        "coordinator-self",
        Arc::new(RouterSink(router.clone())),
    );

    registry.register(agent("a1"));
    membership.register(capable_node("n1", "a1"));

    let j1 = router.route(Job::new("a1", vec![])).unwrap();
    let j2 = router.route(Job::new("a1", vec![])).unwrap();

    clock.advance(Duration::from_secs(31));
    assert_eq!(sweep.sweep_once(), 1);

    assert!(membership.get("n1").is_none());
    for job_id in [&j1, &j2] {
        let job = router.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some("node-evicted"));
    }
    assert!(router.node_jobs("n1").is_empty());
}

#[tokio::test]
async fn test_heartbeat_keeps_node_and_jobs_alive() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let events = EventBus::new(64);
    let registry = Arc::new(AgentRegistry::new());
    let membership = Arc::new(NodeMembership::with_clock(events.clone(), clock.clone()));
    let router = Arc::new(JobRouter::new(events));
    router.initialize(registry.clone(), membership.clone());

    let sweep = LivenessSweep::new(
        membership.clone(),
        "coordinator-self",
        Arc::new(RouterSink(router.clone())),
    );

    registry.register(agent("a1"));
    membership.register(capable_node("n1", "a1"));
    let job_id = router.route(Job::new("a1", vec![])).unwrap();

    for _ in 0..5 {
        clock.advance(Duration::from_secs(20));
        membership.heartbeat("n1");
        assert_eq!(sweep.sweep_once(), 0);
    }

    assert_eq!(router.get(&job_id).unwrap().status, JobStatus::Running);
}

// ── S6: double completion ────────────────────────────────────────────────

#[tokio::test]
async fn test_double_completion_is_idempotent_safe() {
    let dir = TempDir::new().unwrap();
    let coordinator = running_coordinator(&dir);

    coordinator.registry().register(agent("a1"));
    coordinator.register_node(capable_node("n1", "a1"));
    let job_id = coordinator.submit_job(Job::new("a1", vec![])).unwrap();

    assert!(coordinator.router().notify_completed(&job_id, b"x".to_vec()));
    assert!(!coordinator.router().notify_completed(&job_id, b"y".to_vec()));

    let job = coordinator.router().get(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.output(), Some(b"x".to_vec()));

    coordinator.stop().await;
}

// ── snapshot round trip through the coordinator ──────────────────────────

#[tokio::test]
async fn test_component_snapshot_round_trip() {
    let dir = TempDir::new().unwrap();
    let coordinator = running_coordinator(&dir);

    let store = coordinator.snapshot_store();
    let snapshot_id = store.create("registry", b"opaque-registry-state").unwrap();
    assert_eq!(store.load(&snapshot_id), Some(b"opaque-registry-state".to_vec()));
    assert_eq!(store.list("registry").len(), 1);
    assert!(store.delete(&snapshot_id));
    assert_eq!(store.load(&snapshot_id), None);

    coordinator.stop().await;
}

// ── proof validator wired to the proof a node would produce ──────────────

#[tokio::test]
async fn test_completion_attestation_validates_against_job_bytes() {
    let dir = TempDir::new().unwrap();
    let coordinator = running_coordinator(&dir);

    coordinator.registry().register(agent("a1"));
    coordinator.register_node(capable_node("n1", "a1"));

    let input = b"job input".to_vec();
    let output = b"job output".to_vec();
    let job_id = coordinator.submit_job(Job::new("a1", input.clone())).unwrap();

    // the executing node reports completion with an attestation
    let proof = ExecutionProof::attest(&job_id, "a1", Utc::now().timestamp(), &input, &output);
    coordinator.validator().register(proof).unwrap();
    assert!(coordinator.router().notify_completed(&job_id, output.clone()));

    assert_eq!(
        coordinator.validator().validate(&job_id, &input, &output),
        ValidationResult::Valid
    );

    coordinator.stop().await;
}

// ── proof registry rejects colliding ids ─────────────────────────────────

#[tokio::test]
async fn test_duplicate_proof_id_is_rejected() {
    let validator = ProofValidator::new();
    validator
        .register(ExecutionProof::attest("p1", "a1", 1, b"x", b"y"))
        .unwrap();
    assert!(validator
        .register(ExecutionProof::attest("p1", "a1", 2, b"x", b"y"))
        .is_err());
}
