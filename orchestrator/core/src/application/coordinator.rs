// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Composition root for the control plane.
//!
//! The coordinator owns one instance of every component and wires them
//! together at start: the router gets its registry and directory views,
//! the liveness sweep gets the eviction sink that cascades into the
//! router. Components never hold pointers to each other.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::membership::{
    Clock, EvictionSink, LivenessSweep, NodeMembership, SystemClock, HEARTBEAT_INTERVAL,
    NODE_TIMEOUT,
};
use crate::application::registry::AgentRegistry;
use crate::application::router::JobRouter;
use crate::application::validator::ProofValidator;
use crate::domain::job::Job;
use crate::domain::node::NodeInfo;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::snapshot_store::{SnapshotStore, DEFAULT_BASE_DIR};
use crate::infrastructure::worker_pool::{WorkerPool, DEFAULT_WORKERS};

#[derive(Clone)]
pub struct CoordinatorConfig {
    pub snapshot_dir: PathBuf,
    pub workers: usize,
    pub heartbeat_interval: Duration,
    pub node_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from(DEFAULT_BASE_DIR),
            workers: DEFAULT_WORKERS,
            heartbeat_interval: HEARTBEAT_INTERVAL,
            node_timeout: NODE_TIMEOUT,
        }
    }
}

/// Cascades evictions from the membership sweep into the router.
struct RouterEvictionSink {
    router: Arc<JobRouter>,
}

impl EvictionSink for RouterEvictionSink {
    fn node_evicted(&self, node_id: &str) {
        self.router.on_node_evicted(node_id);
    }
}

#[derive(Default)]
struct Lifecycle {
    running: bool,
    sweep_token: Option<CancellationToken>,
}

pub struct Coordinator {
    node_id: String,
    config: CoordinatorConfig,
    registry: Arc<AgentRegistry>,
    membership: Arc<NodeMembership>,
    router: Arc<JobRouter>,
    validator: Arc<ProofValidator>,
    snapshots: Arc<SnapshotStore>,
    events: EventBus,
    workers: Arc<WorkerPool>,
    lifecycle: Mutex<Lifecycle>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build with an injected clock; tests use this to drive eviction.
    pub fn with_clock(config: CoordinatorConfig, clock: Arc<dyn Clock>) -> Self {
        let node_id = Uuid::new_v4().to_string();
        info!(node_id = %node_id, "Coordinator created");

        let events = EventBus::with_default_capacity();
        Self {
            node_id,
            registry: Arc::new(AgentRegistry::new()),
            membership: Arc::new(NodeMembership::with_clock(events.clone(), clock)),
            router: Arc::new(JobRouter::new(events.clone())),
            validator: Arc::new(ProofValidator::new()),
            snapshots: Arc::new(SnapshotStore::new(config.snapshot_dir.clone())),
            workers: Arc::new(WorkerPool::new(config.workers)),
            events,
            config,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Initialize components in dependency order and start the liveness
    /// sweep. Idempotent; a second call only logs a warning.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().unwrap();
        if lifecycle.running {
            warn!("Coordinator is already running");
            return;
        }

        info!("Starting coordinator");

        if let Err(e) = self.snapshots.initialize() {
            error!(error = %e, "Failed to create snapshot directory");
        }

        let sweep = Arc::new(LivenessSweep::with_timing(
            self.membership.clone(),
            self.node_id.clone(),
            Arc::new(RouterEvictionSink {
                router: self.router.clone(),
            }),
            self.config.heartbeat_interval,
            self.config.node_timeout,
        ));
        lifecycle.sweep_token = Some(sweep.shutdown_token());
        self.workers.spawn(async move { sweep.run().await });

        self.router.initialize(self.registry.clone(), self.membership.clone());

        lifecycle.running = true;
        info!("Coordinator started");
    }

    /// Cancel the sweep, shut the router, and drain the worker pool.
    /// Idempotent; a second call only logs a warning.
    pub async fn stop(&self) {
        let token = {
            let mut lifecycle = self.lifecycle.lock().unwrap();
            if !lifecycle.running {
                warn!("Coordinator is not running");
                return;
            }
            lifecycle.running = false;
            lifecycle.sweep_token.take()
        };

        info!("Stopping coordinator");

        if let Some(token) = token {
            token.cancel();
        }
        self.router.shutdown();
        self.workers.shutdown().await;

        info!("Coordinator stopped");
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.lock().unwrap().running
    }

    /// Route a job to a capable node; None when the coordinator is not
    /// running or no placement exists.
    pub fn submit_job(&self, job: Job) -> Option<String> {
        if !self.is_running() {
            warn!("Cannot submit job, coordinator is not running");
            return None;
        }
        info!(job_id = %job.job_id, "Submitting job");
        self.router.route(job)
    }

    pub fn register_node(&self, node: NodeInfo) -> bool {
        if !self.is_running() {
            warn!("Cannot register node, coordinator is not running");
            return false;
        }
        self.membership.register(node);
        true
    }

    /// Voluntary departure; running jobs on the node fail with the
    /// eviction reason, same as a timeout eviction.
    pub fn unregister_node(&self, node_id: &str) -> bool {
        if !self.is_running() {
            warn!("Cannot unregister node, coordinator is not running");
            return false;
        }
        let removed = self.membership.unregister(node_id);
        if removed {
            self.router.on_node_evicted(node_id);
        }
        removed
    }

    pub fn handle_heartbeat(&self, node_id: &str) -> bool {
        self.membership.heartbeat(node_id)
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn membership(&self) -> &NodeMembership {
        &self.membership
    }

    pub fn router(&self) -> &JobRouter {
        &self.router
    }

    pub fn validator(&self) -> &ProofValidator {
        &self.validator
    }

    pub fn snapshot_store(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn worker_pool(&self) -> &Arc<WorkerPool> {
        &self.workers
    }
}
