// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Node directory and heartbeat-based liveness.
//!
//! The directory preserves registration order because job placement scans
//! it first-match. The liveness sweep runs on the shared worker pool and
//! reads time through the [`Clock`] capability so tests can drive eviction
//! without wall-clock waits.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::events::ClusterEvent;
use crate::domain::node::{NodeInfo, NodeStatus};
use crate::infrastructure::event_bus::EventBus;

/// How often the liveness sweep runs; the first pass fires one full
/// interval after start.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// A node whose last heartbeat is older than this is evicted.
pub const NODE_TIMEOUT: Duration = Duration::from_secs(30);

/// Time source for heartbeat bookkeeping and the sweep.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests that need to cross the eviction threshold.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(delta).expect("clock delta out of range");
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Read-only, insertion-ordered view of the directory handed to the router.
pub trait NodeDirectory: Send + Sync {
    fn nodes(&self) -> Vec<NodeInfo>;
}

/// Receiver for eviction cascades; the composition root hands the sweep an
/// adapter that fails the evicted node's jobs.
pub trait EvictionSink: Send + Sync {
    fn node_evicted(&self, node_id: &str);
}

#[derive(Default)]
struct NodeTable {
    nodes: HashMap<String, NodeInfo>,
    /// Registration order of the ids in `nodes`.
    order: Vec<String>,
}

/// Concurrent node directory with heartbeat bookkeeping.
pub struct NodeMembership {
    table: RwLock<NodeTable>,
    events: EventBus,
    clock: Arc<dyn Clock>,
}

impl NodeMembership {
    pub fn new(events: EventBus) -> Self {
        Self::with_clock(events, Arc::new(SystemClock))
    }

    pub fn with_clock(events: EventBus, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(NodeTable::default()),
            events,
            clock,
        }
    }

    /// Insert a node, forcing it Online with a fresh heartbeat, and announce
    /// it on the sync bus. Re-registering an id keeps its original position.
    pub fn register(&self, mut node: NodeInfo) {
        info!(node_id = %node.node_id, hostname = %node.hostname, "Registering node");
        node.status = NodeStatus::Online;
        node.last_heartbeat = self.clock.now();

        let announced = node.clone();
        {
            let mut table = self.table.write().unwrap();
            if table.nodes.insert(node.node_id.clone(), node).is_none() {
                let id = announced.node_id.clone();
                table.order.push(id);
            }
        }

        self.events.publish(ClusterEvent::NodeJoined { node: announced });
    }

    /// Remove a node and announce its departure. False iff the id is absent.
    pub fn unregister(&self, node_id: &str) -> bool {
        info!(node_id, "Unregistering node");
        let removed = {
            let mut table = self.table.write().unwrap();
            let removed = table.nodes.remove(node_id);
            if removed.is_some() {
                table.order.retain(|id| id != node_id);
            }
            removed
        };

        match removed {
            Some(node) => {
                self.events.publish(ClusterEvent::NodeLeft { node });
                true
            }
            None => {
                warn!(node_id, "Node not found");
                false
            }
        }
    }

    /// Record a heartbeat. False iff the id is unknown.
    pub fn heartbeat(&self, node_id: &str) -> bool {
        let mut table = self.table.write().unwrap();
        match table.nodes.get_mut(node_id) {
            Some(node) => {
                node.last_heartbeat = self.clock.now();
                true
            }
            None => {
                warn!(node_id, "Heartbeat from unknown node");
                false
            }
        }
    }

    /// External status signal (Busy, Error, Offline). False iff unknown.
    pub fn set_status(&self, node_id: &str, status: NodeStatus) -> bool {
        let mut table = self.table.write().unwrap();
        match table.nodes.get_mut(node_id) {
            Some(node) => {
                node.status = status;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, node_id: &str) -> Option<NodeInfo> {
        self.table.read().unwrap().nodes.get(node_id).cloned()
    }

    /// Point-in-time snapshot in registration order.
    pub fn all(&self) -> Vec<NodeInfo> {
        let table = self.table.read().unwrap();
        table
            .order
            .iter()
            .filter_map(|id| table.nodes.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.read().unwrap().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl NodeDirectory for NodeMembership {
    fn nodes(&self) -> Vec<NodeInfo> {
        self.all()
    }
}

/// Periodic liveness check that evicts silent nodes.
pub struct LivenessSweep {
    membership: Arc<NodeMembership>,
    /// The coordinator's own id; never evicted even if it shows up in the
    /// directory.
    self_node_id: String,
    sink: Arc<dyn EvictionSink>,
    interval: Duration,
    timeout: Duration,
    shutdown_token: CancellationToken,
}

impl LivenessSweep {
    pub fn new(
        membership: Arc<NodeMembership>,
        self_node_id: impl Into<String>,
        sink: Arc<dyn EvictionSink>,
    ) -> Self {
        Self::with_timing(membership, self_node_id, sink, HEARTBEAT_INTERVAL, NODE_TIMEOUT)
    }

    pub fn with_timing(
        membership: Arc<NodeMembership>,
        self_node_id: impl Into<String>,
        sink: Arc<dyn EvictionSink>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            membership,
            self_node_id: self_node_id.into(),
            sink,
            interval,
            timeout,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Handle used by the coordinator to request cancellation.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Spawn the sweep loop. The in-progress pass always completes before
    /// the task exits on cancellation.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    pub(crate) async fn run(&self) {
        info!(
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.timeout.as_secs(),
            "Starting liveness sweep"
        );

        // First tick after one full interval, not immediately.
        let mut tick = interval_at(Instant::now() + self.interval, self.interval);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let evicted = self.sweep_once();
                    if evicted > 0 {
                        info!(evicted, "Liveness sweep evicted nodes");
                    }
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received, stopping liveness sweep");
                    break;
                }
            }
        }

        info!("Liveness sweep stopped");
    }

    /// One pass over the directory; returns the number of evicted nodes.
    pub fn sweep_once(&self) -> usize {
        debug!("Checking heartbeats");
        let now = self.membership.clock().now();
        let timeout = chrono::Duration::from_std(self.timeout).expect("timeout out of range");

        let expired: Vec<String> = self
            .membership
            .all()
            .into_iter()
            .filter(|node| node.node_id != self.self_node_id)
            .filter(|node| now - node.last_heartbeat > timeout)
            .map(|node| node.node_id)
            .collect();

        let mut evicted = 0;
        for node_id in expired {
            warn!(node_id = %node_id, "Node timeout");
            // Surface the transition before removal so the departure event
            // carries the Unresponsive status.
            self.membership.set_status(&node_id, NodeStatus::Unresponsive);
            if self.membership.unregister(&node_id) {
                self.sink.node_evicted(&node_id);
                evicted += 1;
            }
        }
        evicted
    }
}
