// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeStatus {
    Online,
    Busy,
    Unresponsive,
    Offline,
    Error,
}

impl NodeStatus {
    /// Busy and Error nodes stay in the directory but receive no new jobs.
    pub fn accepts_jobs(&self) -> bool {
        matches!(self, NodeStatus::Online)
    }
}

/// Directory record for a compute node.
///
/// Identity is the node id alone: two records with the same id refer to
/// the same node regardless of any other field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub node_id: String,
    pub hostname: String,
    pub address: IpAddr,
    pub port: u16,
    /// Capability keys advertised by the node; the key is the predicate,
    /// values are free-form annotations.
    pub capabilities: HashMap<String, String>,
    pub joined_at: DateTime<Utc>,
    pub last_heartbeat: DateTime<Utc>,
    pub status: NodeStatus,
}

impl NodeInfo {
    pub fn new(
        node_id: impl Into<String>,
        hostname: impl Into<String>,
        address: IpAddr,
        port: u16,
    ) -> Self {
        let now = Utc::now();
        Self {
            node_id: node_id.into(),
            hostname: hostname.into(),
            address,
            port,
            capabilities: HashMap::new(),
            joined_at: now,
            last_heartbeat: now,
            status: NodeStatus::Online,
        }
    }

    pub fn add_capability(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.capabilities.insert(key.into(), value.into());
    }

    pub fn has_capability(&self, key: &str) -> bool {
        self.capabilities.contains_key(key)
    }
}

impl PartialEq for NodeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
    }
}

impl Eq for NodeInfo {}

impl Hash for NodeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_id.hash(state);
    }
}
