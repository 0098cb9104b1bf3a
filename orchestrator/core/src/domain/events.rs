// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

use crate::domain::node::NodeInfo;

/// Events published on the cluster sync bus.
///
/// The bus is observability plumbing: membership announces directory
/// changes and the router announces assignment outcomes. Subscribers that
/// lag may drop events; nothing in the control plane depends on delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClusterEvent {
    NodeJoined {
        node: NodeInfo,
    },
    NodeLeft {
        node: NodeInfo,
    },
    JobAssigned {
        job_id: String,
        node_id: String,
    },
    JobFailed {
        job_id: String,
        reason: String,
    },
}
