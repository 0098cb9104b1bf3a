// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod coordinator;
pub mod membership;
pub mod registry;
pub mod router;
pub mod validator;

pub use coordinator::{Coordinator, CoordinatorConfig};
pub use membership::{
    Clock, EvictionSink, LivenessSweep, ManualClock, NodeDirectory, NodeMembership, SystemClock,
    HEARTBEAT_INTERVAL, NODE_TIMEOUT,
};
pub use registry::{AgentDirectory, AgentRegistry};
pub use router::{JobRouter, NODE_EVICTED};
pub use validator::{ProofError, ProofValidator};
