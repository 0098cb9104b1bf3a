// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod agent;
pub mod events;
pub mod job;
pub mod node;
pub mod proof;
pub mod snapshot;
pub mod version;

pub use agent::{AgentDefinition, AgentKind, AgentStatus};
pub use events::ClusterEvent;
pub use job::{Job, JobStatus};
pub use node::{NodeInfo, NodeStatus};
pub use proof::{ExecutionProof, ValidationResult};
pub use snapshot::Snapshot;
pub use version::{AgentVersion, VersionError};
