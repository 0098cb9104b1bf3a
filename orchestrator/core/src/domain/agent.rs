// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::version::AgentVersion;

/// Category of work an agent performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentKind {
    Analyzer,
    Transformer,
    Validator,
    Coordinator,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentStatus {
    Active,
    Inactive,
    Executing,
    Error,
    Updating,
}

/// Catalog record for a deployed agent.
///
/// The id is stable for the lifetime of the record and the version is
/// immutable; re-registering under the same id replaces the whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub agent_id: String,
    pub name: String,
    pub kind: AgentKind,
    pub version: AgentVersion,
    pub description: String,
    /// Locator of the external execution artifact (e.g. a module path).
    pub module_path: String,
    pub metadata: HashMap<String, String>,
    pub registered_at: DateTime<Utc>,
    pub status: AgentStatus,
}

impl AgentDefinition {
    pub fn new(
        name: impl Into<String>,
        kind: AgentKind,
        version: AgentVersion,
        description: impl Into<String>,
        module_path: impl Into<String>,
    ) -> Self {
        Self::with_id(
            Uuid::new_v4().to_string(),
            name,
            kind,
            version,
            description,
            module_path,
        )
    }

    pub fn with_id(
        agent_id: impl Into<String>,
        name: impl Into<String>,
        kind: AgentKind,
        version: AgentVersion,
        description: impl Into<String>,
        module_path: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            kind,
            version,
            description: description.into(),
            module_path: module_path.into(),
            metadata: HashMap::new(),
            registered_at: Utc::now(),
            status: AgentStatus::Inactive,
        }
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Capability key a node must advertise to host this agent.
    pub fn capability_key(&self) -> String {
        format!("agent:{}", self.agent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_agent_is_inactive_with_generated_id() {
        let agent = AgentDefinition::new(
            "parser",
            AgentKind::Analyzer,
            AgentVersion::new(1, 0, 0),
            "parses things",
            "modules/parser.wasm",
        );
        assert_eq!(agent.status, AgentStatus::Inactive);
        assert!(!agent.agent_id.is_empty());
        assert!(agent.metadata.is_empty());
    }

    #[test]
    fn test_with_id_keeps_supplied_id() {
        let agent = AgentDefinition::with_id(
            "a1",
            "parser",
            AgentKind::Analyzer,
            AgentVersion::new(1, 0, 0),
            "",
            "",
        );
        assert_eq!(agent.agent_id, "a1");
        assert_eq!(agent.capability_key(), "agent:a1");
    }

    #[test]
    fn test_kind_serializes_uppercase() {
        let json = serde_json::to_string(&AgentKind::Transformer).unwrap();
        assert_eq!(json, "\"TRANSFORMER\"");
        let json = serde_json::to_string(&AgentStatus::Inactive).unwrap();
        assert_eq!(json, "\"INACTIVE\"");
    }
}
