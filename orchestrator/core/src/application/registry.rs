// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent catalog with per-id latest-version tracking.

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{info, warn};

use crate::domain::agent::AgentDefinition;
use crate::domain::version::AgentVersion;

/// Read-only view of the catalog handed to the router at initialization.
pub trait AgentDirectory: Send + Sync {
    fn is_registered(&self, agent_id: &str) -> bool;
}

#[derive(Default)]
struct RegistryTable {
    agents: HashMap<String, AgentDefinition>,
    latest_versions: HashMap<String, AgentVersion>,
}

/// Concurrent agent catalog. Single-key operations are atomic; `all()`
/// returns a point-in-time snapshot.
#[derive(Default)]
pub struct AgentRegistry {
    table: RwLock<RegistryTable>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) an agent record. The latest-version entry only
    /// moves forward: it is bumped iff the supplied version is strictly
    /// greater than anything previously seen for this id.
    pub fn register(&self, agent: AgentDefinition) {
        info!(agent_id = %agent.agent_id, version = %agent.version, "Registering agent");
        let mut table = self.table.write().unwrap();
        Self::store(&mut table, agent);
    }

    /// Remove an agent record and its latest-version entry.
    pub fn unregister(&self, agent_id: &str) -> bool {
        info!(agent_id, "Unregistering agent");
        let mut table = self.table.write().unwrap();
        let removed = table.agents.remove(agent_id).is_some();
        if removed {
            table.latest_versions.remove(agent_id);
        } else {
            warn!(agent_id, "Agent not found");
        }
        removed
    }

    /// Overwrite an existing record; false iff the id is unknown.
    pub fn update(&self, agent: AgentDefinition) -> bool {
        info!(agent_id = %agent.agent_id, "Updating agent");
        let mut table = self.table.write().unwrap();
        if !table.agents.contains_key(&agent.agent_id) {
            warn!(agent_id = %agent.agent_id, "Agent not found");
            return false;
        }
        Self::store(&mut table, agent);
        true
    }

    pub fn get(&self, agent_id: &str) -> Option<AgentDefinition> {
        self.table.read().unwrap().agents.get(agent_id).cloned()
    }

    pub fn all(&self) -> Vec<AgentDefinition> {
        self.table.read().unwrap().agents.values().cloned().collect()
    }

    pub fn latest_version(&self, agent_id: &str) -> Option<AgentVersion> {
        self.table.read().unwrap().latest_versions.get(agent_id).copied()
    }

    pub fn len(&self) -> usize {
        self.table.read().unwrap().agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn store(table: &mut RegistryTable, agent: AgentDefinition) {
        let newer = table
            .latest_versions
            .get(&agent.agent_id)
            .map_or(true, |latest| agent.version > *latest);
        if newer {
            table.latest_versions.insert(agent.agent_id.clone(), agent.version);
        }
        table.agents.insert(agent.agent_id.clone(), agent);
    }
}

impl AgentDirectory for AgentRegistry {
    fn is_registered(&self, agent_id: &str) -> bool {
        self.table.read().unwrap().agents.contains_key(agent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentKind;

    fn agent(id: &str, version: &str) -> AgentDefinition {
        AgentDefinition::with_id(
            id,
            "test-agent",
            AgentKind::Analyzer,
            version.parse().unwrap(),
            "",
            "modules/test.wasm",
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = AgentRegistry::new();
        registry.register(agent("a1", "1.0.0"));
        assert!(registry.is_registered("a1"));
        assert_eq!(registry.get("a1").unwrap().agent_id, "a1");
        assert_eq!(registry.latest_version("a1"), Some("1.0.0".parse().unwrap()));
    }

    #[test]
    fn test_unregister_clears_both_maps() {
        let registry = AgentRegistry::new();
        registry.register(agent("a1", "1.0.0"));
        assert!(registry.unregister("a1"));
        assert!(!registry.is_registered("a1"));
        assert_eq!(registry.latest_version("a1"), None);
    }

    #[test]
    fn test_unregister_unknown_returns_false() {
        let registry = AgentRegistry::new();
        assert!(!registry.unregister("missing"));
    }

    #[test]
    fn test_latest_version_is_monotonic() {
        let registry = AgentRegistry::new();
        registry.register(agent("x", "1.2.0"));
        registry.register(agent("x", "1.3.0"));
        registry.register(agent("x", "1.2.5"));
        assert_eq!(registry.latest_version("x"), Some("1.3.0".parse().unwrap()));
        // but the stored record is the most recent registration
        assert_eq!(registry.get("x").unwrap().version, "1.2.5".parse().unwrap());
    }

    #[test]
    fn test_latest_version_tracks_max_of_any_sequence() {
        let registry = AgentRegistry::new();
        let supplied = ["0.9.9", "2.0.0", "1.5.3", "2.0.0", "0.0.1"];
        let mut max: AgentVersion = supplied[0].parse().unwrap();
        for v in supplied {
            let parsed: AgentVersion = v.parse().unwrap();
            if parsed > max {
                max = parsed;
            }
            registry.register(agent("x", v));
        }
        assert_eq!(registry.latest_version("x"), Some(max));
    }

    #[test]
    fn test_update_requires_existing_id() {
        let registry = AgentRegistry::new();
        assert!(!registry.update(agent("a1", "1.0.0")));
        registry.register(agent("a1", "1.0.0"));
        assert!(registry.update(agent("a1", "1.1.0")));
        assert_eq!(registry.latest_version("a1"), Some("1.1.0".parse().unwrap()));
    }

    #[test]
    fn test_all_is_a_snapshot() {
        let registry = AgentRegistry::new();
        registry.register(agent("a1", "1.0.0"));
        registry.register(agent("a2", "1.0.0"));
        let snapshot = registry.all();
        registry.unregister("a1");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 1);
    }
}
