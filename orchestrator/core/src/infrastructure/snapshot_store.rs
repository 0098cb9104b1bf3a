// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Durable component-scoped snapshots.
//!
//! Payloads live on disk at `${base}/${componentId}/${snapshotId}.snap`;
//! metadata is indexed in memory in insertion order per component. Read
//! and write failures are transient: they are logged and surfaced as
//! `None`/`false`, never as panics.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{error, info, warn};

use crate::domain::snapshot::Snapshot;

pub const DEFAULT_BASE_DIR: &str = "snapshots";

pub struct SnapshotStore {
    base_dir: PathBuf,
    index: RwLock<HashMap<String, Vec<Snapshot>>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DIR)
    }
}

impl SnapshotStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            index: RwLock::new(HashMap::new()),
        }
    }

    /// Create the base directory if needed.
    pub fn initialize(&self) -> std::io::Result<()> {
        info!(base_dir = %self.base_dir.display(), "Initializing snapshot store");
        std::fs::create_dir_all(&self.base_dir)
    }

    /// Persist a payload for a component; returns the new snapshot id, or
    /// None when the write fails.
    pub fn create(&self, component_id: &str, data: &[u8]) -> Option<String> {
        info!(component_id, size = data.len(), "Creating snapshot");

        let snapshot = Snapshot::new(component_id, chrono::Utc::now(), data.len() as u64);
        let path = self.snapshot_path(component_id, &snapshot.snapshot_id);

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!(component_id, error = %e, "Failed to create snapshot directory");
                return None;
            }
        }
        if let Err(e) = std::fs::write(&path, data) {
            error!(path = %path.display(), error = %e, "Failed to save snapshot");
            return None;
        }

        let snapshot_id = snapshot.snapshot_id.clone();
        self.index
            .write()
            .unwrap()
            .entry(component_id.to_string())
            .or_default()
            .push(snapshot);

        info!(snapshot_id = %snapshot_id, path = %path.display(), "Snapshot saved");
        Some(snapshot_id)
    }

    /// Read a payload back. None for an unknown id, a missing or empty
    /// file, or a read failure.
    pub fn load(&self, snapshot_id: &str) -> Option<Vec<u8>> {
        info!(snapshot_id, "Loading snapshot");

        let snapshot = self.find(snapshot_id)?;
        let path = self.snapshot_path(&snapshot.component_id, snapshot_id);

        match std::fs::read(&path) {
            Ok(data) if data.is_empty() => {
                warn!(path = %path.display(), "Snapshot file is empty");
                None
            }
            Ok(data) => Some(data),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load snapshot");
                None
            }
        }
    }

    /// Remove a snapshot from the index and best-effort delete its file.
    pub fn delete(&self, snapshot_id: &str) -> bool {
        info!(snapshot_id, "Deleting snapshot");

        let Some(snapshot) = self.find(snapshot_id) else {
            warn!(snapshot_id, "Snapshot not found");
            return false;
        };

        {
            let mut index = self.index.write().unwrap();
            if let Some(list) = index.get_mut(&snapshot.component_id) {
                list.retain(|s| s.snapshot_id != snapshot_id);
            }
        }

        let path = self.snapshot_path(&snapshot.component_id, snapshot_id);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "Failed to delete snapshot file");
            }
        }
        true
    }

    /// Snapshots for a component in creation order.
    pub fn list(&self, component_id: &str) -> Vec<Snapshot> {
        self.index
            .read()
            .unwrap()
            .get(component_id)
            .cloned()
            .unwrap_or_default()
    }

    fn find(&self, snapshot_id: &str) -> Option<Snapshot> {
        let index = self.index.read().unwrap();
        index
            .values()
            .flatten()
            .find(|s| s.snapshot_id == snapshot_id)
            .cloned()
    }

    fn snapshot_path(&self, component_id: &str, snapshot_id: &str) -> PathBuf {
        self.base_dir
            .join(component_id)
            .join(format!("{snapshot_id}.snap"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
