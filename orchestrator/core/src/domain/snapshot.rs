// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one stored state snapshot. The payload itself is opaque and
/// lives on disk, keyed by component id and snapshot id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: String,
    pub component_id: String,
    pub created_at: DateTime<Utc>,
    pub size: u64,
}

impl Snapshot {
    pub fn new(component_id: impl Into<String>, created_at: DateTime<Utc>, size: u64) -> Self {
        Self {
            snapshot_id: Uuid::new_v4().to_string(),
            component_id: component_id.into(),
            created_at,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_ids_are_unique() {
        let now = Utc::now();
        let a = Snapshot::new("router", now, 16);
        let b = Snapshot::new("router", now, 16);
        assert_ne!(a.snapshot_id, b.snapshot_id);
        assert_eq!(a.component_id, b.component_id);
    }
}
