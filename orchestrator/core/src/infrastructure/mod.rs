// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod event_bus;
pub mod snapshot_store;
pub mod wire;
pub mod worker_pool;

pub use event_bus::{EventBus, EventBusError, EventReceiver};
pub use snapshot_store::SnapshotStore;
pub use wire::{Frame, MessageType, WireError};
pub use worker_pool::WorkerPool;
