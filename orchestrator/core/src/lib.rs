// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! KORRA control plane.
//!
//! Coordinates a fleet of compute nodes hosting versioned agents: an agent
//! catalog, heartbeat-based node membership, capability-routed job
//! placement, content-addressed execution proofs, and durable component
//! snapshots.
//!
//! # Architecture
//!
//! - **domain** — entities, value objects and domain events
//! - **application** — registry, membership, router, validator, coordinator
//! - **infrastructure** — event bus, snapshot store, wire codec, worker pool
//! - **presentation** — axum admin API

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
