// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Content-addressed execution attestations.
//!
//! A proof binds (agent, timestamp, input, output) together: the input and
//! output hashes are SHA-256 of the raw bytes, and the proof hash is SHA-256
//! over the UTF-8 concatenation of agent id, decimal timestamp, input hash
//! and output hash. All digests are standard base64 with padding; both
//! encodings are compatibility-bearing for stored proofs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Outcome of checking a proof against the bytes it claims to attest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationResult {
    Valid,
    ProofNotFound,
    InputMismatch,
    OutputMismatch,
    ProofHashMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionProof {
    pub proof_id: String,
    pub agent_id: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub input_hash: String,
    pub output_hash: String,
    pub proof_hash: String,
}

impl ExecutionProof {
    pub fn new(
        agent_id: impl Into<String>,
        timestamp: i64,
        input_hash: impl Into<String>,
        output_hash: impl Into<String>,
        proof_hash: impl Into<String>,
    ) -> Self {
        Self::with_id(
            Uuid::new_v4().to_string(),
            agent_id,
            timestamp,
            input_hash,
            output_hash,
            proof_hash,
        )
    }

    pub fn with_id(
        proof_id: impl Into<String>,
        agent_id: impl Into<String>,
        timestamp: i64,
        input_hash: impl Into<String>,
        output_hash: impl Into<String>,
        proof_hash: impl Into<String>,
    ) -> Self {
        Self {
            proof_id: proof_id.into(),
            agent_id: agent_id.into(),
            timestamp,
            input_hash: input_hash.into(),
            output_hash: output_hash.into(),
            proof_hash: proof_hash.into(),
        }
    }

    /// Build a proof whose hashes are computed from the given payloads.
    pub fn attest(
        proof_id: impl Into<String>,
        agent_id: impl Into<String>,
        timestamp: i64,
        input: &[u8],
        output: &[u8],
    ) -> Self {
        let agent_id = agent_id.into();
        let input_hash = hash_payload(input);
        let output_hash = hash_payload(output);
        let proof_hash = combined_hash(&agent_id, timestamp, &input_hash, &output_hash);
        Self::with_id(proof_id, agent_id, timestamp, input_hash, output_hash, proof_hash)
    }
}

/// SHA-256 of raw bytes, standard base64 with padding.
pub fn hash_payload(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    STANDARD.encode(digest)
}

/// Proof hash over agent id, ASCII-decimal timestamp, and the two payload
/// hashes, concatenated as UTF-8 bytes.
pub fn combined_hash(agent_id: &str, timestamp: i64, input_hash: &str, output_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(agent_id.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(input_hash.as_bytes());
    hasher.update(output_hash.as_bytes());
    STANDARD.encode(hasher.finalize())
}
