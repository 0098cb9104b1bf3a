// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Verification of execution attestations.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::proof::{combined_hash, hash_payload, ExecutionProof, ValidationResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofError {
    #[error("Proof already registered: {0}")]
    Duplicate(String),
}

/// Store of execution proofs, validated against the bytes they attest.
#[derive(Default)]
pub struct ProofValidator {
    proofs: RwLock<HashMap<String, ExecutionProof>>,
}

impl ProofValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a proof. A second registration under the same id is an
    /// integrity error, not an overwrite.
    pub fn register(&self, proof: ExecutionProof) -> Result<(), ProofError> {
        info!(proof_id = %proof.proof_id, agent_id = %proof.agent_id, "Registering proof");
        let mut proofs = self.proofs.write().unwrap();
        if proofs.contains_key(&proof.proof_id) {
            warn!(proof_id = %proof.proof_id, "Duplicate proof id");
            return Err(ProofError::Duplicate(proof.proof_id));
        }
        proofs.insert(proof.proof_id.clone(), proof);
        Ok(())
    }

    /// Check the given payloads against a registered proof.
    ///
    /// Checks short-circuit in order: unknown id, input hash, output hash,
    /// recomputed combined hash. Cost is one pass over each payload.
    pub fn validate(&self, proof_id: &str, input: &[u8], output: &[u8]) -> ValidationResult {
        info!(proof_id, "Validating proof");

        let proof = {
            let proofs = self.proofs.read().unwrap();
            match proofs.get(proof_id) {
                Some(proof) => proof.clone(),
                None => {
                    warn!(proof_id, "Proof not found");
                    return ValidationResult::ProofNotFound;
                }
            }
        };

        let input_hash = hash_payload(input);
        if input_hash != proof.input_hash {
            warn!(proof_id, "Input hash mismatch");
            return ValidationResult::InputMismatch;
        }

        let output_hash = hash_payload(output);
        if output_hash != proof.output_hash {
            warn!(proof_id, "Output hash mismatch");
            return ValidationResult::OutputMismatch;
        }

        let recomputed = combined_hash(&proof.agent_id, proof.timestamp, &input_hash, &output_hash);
        if recomputed != proof.proof_hash {
            warn!(proof_id, "Proof hash mismatch");
            return ValidationResult::ProofHashMismatch;
        }

        info!(proof_id, "Proof validation successful");
        ValidationResult::Valid
    }

    pub fn get(&self, proof_id: &str) -> Option<ExecutionProof> {
        self.proofs.read().unwrap().get(proof_id).cloned()
    }

    pub fn all(&self) -> Vec<ExecutionProof> {
        self.proofs.read().unwrap().values().cloned().collect()
    }
}
