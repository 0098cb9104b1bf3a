// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Timeout,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled | JobStatus::Timeout
        )
    }
}

/// A single execution request bound to an agent.
///
/// Input and output buffers are owned by the job; they are moved in on
/// construction/completion and cloned out by accessors, so no caller ever
/// holds an alias of the stored bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub agent_id: String,
    input: Vec<u8>,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    output: Option<Vec<u8>>,
    pub executed_by_node_id: Option<String>,
    pub error_message: Option<String>,
}

impl Job {
    pub fn new(agent_id: impl Into<String>, input: Vec<u8>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), agent_id, input)
    }

    pub fn with_id(job_id: impl Into<String>, agent_id: impl Into<String>, input: Vec<u8>) -> Self {
        Self {
            job_id: job_id.into(),
            agent_id: agent_id.into(),
            input,
            metadata: HashMap::new(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            status: JobStatus::Pending,
            output: None,
            executed_by_node_id: None,
            error_message: None,
        }
    }

    pub fn input(&self) -> Vec<u8> {
        self.input.clone()
    }

    /// Present iff the job completed successfully.
    pub fn output(&self) -> Option<Vec<u8>> {
        self.output.clone()
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Pending -> Running, recording the executing node.
    pub fn mark_started(&mut self, node_id: impl Into<String>) {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
        self.executed_by_node_id = Some(node_id.into());
    }

    /// Running -> Completed with the produced output.
    pub fn mark_completed(&mut self, output: Vec<u8>) {
        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.output = Some(output);
    }

    /// Running -> Failed. Output stays unset on the failure path.
    pub fn mark_failed(&mut self, error_message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(error_message.into());
    }

    /// Running -> Timeout, signalled by the executing node.
    pub fn mark_timed_out(&mut self, error_message: impl Into<String>) {
        self.status = JobStatus::Timeout;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(error_message.into());
    }

    /// Pending or Running -> Cancelled.
    pub fn mark_cancelled(&mut self) {
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let job = Job::new("a1", b"hello".to_vec());
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
        assert!(job.executed_by_node_id.is_none());
        assert_eq!(job.input(), b"hello".to_vec());
    }

    #[test]
    fn test_start_sets_node_and_timestamp() {
        let mut job = Job::new("a1", vec![]);
        job.mark_started("n1");
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.executed_by_node_id.as_deref(), Some("n1"));
        assert!(job.started_at.is_some());
    }

    #[test]
    fn test_complete_sets_output() {
        let mut job = Job::new("a1", vec![]);
        job.mark_started("n1");
        job.mark_completed(b"out".to_vec());
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.output(), Some(b"out".to_vec()));
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn test_fail_leaves_output_unset() {
        let mut job = Job::new("a1", vec![]);
        job.mark_started("n1");
        job.mark_failed("boom");
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.output().is_none());
        assert_eq!(job.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_timeout_is_terminal_with_message() {
        let mut job = Job::new("a1", vec![]);
        job.mark_started("n1");
        job.mark_timed_out("deadline exceeded");
        assert_eq!(job.status, JobStatus::Timeout);
        assert!(job.status.is_terminal());
        assert_eq!(job.error_message.as_deref(), Some("deadline exceeded"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(JobStatus::Timeout.is_terminal());
    }

    #[test]
    fn test_input_accessor_returns_copy() {
        let job = Job::new("a1", b"abc".to_vec());
        let mut copy = job.input();
        copy[0] = b'z';
        assert_eq!(job.input(), b"abc".to_vec());
    }
}
