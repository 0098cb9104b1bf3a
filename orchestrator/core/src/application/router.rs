// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Job lifecycle and placement onto capable nodes.
//!
//! Placement is deliberately first-match over the directory's registration
//! order; there is no load balancing. The router never sees the registry or
//! the membership layer directly — it is bound to the narrow
//! [`AgentDirectory`] and [`NodeDirectory`] views at initialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::application::membership::NodeDirectory;
use crate::application::registry::AgentDirectory;
use crate::domain::events::ClusterEvent;
use crate::domain::job::Job;
use crate::infrastructure::event_bus::EventBus;

/// Reason attached to jobs that lose their executing node.
pub const NODE_EVICTED: &str = "node-evicted";

struct RouterViews {
    agents: Arc<dyn AgentDirectory>,
    nodes: Arc<dyn NodeDirectory>,
}

#[derive(Default)]
struct RouterState {
    views: Option<RouterViews>,
    /// Running jobs only.
    active_jobs: HashMap<String, Job>,
    /// Terminal jobs, retained for the jobs listing until a purge pass.
    finished_jobs: HashMap<String, Job>,
    /// Running job ids per node, in assignment order.
    node_jobs: HashMap<String, Vec<String>>,
}

impl RouterState {
    /// Move a running job into a terminal state and drop its node index
    /// entry. Returns false when the id is unknown or not Running.
    fn finish(&mut self, job_id: &str, apply: impl FnOnce(&mut Job)) -> bool {
        let Some(mut job) = self.active_jobs.remove(job_id) else {
            return false;
        };
        if let Some(node_id) = job.executed_by_node_id.clone() {
            if let Some(jobs) = self.node_jobs.get_mut(&node_id) {
                jobs.retain(|id| id != job_id);
                if jobs.is_empty() {
                    self.node_jobs.remove(&node_id);
                }
            }
        }
        apply(&mut job);
        self.finished_jobs.insert(job.job_id.clone(), job);
        true
    }
}

/// Routes jobs between nodes and tracks their lifecycle.
pub struct JobRouter {
    state: Mutex<RouterState>,
    events: EventBus,
}

impl JobRouter {
    pub fn new(events: EventBus) -> Self {
        Self {
            state: Mutex::new(RouterState::default()),
            events,
        }
    }

    /// Bind the directory views. Idempotent; repeat calls are ignored with
    /// a warning.
    pub fn initialize(&self, agents: Arc<dyn AgentDirectory>, nodes: Arc<dyn NodeDirectory>) {
        let mut state = self.state.lock().unwrap();
        if state.views.is_some() {
            warn!("Job router is already initialized");
            return;
        }
        info!("Initializing job router");
        state.views = Some(RouterViews { agents, nodes });
    }

    /// Unbind the views; subsequent placements return None.
    pub fn shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        if state.views.is_none() {
            warn!("Job router is not initialized");
            return;
        }
        info!("Shutting down job router");
        state.views = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().unwrap().views.is_some()
    }

    /// Place a job on the first Online node advertising the agent's
    /// capability key. On success the job transitions Pending -> Running and
    /// its id is returned; otherwise None and the job is not recorded.
    pub fn route(&self, mut job: Job) -> Option<String> {
        let mut state = self.state.lock().unwrap();

        let Some(views) = state.views.as_ref() else {
            warn!(job_id = %job.job_id, "Cannot route job, job router is not initialized");
            return None;
        };

        info!(job_id = %job.job_id, agent_id = %job.agent_id, "Routing job");

        if !views.agents.is_registered(&job.agent_id) {
            warn!(agent_id = %job.agent_id, "Agent not registered");
            return None;
        }

        let capability = format!("agent:{}", job.agent_id);
        let candidate = views
            .nodes
            .nodes()
            .into_iter()
            .find(|node| node.status.accepts_jobs() && node.has_capability(&capability));
        let Some(node_id) = candidate.map(|node| node.node_id) else {
            warn!(job_id = %job.job_id, "No suitable node found");
            return None;
        };

        let job_id = job.job_id.clone();
        job.mark_started(node_id.clone());
        state.active_jobs.insert(job_id.clone(), job);
        state
            .node_jobs
            .entry(node_id.clone())
            .or_default()
            .push(job_id.clone());
        drop(state);

        info!(job_id = %job_id, node_id = %node_id, "Job assigned");
        self.publish(ClusterEvent::JobAssigned {
            job_id: job_id.clone(),
            node_id,
        });

        Some(job_id)
    }

    /// Running -> Completed with the node's output. False when the id is
    /// unknown or the job already reached a terminal state.
    pub fn notify_completed(&self, job_id: &str, output: Vec<u8>) -> bool {
        info!(job_id, "Job completed");
        let done = self
            .state
            .lock()
            .unwrap()
            .finish(job_id, |job| job.mark_completed(output));
        if !done {
            warn!(job_id, "Job not found or not running");
        }
        done
    }

    /// Running -> Failed with the node's error message.
    pub fn notify_failed(&self, job_id: &str, error_message: &str) -> bool {
        info!(job_id, error_message, "Job failed");
        let done = self
            .state
            .lock()
            .unwrap()
            .finish(job_id, |job| job.mark_failed(error_message));
        if done {
            self.publish(ClusterEvent::JobFailed {
                job_id: job_id.to_string(),
                reason: error_message.to_string(),
            });
        } else {
            warn!(job_id, "Job not found or not running");
        }
        done
    }

    /// Running -> Timeout, signalled by the executing node.
    pub fn notify_timeout(&self, job_id: &str, error_message: &str) -> bool {
        info!(job_id, error_message, "Job timed out");
        let done = self
            .state
            .lock()
            .unwrap()
            .finish(job_id, |job| job.mark_timed_out(error_message));
        if !done {
            warn!(job_id, "Job not found or not running");
        }
        done
    }

    /// Cancel a running job. False when unknown or already terminal.
    pub fn cancel(&self, job_id: &str) -> bool {
        info!(job_id, "Cancelling job");
        self.state
            .lock()
            .unwrap()
            .finish(job_id, |job| job.mark_cancelled())
    }

    /// Fail every job running on an evicted node. Called by the composition
    /// root after the membership layer reports a removal.
    pub fn on_node_evicted(&self, node_id: &str) {
        let job_ids = {
            let state = self.state.lock().unwrap();
            state.node_jobs.get(node_id).cloned().unwrap_or_default()
        };
        if job_ids.is_empty() {
            return;
        }

        warn!(node_id, jobs = job_ids.len(), "Failing jobs on evicted node");
        for job_id in &job_ids {
            self.state
                .lock()
                .unwrap()
                .finish(job_id, |job| job.mark_failed(NODE_EVICTED));
            self.publish(ClusterEvent::JobFailed {
                job_id: job_id.clone(),
                reason: NODE_EVICTED.to_string(),
            });
        }
    }

    pub fn get(&self, job_id: &str) -> Option<Job> {
        let state = self.state.lock().unwrap();
        state
            .active_jobs
            .get(job_id)
            .or_else(|| state.finished_jobs.get(job_id))
            .cloned()
    }

    /// Running jobs only.
    pub fn active_jobs(&self) -> Vec<Job> {
        self.state.lock().unwrap().active_jobs.values().cloned().collect()
    }

    /// Every job the router still knows about, running and terminal.
    pub fn all_jobs(&self) -> Vec<Job> {
        let state = self.state.lock().unwrap();
        state
            .active_jobs
            .values()
            .chain(state.finished_jobs.values())
            .cloned()
            .collect()
    }

    /// Ids of jobs currently running on the given node.
    pub fn node_jobs(&self, node_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .node_jobs
            .get(node_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop retained terminal jobs; returns how many were purged.
    pub fn purge_finished(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        let purged = state.finished_jobs.len();
        state.finished_jobs.clear();
        purged
    }

    fn publish(&self, event: ClusterEvent) {
        self.events.publish(event);
    }
}
