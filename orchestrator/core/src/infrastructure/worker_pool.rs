// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Bounded shared executor.
//!
//! The liveness sweep and caller-supplied deferred work run on one pool. A
//! semaphore caps how many tasks run at once; excess submissions queue on
//! permit acquisition. Shutdown closes the pool to new work and drains
//! what is in flight.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const DEFAULT_WORKERS: usize = 10;

pub struct WorkerPool {
    permits: Arc<Semaphore>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            handles: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Submit a task. Returns false once the pool is shutting down.
    pub fn spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.closed.load(Ordering::Acquire) {
            warn!("Worker pool is draining, task rejected");
            return false;
        }

        let permits = self.permits.clone();
        let handle = tokio::spawn(async move {
            // Acquired inside the task so submission never blocks the caller.
            let _permit = permits.acquire().await.expect("worker pool semaphore closed");
            task.await;
        });

        self.handles.lock().unwrap().push(handle);
        true
    }

    /// Stop accepting work and wait for every in-flight task.
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Draining worker pool");

        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock().unwrap());
        for handle in handles {
            let _ = handle.await;
        }
        info!("Worker pool drained");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_tasks_run_and_drain() {
        let pool = WorkerPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let counter = counter.clone();
            assert!(pool.spawn(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        pool.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let running = running.clone();
            let peak = peak.clone();
            pool.spawn(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }

        pool.shutdown().await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_spawn_after_shutdown_is_rejected() {
        let pool = WorkerPool::new(1);
        pool.shutdown().await;
        assert!(!pool.spawn(async {}));
        assert!(pool.is_closed());
    }
}
