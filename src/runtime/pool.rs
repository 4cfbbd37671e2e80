//! Pool of long-lived worker threads for program runs.
//!
//! Runs block for arbitrary periods (breakpoints, pending input), so they
//! go to tokio's blocking pool: threads are spawned on demand and an idle
//! thread is only reclaimed after the keep-alive period, which keeps
//! repeated short runs from paying thread start-up each time.

use crate::config::PoolConfig;
use crate::error::{Result, RuntimeError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

static SHARED_POOL: Mutex<Option<Arc<WorkerPool>>> = Mutex::new(None);

pub struct WorkerPool {
    runtime: Runtime,
    keep_alive: Duration,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("keep_alive", &self.keep_alive)
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    pub fn new(config: &PoolConfig) -> Result<Self> {
        let keep_alive = Duration::from_secs(config.keep_alive_secs);
        let runtime = Builder::new_current_thread()
            .thread_name(config.thread_name.clone())
            .thread_keep_alive(keep_alive)
            .max_blocking_threads(config.max_threads.max(1))
            .build()
            .map_err(RuntimeError::Pool)?;

        debug!(
            keep_alive_secs = config.keep_alive_secs,
            max_threads = config.max_threads,
            "Worker pool created"
        );
        Ok(Self {
            runtime,
            keep_alive,
        })
    }

    /// The process-wide pool, created with default settings on first use.
    pub fn shared() -> Result<Arc<WorkerPool>> {
        let mut slot = SHARED_POOL.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pool) = slot.as_ref() {
            return Ok(Arc::clone(pool));
        }
        let pool = Arc::new(WorkerPool::new(&PoolConfig::default())?);
        *slot = Some(Arc::clone(&pool));
        Ok(pool)
    }

    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Run `job` on a pooled thread. The job is detached.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        drop(self.runtime.spawn_blocking(job));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_submit_runs_on_named_thread() {
        let config = PoolConfig {
            thread_name: "pool-test".to_string(),
            ..PoolConfig::default()
        };
        let pool = WorkerPool::new(&config).unwrap();
        let (tx, rx) = mpsc::channel();
        pool.submit(move || {
            let name = std::thread::current().name().map(str::to_string);
            tx.send(name).unwrap();
        });
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("pool-test"));
    }

    #[test]
    fn test_keep_alive_comes_from_config() {
        let config = PoolConfig {
            keep_alive_secs: 90,
            ..PoolConfig::default()
        };
        let pool = WorkerPool::new(&config).unwrap();
        assert_eq!(pool.keep_alive(), Duration::from_secs(90));
    }

    #[test]
    fn test_shared_pool_is_reused() {
        let a = WorkerPool::shared().unwrap();
        let b = WorkerPool::shared().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
