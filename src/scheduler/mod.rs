//! Bounded concurrency for site scrapes
//!
//! [`ConcurrencyLimiter`] lets at most `n` scheduled tasks run at once.
//! Waiting tasks start in submission order because tokio's semaphore hands
//! out permits first-in first-out.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;

/// FIFO limiter for concurrently running tasks
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
    running: Arc<AtomicUsize>,
    queued: Arc<AtomicUsize>,
}

impl ConcurrencyLimiter {
    /// Limiter allowing `limit` running tasks; zero is treated as one
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            running: Arc::new(AtomicUsize::new(0)),
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Tasks currently holding a slot
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Tasks waiting for a slot
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Run `task` once a slot is free and return its output
    ///
    /// The task's own result, success or failure, goes back to this caller
    /// only. The slot is released when the task finishes or is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use jobharvest::scheduler::ConcurrencyLimiter;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let limiter = ConcurrencyLimiter::new(2);
    /// let value = limiter.schedule(async { 21 * 2 }).await;
    /// assert_eq!(value, 42);
    /// # }
    /// ```
    pub async fn schedule<F>(&self, task: F) -> F::Output
    where
        F: Future,
    {
        self.queued.fetch_add(1, Ordering::SeqCst);
        // The semaphore is never closed, so a failed acquire only means the
        // task runs without a permit.
        let permit = self.semaphore.acquire().await.ok();
        self.queued.fetch_sub(1, Ordering::SeqCst);

        let _running = RunningGuard::enter(&self.running);
        let output = task.await;
        drop(permit);
        output
    }
}

struct RunningGuard<'a>(&'a AtomicUsize);

impl<'a> RunningGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
