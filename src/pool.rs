// src/pool.rs
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use tokio::sync::Semaphore;

pub const MIN_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 200;

pub fn clamp_workers(requested: usize) -> usize {
    requested.clamp(MIN_WORKERS, MAX_WORKERS)
}

/// Bounded worker pool for the unit operations of one probe invocation.
///
/// Each invocation builds its own pool, so the bound applies per probe call
/// and not across jobs running side by side.
#[derive(Debug)]
pub struct WorkerPool {
    semaphore: Semaphore,
    limit: usize,
}

impl WorkerPool {
    pub fn new(requested: usize) -> Self {
        let limit = clamp_workers(requested);
        Self {
            semaphore: Semaphore::new(limit),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `task` for every item, at most `limit` at a time, and returns the
    /// outputs in completion order.
    pub async fn run<I, F, Fut>(&self, items: I, task: F) -> Vec<Fut::Output>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future,
    {
        let semaphore = &self.semaphore;
        let mut futures = FuturesUnordered::new();

        for item in items {
            let unit = task(item);
            futures.push(async move {
                // The semaphore is owned by the pool and never closed.
                let _permit = semaphore.acquire().await;
                unit.await
            });
        }

        let mut outputs = Vec::with_capacity(futures.len());
        while let Some(output) = futures.next().await {
            outputs.push(output);
        }
        outputs
    }
}
