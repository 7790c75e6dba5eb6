use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

/// The four named worker queues every activity is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskQueue {
    Common,
    Tika,
    EasyOcr,
    Indexing,
}

impl TaskQueue {
    /// Default concurrency per queue, matching `run_worker.py` exactly
    /// (Section 5 of SPEC_FULL.md).
    pub fn default_concurrency(self) -> usize {
        match self {
            TaskQueue::Common => 8,
            TaskQueue::Tika => 8,
            TaskQueue::EasyOcr => 4,
            TaskQueue::Indexing => 1,
        }
    }
}

/// Bounds concurrent activity execution on one queue via a semaphore.
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(concurrency: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
        }
    }

    pub fn for_queue(queue: TaskQueue) -> Self {
        Self::new(queue.default_concurrency())
    }

    pub async fn acquire(&self) -> SemaphorePermit<'_> {
        self.semaphore.acquire().await.expect("semaphore never closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_matches_run_worker_py() {
        assert_eq!(TaskQueue::Common.default_concurrency(), 8);
        assert_eq!(TaskQueue::Tika.default_concurrency(), 8);
        assert_eq!(TaskQueue::EasyOcr.default_concurrency(), 4);
        assert_eq!(TaskQueue::Indexing.default_concurrency(), 1);
    }

    #[tokio::test]
    async fn pool_bounds_concurrent_permits() {
        let pool = WorkerPool::new(2);
        let p1 = pool.acquire().await;
        let p2 = pool.acquire().await;
        assert_eq!(pool.semaphore.available_permits(), 0);
        drop(p1);
        assert_eq!(pool.semaphore.available_permits(), 1);
        drop(p2);
    }
}
