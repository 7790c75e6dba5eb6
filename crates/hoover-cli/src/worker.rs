use clap::ValueEnum;
use hoover_engine::{TaskQueue, WorkerPool};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WorkerQueue {
    Common,
    Tika,
    EasyOcr,
    Indexing,
}

impl WorkerQueue {
    pub fn as_arg(self) -> &'static str {
        match self {
            WorkerQueue::Common => "common",
            WorkerQueue::Tika => "tika",
            WorkerQueue::EasyOcr => "easyocr",
            WorkerQueue::Indexing => "indexing",
        }
    }

    fn task_queue(self) -> TaskQueue {
        match self {
            WorkerQueue::Common => TaskQueue::Common,
            WorkerQueue::Tika => TaskQueue::Tika,
            WorkerQueue::EasyOcr => TaskQueue::EasyOcr,
            WorkerQueue::Indexing => TaskQueue::Indexing,
        }
    }
}

/// Runs a single worker type in-process. Activities in this engine are
/// dispatched in-process by whatever drives the workflow (the
/// `add_disk_dataset` pipeline), rather than pulled from a remote task
/// queue, so there is no queue to poll here -- this holds the named
/// queue's concurrency pool open and idles until told to stop, exactly
/// the role the supervisor needs a child process to play.
pub async fn run_worker(queue: WorkerQueue) -> anyhow::Result<()> {
    let _pool = WorkerPool::for_queue(queue.task_queue());
    tracing::info!(
        queue = queue.as_arg(),
        concurrency = queue.task_queue().default_concurrency(),
        "worker started"
    );
    tokio::signal::ctrl_c().await?;
    tracing::info!(queue = queue.as_arg(), "worker shutting down");
    Ok(())
}
