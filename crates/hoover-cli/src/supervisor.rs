use std::path::Path;
use std::time::Duration;
use tokio::process::{Child, Command};

const RESTART_COOLDOWN: Duration = Duration::from_secs(10);

/// Spawns the fixed worker topology (one `tika`, one `easyocr`, one
/// `indexing`, `worker_count_common` `common` workers), restarting any
/// child that exits until Ctrl-C, at which point every child is killed
/// immediately. The direct Rust analogue of a single-daemon-process
/// supervisor, generalized from "one daemon" to "one supervisor of N
/// typed worker processes".
pub async fn run_supervisor(worker_count_common: usize) -> anyhow::Result<()> {
    let exe = std::env::current_exe()?;

    let mut queues = vec!["tika", "easyocr", "indexing"];
    for _ in 0..worker_count_common.max(1) {
        queues.push("common");
    }

    let mut children: Vec<(String, Child)> = Vec::new();
    for queue in queues {
        children.push((queue.to_string(), spawn_worker(&exe, queue)?));
    }
    tracing::info!(workers = children.len(), "supervisor started");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("supervisor received ctrl-c, stopping all workers");
                for (queue, child) in children.iter_mut() {
                    if let Err(error) = child.kill().await {
                        tracing::warn!(queue, %error, "failed to kill worker");
                    }
                }
                return Ok(());
            }
            (index, queue) = wait_any(&mut children) => {
                tracing::warn!(queue, "worker exited, restarting after cooldown");
                tokio::time::sleep(RESTART_COOLDOWN).await;
                children[index].1 = spawn_worker(&exe, &queue)?;
            }
        }
    }
}

fn spawn_worker(exe: &Path, queue: &str) -> anyhow::Result<Child> {
    let child = Command::new(exe)
        .arg("worker")
        .arg(queue)
        .kill_on_drop(true)
        .spawn()?;
    Ok(child)
}

/// Waits for whichever child exits first, returning its index and queue
/// name. Each future borrows a disjoint element of the slice, so the
/// concurrent borrows are sound despite all running against one `&mut`.
async fn wait_any(children: &mut [(String, Child)]) -> (usize, String) {
    let futures = children.iter_mut().enumerate().map(|(index, (queue, child))| {
        let queue = queue.clone();
        Box::pin(async move {
            let _ = child.wait().await;
            (index, queue)
        })
    });
    let (result, _, _) = futures::future::select_all(futures).await;
    result
}
