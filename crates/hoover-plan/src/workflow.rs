//! `compute_plans`: the planner's workflow entry point (C6, phase P1).

use crate::packing::pack_into_plans;
use hoover_engine::{execute_activity, ActivityOptions, TaskQueue, WorkflowError};
use hoover_store::StoreClient;
use std::time::Duration;

/// Streams every unplanned blob for `dataset` in ascending size order,
/// packs them into plans, and inserts each one. A second run over an
/// unchanged dataset is a no-op -- every blob it would stream already has a
/// `processing_plan_hits` row.
pub async fn compute_plans(store: &StoreClient, dataset: &str) -> Result<usize, WorkflowError> {
    let blobs = hoover_store::plan::unplanned_blobs_by_size(store, dataset)
        .await
        .map_err(app_err)?;
    if blobs.is_empty() {
        return Ok(0);
    }

    let timeout = activity_timeout(blobs.len());
    let options = ActivityOptions::new(timeout, TaskQueue::Common);
    let plans = pack_into_plans(dataset, &blobs);
    let plan_count = plans.len();

    for plan in plans {
        execute_activity("insert_plan", &options, || {
            let plan = plan.clone();
            async move { hoover_store::plan::insert_plan(store, &plan).await.map_err(app_err) }
        })
        .await?;
    }

    Ok(plan_count)
}

/// `60 s + ceil(blob_count / 4000) s`, the planner's throughput-derived
/// timeout (SPEC_FULL.md §4.5).
fn activity_timeout(blob_count: usize) -> Duration {
    let extra_secs = (blob_count as u64).div_ceil(4000);
    Duration::from_secs(60 + extra_secs)
}

fn app_err(e: hoover_store::StoreError) -> WorkflowError {
    WorkflowError::ApplicationError {
        message: e.to_string(),
        non_retryable: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_has_60s_floor() {
        assert_eq!(activity_timeout(0), Duration::from_secs(60));
        assert_eq!(activity_timeout(4000), Duration::from_secs(61));
        assert_eq!(activity_timeout(4001), Duration::from_secs(62));
        assert_eq!(activity_timeout(8000), Duration::from_secs(62));
    }
}
