use crate::client::StoreClient;
use crate::error::StoreError;
use clickhouse::Row;
use hoover_types::{PlanFinished, PlanHit, ProcessingPlan};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct ProcessingPlanRow {
    collection_dataset: String,
    plan_hash: String,
    item_hashes: Vec<String>,
    plan_size_bytes: u64,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct PlanHitRow {
    collection_dataset: String,
    item_hash: String,
    plan_hash: String,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct PlanFinishedRow {
    collection_dataset: String,
    plan_hash: String,
    finished_at_unix_ms: i64,
}

/// Inserts the plan row plus one hit row per item, in a single call -- the
/// planner flushes a plan only once it is fully accumulated, so there is no
/// partial-plan state to guard against.
pub async fn insert_plan(
    client: &StoreClient,
    plan: &ProcessingPlan,
) -> Result<(), StoreError> {
    let plan_row = ProcessingPlanRow {
        collection_dataset: plan.collection_dataset.clone(),
        plan_hash: plan.plan_hash.clone(),
        item_hashes: plan.item_hashes.clone(),
        plan_size_bytes: plan.plan_size_bytes,
    };
    let mut insert = client.inner.insert("processing_plans")?;
    insert.write(&plan_row).await?;
    insert.end().await?;

    let mut insert = client.inner.insert("processing_plan_hits")?;
    for item_hash in &plan.item_hashes {
        let hit = PlanHit {
            collection_dataset: plan.collection_dataset.clone(),
            item_hash: item_hash.clone(),
            plan_hash: plan.plan_hash.clone(),
        };
        let wire = PlanHitRow {
            collection_dataset: hit.collection_dataset,
            item_hash: hit.item_hash,
            plan_hash: hit.plan_hash,
        };
        insert.write(&wire).await?;
    }
    insert.end().await?;
    Ok(())
}

/// Count blobs that exist for `dataset` but have no `processing_plan_hits`
/// row -- the planner's "is there anything new to plan" check.
pub async fn count_unplanned_blobs(client: &StoreClient, dataset: &str) -> Result<u64, StoreError> {
    let rows: Vec<u64> = client
        .inner
        .query(
            "SELECT count() FROM blobs b \
             LEFT ANTI JOIN processing_plan_hits h \
             ON b.collection_dataset = h.collection_dataset AND b.blob_hash = h.item_hash \
             WHERE b.collection_dataset = ?",
        )
        .bind(dataset)
        .fetch_all()
        .await?;
    Ok(rows.into_iter().next().unwrap_or(0))
}

/// Blobs absent from `processing_plan_hits`, streamed in ascending size
/// order -- exactly the planner's bin-packing input order.
pub async fn unplanned_blobs_by_size(
    client: &StoreClient,
    dataset: &str,
) -> Result<Vec<(String, u64)>, StoreError> {
    let rows: Vec<(String, u64)> = client
        .inner
        .query(
            "SELECT b.blob_hash, b.size FROM blobs b \
             LEFT ANTI JOIN processing_plan_hits h \
             ON b.collection_dataset = h.collection_dataset AND b.blob_hash = h.item_hash \
             WHERE b.collection_dataset = ? ORDER BY b.size ASC",
        )
        .bind(dataset)
        .fetch_all()
        .await?;
    Ok(rows)
}

/// Up to 1001 pending plan hashes above `starting_plan_hash`, ordered so the
/// caller can truncate to 1000 and keep the 1001st as a continuation
/// cursor, per C7 step 1.
pub async fn list_pending_plans(
    client: &StoreClient,
    dataset: &str,
    starting_plan_hash: Option<&str>,
) -> Result<Vec<String>, StoreError> {
    let cursor = starting_plan_hash.unwrap_or("");
    let rows: Vec<String> = client
        .inner
        .query(
            "SELECT p.plan_hash FROM processing_plans p \
             LEFT ANTI JOIN processing_plan_finished f \
             ON p.collection_dataset = f.collection_dataset AND p.plan_hash = f.plan_hash \
             WHERE p.collection_dataset = ? AND p.plan_hash > ? \
             ORDER BY p.plan_hash ASC LIMIT 1001",
        )
        .bind(dataset)
        .bind(cursor)
        .fetch_all()
        .await?;
    Ok(rows)
}

pub async fn get_plan(
    client: &StoreClient,
    dataset: &str,
    plan_hash: &str,
) -> Result<Option<ProcessingPlan>, StoreError> {
    let rows: Vec<ProcessingPlanRow> = client
        .inner
        .query(
            "SELECT collection_dataset, plan_hash, item_hashes, plan_size_bytes \
             FROM processing_plans WHERE collection_dataset = ? AND plan_hash = ? LIMIT 1",
        )
        .bind(dataset)
        .bind(plan_hash)
        .fetch_all()
        .await?;
    Ok(rows.into_iter().next().map(|r| ProcessingPlan {
        collection_dataset: r.collection_dataset,
        plan_hash: r.plan_hash,
        item_hashes: r.item_hashes,
        plan_size_bytes: r.plan_size_bytes,
    }))
}

/// The plan's commit point: P2 appends this only after P3 dispatch and P4
/// indexing have both completed for the plan.
pub async fn mark_finished(
    client: &StoreClient,
    finished: &PlanFinished,
) -> Result<(), StoreError> {
    let row = PlanFinishedRow {
        collection_dataset: finished.collection_dataset.clone(),
        plan_hash: finished.plan_hash.clone(),
        finished_at_unix_ms: finished.finished_at_unix_ms,
    };
    let mut insert = client.inner.insert("processing_plan_finished")?;
    insert.write(&row).await?;
    insert.end().await?;
    Ok(())
}

/// Splits up to 1001 rows from [`list_pending_plans`] into the page to
/// execute now (<=1000) and an optional continuation cursor (C7 step 1).
pub fn split_continuation(mut pending: Vec<String>) -> (Vec<String>, Option<String>) {
    if pending.len() > 1000 {
        let cursor = pending.pop();
        (pending, cursor)
    } else {
        (pending, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_continuation_when_at_or_under_limit() {
        let pending: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
        let (page, cursor) = split_continuation(pending.clone());
        assert_eq!(page.len(), 1000);
        assert!(cursor.is_none());
    }

    #[test]
    fn continuation_cursor_is_the_1001st_item() {
        let pending: Vec<String> = (0..1001).map(|i| i.to_string()).collect();
        let (page, cursor) = split_continuation(pending);
        assert_eq!(page.len(), 1000);
        assert_eq!(cursor, Some("1000".to_string()));
    }
}
