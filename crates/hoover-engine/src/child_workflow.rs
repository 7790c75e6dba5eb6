use crate::error::WorkflowError;
use crate::queue::TaskQueue;
use md5::{Digest, Md5};
use serde::Serialize;
use std::future::Future;

#[derive(Debug, Clone)]
pub struct ChildWorkflowOptions {
    pub id: String,
    pub task_queue: TaskQueue,
}

/// Canonical-JSON-encodes `params` (keys sorted, no extraneous whitespace),
/// MD5-hashes the UTF-8 bytes, and formats `"{prefix}-{digest}"`. `serde_json`
/// serializes maps in key-sorted order by default (no `preserve_order`
/// feature enabled), which gives the canonical encoding for free.
///
/// MD5 digests are already exactly 32 hex characters, so "first 32 hex
/// characters" in the original is the whole digest, not a truncation.
pub fn child_workflow_id<P: Serialize>(prefix: &str, params: &P) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(params)?;
    let mut hasher = Md5::new();
    hasher.update(canonical.as_bytes());
    let digest = hex::encode(hasher.finalize());
    Ok(format!("{prefix}-{digest}"))
}

/// Runs the named child workflow to completion. `options.id` is a caller
/// supplied stable identity used for dedup/observability; this engine does
/// not persist workflow history across restarts, so `id` is not used for
/// replay suppression (see C11's documented simplification).
pub async fn execute_child_workflow<F, Fut, T>(
    workflow_name: &str,
    options: &ChildWorkflowOptions,
    f: F,
) -> Result<T, WorkflowError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, WorkflowError>>,
{
    tracing::info!(workflow = workflow_name, id = %options.id, "starting child workflow");
    f().await.map_err(|source| WorkflowError::ChildFailure {
        workflow: workflow_name.to_string(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Params {
        b: u32,
        a: u32,
    }

    #[test]
    fn id_is_deterministic_for_same_params() {
        let p1 = Params { a: 1, b: 2 };
        let p2 = Params { a: 1, b: 2 };
        let id1 = child_workflow_id("execute_single_plan", &p1).unwrap();
        let id2 = child_workflow_id("execute_single_plan", &p2).unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn id_has_prefix_and_32_hex_digest() {
        let id = child_workflow_id("parse_single_file", &Params { a: 1, b: 2 }).unwrap();
        let (prefix, digest) = id.rsplit_once('-').unwrap();
        assert_eq!(prefix, "parse_single_file");
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn differing_params_give_differing_ids() {
        let id1 = child_workflow_id("x", &Params { a: 1, b: 2 }).unwrap();
        let id2 = child_workflow_id("x", &Params { a: 9, b: 2 }).unwrap();
        assert_ne!(id1, id2);
    }
}
