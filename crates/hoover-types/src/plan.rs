use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// A plan may hold at most this many items.
pub const PLAN_MAX_ITEMS: usize = 1000;
/// A plan may total at most this many bytes, unless it holds a single
/// oversized item (single-item overflow plans are permitted).
pub const PLAN_MAX_BYTES: u64 = 1_000_000_000;

/// An immutable, size-bounded batch of blob hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingPlan {
    pub collection_dataset: String,
    pub plan_hash: String,
    pub item_hashes: Vec<String>,
    pub plan_size_bytes: u64,
}

/// Proof that a blob is covered by a specific plan; the planner's anti-set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanHit {
    pub collection_dataset: String,
    pub item_hash: String,
    pub plan_hash: String,
}

/// Marks a plan as fully executed and indexed; the plan's commit point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFinished {
    pub collection_dataset: String,
    pub plan_hash: String,
    pub finished_at_unix_ms: i64,
}

/// `plan_hash = sha1(json.dumps(sorted(item_hashes), separators=(",", ":")))`.
///
/// `hashes` must already be sorted by the caller (the planner streams blobs
/// in ascending size order and sorts the accumulated hash list before
/// calling this, exactly as the original `compute_plans` activity does).
pub fn plan_hash_of(sorted_hashes: &[String]) -> String {
    let payload = serde_json::to_string(sorted_hashes).expect("Vec<String> always serializes");
    let mut hasher = Sha1::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_hash_is_deterministic() {
        let hashes = vec!["bbb".to_string(), "aaa".to_string()];
        let mut sorted = hashes.clone();
        sorted.sort();
        let h1 = plan_hash_of(&sorted);
        let h2 = plan_hash_of(&sorted);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 40);
    }

    #[test]
    fn identical_sorted_lists_give_identical_hash() {
        let a = vec!["x".to_string(), "y".to_string()];
        let b = vec!["x".to_string(), "y".to_string()];
        assert_eq!(plan_hash_of(&a), plan_hash_of(&b));
    }

    #[test]
    fn matches_known_vector() {
        // json.dumps(["a"], separators=(",", ":")) == '["a"]'
        let expected_payload = "[\"a\"]";
        let mut hasher = Sha1::new();
        hasher.update(expected_payload.as_bytes());
        let expected = hex::encode(hasher.finalize());
        assert_eq!(plan_hash_of(&["a".to_string()]), expected);
    }
}
