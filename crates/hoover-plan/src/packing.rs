//! Greedy first-fit bin-packing, pure and independent of I/O -- the
//! planner's actual decision logic, unit-testable without a store.

use hoover_types::{plan_hash_of, ProcessingPlan, PLAN_MAX_BYTES, PLAN_MAX_ITEMS};

/// Packs `blobs` (already streamed in ascending-size order, per the
/// planner's contract) into plans bounded by `PLAN_MAX_ITEMS` and
/// `PLAN_MAX_BYTES`. A single blob over `PLAN_MAX_BYTES` becomes its own
/// plan rather than being rejected.
pub fn pack_into_plans(dataset: &str, blobs: &[(String, u64)]) -> Vec<ProcessingPlan> {
    let mut plans = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_bytes: u64 = 0;

    for (hash, size) in blobs {
        if *size > PLAN_MAX_BYTES {
            flush(dataset, &mut current, &mut current_bytes, &mut plans);
            plans.push(build_plan(dataset, vec![hash.clone()], *size));
            continue;
        }
        if current.len() >= PLAN_MAX_ITEMS || current_bytes + size > PLAN_MAX_BYTES {
            flush(dataset, &mut current, &mut current_bytes, &mut plans);
        }
        current.push(hash.clone());
        current_bytes += size;
    }
    flush(dataset, &mut current, &mut current_bytes, &mut plans);

    plans
}

fn flush(dataset: &str, current: &mut Vec<String>, current_bytes: &mut u64, plans: &mut Vec<ProcessingPlan>) {
    if current.is_empty() {
        return;
    }
    let hashes = std::mem::take(current);
    let bytes = std::mem::take(current_bytes);
    plans.push(build_plan(dataset, hashes, bytes));
}

fn build_plan(dataset: &str, mut hashes: Vec<String>, size: u64) -> ProcessingPlan {
    hashes.sort();
    let plan_hash = plan_hash_of(&hashes);
    ProcessingPlan {
        collection_dataset: dataset.to_string(),
        plan_hash,
        item_hashes: hashes,
        plan_size_bytes: size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_plans() {
        assert!(pack_into_plans("ds", &[]).is_empty());
    }

    #[test]
    fn single_small_blob_is_one_plan() {
        let blobs = vec![("a".to_string(), 10u64)];
        let plans = pack_into_plans("ds", &blobs);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].item_hashes, vec!["a".to_string()]);
        assert_eq!(plans[0].plan_size_bytes, 10);
    }

    #[test]
    fn flushes_at_max_items() {
        let blobs: Vec<(String, u64)> = (0..(PLAN_MAX_ITEMS + 5))
            .map(|i| (format!("h{i}"), 1u64))
            .collect();
        let plans = pack_into_plans("ds", &blobs);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].item_hashes.len(), PLAN_MAX_ITEMS);
        assert_eq!(plans[1].item_hashes.len(), 5);
    }

    #[test]
    fn flushes_at_max_bytes() {
        let blobs = vec![
            ("a".to_string(), PLAN_MAX_BYTES - 10),
            ("b".to_string(), 20u64),
        ];
        let plans = pack_into_plans("ds", &blobs);
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn oversized_blob_is_its_own_plan() {
        let blobs = vec![
            ("small".to_string(), 10u64),
            ("huge".to_string(), PLAN_MAX_BYTES + 1),
            ("small2".to_string(), 10u64),
        ];
        let plans = pack_into_plans("ds", &blobs);
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[1].item_hashes, vec!["huge".to_string()]);
        assert_eq!(plans[1].plan_size_bytes, PLAN_MAX_BYTES + 1);
    }

    #[test]
    fn plan_hash_is_over_sorted_hashes() {
        let blobs = vec![("z".to_string(), 1u64), ("a".to_string(), 1u64)];
        let plans = pack_into_plans("ds", &blobs);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].item_hashes, vec!["a".to_string(), "z".to_string()]);
    }
}
