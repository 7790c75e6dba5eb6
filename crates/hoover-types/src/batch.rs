/// Anything that can report a byte size, for size-bounded batching.
pub trait SizedItem {
    fn size_bytes(&self) -> u64;
}

/// Slice `items` into contiguous chunks of at most `n`.
pub fn batch_seq<T: Clone>(items: &[T], n: usize) -> Vec<Vec<T>> {
    items.chunks(n.max(1)).map(|c| c.to_vec()).collect()
}

/// Pack items into batches bounded by both a max item count and a max total
/// byte size. A single item larger than `max_bytes` always becomes its own
/// batch. Ported from the original workflow's `_batch_files_by_size`.
pub fn batch_files_by_size<T: Clone + SizedItem>(
    items: &[T],
    max_count: usize,
    max_bytes: u64,
) -> Vec<Vec<T>> {
    let mut batches: Vec<Vec<T>> = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut current_bytes: u64 = 0;

    for item in items {
        let size = item.size_bytes();
        if size > max_bytes {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current_bytes = 0;
            }
            batches.push(vec![item.clone()]);
            continue;
        }
        if current.len() >= max_count || current_bytes + size > max_bytes {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
            }
            current = vec![item.clone()];
            current_bytes = size;
        } else {
            current.push(item.clone());
            current_bytes += size;
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct F(u64);
    impl SizedItem for F {
        fn size_bytes(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn batch_seq_splits_evenly() {
        let items: Vec<i32> = (0..25).collect();
        let batches = batch_seq(&items, 10);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].len(), 5);
    }

    #[test]
    fn batch_seq_empty() {
        let items: Vec<i32> = Vec::new();
        assert!(batch_seq(&items, 10).is_empty());
    }

    #[test]
    fn respects_max_count() {
        let items: Vec<F> = (0..5).map(|_| F(1)).collect();
        let batches = batch_files_by_size(&items, 2, 1_000_000);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn respects_max_bytes() {
        let items = vec![F(40), F(40), F(40)];
        let batches = batch_files_by_size(&items, 100, 50);
        assert_eq!(batches.len(), 3);
    }

    #[test]
    fn oversized_item_is_its_own_batch() {
        let items = vec![F(10), F(1000), F(10)];
        let batches = batch_files_by_size(&items, 100, 50);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[1], vec![F(1000)]);
    }
}
