//! The executor's plan-level scratch directory: distinct from P3's
//! container-scratch naming (`hoover_parse::temp_dir::make_temp_dir`) --
//! one directory per plan, one file per item, named by item hash.

use std::path::{Path, PathBuf};

/// `<base>/<dataset>/<plan_hash>/`, per C7 step 2.
pub fn plan_scratch_dir(base: &Path, dataset: &str, plan_hash: &str) -> PathBuf {
    base.join(dataset).join(plan_hash)
}

/// `<plan_dir>/<item_hash>`, the local download destination for one item.
pub fn item_scratch_path(plan_dir: &Path, item_hash: &str) -> PathBuf {
    plan_dir.join(item_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_dir_nests_dataset_then_plan_hash() {
        let base = Path::new("/tmp/hoover4");
        let dir = plan_scratch_dir(base, "ds1", "abc123");
        assert_eq!(dir, PathBuf::from("/tmp/hoover4/ds1/abc123"));
    }

    #[test]
    fn item_path_is_plan_dir_plus_hash() {
        let plan_dir = Path::new("/tmp/hoover4/ds1/abc123");
        assert_eq!(
            item_scratch_path(plan_dir, "itemhash"),
            PathBuf::from("/tmp/hoover4/ds1/abc123/itemhash")
        );
    }
}
