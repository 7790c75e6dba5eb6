//! # hoover-plan
//!
//! The planner (C6, phase P1): greedy first-fit bin-packing of blobs that
//! have never been assigned to a plan, bounded by `PLAN_MAX_ITEMS`/
//! `PLAN_MAX_BYTES`.

mod packing;
mod workflow;

pub use packing::pack_into_plans;
pub use workflow::compute_plans;
