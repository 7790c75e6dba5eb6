//! # hoover-execute
//!
//! The executor (C7, phase P2): drives processing plans to completion one
//! at a time -- download every plan item into a scratch directory, fan out
//! to P3's per-file parser, run P4 indexing over the finished plan, then
//! append the plan's commit row.

mod dispatch;
mod download;
mod scratch_dir;
mod workflow;

pub use dispatch::process_items_batched;
pub use download::{download_plan_items, download_timeout_secs, DownloadedItem};
pub use scratch_dir::{item_scratch_path, plan_scratch_dir};
pub use workflow::{execute_plans, execute_single_plan, ExecuteContext};
