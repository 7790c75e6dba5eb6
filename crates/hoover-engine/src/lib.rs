//! # hoover-engine
//!
//! The durable engine (C11): the only place in the repo that implements
//! the activities/retries/child-workflows/timers/stable-IDs contract every
//! phase (P0-P4) is written against. Phases never perform raw I/O directly
//! -- they call `execute_activity`/`execute_child_workflow`, which this
//! crate dispatches with bounded per-queue concurrency.
//!
//! Deterministic replay is approximated, not literally implemented: every
//! phase's durable state lives in the columnar store itself (idempotent
//! upserts, anti-joins), so a killed-and-rerun workflow converges to the
//! same end-state without this engine needing to persist workflow history.

mod activity;
mod child_workflow;
mod error;
mod queue;
mod retry;
mod timer;

pub use activity::{execute_activity, ActivityOptions};
pub use child_workflow::{child_workflow_id, execute_child_workflow, ChildWorkflowOptions};
pub use error::{render_error_chain, WorkflowError};
pub use queue::{TaskQueue, WorkerPool};
pub use retry::RetryPolicy;
pub use timer::timer;
