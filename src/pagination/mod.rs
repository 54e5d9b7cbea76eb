//! Pagination module
//!
//! Cursor-chain traversal: every page carries one record and, unless it is
//! the last page, the opaque token of its successor.
//!
//! # Overview
//!
//! - `PaginationEngine` - Follows the chain over a bounded worker pool
//! - `Page`, `FetchResult`, `FetchFailure` - What a single token resolves to
//! - `TraversalState` - Per-token state machine
//! - `HarvestOutcome`, `HarvestStats` - What a run produced

mod engine;
mod types;

pub use engine::{HarvestOutcome, PaginationEngine, DEFAULT_WORKERS};
pub use types::{FailureRecord, FetchFailure, FetchResult, HarvestStats, Page, TraversalState};
