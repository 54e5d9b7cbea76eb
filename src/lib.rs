// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # chainfetch
//!
//! Harvests every record behind a cursor-paginated endpoint, where each page
//! holds one record and the token of the next page.
//!
//! ## Features
//!
//! - **Chain traversal**: Follows continuation tokens from the first page to the last
//! - **Bounded concurrency**: Fixed-size worker pool, never requests ahead of known tokens
//! - **Retry with backoff**: Busy responses retried `d, 2d, 4d, ...` up to a budget
//! - **Deduplication**: Records keyed by id, safe under concurrent completion
//! - **Reporting**: Category counts, most expensive and mean price
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chainfetch::{HarvestConfig, PaginationEngine, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = HarvestConfig::from_file("harvest.yaml")?;
//!     let outcome = PaginationEngine::from_harvest(&config)?.fetch_all().await;
//!
//!     println!("{} records, {} failures", outcome.records.len(), outcome.failures.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      PaginationEngine                           │
//! │  frontier of known tokens → JoinSet of `workers` tasks          │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Retry   │   HTTP    │    Decode     │ Collector │   Report    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Budget   │ GET       │ Id            │ Dedup     │ Counts      │
//! │ Backoff  │ Status    │ Next token    │ Failures  │ Max price   │
//! │ Cancel   │ Rate Limit│ Required      │           │ Mean price  │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Harvest configuration
pub mod config;

/// HTTP transport with rate limiting
pub mod http;

/// Page decoding
pub mod decode;

/// Retry and backoff
pub mod retry;

/// Token-chain traversal
pub mod pagination;

/// Deduplicating collector
pub mod collector;

/// JSON output
pub mod output;

/// Summary statistics
pub mod report;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use collector::{Collector, ResultSet};
pub use config::HarvestConfig;
pub use http::{HttpTransport, Transport};
pub use pagination::{FailureRecord, FetchFailure, FetchResult, HarvestOutcome, Page, PaginationEngine};
pub use retry::RetryPolicy;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
