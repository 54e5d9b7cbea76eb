//! Pagination types
//!
//! Pages, per-attempt fetch results, per-token failures and the traversal
//! state machine shared by the transport, the retry policy and the engine.

use crate::types::{display_token, ContinuationToken, JsonValue, RecordId};
use std::fmt;
use thiserror::Error;

/// One fetched page: a single record plus the token revealing its successor
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    id: RecordId,
    record: JsonValue,
    next_token: Option<ContinuationToken>,
}

impl Page {
    /// Create a page
    pub fn new(id: RecordId, record: JsonValue, next_token: Option<ContinuationToken>) -> Self {
        Self {
            id,
            record,
            next_token,
        }
    }

    /// Record identifier
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// The record as received, all fields included
    pub fn record(&self) -> &JsonValue {
        &self.record
    }

    /// Token of the next page, `None` at the end of the chain
    pub fn next_token(&self) -> Option<&ContinuationToken> {
        self.next_token.as_ref()
    }

    /// Split into record parts and the next token
    pub fn into_parts(self) -> (RecordId, JsonValue, Option<ContinuationToken>) {
        (self.id, self.record, self.next_token)
    }
}

/// Outcome of a single transport attempt
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// Page fetched and decoded
    Success(Page),
    /// Transient failure; the same token may be tried again
    RetryableFailure(String),
    /// Permanent failure for this token
    FatalFailure(String),
}

impl FetchResult {
    /// Check if this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Check if this failure may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryableFailure(_))
    }
}

/// Why a token could not be resolved to a page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Non-retryable response or malformed page
    #[error("fatal failure: {reason}")]
    Fatal { reason: String },

    /// Every attempt failed with a retryable failure
    #[error("retries exhausted after {attempts} attempts: {last_reason}")]
    ExhaustedRetries { attempts: u32, last_reason: String },

    /// The run was cancelled before the token resolved
    #[error("cancelled")]
    Cancelled,

    /// The worker task resolving the token died
    #[error("worker aborted: {reason}")]
    WorkerAborted { reason: String },
}

impl FetchFailure {
    /// Short machine-friendly name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fatal { .. } => "fatal",
            Self::ExhaustedRetries { .. } => "exhausted_retries",
            Self::Cancelled => "cancelled",
            Self::WorkerAborted { .. } => "worker_aborted",
        }
    }
}

/// A failure recorded against the token that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Token being resolved; `None` is the first page
    pub token: Option<ContinuationToken>,
    /// What went wrong
    pub failure: FetchFailure,
}

impl FailureRecord {
    /// Create a failure record
    pub fn new(token: Option<ContinuationToken>, failure: FetchFailure) -> Self {
        Self { token, failure }
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token {}: {}",
            display_token(self.token.as_ref()),
            self.failure
        )
    }
}

/// Where a single path of the token chain stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalState {
    /// Nothing requested yet
    Idle,
    /// A worker is resolving this token
    Fetching(Option<ContinuationToken>),
    /// Page absorbed; its successor token is known
    Chained(ContinuationToken),
    /// Page absorbed; no successor
    Terminal,
    /// Token could not be resolved; the chain stops here
    Failed(FetchFailure),
}

impl TraversalState {
    /// State reached once a fetch for some token has resolved
    pub fn resolve(outcome: &Result<Page, FetchFailure>) -> Self {
        match outcome {
            Ok(page) => match page.next_token() {
                Some(next) => Self::Chained(next.clone()),
                None => Self::Terminal,
            },
            Err(failure) => Self::Failed(failure.clone()),
        }
    }

    /// Check if this path is finished
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Terminal | Self::Failed(_))
    }
}

/// Statistics from a harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    /// Pages successfully fetched
    pub pages_fetched: usize,
    /// Unique records collected
    pub records: usize,
    /// Pages whose id was already collected (last write wins)
    pub duplicates: usize,
    /// Tokens that ended in a failure
    pub failures: usize,
    /// Next tokens skipped because they were already dispatched
    pub revisited_tokens: usize,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl HarvestStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fetched page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a failed token
    pub fn add_failure(&mut self) {
        self.failures += 1;
    }

    /// Add a revisited token
    pub fn add_revisited(&mut self) {
        self.revisited_tokens += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
