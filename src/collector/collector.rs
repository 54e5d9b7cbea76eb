//! Thread-safe page collector

use super::result_set::ResultSet;
use crate::pagination::{FailureRecord, FetchFailure, Page};
use crate::types::ContinuationToken;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What absorbing a page did to the set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsorbOutcome {
    /// New id; `total` unique records so far
    Inserted { total: usize },
    /// Known id, record overwritten; `total` unchanged
    Replaced { total: usize },
}

impl AbsorbOutcome {
    /// Unique records after this absorb
    pub fn total(&self) -> usize {
        match self {
            Self::Inserted { total } | Self::Replaced { total } => *total,
        }
    }

    /// Check if the page replaced an existing record
    pub fn is_replaced(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }
}

#[derive(Debug, Default)]
struct CollectorState {
    records: ResultSet,
    failures: Vec<FailureRecord>,
}

/// Accumulates pages and failures from concurrent workers
///
/// The lock guards bookkeeping only and is never held across an `.await`.
#[derive(Debug, Default)]
pub struct Collector {
    state: Mutex<CollectorState>,
}

impl Collector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    // A panic cannot leave the state half-written: every critical section is a
    // single insert or push.
    fn lock(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a page's record; a repeated id overwrites (last write wins)
    pub fn absorb(&self, page: Page) -> AbsorbOutcome {
        let (id, record, _) = page.into_parts();
        let mut state = self.lock();
        let inserted = state.records.insert(id, record);
        let total = state.records.len();
        if inserted {
            AbsorbOutcome::Inserted { total }
        } else {
            AbsorbOutcome::Replaced { total }
        }
    }

    /// Log a failure against the token that produced it
    pub fn record_failure(&self, token: Option<ContinuationToken>, failure: FetchFailure) {
        self.lock().failures.push(FailureRecord::new(token, failure));
    }

    /// Unique records so far
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Check if nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Failures so far
    pub fn failure_count(&self) -> usize {
        self.lock().failures.len()
    }

    /// Snapshot of the failure log
    pub fn failures(&self) -> Vec<FailureRecord> {
        self.lock().failures.clone()
    }

    /// Take the finished result set and failure log, leaving the collector empty
    pub fn finalize(&self) -> (ResultSet, Vec<FailureRecord>) {
        let state = std::mem::take(&mut *self.lock());
        (state.records, state.failures)
    }
}
