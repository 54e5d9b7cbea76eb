//! Token-chain traversal over a bounded worker pool

use super::types::{FailureRecord, FetchFailure, HarvestStats, TraversalState};
use crate::collector::{AbsorbOutcome, Collector, ResultSet};
use crate::config::HarvestConfig;
use crate::error::Result;
use crate::http::{HttpTransport, Transport};
use crate::retry::RetryPolicy;
use crate::types::{display_token, ContinuationToken};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default worker pool size
pub const DEFAULT_WORKERS: usize = 5;

/// Everything a harvest produced
#[derive(Debug, Clone, Default)]
pub struct HarvestOutcome {
    /// Deduplicated records
    pub records: ResultSet,
    /// One entry per token that could not be resolved
    pub failures: Vec<FailureRecord>,
    /// Run statistics
    pub stats: HarvestStats,
}

impl HarvestOutcome {
    /// Check if the chain was followed to its end without failures
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Follows a continuation-token chain to its end
///
/// Only tokens revealed by an absorbed page are ever fetched; the pool lets
/// slow retry cycles overlap but never guesses tokens ahead of the frontier.
pub struct PaginationEngine {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    workers: usize,
    cancel: CancellationToken,
}

impl fmt::Debug for PaginationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationEngine")
            .field("policy", &self.policy)
            .field("workers", &self.workers)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl PaginationEngine {
    /// Create an engine with the default pool size
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            workers: DEFAULT_WORKERS,
            cancel: CancellationToken::new(),
        }
    }

    /// Build the HTTP transport, retry policy and pool size from configuration
    pub fn from_harvest(config: &HarvestConfig) -> Result<Self> {
        let transport = HttpTransport::from_harvest(config)?;
        Ok(Self::new(Arc::new(transport), RetryPolicy::from_config(&config.retry))
            .with_workers(config.engine.workers))
    }

    /// Set the pool size (at least one)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Use an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the harvest when cancelled
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Pool size
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Traverse the chain from the first page until no path is left
    pub async fn fetch_all(&self) -> HarvestOutcome {
        self.traverse(vec![None]).await
    }

    /// Traverse every path starting at `seeds`
    ///
    /// At most `workers` tokens are in flight at once; the rest wait in the
    /// frontier in seed order.
    pub(crate) async fn traverse(&self, seeds: Vec<Option<ContinuationToken>>) -> HarvestOutcome {
        let started = Instant::now();
        let collector = Arc::new(Collector::new());
        let worker = Worker {
            transport: Arc::clone(&self.transport),
            policy: self.policy.clone(),
            cancel: self.cancel.clone(),
            collector: Arc::clone(&collector),
            started,
        };

        let mut stats = HarvestStats::new();
        let mut seen: HashSet<ContinuationToken> = seeds.iter().flatten().cloned().collect();
        let mut frontier: VecDeque<Option<ContinuationToken>> = seeds.into();
        let mut in_flight: HashMap<task::Id, TraversalState> = HashMap::new();
        let mut tasks: JoinSet<TraversalState> = JoinSet::new();

        info!("Starting harvest with {} workers", self.workers);

        loop {
            if self.cancel.is_cancelled() && !frontier.is_empty() {
                warn!(
                    "Harvest cancelled, {} undispatched token(s) dropped",
                    frontier.len()
                );
                for token in frontier.drain(..) {
                    collector.record_failure(token, FetchFailure::Cancelled);
                    stats.add_failure();
                }
            }

            while tasks.len() < self.workers {
                let Some(token) = frontier.pop_front() else {
                    break;
                };
                debug!("Dispatching token {}", display_token(token.as_ref()));
                let handle = tasks.spawn(worker.clone().resolve(token.clone()));
                in_flight.insert(handle.id(), TraversalState::Fetching(token));
            }

            let Some(joined) = tasks.join_next_with_id().await else {
                break;
            };

            match joined {
                Ok((id, state)) => {
                    in_flight.remove(&id);
                    match state {
                        TraversalState::Chained(next) => {
                            stats.add_page();
                            if seen.insert(next.clone()) {
                                frontier.push_back(Some(next));
                            } else {
                                warn!("Token {} was already visited, path ends here", next);
                                stats.add_revisited();
                            }
                        }
                        TraversalState::Terminal => {
                            stats.add_page();
                            debug!("Reached the end of the chain");
                        }
                        TraversalState::Failed(_) => stats.add_failure(),
                        TraversalState::Idle | TraversalState::Fetching(_) => {}
                    }
                }
                Err(join_error) => {
                    let token = match in_flight.remove(&join_error.id()) {
                        Some(TraversalState::Fetching(token)) => token,
                        _ => None,
                    };
                    error!(
                        "Worker for token {} aborted: {}",
                        display_token(token.as_ref()),
                        join_error
                    );
                    collector.record_failure(
                        token,
                        FetchFailure::WorkerAborted {
                            reason: join_error.to_string(),
                        },
                    );
                    stats.add_failure();
                }
            }
        }

        let (records, failures) = collector.finalize();
        stats.records = records.len();
        stats.duplicates = stats.pages_fetched.saturating_sub(records.len());
        stats.set_duration(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));

        info!(
            "Harvest finished: {} records, {} failures in {:.2}s",
            stats.records,
            stats.failures,
            started.elapsed().as_secs_f64()
        );

        HarvestOutcome {
            records,
            failures,
            stats,
        }
    }
}

/// State handed to every pool task
#[derive(Clone)]
struct Worker {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    cancel: CancellationToken,
    collector: Arc<Collector>,
    started: Instant,
}

impl Worker {
    /// Run one retry cycle for `token` and absorb or record its outcome
    async fn resolve(self, token: Option<ContinuationToken>) -> TraversalState {
        let outcome = self
            .policy
            .fetch_with_retry(self.transport.as_ref(), token.as_ref(), &self.cancel)
            .await;
        let state = TraversalState::resolve(&outcome);

        match outcome {
            Ok(page) => {
                let id = page.id().clone();
                let absorbed = self.collector.absorb(page);
                if let AbsorbOutcome::Replaced { .. } = absorbed {
                    debug!("Record {} seen again, keeping the latest copy", id);
                }
                info!(
                    "Time: {:.2}s, record {}, total records: {}",
                    self.started.elapsed().as_secs_f64(),
                    id,
                    absorbed.total()
                );
            }
            Err(failure) => {
                error!(
                    "Chain stopped at token {}: {}",
                    display_token(token.as_ref()),
                    failure
                );
                self.collector.record_failure(token, failure);
            }
        }

        state
    }
}
