//! Frontier engine - the round-based convergence loop
//!
//! Each round dispatches `known - attempted` through the concurrency gate and
//! waits for every dispatched identifier to settle. Discoveries are folded
//! into the known set as workers report back, but only become work in the
//! next round. The known set is snapshotted after every round. The loop ends
//! when a round has no work.

use crate::crawler::fetcher::DocumentFetcher;
use crate::crawler::gate::{ConcurrencyGate, GatePermit};
use crate::crawler::materializer::{MaterializeOutcome, Materializer};
use crate::identifier::Identifier;
use crate::output::{CrawlReport, FailedItem, RoundReport};
use crate::state::{FailureStage, FrontierState, ItemOutcome};
use crate::storage::FrontierStore;
use crate::HarvestError;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

/// Default number of successes between progress log lines
const DEFAULT_PROGRESS_INTERVAL: u64 = 50;

/// Drives the known set to a fixed point
pub struct FrontierEngine {
    fetcher: Arc<dyn DocumentFetcher>,
    materializer: Arc<Materializer>,
    gate: ConcurrencyGate,
    frontier_store: FrontierStore,
    progress_interval: u64,
}

impl FrontierEngine {
    /// Creates an engine
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Retrieves documents; called at most `gate.capacity()` times at once
    /// * `materializer` - Writes records and reports discoveries
    /// * `gate` - Bounds in-flight fetches
    /// * `frontier_store` - Receives a snapshot of the known set after every round
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        materializer: Arc<Materializer>,
        gate: ConcurrencyGate,
        frontier_store: FrontierStore,
    ) -> Self {
        Self {
            fetcher,
            materializer,
            gate,
            frontier_store,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Sets how many successes pass between progress log lines
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Runs rounds until one has no work
    ///
    /// Per-identifier failures are logged and reported but never abort the
    /// run. The only error returned is a failure to snapshot the frontier.
    pub async fn run(&self, initial: BTreeSet<Identifier>) -> Result<CrawlReport, HarvestError> {
        let mut report = CrawlReport::start(initial.len());
        if initial.is_empty() {
            tracing::info!("Known set is empty, nothing to harvest");
            return Ok(report.finish(0));
        }

        let mut state = FrontierState::new(initial);
        let mut successes: u64 = 0;

        tracing::info!(
            "Starting harvest: {} known identifiers, fetch capacity {}",
            state.known_len(),
            self.gate.capacity()
        );

        loop {
            let work = state.begin_round();
            if work.is_empty() {
                tracing::info!(
                    "Fixed point reached after {} rounds: {} identifiers known",
                    report.rounds.len(),
                    state.known_len()
                );
                break;
            }

            let number = report.rounds.len() + 1;
            tracing::info!("Round {}: dispatching {} identifiers", number, work.len());

            let round = self
                .run_round(number, work, &mut state, &mut successes)
                .await;

            self.frontier_store.snapshot(state.known())?;

            tracing::info!(
                "Round {} complete: {} succeeded, {} skipped, {} failed, {} new ({} known, {} succeeded overall)",
                number,
                round.succeeded,
                round.skipped,
                round.failures.len(),
                round.newly_discovered,
                round.known_after,
                successes
            );
            report.rounds.push(round);
        }

        Ok(report.finish(state.known_len()))
    }

    /// Dispatches one round's work and waits for all of it to settle
    async fn run_round(
        &self,
        number: usize,
        work: Vec<Identifier>,
        state: &mut FrontierState,
        successes: &mut u64,
    ) -> RoundReport {
        let mut round = RoundReport {
            number,
            dispatched: work.clone(),
            ..RoundReport::default()
        };
        let mut unsettled: HashSet<Identifier> = work.iter().cloned().collect();
        let mut queue = work.into_iter().peekable();
        let mut tasks: JoinSet<(Identifier, ItemOutcome)> = JoinSet::new();

        loop {
            tokio::select! {
                permit = self.gate.acquire(), if queue.peek().is_some() => {
                    if let Some(id) = queue.next() {
                        tracing::trace!(id = %id, in_flight = self.gate.in_flight(), "Dispatching");
                        tasks.spawn(process_identifier(
                            id,
                            Arc::clone(&self.fetcher),
                            Arc::clone(&self.materializer),
                            permit,
                        ));
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    match joined {
                        Ok((id, outcome)) => {
                            unsettled.remove(&id);
                            self.fold_outcome(id, outcome, state, &mut round, successes);
                        }
                        Err(e) => log_join_error(&e),
                    }
                }
                else => break,
            }
        }

        // Tasks that died before reporting still count as settled failures
        let mut lost: Vec<Identifier> = unsettled.into_iter().collect();
        lost.sort();
        for id in lost {
            self.fold_outcome(
                id,
                ItemOutcome::Failed {
                    stage: FailureStage::Task,
                    error: "worker task terminated before reporting".to_string(),
                },
                state,
                &mut round,
                successes,
            );
        }

        round.known_after = state.known_len();
        round
    }

    /// Applies one worker's outcome to the frontier and the round report
    fn fold_outcome(
        &self,
        id: Identifier,
        outcome: ItemOutcome,
        state: &mut FrontierState,
        round: &mut RoundReport,
        successes: &mut u64,
    ) {
        match outcome {
            ItemOutcome::Materialized { discovered } => {
                let new = state.absorb(&discovered);
                round.newly_discovered += new;
                round.succeeded += 1;
                *successes += 1;

                tracing::debug!(
                    id = %id,
                    discovered = discovered.len(),
                    new,
                    succeeded = *successes,
                    "Materialized record"
                );
                if *successes % self.progress_interval == 0 {
                    tracing::info!(
                        "Progress: {} succeeded, {} known",
                        successes,
                        state.known_len()
                    );
                }
            }
            ItemOutcome::AlreadyMaterialized => {
                round.skipped += 1;
                tracing::debug!(id = %id, "Record already present, skipped");
            }
            ItemOutcome::Failed { stage, error } => {
                tracing::warn!(id = %id, stage = %stage, error = %error, "Failed to harvest identifier");
                round.failures.push(FailedItem { id, stage, error });
            }
        }
    }
}

/// Runs one identifier through check, fetch, and materialize
///
/// The gate permit is held only for the presence check and the fetch. It is
/// dropped as soon as the fetch settles, whether it succeeded or not.
async fn process_identifier(
    id: Identifier,
    fetcher: Arc<dyn DocumentFetcher>,
    materializer: Arc<Materializer>,
    permit: GatePermit,
) -> (Identifier, ItemOutcome) {
    if materializer.is_materialized(&id) {
        drop(permit);
        return (id, ItemOutcome::AlreadyMaterialized);
    }

    let fetched = fetcher.fetch(&id).await;
    drop(permit);

    let body = match fetched {
        Ok(body) => body,
        Err(e) => {
            return (
                id,
                ItemOutcome::Failed {
                    stage: FailureStage::Fetch,
                    error: e.to_string(),
                },
            );
        }
    };

    let link = fetcher.address(&id);
    let task_id = id.clone();
    let materialized =
        tokio::task::spawn_blocking(move || materializer.materialize(&task_id, &link, &body))
            .await;

    let outcome = match materialized {
        Ok(Ok(MaterializeOutcome::Written { discovered })) => {
            ItemOutcome::Materialized { discovered }
        }
        Ok(Ok(MaterializeOutcome::AlreadyPresent)) => ItemOutcome::AlreadyMaterialized,
        Ok(Err(e)) => ItemOutcome::Failed {
            stage: FailureStage::Materialize,
            error: e.to_string(),
        },
        Err(e) => ItemOutcome::Failed {
            stage: FailureStage::Task,
            error: e.to_string(),
        },
    };

    (id, outcome)
}

fn log_join_error(e: &JoinError) {
    if e.is_panic() {
        tracing::error!("Worker task panicked: {}", e);
    } else {
        tracing::error!("Worker task cancelled: {}", e);
    }
}
