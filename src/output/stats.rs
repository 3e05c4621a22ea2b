//! Run reports and dataset statistics
//!
//! This module provides the per-round report produced by the engine, plus
//! statistics about the dataset on disk, and prints both.

use crate::identifier::Identifier;
use crate::state::FailureStage;
use crate::storage::{FrontierStore, RecordStore};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// An identifier that failed during a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub id: Identifier,
    pub stage: FailureStage,
    pub error: String,
}

/// What happened during one round
#[derive(Debug, Clone, Default)]
pub struct RoundReport {
    /// 1-based round number
    pub number: usize,

    /// Identifiers dispatched this round, in dispatch order
    pub dispatched: Vec<Identifier>,

    /// Records written this round
    pub succeeded: usize,

    /// Identifiers whose record already existed
    pub skipped: usize,

    /// Identifiers that failed, with stage and error
    pub failures: Vec<FailedItem>,

    /// Identifiers added to the known set by this round
    pub newly_discovered: usize,

    /// Size of the known set once the round settled
    pub known_after: usize,
}

/// Summary of a run to convergence
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Size of the known set the run started from
    pub initial_known: usize,

    /// Size of the known set at the fixed point
    pub final_known: usize,

    /// One entry per executed round; the terminating empty round is not included
    pub rounds: Vec<RoundReport>,
}

impl CrawlReport {
    /// Starts a report for a run beginning with `initial_known` identifiers
    pub fn start(initial_known: usize) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            initial_known,
            final_known: initial_known,
            rounds: Vec::new(),
        }
    }

    /// Marks the run as finished at the fixed point
    pub fn finish(mut self, final_known: usize) -> Self {
        self.final_known = final_known;
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn total_dispatched(&self) -> usize {
        self.rounds.iter().map(|r| r.dispatched.len()).sum()
    }

    pub fn total_succeeded(&self) -> usize {
        self.rounds.iter().map(|r| r.succeeded).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.rounds.iter().map(|r| r.skipped).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.rounds.iter().map(|r| r.failures.len()).sum()
    }

    /// Failure counts keyed by stage
    pub fn failures_by_stage(&self) -> HashMap<FailureStage, usize> {
        let mut counts = HashMap::new();
        for failure in self.rounds.iter().flat_map(|r| &r.failures) {
            *counts.entry(failure.stage).or_insert(0) += 1;
        }
        counts
    }

    /// Wall-clock duration, if finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints a run report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Harvest Report ===\n");

    println!("Overview:");
    println!("  Started: {}", report.started_at.to_rfc3339());
    if let Some(seconds) = report.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!(
        "  Known identifiers: {} -> {}",
        report.initial_known, report.final_known
    );
    println!("  Rounds: {}", report.rounds.len());
    println!();

    if !report.rounds.is_empty() {
        println!("Rounds:");
        println!(
            "  {:>5} {:>10} {:>10} {:>8} {:>8} {:>8} {:>10}",
            "round", "dispatched", "succeeded", "skipped", "failed", "new", "known"
        );
        for round in &report.rounds {
            println!(
                "  {:>5} {:>10} {:>10} {:>8} {:>8} {:>8} {:>10}",
                round.number,
                round.dispatched.len(),
                round.succeeded,
                round.skipped,
                round.failures.len(),
                round.newly_discovered,
                round.known_after
            );
        }
        println!();
    }

    let by_stage = report.failures_by_stage();
    if !by_stage.is_empty() {
        println!("Failure Summary:");
        let mut stage_counts: Vec<_> = by_stage.iter().collect();
        stage_counts.sort_by(|a, b| b.1.cmp(a.1));
        for (stage, count) in stage_counts {
            println!("  {}: {}", stage, count);
        }
        println!();
    }

    println!(
        "Succeeded: {}, skipped: {}, failed: {} (of {} dispatched)",
        report.total_succeeded(),
        report.total_skipped(),
        report.total_failed(),
        report.total_dispatched()
    );
}

/// Coverage of the dataset on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStatistics {
    /// Identifiers in the frontier file
    pub known: usize,

    /// Record files present
    pub materialized: usize,

    /// Known identifiers that have no record yet
    pub pending: usize,
}

impl DatasetStatistics {
    /// Percentage of known identifiers with a record
    pub fn coverage(&self) -> f64 {
        if self.known == 0 {
            0.0
        } else {
            ((self.known - self.pending) as f64 / self.known as f64) * 100.0
        }
    }
}

/// Loads dataset statistics from the frontier file and the record store
pub fn load_dataset_statistics(
    frontier: &FrontierStore,
    store: &dyn RecordStore,
) -> Result<DatasetStatistics, HarvestError> {
    let known = frontier.load()?;
    let materialized = store.list()?;
    let pending = known.iter().filter(|id| !store.contains(id)).count();

    Ok(DatasetStatistics {
        known: known.len(),
        materialized: materialized.len(),
        pending,
    })
}

/// Prints dataset statistics to stdout
pub fn print_dataset_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");
    println!("  Known identifiers: {}", stats.known);
    println!("  Records on disk: {}", stats.materialized);
    println!("  Pending: {}", stats.pending);
    println!("  Coverage: {:.1}%", stats.coverage());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsRecordStore;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn id(token: &str) -> Identifier {
        Identifier::from_token(token).unwrap()
    }

    #[test]
    fn test_report_totals() {
        let mut report = CrawlReport::start(1);
        report.rounds.push(RoundReport {
            number: 1,
            dispatched: vec![id("A000001")],
            succeeded: 1,
            newly_discovered: 2,
            known_after: 3,
            ..RoundReport::default()
        });
        report.rounds.push(RoundReport {
            number: 2,
            dispatched: vec![id("A000002"), id("A000003")],
            succeeded: 1,
            skipped: 0,
            failures: vec![FailedItem {
                id: id("A000003"),
                stage: FailureStage::Fetch,
                error: "HTTP 500".to_string(),
            }],
            newly_discovered: 0,
            known_after: 3,
        });
        let report = report.finish(3);

        assert_eq!(report.total_dispatched(), 3);
        assert_eq!(report.total_succeeded(), 2);
        assert_eq!(report.total_failed(), 1);
        assert_eq!(report.failures_by_stage().get(&FailureStage::Fetch), Some(&1));
        assert!(report.finished_at.is_some());
        assert_eq!(report.final_known, 3);
    }

    #[test]
    fn test_coverage() {
        let stats = DatasetStatistics {
            known: 4,
            materialized: 3,
            pending: 1,
        };
        assert!((stats.coverage() - 75.0).abs() < f64::EPSILON);

        let empty = DatasetStatistics {
            known: 0,
            materialized: 0,
            pending: 0,
        };
        assert_eq!(empty.coverage(), 0.0);
    }

    #[test]
    fn test_load_dataset_statistics() {
        let tmp = TempDir::new().unwrap();
        let frontier = FrontierStore::new(tmp.path().join("list.json"));
        let store = FsRecordStore::open(&tmp.path().join("data")).unwrap();

        let known: BTreeSet<Identifier> = [id("A000001"), id("A000002")].into_iter().collect();
        frontier.snapshot(&known).unwrap();
        std::fs::write(store.path_for(&id("A000001")), b"{}").unwrap();

        let stats = load_dataset_statistics(&frontier, &store).unwrap();
        assert_eq!(
            stats,
            DatasetStatistics {
                known: 2,
                materialized: 1,
                pending: 1,
            }
        );
    }
}
