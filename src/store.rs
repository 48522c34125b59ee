//! The name store: serving corpus, filter pipeline and recent decision history.
//!
//! A [`NameStore`] is built once at startup from already-loaded candidates. Every candidate is
//! classified by the standard pipeline (seeding the history buffers as it goes); survivors form
//! the serving corpus, whose length distribution then parameterizes the length rule appended
//! to the pipeline. After construction the corpus and pipeline are immutable, so only the
//! history buffers and the random source need locking.

use crate::filters::{
    Filter, LengthStatistics, StatsError, compute_length_statistics, length_filter, run_filters,
};
use crate::history::HistoryBuffer;
use crate::metrics::{MetricsSnapshot, StoreMetrics};
use parking_lot::{Mutex, RwLock};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;

/// Default number of names retained per history buffer.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
/// Default length threshold, in standard deviations above the mean.
pub const DEFAULT_MAX_DIST: f64 = 2.0;

/// Errors that prevent a store from being built.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No candidate survived the pipeline, so there is nothing to generate from.
    #[error("no candidate name passed the filters; the serving corpus would be empty")]
    EmptyCorpus,
    /// Length statistics could not be derived from the accepted corpus.
    #[error("failed to derive length statistics: {0}")]
    Statistics(#[from] StatsError),
}

/// Inputs for [`NameStore::new`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Raw candidate names, in source order.
    pub candidates: Vec<String>,
    /// Ordered pipeline, without the length rule.
    pub filters: Vec<Filter>,
    /// Capacity of each history buffer.
    pub history_capacity: usize,
    /// Length threshold, in standard deviations above the mean.
    pub max_dist: f64,
}

impl StoreConfig {
    /// Configuration with default history capacity and threshold.
    pub fn new(candidates: Vec<String>, filters: Vec<Filter>) -> Self {
        Self {
            candidates,
            filters,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_dist: DEFAULT_MAX_DIST,
        }
    }
}

/// Classification of a single name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// True when no filter produced a reason.
    pub accepted: bool,
    /// Every rejection reason, in pipeline order.
    pub reasons: Vec<String>,
}

impl Validation {
    fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            accepted: reasons.is_empty(),
            reasons,
        }
    }
}

/// Recent decisions, oldest first within each list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct History {
    /// Recently accepted names.
    pub accepted: Vec<String>,
    /// Recently rejected names.
    pub rejected: Vec<String>,
}

/// Operations the HTTP layer needs from a store.
pub trait NameApi: Send + Sync {
    /// Pick a name from the serving corpus.
    fn generate(&self) -> String;
    /// Classify `candidate` and record it in the matching history.
    fn validate(&self, candidate: &str) -> Validation;
    /// Return up to `count` recent entries from each history.
    fn recent_history(&self, count: usize) -> History;
    /// Return activity counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

struct Histories {
    accepted: HistoryBuffer,
    rejected: HistoryBuffer,
}

impl Histories {
    fn record(&mut self, name: &str, accepted: bool) {
        if accepted {
            self.accepted.enqueue(name);
        } else {
            self.rejected.enqueue(name);
        }
    }
}

/// Shared, concurrently accessible name store.
///
/// Construct it once and share it through an `Arc`.
pub struct NameStore {
    corpus: Vec<String>,
    filters: Vec<Filter>,
    statistics: LengthStatistics,
    max_dist: f64,
    rng: Mutex<StdRng>,
    history: RwLock<Histories>,
    metrics: StoreMetrics,
}

impl NameStore {
    /// Build a store seeded from OS entropy.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Build a store drawing from the supplied random source.
    pub fn with_rng(config: StoreConfig, rng: StdRng) -> Result<Self, StoreError> {
        let StoreConfig {
            candidates,
            mut filters,
            history_capacity,
            max_dist,
        } = config;

        let mut history = Histories {
            accepted: HistoryBuffer::new(history_capacity),
            rejected: HistoryBuffer::new(history_capacity),
        };

        let mut corpus = Vec::new();
        for candidate in candidates {
            let reasons = run_filters(&filters, &candidate);
            history.record(&candidate, reasons.is_empty());
            if reasons.is_empty() {
                corpus.push(candidate);
            } else {
                tracing::debug!(
                    pkgname = %candidate,
                    reasons = %reasons.join("\n"),
                    "Rejecting name from source"
                );
            }
        }

        if corpus.is_empty() {
            return Err(StoreError::EmptyCorpus);
        }

        let statistics = compute_length_statistics(&corpus)?;
        tracing::info!(
            names = corpus.len(),
            mean = statistics.mean,
            stdev = statistics.stdev,
            max_length = statistics.max_length(max_dist),
            "Derived name length statistics"
        );
        filters.push(length_filter(statistics, max_dist));

        Ok(Self {
            corpus,
            filters,
            statistics,
            max_dist,
            rng: Mutex::new(rng),
            history: RwLock::new(history),
            metrics: StoreMetrics::new(),
        })
    }

    /// Pick a name from the serving corpus uniformly at random.
    pub fn generate(&self) -> String {
        let index = self.rng.lock().gen_range(0..self.corpus.len());
        self.metrics.record_generated();
        self.corpus[index].clone()
    }

    /// Run `candidate` through the whole pipeline and record it in the matching history.
    pub fn validate(&self, candidate: &str) -> Validation {
        let validation = Validation::from_reasons(run_filters(&self.filters, candidate));
        self.history.write().record(candidate, validation.accepted);
        self.metrics.record_validation(validation.accepted);
        tracing::debug!(
            pkgname = candidate,
            accepted = validation.accepted,
            reasons = validation.reasons.len(),
            "Validated name"
        );
        validation
    }

    /// Return up to `count` of the newest entries from each history, oldest first.
    pub fn recent_history(&self, count: usize) -> History {
        let history = self.history.read();
        History {
            accepted: history.accepted.last(count),
            rejected: history.rejected.last(count),
        }
    }

    /// The serving corpus, in source order.
    pub fn corpus(&self) -> &[String] {
        &self.corpus
    }

    /// Length statistics frozen at construction.
    pub fn statistics(&self) -> LengthStatistics {
        self.statistics
    }

    /// Length threshold in standard deviations.
    pub fn max_dist(&self) -> f64 {
        self.max_dist
    }

    /// Names of the pipeline's filters, in evaluation order.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(Filter::name).collect()
    }

    /// Return the current activity counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl NameApi for NameStore {
    fn generate(&self) -> String {
        NameStore::generate(self)
    }

    fn validate(&self, candidate: &str) -> Validation {
        NameStore::validate(self, candidate)
    }

    fn recent_history(&self, count: usize) -> History {
        NameStore::recent_history(self, count)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        NameStore::metrics_snapshot(self)
    }
}
