//! Bounded execution history and per-step aggregate counters.
//!
//! The store owns two pieces of shared state: a FIFO history of finished
//! runs (capacity 50, oldest evicted first) and monotonically growing
//! success/failure counters per stage name. In-flight runs live in an
//! [`ExecutionHandle`] owned by the caller, so concurrent runs cannot
//! corrupt each other's step attribution; only aggregate bumps and the
//! final history append touch the shared state, under a lock.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{ExecutionRecord, RunStatus, StepOutcome, StepRecord};

use super::system::{ResourceMonitor, SystemSample};

/// Maximum number of finished runs kept in history
pub const HISTORY_CAPACITY: usize = 50;

/// Running counters for one stage name
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StepCounters {
    /// Times the stage ran (success + failure)
    pub total: u64,

    /// Times the stage ultimately succeeded
    pub success: u64,

    /// Times the stage failed after exhausting retries
    pub failure: u64,
}

/// Exclusive handle to an in-flight execution.
///
/// Returned by [`MetricsStore::start_execution`]; the run it tracks is
/// private to the holder until handed back through
/// [`MetricsStore::finish_execution`].
#[derive(Debug)]
pub struct ExecutionHandle {
    record: ExecutionRecord,
}

impl ExecutionHandle {
    /// Identifier of the run this handle tracks
    pub fn id(&self) -> Uuid {
        self.record.id
    }

    /// Steps recorded so far, in execution order
    pub fn steps(&self) -> &[StepRecord] {
        &self.record.steps
    }
}

struct MetricsInner {
    history: VecDeque<ExecutionRecord>,
    step_aggregates: BTreeMap<String, StepCounters>,
}

/// Shared telemetry store fed by the orchestrator
#[derive(Clone)]
pub struct MetricsStore {
    inner: Arc<Mutex<MetricsInner>>,
    monitor: Arc<Mutex<ResourceMonitor>>,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsInner {
                history: VecDeque::with_capacity(HISTORY_CAPACITY),
                step_aggregates: BTreeMap::new(),
            })),
            monitor: Arc::new(Mutex::new(ResourceMonitor::new())),
        }
    }

    /// Open a new execution record and hand it to the caller.
    ///
    /// The record stays out of the history until finished; any number of
    /// runs may be in flight at once.
    pub fn start_execution(&self, input: &str) -> ExecutionHandle {
        ExecutionHandle {
            record: ExecutionRecord::new(input),
        }
    }

    /// Append a step outcome to a run and bump the shared aggregates
    pub fn record_step(
        &self,
        handle: &mut ExecutionHandle,
        name: &str,
        duration_seconds: f64,
        outcome: StepOutcome,
    ) {
        handle
            .record
            .steps
            .push(StepRecord::new(name, duration_seconds, outcome));

        let mut inner = self.inner.lock().expect("metrics store lock poisoned");
        let counters = inner.step_aggregates.entry(name.to_string()).or_default();
        counters.total += 1;
        match outcome {
            StepOutcome::Success => counters.success += 1,
            StepOutcome::Failure => counters.failure += 1,
        }
    }

    /// Finish a run and copy it into the bounded history.
    ///
    /// Consumes the handle; the returned record is the immutable copy
    /// that entered the history.
    pub fn finish_execution(
        &self,
        handle: ExecutionHandle,
        status: RunStatus,
        error: Option<String>,
    ) -> ExecutionRecord {
        let mut record = handle.record;
        let finished = Utc::now();

        record.duration_seconds = Some(
            (finished - record.started_at)
                .to_std()
                .map_or(0.0, |d| d.as_secs_f64()),
        );
        record.finished_at = Some(finished);
        record.status = status;
        record.error = error;

        let mut inner = self.inner.lock().expect("metrics store lock poisoned");
        if inner.history.len() >= HISTORY_CAPACITY {
            if let Some(evicted) = inner.history.pop_front() {
                debug!(run_id = %evicted.id, "history at capacity, evicting oldest record");
            }
        }
        inner.history.push_back(record.clone());

        record
    }

    /// Aggregate statistics over the current history snapshot plus a
    /// point-in-time host utilization sample
    pub fn summary(&self) -> MetricsSummary {
        let (pipeline_stats, step_stats) = {
            let inner = self.inner.lock().expect("metrics store lock poisoned");

            let total = inner.history.len() as u64;
            let successful = inner
                .history
                .iter()
                .filter(|record| record.status == RunStatus::Success)
                .count() as u64;

            let pipeline_stats = PipelineStats {
                total,
                successful,
                failed: total - successful,
                success_rate: ratio(successful, total),
            };

            let step_stats = inner
                .step_aggregates
                .iter()
                .map(|(name, counters)| {
                    (
                        name.clone(),
                        StepStats {
                            total: counters.total,
                            success: counters.success,
                            failure: counters.failure,
                            success_rate: ratio(counters.success, counters.total),
                        },
                    )
                })
                .collect();

            (pipeline_stats, step_stats)
        };

        let system = self
            .monitor
            .lock()
            .map(|mut monitor| monitor.sample())
            .unwrap_or_else(|_| SystemSample::unavailable());

        MetricsSummary {
            pipeline_stats,
            step_stats,
            system,
        }
    }

    /// Snapshot of the full history, oldest first.
    ///
    /// Callers wanting most-recent-first display reverse the result.
    pub fn execution_history(&self) -> Vec<ExecutionRecord> {
        let inner = self.inner.lock().expect("metrics store lock poisoned");
        inner.history.iter().cloned().collect()
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Aggregate statistics returned by [`MetricsStore::summary`]
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    /// Run-level counters over the history snapshot
    pub pipeline_stats: PipelineStats,

    /// Per-stage counters since process start
    pub step_stats: BTreeMap<String, StepStats>,

    /// Host utilization at call time
    pub system: SystemSample,
}

/// Run-level statistics
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PipelineStats {
    /// Runs currently in the history
    pub total: u64,

    /// Runs that finished successfully
    pub successful: u64,

    /// Runs that failed
    pub failed: u64,

    /// successful / total, zero when the history is empty
    pub success_rate: f64,
}

/// Per-stage statistics
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepStats {
    /// Times the stage ran
    pub total: u64,

    /// Times it succeeded
    pub success: u64,

    /// Times it failed
    pub failure: u64,

    /// success / total, zero when the stage never ran
    pub success_rate: f64,
}
