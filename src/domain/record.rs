//! Execution records for pipeline telemetry.
//!
//! An [`ExecutionRecord`] captures one pipeline run: when it started,
//! how it ended, and the ordered outcomes of each stage. Records are
//! mutated only by the run that owns them; once finished they are copied
//! immutably into the metrics history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters of input kept in a record's summary.
const INPUT_SUMMARY_CHARS: usize = 50;

/// One pipeline run as seen by the metrics store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Unique identifier for this run
    pub id: Uuid,

    /// Truncated representation of the input
    pub input_summary: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (if it has)
    pub finished_at: Option<DateTime<Utc>>,

    /// Wall time of the whole run in seconds, set at finish
    pub duration_seconds: Option<f64>,

    /// Current state of the run
    pub status: RunStatus,

    /// Per-stage outcomes, appended in execution order
    pub steps: Vec<StepRecord>,

    /// Error message, set only when the run failed
    pub error: Option<String>,
}

impl ExecutionRecord {
    /// Create a new running record for the given input
    pub fn new(input: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            input_summary: summarize_input(input),
            started_at: Utc::now(),
            finished_at: None,
            duration_seconds: None,
            status: RunStatus::Running,
            steps: Vec::new(),
            error: None,
        }
    }

    /// Check if the run is still in progress
    pub fn is_running(&self) -> bool {
        matches!(self.status, RunStatus::Running)
    }

    /// Check if the run has reached a terminal state
    pub fn is_finished(&self) -> bool {
        !self.is_running()
    }
}

/// Truncate an input text for display: the first 50 characters plus an
/// ellipsis when longer.
pub fn summarize_input(input: &str) -> String {
    let mut chars = input.chars();
    let summary: String = chars.by_ref().take(INPUT_SUMMARY_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", summary)
    } else {
        summary
    }
}

/// State of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Currently executing
    Running,

    /// Completed successfully
    Success,

    /// Failed with an error
    Failure,
}

/// Outcome of a single stage, recorded after all retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The stage eventually succeeded
    Success,

    /// The stage failed after exhausting its retry attempts
    Failure,
}

/// One stage outcome within a run.
///
/// The duration covers the whole retried invocation of the stage,
/// including backoff sleeps, not a single attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Stage name
    pub name: String,

    /// Wall time in seconds across all attempts of this stage
    pub duration_seconds: f64,

    /// Final post-retry outcome
    pub status: StepOutcome,

    /// When the stage finished
    pub timestamp: DateTime<Utc>,
}

impl StepRecord {
    /// Create a step record stamped with the current time
    pub fn new(name: impl Into<String>, duration_seconds: f64, status: StepOutcome) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
            status,
            timestamp: Utc::now(),
        }
    }
}
