//! textlens - text-analysis pipeline orchestrator with telemetry
//!
//! A fixed four-stage analysis pipeline (tokenization, embedding
//! generation, sentiment analysis, post-processing) with a
//! retry-with-backoff policy per stage and a bounded telemetry store.
//!
//! # Architecture
//!
//! - Each stage runs through [`RetryPolicy`], which sleeps an
//!   exponentially growing, clamped delay between attempts
//! - Stage and run outcomes feed [`MetricsStore`]: a FIFO history of
//!   the last 50 runs plus per-stage success/failure aggregates
//! - The model stages call out through the [`ModelBackend`] trait;
//!   the bundled implementation talks to a model server over HTTP
//!
//! # Modules
//!
//! - `adapters`: Model backend interface and HTTP implementation
//! - `core`: Orchestration logic (Orchestrator, RetryPolicy, MetricsStore)
//! - `domain`: Data structures (records, artifacts, results)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Analyze one text
//! textlens analyze "I love this food!"
//!
//! # Batch mode with a metrics summary at the end
//! textlens batch --input reviews.txt
//!
//! # Check the model backend
//! textlens health
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{HttpModelBackend, ModelBackend};
pub use config::{Config, ConfigError};
pub use core::{MetricsStore, MetricsSummary, Orchestrator, RetryPolicy, StageError};
pub use domain::{AnalysisResult, ExecutionRecord, RunStatus, StepOutcome, StepRecord};
