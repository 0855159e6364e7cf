//! Domain types for the textlens pipeline.
//!
//! This module contains the core data structures:
//! - Records: execution and per-stage telemetry
//! - Artifacts: stage outputs with queryable shape
//! - Result: the final output object

pub mod artifact;
pub mod record;
pub mod result;

// Re-export commonly used types
pub use artifact::{Classification, Embedding, TokenSequence};
pub use record::{ExecutionRecord, RunStatus, StepOutcome, StepRecord};
pub use result::AnalysisResult;
