//! Main orchestrator for pipeline execution.
//!
//! Drives the fixed four-stage analysis pipeline, applying the retry
//! policy to each stage and reporting stage and run outcomes to the
//! metrics store.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info, instrument};

use crate::adapters::ModelBackend;
use crate::config::Config;
use crate::domain::{AnalysisResult, RunStatus, StepOutcome};

use super::metrics::{ExecutionHandle, MetricsStore};
use super::retry::RetryPolicy;

/// Stage names as they appear in telemetry
pub const STAGE_TOKENIZATION: &str = "tokenization";
pub const STAGE_EMBEDDING: &str = "embedding_generation";
pub const STAGE_SENTIMENT: &str = "sentiment_analysis";
pub const STAGE_POST_PROCESSING: &str = "post_processing";

/// A stage's underlying operation failed after exhausting its retry
/// attempts. Aborts the run; stages after the failing one never execute.
#[derive(Debug, Error)]
#[error("stage '{stage}' failed: {source}")]
pub struct StageError {
    /// Name of the failing stage
    pub stage: &'static str,

    /// Root cause from the last attempt
    #[source]
    pub source: anyhow::Error,
}

/// Fixed-sequence pipeline execution engine
pub struct Orchestrator {
    backend: Arc<dyn ModelBackend>,
    retry: RetryPolicy,
    metrics: MetricsStore,
    stage_timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator from configuration
    pub fn new(backend: Arc<dyn ModelBackend>, config: &Config, metrics: MetricsStore) -> Self {
        Self {
            backend,
            retry: config.retry.policy(),
            metrics,
            stage_timeout: Duration::from_secs(config.pipeline.stage_timeout_seconds),
        }
    }

    /// The telemetry store this orchestrator reports into
    pub fn metrics(&self) -> &MetricsStore {
        &self.metrics
    }

    /// Run the full pipeline against one input.
    ///
    /// Stages execute strictly in order: tokenization, embedding
    /// generation, sentiment analysis, post-processing. The first stage
    /// to fail terminally aborts the run; the error is recorded into the
    /// metrics store and returned unchanged.
    #[instrument(skip(self, text), fields(backend = self.backend.name()))]
    pub async fn process(&self, text: &str) -> Result<AnalysisResult, StageError> {
        let mut run = self.metrics.start_execution(text);
        info!(run_id = %run.id(), "starting pipeline run");

        match self.run_stages(&mut run, text).await {
            Ok(analysis) => {
                let record = self
                    .metrics
                    .finish_execution(run, RunStatus::Success, None);
                info!(
                    run_id = %record.id,
                    duration_s = record.duration_seconds.unwrap_or(0.0),
                    "pipeline run completed"
                );
                Ok(analysis)
            }
            Err(e) => {
                error!(run_id = %run.id(), stage = e.stage, error = %e.source, "pipeline run failed");
                self.metrics
                    .finish_execution(run, RunStatus::Failure, Some(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        run: &mut ExecutionHandle,
        text: &str,
    ) -> Result<AnalysisResult, StageError> {
        let backend = Arc::clone(&self.backend);

        let tokens = self
            .run_stage(run, STAGE_TOKENIZATION, || backend.tokenize(text))
            .await?;

        let embedding = self
            .run_stage(run, STAGE_EMBEDDING, || backend.embed(&tokens))
            .await?;

        // Classification operates on the raw input, not the tokens
        let classification = self
            .run_stage(run, STAGE_SENTIMENT, || backend.classify(text))
            .await?;

        self.run_stage(run, STAGE_POST_PROCESSING, || async {
            Ok(AnalysisResult::assemble(
                text,
                &tokens,
                &embedding,
                &classification,
            ))
        })
        .await
    }

    /// Execute one stage through the retry policy and record its outcome.
    ///
    /// The recorded duration is the wall time of the whole invocation,
    /// retries and backoff sleeps included; only the final post-retry
    /// outcome enters the telemetry.
    async fn run_stage<T, F, Fut>(
        &self,
        run: &mut ExecutionHandle,
        stage: &'static str,
        mut op: F,
    ) -> Result<T, StageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let stage_timeout = self.stage_timeout;
        let started = Instant::now();

        let outcome = self
            .retry
            .execute(|attempt| {
                let fut = op();
                async move {
                    match timeout(stage_timeout, fut).await {
                        Ok(result) => result,
                        Err(_) => anyhow::bail!(
                            "stage '{}' attempt {} timed out after {:?}",
                            stage,
                            attempt,
                            stage_timeout
                        ),
                    }
                }
            })
            .await;

        let duration = started.elapsed().as_secs_f64();

        match outcome {
            Ok(value) => {
                self.metrics
                    .record_step(run, stage, duration, StepOutcome::Success);
                Ok(value)
            }
            Err(source) => {
                self.metrics
                    .record_step(run, stage, duration, StepOutcome::Failure);
                Err(StageError { stage, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::domain::{Classification, Embedding, TokenSequence};

    struct StubBackend;

    #[async_trait]
    impl ModelBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        async fn tokenize(&self, text: &str) -> Result<TokenSequence> {
            Ok(TokenSequence::new(
                text.split_whitespace().map(|_| 0).collect(),
            ))
        }

        async fn embed(&self, _tokens: &TokenSequence) -> Result<Embedding> {
            Ok(Embedding::new(vec![0.0; 8]))
        }

        async fn classify(&self, _text: &str) -> Result<Classification> {
            Ok(Classification::new("POSITIVE", 0.9))
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stages_execute_in_order() {
        let config = Config::default();
        let orchestrator =
            Orchestrator::new(Arc::new(StubBackend), &config, MetricsStore::new());

        let result = orchestrator.process("one two three").await.unwrap();
        assert_eq!(result.token_count, 3);
        assert_eq!(result.embedding_dim, 8);

        let history = orchestrator.metrics().execution_history();
        let names: Vec<&str> = history[0].steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                STAGE_TOKENIZATION,
                STAGE_EMBEDDING,
                STAGE_SENTIMENT,
                STAGE_POST_PROCESSING
            ]
        );
    }
}
