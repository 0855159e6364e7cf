//! Command-line interface for textlens.
//!
//! Provides commands for analyzing texts, batch processing with a
//! metrics summary, checking the model backend, and inspecting the
//! resolved configuration.

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{HttpModelBackend, ModelBackend};
use crate::config::Config;
use crate::core::{MetricsStore, Orchestrator};

/// History entries shown after a batch run
const BATCH_HISTORY_LIMIT: usize = 10;

/// textlens - text-analysis pipeline orchestrator with telemetry
#[derive(Parser, Debug)]
#[command(name = "textlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "TEXTLENS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a single text
    Analyze {
        /// Text to analyze (reads from stdin if not provided)
        text: Option<String>,

        /// Input file to read the text from
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the metrics summary after the run
        #[arg(long)]
        metrics: bool,
    },

    /// Analyze a batch of texts (one per line), then print the summary
    Batch {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check that the model backend is reachable
    Health,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match self.command {
            Commands::Analyze {
                text,
                input,
                metrics,
            } => analyze(&config, text, input, metrics).await,
            Commands::Batch { input } => batch(&config, input).await,
            Commands::Health => health(&config).await,
            Commands::Config => {
                println!("{:#?}", config);
                Ok(())
            }
        }
    }
}

fn build_orchestrator(config: &Config) -> Orchestrator {
    let backend = Arc::new(HttpModelBackend::new(config.models.clone()));
    Orchestrator::new(backend, config, MetricsStore::new())
}

/// Read input text from an argument, a file, or stdin
fn read_input(text: Option<String>, input: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = input {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read input file: {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

async fn analyze(
    config: &Config,
    text: Option<String>,
    input: Option<PathBuf>,
    metrics: bool,
) -> Result<()> {
    let text = read_input(text, input)?;
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("no input text provided");
    }

    let orchestrator = build_orchestrator(config);
    let result = orchestrator.process(text).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if metrics {
        let summary = orchestrator.metrics().summary();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

async fn batch(config: &Config, input: Option<PathBuf>) -> Result<()> {
    let content = read_input(None, input)?;
    let orchestrator = build_orchestrator(config);

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        // A failed line is reported and recorded; the batch continues
        match orchestrator.process(line).await {
            Ok(result) => {
                println!(
                    "{} ({:.3}): {}",
                    result.sentiment, result.sentiment_confidence, result.text
                );
            }
            Err(e) => {
                eprintln!("failed: {}: {}", line, e);
            }
        }
    }

    let summary = orchestrator.metrics().summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    // Most recent first for display
    let mut history = orchestrator.metrics().execution_history();
    history.reverse();
    for record in history.iter().take(BATCH_HISTORY_LIMIT) {
        println!(
            "{} [{:?}] {:.2}s {}",
            record.started_at.format("%H:%M:%S"),
            record.status,
            record.duration_seconds.unwrap_or(0.0),
            record.input_summary,
        );
    }

    Ok(())
}

async fn health(config: &Config) -> Result<()> {
    let backend = HttpModelBackend::new(config.models.clone());
    backend
        .health_check()
        .await
        .context("model backend health check failed")?;

    println!("model backend ok: {}", config.models.endpoint);
    Ok(())
}
