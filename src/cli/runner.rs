//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::HarvestConfig;
use crate::error::Result;
use crate::output::{read_records, JsonWriter, JsonWriterConfig};
use crate::pagination::{HarvestOutcome, PaginationEngine};
use crate::report::analyze;
use crate::types::OptionStringExt;
use chrono::Local;
use std::path::Path;
use tracing::{error, info, warn};

/// How a finished command should exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Everything succeeded
    Complete,
    /// The run finished but some tokens failed
    CompletedWithFailures,
    /// Records were collected and reported but could not be saved
    NotPersisted,
}

impl RunStatus {
    /// Process exit code: `0` when complete, `2` with failures, `1` when
    /// the output could not be saved
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Complete => 0,
            Self::CompletedWithFailures => 2,
            Self::NotPersisted => 1,
        }
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<RunStatus> {
        let config = self.effective_config()?;
        match &self.cli.command {
            Commands::Run { .. } => self.harvest(&config).await,
            Commands::Report { input } => self.report(&config, input).await,
            Commands::Config => {
                print!("{}", config.to_yaml()?);
                Ok(RunStatus::Complete)
            }
        }
    }

    /// Configuration file (or defaults) with command-line overrides applied
    pub fn effective_config(&self) -> Result<HarvestConfig> {
        let mut config = match &self.cli.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        };

        if let Commands::Run {
            base_url,
            workers,
            max_attempts,
            output,
        } = &self.cli.command
        {
            if let Some(url) = base_url.clone().none_if_empty() {
                config.source.base_url = url;
            }
            if let Some(workers) = workers {
                config.engine.workers = *workers;
            }
            if let Some(attempts) = max_attempts {
                config.retry.max_attempts = *attempts;
            }
            if let Some(path) = output {
                config.output.path.clone_from(path);
            }
        }

        config.validate()?;
        Ok(config)
    }

    async fn harvest(&self, config: &HarvestConfig) -> Result<RunStatus> {
        let started_at = Local::now();
        let engine = PaginationEngine::from_harvest(config)?;

        let cancel = engine.cancellation();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, waiting for in-flight requests to finish");
                cancel.cancel();
            }
        });

        println!("Fetching products...");
        let outcome = engine.fetch_all().await;
        interrupt.abort();

        let writer = JsonWriter::with_config(JsonWriterConfig::from(&config.output));
        let persisted = match writer.write(&outcome.records).await {
            Ok(written) => {
                info!("Saved {} records to {}", written, writer.path().display());
                true
            }
            Err(e) => {
                error!("Could not save records to {}: {e}", writer.path().display());
                false
            }
        };

        let report = analyze(outcome.records.records(), &config.report)?;
        println!();
        println!("{report}");
        println!();
        if persisted {
            println!("Products have been saved to '{}'", writer.path().display());
        } else {
            println!("Products could not be saved to '{}'", writer.path().display());
        }

        print_summary(&outcome, &started_at.format("%Y-%m-%d %H:%M:%S").to_string());

        Ok(if !persisted {
            RunStatus::NotPersisted
        } else if outcome.is_clean() {
            RunStatus::Complete
        } else {
            RunStatus::CompletedWithFailures
        })
    }

    async fn report(&self, config: &HarvestConfig, input: &Path) -> Result<RunStatus> {
        let records = read_records(input).await?;
        let report = analyze(&records, &config.report)?;
        println!("{report}");
        Ok(RunStatus::Complete)
    }
}

fn print_summary(outcome: &HarvestOutcome, started_at: &str) {
    if !outcome.failures.is_empty() {
        println!();
        println!("Failed tokens ({}):", outcome.failures.len());
        for failure in &outcome.failures {
            println!("   - {failure}");
        }
    }

    let stats = &outcome.stats;
    println!();
    println!(
        "Run started {}: {} pages, {} records, {} duplicates, {} failures in {:.2} seconds",
        started_at,
        stats.pages_fetched,
        stats.records,
        stats.duplicates,
        stats.failures,
        stats.duration_ms as f64 / 1000.0
    );
}
