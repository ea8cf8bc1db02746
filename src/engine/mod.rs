//! Execution engine module
//!
//! Builds the run context and sequences the transformers.
//!
//! # Overview
//!
//! The engine module provides:
//! - `EtlEngine` - Opens storage and runs the catalog and event transformers
//! - `RunScope` - Which transformers to run
//! - `RunStats` - Stage reports and timing for a run

mod types;

pub use types::{RunScope, RunStats};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::storage::StorageLocation;
use crate::transform::{process_log_data, process_song_data, RunContext};
use std::time::Instant;

/// ETL engine for one pipeline configuration
#[derive(Debug, Clone)]
pub struct EtlEngine {
    /// Storage and configuration shared by both transformers
    context: RunContext,
}

impl EtlEngine {
    /// Create an engine over an existing run context
    pub fn new(context: RunContext) -> Self {
        Self { context }
    }

    /// Validate the config, acquire credentials and open storage
    ///
    /// The input root must exist; the output root is created if it is a
    /// missing local directory.
    pub async fn connect(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let secrets = config.secret_provider();
        tracing::debug!(provider = secrets.name(), "Using secret provider");

        let input = StorageLocation::open(&config.input, secrets.as_ref()).await?;
        let output = StorageLocation::create(&config.output, secrets.as_ref()).await?;
        tracing::info!(
            input = input.url(),
            output = output.url(),
            join = %config.join,
            "Opened storage"
        );

        Ok(Self::new(RunContext::new(input, output, config)))
    }

    /// Get the run context
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Get the configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.context.config
    }

    /// Run the transformers selected by `scope`
    ///
    /// The first error aborts the run; tables written before it stay
    /// in place.
    pub async fn run(&self, scope: RunScope) -> Result<RunStats> {
        let start = Instant::now();
        let mut stats = RunStats::new();

        tracing::info!(%scope, "Starting run");

        if scope.includes_catalog() {
            stats.add_reports(process_song_data(&self.context).await?);
        }
        if scope.includes_events() {
            stats.add_reports(process_log_data(&self.context).await?);
        }

        stats.set_duration(start.elapsed().as_millis() as u64);
        tracing::info!(
            tables = stats.tables_written().len(),
            duration_ms = stats.duration_ms,
            "Run complete"
        );
        Ok(stats)
    }
}
