//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{CredentialsConfig, PipelineConfig};
use crate::engine::{EtlEngine, RunScope, RunStats};
use crate::error::Result;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "etl.yaml";

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
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        let engine = EtlEngine::connect(config).await?;
        let stats = engine.run(self.scope()).await?;
        self.print_summary(&stats);
        Ok(())
    }

    /// Transformers selected by the subcommand
    pub fn scope(&self) -> RunScope {
        match self.cli.command {
            None | Some(Commands::Run) => RunScope::All,
            Some(Commands::Catalog) => RunScope::Catalog,
            Some(Commands::Events) => RunScope::Events,
        }
    }

    /// Load the config file, then apply CLI overrides
    pub fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = match self.config_path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                PipelineConfig::from_file(&path)?
            }
            None => PipelineConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// `--config`, or `etl.yaml` if it exists
    fn config_path(&self) -> Option<PathBuf> {
        match &self.cli.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                default.is_file().then(|| default.to_path_buf())
            }
        }
    }

    fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(input) = &self.cli.input {
            config.input.clone_from(input);
        }
        if let Some(output) = &self.cli.output {
            config.output.clone_from(output);
        }
        if let Some(path) = &self.cli.credentials {
            config.credentials = CredentialsConfig::File(path.clone());
        }
        if let Some(join) = self.cli.join {
            config.join = join;
        }
    }

    fn print_summary(&self, stats: &RunStats) {
        match self.cli.format {
            OutputFormat::Json => {
                let stages: Vec<_> = stats
                    .reports
                    .iter()
                    .map(|report| {
                        json!({
                            "stage": report.stage.to_string(),
                            "rows": report.rows,
                            "path": report.path,
                        })
                    })
                    .collect();
                let summary = json!({
                    "stages": stages,
                    "tables": stats.tables_written(),
                    "duration_ms": stats.duration_ms,
                });
                println!("{summary}");
            }
            OutputFormat::Pretty => {
                for report in &stats.reports {
                    println!("{:<24} {:>8} rows  {}", report.stage, report.rows, report.path);
                }
                println!(
                    "Wrote {} tables in {} ms",
                    stats.tables_written().len(),
                    stats.duration_ms
                );
            }
        }
    }
}
