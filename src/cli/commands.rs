//! CLI commands and argument parsing

use crate::types::JoinStrategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Songplay lake ETL CLI
#[derive(Parser, Debug)]
#[command(name = "songplay-lake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML); `etl.yaml` is used when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Input root holding song_data/ and log_data/
    #[arg(short, long, global = true)]
    pub input: Option<String>,

    /// Output root for the five tables
    /// Supports: /path, s3://bucket/path, s3a://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Credentials file (YAML with an `aws` section)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Songplays join predicate
    #[arg(long, global = true)]
    pub join: Option<JoinStrategy>,

    /// Summary format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Stage to run; both stages when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run both transformers (default)
    Run,

    /// Write the songs and artists tables only
    Catalog,

    /// Write users, time and songplays; needs catalog output
    Events,
}

/// Summary format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object
    Json,
    /// Human-readable lines
    Pretty,
}
