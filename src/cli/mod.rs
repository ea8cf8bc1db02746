//! CLI module
//!
//! Command-line interface for running the pipeline.
//!
//! # Commands
//!
//! - `run` - Catalog then events (default)
//! - `catalog` - Songs and artists tables
//! - `events` - Users, time and songplays tables

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{Runner, DEFAULT_CONFIG_FILE};
