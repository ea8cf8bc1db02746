//! Transformer types
//!
//! Run context and the stage reports each transformer emits.

use crate::config::PipelineConfig;
use crate::storage::StorageLocation;
use std::fmt;

/// Everything a transformer needs for one run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Where raw JSON is read from
    pub input: StorageLocation,
    /// Where tables are written and read back
    pub output: StorageLocation,
    /// Pipeline configuration
    pub config: PipelineConfig,
}

impl RunContext {
    /// Create a run context
    pub fn new(input: StorageLocation, output: StorageLocation, config: PipelineConfig) -> Self {
        Self {
            input,
            output,
            config,
        }
    }
}

/// A completed pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Catalog JSON read
    ReadSongData,
    /// Songs table written
    WroteSongs,
    /// Artists table written
    WroteArtists,
    /// Event JSON read
    ReadLogData,
    /// Users table written
    WroteUsers,
    /// Time table written
    WroteTime,
    /// Songs table read back
    ReadSongs,
    /// Artists table read back
    ReadArtists,
    /// Songplays table written
    WroteSongplays,
}

impl Stage {
    /// Table the stage wrote, if any
    pub fn table(&self) -> Option<&'static str> {
        match self {
            Stage::WroteSongs => Some("songs"),
            Stage::WroteArtists => Some("artists"),
            Stage::WroteUsers => Some("users"),
            Stage::WroteTime => Some("time"),
            Stage::WroteSongplays => Some("songplays"),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Stage::ReadSongData => "Read song data.",
            Stage::WroteSongs => "Wrote songs table.",
            Stage::WroteArtists => "Wrote artists table.",
            Stage::ReadLogData => "Read log data.",
            Stage::WroteUsers => "Wrote users table.",
            Stage::WroteTime => "Wrote time table.",
            Stage::ReadSongs => "Read songs table.",
            Stage::ReadArtists => "Read artists table.",
            Stage::WroteSongplays => "Wrote songplays table.",
        };
        f.write_str(text)
    }
}

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Which stage finished
    pub stage: Stage,
    /// Rows read or written
    pub rows: usize,
    /// Source or destination, as a display path
    pub path: String,
}

impl StageReport {
    /// Create a report and log it
    pub fn new(stage: Stage, rows: usize, path: impl Into<String>) -> Self {
        let report = Self {
            stage,
            rows,
            path: path.into(),
        };
        tracing::info!(rows = report.rows, path = %report.path, "{}", report.stage);
        report
    }
}
