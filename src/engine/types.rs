//! Engine types
//!
//! Run scope and statistics for the ETL engine.

use crate::transform::{Stage, StageReport};
use std::fmt;

/// Which transformers a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunScope {
    /// Catalog then events
    #[default]
    All,
    /// Songs and artists only
    Catalog,
    /// Users, time and songplays; catalog tables must already exist
    Events,
}

impl RunScope {
    /// Whether the catalog transformer runs
    pub fn includes_catalog(&self) -> bool {
        matches!(self, Self::All | Self::Catalog)
    }

    /// Whether the event transformer runs
    pub fn includes_events(&self) -> bool {
        matches!(self, Self::All | Self::Events)
    }
}

impl fmt::Display for RunScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Catalog => write!(f, "catalog"),
            Self::Events => write!(f, "events"),
        }
    }
}

/// Statistics from a run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Stage reports in completion order
    pub reports: Vec<StageReport>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add stage reports
    pub fn add_reports(&mut self, reports: impl IntoIterator<Item = StageReport>) {
        self.reports.extend(reports);
    }

    /// Rows recorded for a stage, if it ran
    pub fn rows_for(&self, stage: Stage) -> Option<usize> {
        self.reports
            .iter()
            .find(|report| report.stage == stage)
            .map(|report| report.rows)
    }

    /// Names of the tables written
    pub fn tables_written(&self) -> Vec<&'static str> {
        self.reports
            .iter()
            .filter_map(|report| report.stage.table())
            .collect()
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
