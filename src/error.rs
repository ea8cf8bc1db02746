//! Error types for songplay-lake
//!
//! This module defines the error hierarchy for the whole pipeline.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Nothing in the transformation core catches or retries these; the first
//! error aborts the run.

use thiserror::Error;

/// The main error type for songplay-lake
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// A required field was absent from every config layer
    #[error("Missing required config field: {field}")]
    MissingConfigField {
        /// Field name as it appears in the config file
        field: String,
    },

    /// Config file is not valid YAML
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Config or credentials file is not valid JSON
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Credentials could not be loaded
    #[error("Credentials error: {message}")]
    Credentials {
        /// What was wrong
        message: String,
    },

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    /// Input listing or decoding failed
    #[error("Failed to read source '{path}': {message}")]
    SourceRead {
        /// Input path or glob
        path: String,
        /// Underlying cause
        message: String,
    },

    /// A column is missing or has a type the pipeline cannot use
    #[error("Schema mismatch on column '{column}': {message}")]
    SchemaMismatch {
        /// Offending column
        column: String,
        /// What was expected
        message: String,
    },

    /// Writing an output table failed
    #[error("Failed to write '{path}': {message}")]
    SinkWrite {
        /// Output table path
        path: String,
        /// Underlying cause
        message: String,
    },

    /// A table the events stage reads back has not been written yet
    #[error("Upstream table '{table}' not found at '{path}'")]
    MissingUpstreamTable {
        /// Table name
        table: String,
        /// Path that was probed
        path: String,
    },

    // ============================================================================
    // Arrow/Parquet/Storage Errors
    // ============================================================================
    /// Arrow compute or decoding error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet encoding or decoding error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Object store request failed
    #[error("Object store error: {0}")]
    Storage(#[from] object_store::Error),

    /// Location is not a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a credentials error
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    /// Create a source read error
    pub fn source_read(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a sink write error
    pub fn sink_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing upstream table error
    pub fn missing_upstream(table: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingUpstreamTable {
            table: table.into(),
            path: path.into(),
        }
    }

    /// Short category name, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_) => "config",
            Error::Credentials { .. } => "credentials",
            Error::SourceRead { .. } | Error::JsonParse(_) => "source_read",
            Error::SchemaMismatch { .. } => "schema_mismatch",
            Error::SinkWrite { .. } => "sink_write",
            Error::MissingUpstreamTable { .. } => "missing_upstream_table",
            Error::Arrow(_) | Error::Parquet(_) => "data",
            Error::Storage(_) => "io",
            Error::Other(_) => "other",
        }
    }
}

/// Result type alias for songplay-lake
pub type Result<T> = std::result::Result<T, Error>;
