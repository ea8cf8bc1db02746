//! Pipeline configuration
//!
//! Loaded from YAML; CLI flags override individual fields. The resulting
//! `PipelineConfig` is passed by reference to everything that needs it.
//!
//! ```yaml
//! input: s3a://udacity-dend/
//! output: s3a://my-lake/
//! join: artist_name_and_title
//! credentials:
//!   file: dl.yaml
//! writer:
//!   compression: snappy
//! ```

use crate::auth::{EnvSecretProvider, FileSecretProvider, NoSecrets, SecretProvider};
use crate::error::{Error, Result};
use crate::table::ParquetWriterConfig;
use crate::types::{CompressionCodec, JoinStrategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root holding `song_data/` and `log_data/`
    #[serde(default)]
    pub input: String,

    /// Root the five tables are written under
    #[serde(default)]
    pub output: String,

    /// Catalog files, relative to `input`
    #[serde(default = "default_song_data_glob")]
    pub song_data_glob: String,

    /// Event files, relative to `input`
    #[serde(default = "default_log_data_glob")]
    pub log_data_glob: String,

    /// Songplays join predicate
    #[serde(default)]
    pub join: JoinStrategy,

    /// Where object-store credentials come from
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Parquet output settings
    #[serde(default)]
    pub writer: WriterSettings,
}

fn default_song_data_glob() -> String {
    "song_data/*/*/*/*.json".to_string()
}

fn default_log_data_glob() -> String {
    "log_data/*/*/*.json".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            song_data_glob: default_song_data_glob(),
            log_data_glob: default_log_data_glob(),
            join: JoinStrategy::default(),
            credentials: CredentialsConfig::default(),
            writer: WriterSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config for the given input and output roots
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml(&contents)
    }

    /// Set the join strategy
    #[must_use]
    pub fn with_join(mut self, join: JoinStrategy) -> Self {
        self.join = join;
        self
    }

    /// Set the writer settings
    #[must_use]
    pub fn with_writer(mut self, writer: WriterSettings) -> Self {
        self.writer = writer;
        self
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(Error::missing_field("input"));
        }
        if self.output.trim().is_empty() {
            return Err(Error::missing_field("output"));
        }
        if self.song_data_glob.trim().is_empty() {
            return Err(Error::missing_field("song_data_glob"));
        }
        if self.log_data_glob.trim().is_empty() {
            return Err(Error::missing_field("log_data_glob"));
        }
        if self.writer.row_group_size == 0 {
            return Err(Error::config("writer.row_group_size must be positive"));
        }
        if self.writer.rows_per_partition == 0 || self.writer.rows_per_partition >= 1 << 33 {
            return Err(Error::config(
                "writer.rows_per_partition must be between 1 and 2^33 - 1",
            ));
        }
        Ok(())
    }

    /// Build the secret provider named by `credentials`
    pub fn secret_provider(&self) -> Box<dyn SecretProvider> {
        match &self.credentials {
            CredentialsConfig::None => Box::new(NoSecrets),
            CredentialsConfig::Env => Box::new(EnvSecretProvider),
            CredentialsConfig::File(path) => Box::new(FileSecretProvider::new(path)),
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Credential source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsConfig {
    /// Let the store use its own defaults
    #[default]
    None,
    /// Read `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`
    Env,
    /// Read a YAML credentials file
    File(PathBuf),
}

// ============================================================================
// Writer Settings
// ============================================================================

/// Parquet output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterSettings {
    /// Compression codec
    pub compression: CompressionCodec,

    /// Rows per row group
    pub row_group_size: usize,

    /// Split part files at this many rows (0 = one file per partition)
    pub max_rows_per_file: usize,

    /// Rows per logical partition when assigning songplay ids
    pub rows_per_partition: usize,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::Snappy,
            row_group_size: 1024 * 1024,
            max_rows_per_file: 0,
            rows_per_partition: 1 << 20,
        }
    }
}

impl WriterSettings {
    /// Parquet writer config for these settings
    pub fn parquet_config(&self) -> ParquetWriterConfig {
        let config = ParquetWriterConfig::new()
            .with_row_group_size(self.row_group_size)
            .with_max_rows_per_file(self.max_rows_per_file);
        match self.compression {
            CompressionCodec::Snappy => config,
            CompressionCodec::Zstd => config.zstd(),
            CompressionCodec::Gzip => config.gzip(),
            CompressionCodec::None => config.uncompressed(),
        }
    }
}
