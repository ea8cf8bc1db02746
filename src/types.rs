//! Common types used throughout songplay-lake
//!
//! Output table layouts and the enums shared by config, CLI and the
//! transformers.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Output Tables
// ============================================================================

/// Layout of one output table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name used in logs and errors
    pub name: &'static str,
    /// Directory relative to the output root
    pub path: &'static str,
    /// Columns in output order (partition columns included)
    pub columns: &'static [&'static str],
    /// Hive partition columns
    pub partition_by: &'static [&'static str],
}

/// Songs dimension
pub const SONGS_TABLE: TableSpec = TableSpec {
    name: "songs",
    path: "songs/songs.parquet",
    columns: &["song_id", "title", "artist_id", "year", "duration"],
    partition_by: &["year", "artist_id"],
};

/// Artists dimension
pub const ARTISTS_TABLE: TableSpec = TableSpec {
    name: "artists",
    path: "artists/artists.parquet",
    columns: &[
        "artist_id",
        "artist_name",
        "artist_location",
        "artist_latitude",
        "artist_longitude",
    ],
    partition_by: &[],
};

/// Users dimension
pub const USERS_TABLE: TableSpec = TableSpec {
    name: "users",
    path: "users.parquet",
    columns: &["userId", "firstName", "lastName", "gender", "level"],
    partition_by: &[],
};

/// Time dimension
pub const TIME_TABLE: TableSpec = TableSpec {
    name: "time",
    path: "time.parquet",
    columns: &["start_time", "hour", "day", "week", "month", "year", "weekday"],
    partition_by: &["year", "month"],
};

/// Songplays fact table
pub const SONGPLAYS_TABLE: TableSpec = TableSpec {
    name: "songplays",
    path: "songplays.parquet",
    columns: &[
        "songplay_id",
        "start_time",
        "userId",
        "level",
        "song_id",
        "artist_id",
        "sessionId",
        "location",
        "userAgent",
        "year",
        "month",
    ],
    partition_by: &["year", "month"],
};

/// Every table the pipeline writes, in write order
pub const ALL_TABLES: [TableSpec; 5] = [
    SONGS_TABLE,
    ARTISTS_TABLE,
    USERS_TABLE,
    TIME_TABLE,
    SONGPLAYS_TABLE,
];

// ============================================================================
// Join Strategy
// ============================================================================

/// How play events are matched to catalog songs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum JoinStrategy {
    /// Event artist equals the artist's name and event song equals the title
    #[default]
    #[value(name = "artist_name_and_title")]
    ArtistNameAndTitle,
    /// Event artist equals the song's artist_id (reproduces legacy output)
    #[value(name = "artist_name_to_artist_id")]
    ArtistNameToArtistId,
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinStrategy::ArtistNameAndTitle => write!(f, "artist_name_and_title"),
            JoinStrategy::ArtistNameToArtistId => write!(f, "artist_name_to_artist_id"),
        }
    }
}

// ============================================================================
// Compression
// ============================================================================

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    /// Snappy, the Parquet default
    #[default]
    Snappy,
    /// Zstandard at the default level
    Zstd,
    /// Gzip at the default level
    Gzip,
    /// No compression
    None,
}
