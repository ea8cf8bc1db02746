//! Transform module
//!
//! The two transformers that turn raw JSON into the five output tables.
//!
//! # Overview
//!
//! This module provides:
//! - `process_song_data` - catalog JSON to songs and artists
//! - `process_log_data` - event JSON to users, time and songplays
//! - `time_parts` - epoch milliseconds to calendar parts
//! - the pure table derivations each transformer is built from

mod catalog;
mod events;
mod time;
mod types;

pub use catalog::{artists_table, process_song_data, songs_table};
pub use events::{
    catalog_view, process_log_data, song_plays, songplays_table, time_table, users_table,
    with_start_time,
};
pub use time::{start_time_column, time_part_column, time_parts, TimeParts, TIME_PART_COLUMNS};
pub use types::{RunContext, Stage, StageReport};
