//! Event transformer
//!
//! Play-event JSON in, users, time and songplays tables out. Songplays
//! needs the catalog tables, so this runs after the catalog transformer.

use super::catalog::write_table;
use super::time::{start_time_column, time_part_column, TIME_PART_COLUMNS};
use super::types::{RunContext, Stage, StageReport};
use crate::error::Result;
use crate::table::{read_json, read_parquet_table, JoinKind, Table};
use crate::types::{
    JoinStrategy, TableSpec, ARTISTS_TABLE, SONGPLAYS_TABLE, SONGS_TABLE, TIME_TABLE, USERS_TABLE,
};

/// Event columns carried into the songplays join
const PLAY_COLUMNS: [&str; 8] = [
    "start_time",
    "userId",
    "level",
    "sessionId",
    "location",
    "userAgent",
    "artist",
    "song",
];

/// Fact columns selected after the join, before year/month are added
const FACT_COLUMNS: [&str; 8] = [
    "start_time",
    "userId",
    "level",
    "song_id",
    "artist_id",
    "sessionId",
    "location",
    "userAgent",
];

/// Keep only song-play events (`page == "NextSong"`)
pub fn song_plays(events: &Table) -> Result<Table> {
    events.filter_eq("page", "NextSong")
}

/// Add `start_time` derived from `ts`
pub fn with_start_time(plays: &Table) -> Result<Table> {
    let ts = plays.column("ts")?.clone();
    plays.with_column("start_time", |_| start_time_column(&ts))
}

/// Derive the users table from song plays
///
/// A user whose level changed appears once per level.
pub fn users_table(plays: &Table) -> Result<Table> {
    plays.select(USERS_TABLE.columns)?.deduplicate()
}

/// Append the named time parts of `start_time`
fn with_time_parts(table: &Table, parts: &[&str]) -> Result<Table> {
    let start_time = table.column("start_time")?.clone();
    let mut table = table.clone();
    for part in parts {
        table = table.with_column(part, |_| time_part_column(&start_time, part))?;
    }
    Ok(table)
}

/// Derive the time table from song plays carrying `start_time`
pub fn time_table(plays: &Table) -> Result<Table> {
    let instants = plays.select(&["start_time"])?.deduplicate()?;
    with_time_parts(&instants, &TIME_PART_COLUMNS)?.select(TIME_TABLE.columns)
}

/// Songs joined with their artist's name, for name-based matching
pub fn catalog_view(songs: &Table, artists: &Table) -> Result<Table> {
    let names = artists.select(&["artist_id", "artist_name"])?;
    songs.join(&names, &[("artist_id", "artist_id")], JoinKind::Inner)
}

/// Derive the songplays table
///
/// `catalog` is the songs table for the legacy strategy and the
/// `catalog_view` for name matching. Only plays with a catalog match
/// survive. Ids are assigned after deduplication.
pub fn songplays_table(
    plays: &Table,
    catalog: &Table,
    strategy: JoinStrategy,
    rows_per_partition: usize,
) -> Result<Table> {
    let plays = plays.select(&PLAY_COLUMNS)?;
    let on: &[(&str, &str)] = match strategy {
        JoinStrategy::ArtistNameAndTitle => &[("artist", "artist_name"), ("song", "title")],
        JoinStrategy::ArtistNameToArtistId => &[("artist", "artist_id")],
    };

    let facts = plays
        .join(catalog, on, JoinKind::Inner)?
        .select(&FACT_COLUMNS)?
        .deduplicate()?;

    with_time_parts(&facts, &["year", "month"])?
        .with_surrogate_key("songplay_id", rows_per_partition)?
        .select(SONGPLAYS_TABLE.columns)
}

/// Read a table written earlier in this run
async fn read_upstream(
    ctx: &RunContext,
    spec: &TableSpec,
    stage: Stage,
) -> Result<(Table, StageReport)> {
    let table = read_parquet_table(&ctx.output, spec.path, spec.name).await?;
    let report = StageReport::new(stage, table.num_rows(), ctx.output.display_path(spec.path));
    Ok((table, report))
}

/// Read play events and write the users, time and songplays tables
pub async fn process_log_data(ctx: &RunContext) -> Result<Vec<StageReport>> {
    let pattern = &ctx.config.log_data_glob;
    let events = read_json(&ctx.input, pattern).await?;
    let mut reports = vec![StageReport::new(
        Stage::ReadLogData,
        events.num_rows(),
        ctx.input.display_path(pattern),
    )];

    let plays = with_start_time(&song_plays(&events)?)?;
    tracing::debug!(events = events.num_rows(), plays = plays.num_rows(), "Filtered song plays");

    let users = users_table(&plays)?;
    reports.push(write_table(ctx, &users, &USERS_TABLE, Stage::WroteUsers).await?);

    let time = time_table(&plays)?;
    reports.push(write_table(ctx, &time, &TIME_TABLE, Stage::WroteTime).await?);

    let (songs, report) = read_upstream(ctx, &SONGS_TABLE, Stage::ReadSongs).await?;
    reports.push(report);

    let catalog = match ctx.config.join {
        JoinStrategy::ArtistNameAndTitle => {
            let (artists, report) = read_upstream(ctx, &ARTISTS_TABLE, Stage::ReadArtists).await?;
            reports.push(report);
            catalog_view(&songs, &artists)?
        }
        JoinStrategy::ArtistNameToArtistId => songs,
    };

    let songplays = songplays_table(
        &plays,
        &catalog,
        ctx.config.join,
        ctx.config.writer.rows_per_partition,
    )?;
    reports.push(write_table(ctx, &songplays, &SONGPLAYS_TABLE, Stage::WroteSongplays).await?);

    Ok(reports)
}
