//! Catalog transformer
//!
//! Song catalog JSON in, songs and artists tables out.

use super::types::{RunContext, Stage, StageReport};
use crate::error::Result;
use crate::table::{read_json, write_partitioned, Table, WriteMode};
use crate::types::{TableSpec, ARTISTS_TABLE, SONGS_TABLE};

/// Derive the songs table from catalog records
///
/// Rows without a `song_id` are dropped; the rest are deduplicated on the
/// full row.
pub fn songs_table(catalog: &Table) -> Result<Table> {
    catalog
        .select(SONGS_TABLE.columns)?
        .drop_nulls(&["song_id"])?
        .deduplicate()
}

/// Derive the artists table from catalog records
pub fn artists_table(catalog: &Table) -> Result<Table> {
    catalog
        .select(ARTISTS_TABLE.columns)?
        .drop_nulls(&["artist_id"])?
        .deduplicate()
}

/// Write a derived table with full-overwrite semantics
pub(crate) async fn write_table(
    ctx: &RunContext,
    table: &Table,
    spec: &TableSpec,
    stage: Stage,
) -> Result<StageReport> {
    let summary = write_partitioned(
        table,
        &ctx.output,
        spec.path,
        spec.partition_by,
        WriteMode::Overwrite,
        &ctx.config.writer.parquet_config(),
    )
    .await?;
    tracing::debug!(
        table = spec.name,
        files = summary.files,
        partitions = summary.partitions.len(),
        "Table written"
    );
    Ok(StageReport::new(stage, summary.rows, summary.path))
}

/// Read the song catalog and write the songs and artists tables
pub async fn process_song_data(ctx: &RunContext) -> Result<Vec<StageReport>> {
    let pattern = &ctx.config.song_data_glob;
    let catalog = read_json(&ctx.input, pattern).await?;
    let mut reports = vec![StageReport::new(
        Stage::ReadSongData,
        catalog.num_rows(),
        ctx.input.display_path(pattern),
    )];

    let songs = songs_table(&catalog)?;
    reports.push(write_table(ctx, &songs, &SONGS_TABLE, Stage::WroteSongs).await?);

    let artists = artists_table(&catalog)?;
    reports.push(write_table(ctx, &artists, &ARTISTS_TABLE, Stage::WroteArtists).await?);

    Ok(reports)
}
