//! Tests for the table module

use super::*;
use crate::storage::StorageLocation;
use arrow::array::{Array, BooleanArray, Int64Array, StringArray};
use arrow::datatypes::DataType;
use bytes::Bytes;
use object_store::memory::InMemory;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use test_case::test_case;

fn table(records: &[Value]) -> Table {
    Table::new(json_to_arrow(records, None).unwrap())
}

fn memory_location() -> StorageLocation {
    StorageLocation::from_store(Arc::new(InMemory::new()), "lake", "memory")
}

fn strings(table: &Table, column: &str) -> Vec<Option<String>> {
    let array = table.column(column).unwrap();
    let array = array.as_any().downcast_ref::<StringArray>().unwrap();
    (0..array.len())
        .map(|i| (!array.is_null(i)).then(|| array.value(i).to_string()))
        .collect()
}

fn ints(table: &Table, column: &str) -> Vec<Option<i64>> {
    let array = table.column(column).unwrap();
    let array = array.as_any().downcast_ref::<Int64Array>().unwrap();
    (0..array.len())
        .map(|i| (!array.is_null(i)).then(|| array.value(i)))
        .collect()
}

// ============================================================================
// JSON Lines Decoding Tests
// ============================================================================

#[test]
fn test_decode_json_lines_skips_blank_lines() {
    let body = "{\"a\": 1}\n\n  \n{\"a\": 2}\n";
    let records = decode_json_lines(body).unwrap();
    assert_eq!(records, vec![json!({"a": 1}), json!({"a": 2})]);
}

#[test]
fn test_decode_json_lines_array_line() {
    let records = decode_json_lines("[{\"a\": 1}, {\"a\": 2}]").unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_decode_json_lines_reports_line() {
    let err = decode_json_lines("{\"a\": 1}\n{broken").unwrap_err();
    assert!(err.contains("line 2"), "{err}");
}

#[test]
fn test_decode_json_lines_rejects_scalars() {
    let err = decode_json_lines("42").unwrap_err();
    assert!(err.contains("Expected a JSON object"));
}

// ============================================================================
// Schema Inference Tests
// ============================================================================

#[test]
fn test_infer_schema_sorted_fields() {
    let schema = infer_schema(&[json!({"title": "T", "artist_id": "A1", "year": 2000})]);
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["artist_id", "title", "year"]);
}

#[test_case(json!(1), json!(2), DataType::Int64 ; "ints")]
#[test_case(json!(1), json!(2.5), DataType::Float64 ; "mixed numbers")]
#[test_case(json!(null), json!(1.5), DataType::Float64 ; "null then float")]
#[test_case(json!(null), json!(null), DataType::Utf8 ; "all null")]
#[test_case(json!("7"), json!(7), DataType::Utf8 ; "conflict falls back to string")]
#[test_case(json!(true), json!(false), DataType::Boolean ; "booleans")]
fn test_infer_schema_types(first: Value, second: Value, expected: DataType) {
    let schema = infer_schema(&[json!({ "v": first }), json!({ "v": second })]);
    assert_eq!(schema.field_with_name("v").unwrap().data_type(), &expected);
}

#[test]
fn test_infer_schema_missing_field_is_nullable() {
    let schema = infer_schema(&[json!({"a": 1}), json!({"b": "x"})]);
    assert_eq!(schema.fields().len(), 2);
    assert!(schema.fields().iter().all(|f| f.is_nullable()));
}

#[test]
fn test_infer_schema_merges_structs() {
    let schema = infer_schema(&[
        json!({"user": {"id": 1}}),
        json!({"user": {"name": "Alice"}}),
    ]);
    let DataType::Struct(fields) = schema.field_with_name("user").unwrap().data_type() else {
        panic!("Expected Struct type");
    };
    assert_eq!(fields.len(), 2);
}

#[test]
fn test_json_to_arrow_conflicting_values_stringified() {
    let t = table(&[json!({"userId": "7"}), json!({"userId": 8}), json!({"userId": null})]);
    assert_eq!(
        strings(&t, "userId"),
        vec![Some("7".to_string()), Some("8".to_string()), None]
    );
}

#[test]
fn test_json_to_arrow_nested() {
    let t = table(&[
        json!({"tags": ["a", "b"], "meta": {"k": 1}}),
        json!({"tags": null, "meta": null}),
    ]);
    assert_eq!(t.num_rows(), 2);
    assert!(t.column("tags").unwrap().is_null(1));
    assert!(t.column("meta").unwrap().is_null(1));
}

// ============================================================================
// Projection and Filter Tests
// ============================================================================

#[test]
fn test_select_orders_columns() {
    let t = table(&[json!({"a": 1, "b": 2, "c": 3})]);
    let selected = t.select(&["c", "a"]).unwrap();
    assert_eq!(selected.column_names(), vec!["c", "a"]);
}

#[test]
fn test_select_missing_column() {
    let t = table(&[json!({"a": 1})]);
    let err = t.select(&["a", "song_id"]).unwrap_err();
    assert_eq!(err.kind(), "schema_mismatch");
    assert!(err.to_string().contains("song_id"));
}

#[test]
fn test_drop_ignores_unknown() {
    let t = table(&[json!({"a": 1, "b": 2})]);
    assert_eq!(t.drop(&["b", "zzz"]).unwrap().column_names(), vec!["a"]);
}

#[test]
fn test_filter_eq_excludes_nulls_and_other_values() {
    let t = table(&[
        json!({"page": "NextSong", "n": 1}),
        json!({"page": "Home", "n": 2}),
        json!({"page": null, "n": 3}),
        json!({"n": 4}),
        json!({"page": "NextSong", "n": 5}),
    ]);
    let plays = t.filter_eq("page", "NextSong").unwrap();
    assert_eq!(ints(&plays, "n"), vec![Some(1), Some(5)]);
}

#[test]
fn test_filter_eq_casts_non_string_columns() {
    let t = table(&[json!({"status": 200}), json!({"status": 404})]);
    let ok = t.filter_eq("status", "200").unwrap();
    assert_eq!(ok.num_rows(), 1);
}

#[test]
fn test_filter_length_mismatch() {
    let t = table(&[json!({"a": 1}), json!({"a": 2})]);
    let predicate = BooleanArray::from(vec![true]);
    assert!(t.filter(&predicate).is_err());
}

#[test]
fn test_drop_nulls() {
    let t = table(&[
        json!({"song_id": "S1", "artist_id": "A1"}),
        json!({"song_id": null, "artist_id": "A2"}),
        json!({"song_id": "S3", "artist_id": null}),
    ]);
    let kept = t.drop_nulls(&["song_id", "artist_id"]).unwrap();
    assert_eq!(strings(&kept, "song_id"), vec![Some("S1".to_string())]);
}

// ============================================================================
// Deduplicate Tests
// ============================================================================

#[test]
fn test_deduplicate_keeps_first_occurrence() {
    let t = table(&[
        json!({"id": "b", "v": 1}),
        json!({"id": "a", "v": 1}),
        json!({"id": "b", "v": 1}),
        json!({"id": "b", "v": 2}),
    ]);
    let deduped = t.deduplicate().unwrap();
    assert_eq!(
        strings(&deduped, "id"),
        vec![Some("b".into()), Some("a".into()), Some("b".into())]
    );
    assert_eq!(ints(&deduped, "v"), vec![Some(1), Some(1), Some(2)]);
}

#[test]
fn test_deduplicate_nulls_compare_equal() {
    let t = table(&[
        json!({"id": "a", "lat": null}),
        json!({"id": "a", "lat": null}),
        json!({"id": "a", "lat": 1.5}),
    ]);
    assert_eq!(t.deduplicate().unwrap().num_rows(), 2);
}

#[test]
fn test_deduplicate_differing_level_survives() {
    let t = table(&[
        json!({"userId": "7", "level": "free"}),
        json!({"userId": "7", "level": "paid"}),
        json!({"userId": "7", "level": "free"}),
    ]);
    assert_eq!(t.deduplicate().unwrap().num_rows(), 2);
}

// ============================================================================
// Derived Column Tests
// ============================================================================

#[test]
fn test_with_column_appends() {
    let t = table(&[json!({"a": 1}), json!({"a": 2})]);
    let t = t
        .with_column("b", |batch| {
            Ok(arrow::compute::kernels::numeric::add(
                batch.column(0),
                &Int64Array::new_scalar(10),
            )?)
        })
        .unwrap();
    assert_eq!(t.column_names(), vec!["a", "b"]);
    assert_eq!(ints(&t, "b"), vec![Some(11), Some(12)]);
}

#[test]
fn test_with_column_replaces_in_place() {
    let t = table(&[json!({"a": 1, "b": 2})]);
    let t = t
        .with_column("a", |_| Ok(Arc::new(StringArray::from(vec!["x"])) as _))
        .unwrap();
    assert_eq!(t.column_names(), vec!["a", "b"]);
    assert_eq!(strings(&t, "a"), vec![Some("x".to_string())]);
}

#[test]
fn test_with_column_length_mismatch() {
    let t = table(&[json!({"a": 1}), json!({"a": 2})]);
    let err = t
        .with_column("b", |_| Ok(Arc::new(Int64Array::from(vec![1])) as _))
        .unwrap_err();
    assert_eq!(err.kind(), "schema_mismatch");
}

#[test]
fn test_surrogate_key_composite() {
    let records: Vec<Value> = (0..5).map(|i| json!({ "n": i })).collect();
    let t = table(&records).with_surrogate_key("id", 2).unwrap();
    let p = 1_i64 << 33;
    assert_eq!(
        ints(&t, "id"),
        vec![Some(0), Some(1), Some(p), Some(p + 1), Some(2 * p)]
    );
}

#[test]
fn test_surrogate_key_unique() {
    let records: Vec<Value> = (0..100).map(|i| json!({ "n": i % 3 })).collect();
    let t = table(&records).with_surrogate_key("id", 7).unwrap();
    let ids = ints(&t, "id");
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 100);
}

#[test]
fn test_surrogate_key_overflow() {
    let p = 1_i64 << 33;
    assert_eq!(frame::surrogate_key(5, 2), Some(2 * p + 1));
    assert_eq!(frame::surrogate_key((1 << 30) - 1, 1), Some(((1 << 30) - 1) * p));
    assert_eq!(frame::surrogate_key(1 << 30, 1), None);
    assert_eq!(frame::surrogate_key(i64::MAX, 1), None);
}

// ============================================================================
// Join Tests
// ============================================================================

#[test]
fn test_inner_join_one_to_many() {
    let events = table(&[
        json!({"artist": "N", "e": 1}),
        json!({"artist": "M", "e": 2}),
        json!({"artist": null, "e": 3}),
    ]);
    let songs = table(&[
        json!({"artist_name": "N", "song_id": "S1"}),
        json!({"artist_name": "N", "song_id": "S2"}),
        json!({"artist_name": null, "song_id": "S3"}),
    ]);

    let joined = events
        .join(&songs, &[("artist", "artist_name")], JoinKind::Inner)
        .unwrap();
    assert_eq!(joined.num_rows(), 2);
    assert_eq!(
        strings(&joined, "song_id"),
        vec![Some("S1".into()), Some("S2".into())]
    );
    assert_eq!(
        joined.column_names(),
        vec!["artist", "e", "artist_name", "song_id"]
    );
}

#[test]
fn test_left_join_fills_nulls() {
    let left = table(&[json!({"k": "a"}), json!({"k": "b"})]);
    let right = table(&[json!({"k2": "a", "v": 1})]);

    let joined = left.join(&right, &[("k", "k2")], JoinKind::Left).unwrap();
    assert_eq!(joined.num_rows(), 2);
    assert_eq!(ints(&joined, "v"), vec![Some(1), None]);
}

#[test]
fn test_join_multiple_keys() {
    let events = table(&[
        json!({"artist": "N", "song": "T"}),
        json!({"artist": "N", "song": "Other"}),
    ]);
    let catalog = table(&[json!({"artist_name": "N", "title": "T", "song_id": "S1"})]);

    let joined = events
        .join(
            &catalog,
            &[("artist", "artist_name"), ("song", "title")],
            JoinKind::Inner,
        )
        .unwrap();
    assert_eq!(joined.num_rows(), 1);
}

#[test]
fn test_join_shared_key_emitted_once() {
    let songs = table(&[json!({"artist_id": "A1", "song_id": "S1"})]);
    let artists = table(&[json!({"artist_id": "A1", "artist_name": "N"})]);

    let joined = songs
        .join(&artists, &[("artist_id", "artist_id")], JoinKind::Inner)
        .unwrap();
    assert_eq!(
        joined.column_names(),
        vec!["artist_id", "song_id", "artist_name"]
    );
}

#[test]
fn test_join_column_collision() {
    let left = table(&[json!({"k": "a", "location": "x"})]);
    let right = table(&[json!({"k": "a", "location": "y"})]);
    let err = left
        .join(&right, &[("k", "k")], JoinKind::Inner)
        .unwrap_err();
    assert_eq!(err.kind(), "schema_mismatch");
}

#[test]
fn test_join_casts_right_key() {
    let left = table(&[json!({"user": "7"})]);
    let right = table(&[json!({"uid": 7, "name": "A"})]);
    let joined = left.join(&right, &[("user", "uid")], JoinKind::Inner).unwrap();
    assert_eq!(joined.num_rows(), 1);
}

#[test]
fn test_join_requires_keys() {
    let t = table(&[json!({"a": 1})]);
    assert!(t.join(&t, &[], JoinKind::Inner).is_err());
}

// ============================================================================
// Partition Naming Tests
// ============================================================================

#[test_case("AR5KOSW1187FB35FF4", "AR5KOSW1187FB35FF4" ; "plain")]
#[test_case("a/b", "a%2Fb" ; "slash")]
#[test_case("k=v", "k%3Dv" ; "equals")]
#[test_case("100%", "100%25" ; "percent")]
#[test_case("Los Angeles, CA", "Los Angeles, CA" ; "spaces and commas kept")]
fn test_escape_partition_value(raw: &str, escaped: &str) {
    assert_eq!(escape_partition_value(raw), escaped);
    assert_eq!(unescape_partition_value(escaped), raw);
}

#[test]
fn test_partition_segment_null() {
    assert_eq!(
        partition_segment("year", None),
        format!("year={DEFAULT_PARTITION_NAME}")
    );
    assert_eq!(
        parse_partition_segment(&format!("year={DEFAULT_PARTITION_NAME}")),
        Some(("year".to_string(), None))
    );
}

#[test]
fn test_parse_partition_segment() {
    assert_eq!(
        parse_partition_segment("artist_id=a%2Fb"),
        Some(("artist_id".to_string(), Some("a/b".to_string())))
    );
    assert_eq!(parse_partition_segment("part-00000.snappy.parquet"), None);
    assert_eq!(parse_partition_segment("=x"), None);
}

// ============================================================================
// Parquet Sink Tests
// ============================================================================

fn songs() -> Table {
    table(&[
        json!({"song_id": "S1", "title": "T1", "artist_id": "A1", "year": 2000, "duration": 180.0}),
        json!({"song_id": "S2", "title": "T2", "artist_id": "A1", "year": 2000, "duration": 200.5}),
        json!({"song_id": "S3", "title": "T3", "artist_id": "A2", "year": 0, "duration": 90.0}),
    ])
    .select(&["song_id", "title", "artist_id", "year", "duration"])
    .unwrap()
}

#[tokio::test]
async fn test_write_partitioned_directories() {
    let location = memory_location();
    let config = ParquetWriterConfig::default();

    let summary = write_partitioned(
        &songs(),
        &location,
        "songs/songs.parquet",
        &["year", "artist_id"],
        WriteMode::Overwrite,
        &config,
    )
    .await
    .unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.files, 2);
    assert_eq!(
        summary.partitions,
        vec!["year=0/artist_id=A2", "year=2000/artist_id=A1"]
    );
    assert!(location
        .exists("songs/songs.parquet/_SUCCESS")
        .await
        .unwrap());
    assert!(location
        .exists("songs/songs.parquet/year=2000/artist_id=A1/part-00000.snappy.parquet")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_read_back_restores_partition_columns() {
    let location = memory_location();
    write_partitioned(
        &songs(),
        &location,
        "songs/songs.parquet",
        &["year", "artist_id"],
        WriteMode::Overwrite,
        &ParquetWriterConfig::default(),
    )
    .await
    .unwrap();

    let back = read_parquet_table(&location, "songs/songs.parquet", "songs")
        .await
        .unwrap();
    assert_eq!(
        back.column_names(),
        vec!["song_id", "title", "duration", "year", "artist_id"]
    );
    assert_eq!(back.schema().field_with_name("year").unwrap().data_type(), &DataType::Int64);
    assert_eq!(back.num_rows(), 3);

    let mut ids = strings(&back, "song_id");
    ids.sort();
    assert_eq!(ids, vec![Some("S1".into()), Some("S2".into()), Some("S3".into())]);
}

#[tokio::test]
async fn test_overwrite_removes_stale_partitions() {
    let location = memory_location();
    let config = ParquetWriterConfig::default();
    location
        .put(
            "songs/songs.parquet/year=1999/artist_id=OLD/part-00000.snappy.parquet",
            Bytes::from_static(b"stale"),
        )
        .await
        .unwrap();

    write_partitioned(
        &songs(),
        &location,
        "songs/songs.parquet",
        &["year", "artist_id"],
        WriteMode::Overwrite,
        &config,
    )
    .await
    .unwrap();

    assert!(!location
        .exists("songs/songs.parquet/year=1999/artist_id=OLD/part-00000.snappy.parquet")
        .await
        .unwrap());
    let back = read_parquet_table(&location, "songs/songs.parquet", "songs")
        .await
        .unwrap();
    assert_eq!(back.num_rows(), 3);
}

#[tokio::test]
async fn test_error_if_exists() {
    let location = memory_location();
    let config = ParquetWriterConfig::default();
    let t = table(&[json!({"a": 1})]);

    write_partitioned(&t, &location, "t", &[], WriteMode::ErrorIfExists, &config)
        .await
        .unwrap();
    let err = write_partitioned(&t, &location, "t", &[], WriteMode::ErrorIfExists, &config)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "sink_write");
}

#[tokio::test]
async fn test_null_partition_value() {
    let location = memory_location();
    let t = table(&[json!({"k": null, "v": 1}), json!({"k": "x", "v": 2})]);

    let summary = write_partitioned(
        &t,
        &location,
        "t",
        &["k"],
        WriteMode::Overwrite,
        &ParquetWriterConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(
        summary.partitions,
        vec![format!("k={DEFAULT_PARTITION_NAME}"), "k=x".to_string()]
    );

    let back = read_parquet_table(&location, "t", "t").await.unwrap();
    let mut keys = strings(&back, "k");
    keys.sort();
    assert_eq!(keys, vec![None, Some("x".to_string())]);
}

#[tokio::test]
async fn test_partition_types_survive_read_back() {
    let location = memory_location();
    let t = table(&[
        json!({"artist_id": "007", "v": 1}),
        json!({"artist_id": "12", "v": 2}),
    ])
    .with_column("month", |_| {
        Ok(Arc::new(arrow::array::Int32Array::from(vec![11, 12])) as _)
    })
    .unwrap();

    write_partitioned(
        &t,
        &location,
        "t",
        &["month", "artist_id"],
        WriteMode::Overwrite,
        &ParquetWriterConfig::default(),
    )
    .await
    .unwrap();

    let back = read_parquet_table(&location, "t", "t").await.unwrap();
    let schema = back.schema();
    assert_eq!(schema.field_with_name("artist_id").unwrap().data_type(), &DataType::Utf8);
    assert_eq!(schema.field_with_name("month").unwrap().data_type(), &DataType::Int32);
    let mut ids = strings(&back, "artist_id");
    ids.sort();
    assert_eq!(ids, vec![Some("007".to_string()), Some("12".to_string())]);
}

#[tokio::test]
async fn test_empty_marker_infers_partition_types() {
    let location = memory_location();
    let t = table(&[json!({"artist_id": "007", "v": 1})]);
    write_partitioned(
        &t,
        &location,
        "t",
        &["artist_id"],
        WriteMode::Overwrite,
        &ParquetWriterConfig::default(),
    )
    .await
    .unwrap();
    location.put("t/_SUCCESS", Bytes::new()).await.unwrap();

    let back = read_parquet_table(&location, "t", "t").await.unwrap();
    assert_eq!(ints(&back, "artist_id"), vec![Some(7)]);
}

#[test]
fn test_writer_config_sets_codec_and_row_groups() {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use parquet::basic::Compression;

    let records: Vec<Value> = (0..5).map(|i| json!({ "n": i })).collect();
    let config = ParquetWriterConfig::default().zstd().with_row_group_size(2);
    assert_eq!(config.file_extension(), "zstd.parquet");

    let bytes = encode_parquet(table(&records).batch(), &config).unwrap();
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).unwrap();
    let metadata = builder.metadata();
    assert_eq!(metadata.num_row_groups(), 3);
    assert!(matches!(
        metadata.row_group(0).column(0).compression(),
        Compression::ZSTD(_)
    ));
}

#[tokio::test]
async fn test_empty_partitioned_table_keeps_schema() {
    let location = memory_location();
    let empty = songs().filter_eq("song_id", "nope").unwrap();

    let summary = write_partitioned(
        &empty,
        &location,
        "songs/songs.parquet",
        &["year", "artist_id"],
        WriteMode::Overwrite,
        &ParquetWriterConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(summary.files, 1);
    assert!(summary.partitions.is_empty());

    let back = read_parquet_table(&location, "songs/songs.parquet", "songs")
        .await
        .unwrap();
    assert!(back.is_empty());
    assert_eq!(
        back.column_names(),
        vec!["song_id", "title", "duration", "year", "artist_id"]
    );
}

#[tokio::test]
async fn test_max_rows_per_file_splits() {
    let location = memory_location();
    let records: Vec<Value> = (0..5).map(|i| json!({ "n": i })).collect();
    let config = ParquetWriterConfig::default()
        .uncompressed()
        .with_max_rows_per_file(2);

    let summary = write_partitioned(
        &table(&records),
        &location,
        "users.parquet",
        &[],
        WriteMode::Overwrite,
        &config,
    )
    .await
    .unwrap();
    assert_eq!(summary.files, 3);
    assert!(location
        .exists("users.parquet/part-00002.parquet")
        .await
        .unwrap());

    let back = read_parquet_table(&location, "users.parquet", "users")
        .await
        .unwrap();
    assert_eq!(back.num_rows(), 5);
}

#[tokio::test]
async fn test_partition_on_missing_column() {
    let location = memory_location();
    let err = write_partitioned(
        &songs(),
        &location,
        "songs",
        &["month"],
        WriteMode::Overwrite,
        &ParquetWriterConfig::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "schema_mismatch");
}

#[tokio::test]
async fn test_read_missing_table() {
    let location = memory_location();
    let err = read_parquet_table(&location, "songs/songs.parquet", "songs")
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::Error::MissingUpstreamTable { .. }));
}

#[tokio::test]
async fn test_read_json_no_match() {
    let location = memory_location();
    let err = read_json(&location, "song_data/*/*/*/*.json").await.unwrap_err();
    assert_eq!(err.kind(), "source_read");
}

#[tokio::test]
async fn test_read_json_across_files() {
    let location = memory_location();
    location
        .put(
            "log_data/2018/11/a.json",
            Bytes::from_static(b"{\"page\":\"NextSong\",\"ts\":1}\n{\"page\":\"Home\",\"ts\":2}\n"),
        )
        .await
        .unwrap();
    location
        .put(
            "log_data/2018/11/b.json",
            Bytes::from_static(b"{\"page\":\"NextSong\",\"ts\":3,\"extra\":true}\n"),
        )
        .await
        .unwrap();

    let t = read_json(&location, "log_data/*/*/*.json").await.unwrap();
    assert_eq!(t.num_rows(), 3);
    assert_eq!(t.column_names(), vec!["extra", "page", "ts"]);
}

#[tokio::test]
async fn test_read_json_malformed_file() {
    let location = memory_location();
    location
        .put("log_data/2018/11/bad.json", Bytes::from_static(b"{\"page\":"))
        .await
        .unwrap();

    let err = read_json(&location, "log_data/*/*/*.json").await.unwrap_err();
    assert_eq!(err.kind(), "source_read");
    assert!(err.to_string().contains("bad.json"));
}
