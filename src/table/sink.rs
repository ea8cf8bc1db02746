//! Parquet sink and source
//!
//! Tables are written as Hive-style partitioned directories of Parquet part
//! files, finished with a `_SUCCESS` marker that carries the table's Arrow
//! schema in IPC stream form. Reading back requires the marker and restores
//! partition columns from the directory names, typed as they were written.

use super::frame::Table;
use super::partition::{parse_partition_segment, partition_segment};
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use arrow::array::{new_null_array, Array, ArrayRef, StringArray, UInt32Array};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::ipc::reader::StreamReader;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Name of the marker written after every part file
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    max_rows_per_file: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
            max_rows_per_file: 0,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Split part files at this many rows (0 = never split)
    #[must_use]
    pub fn with_max_rows_per_file(mut self, rows: usize) -> Self {
        self.max_rows_per_file = rows;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    /// Use GZIP compression
    #[must_use]
    pub fn gzip(mut self) -> Self {
        self.compression = Compression::GZIP(parquet::basic::GzipLevel::default());
        self
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Get the per-file row limit
    #[must_use]
    pub fn max_rows_per_file(&self) -> usize {
        self.max_rows_per_file
    }

    /// Part file suffix, e.g. `snappy.parquet`
    #[must_use]
    pub fn file_extension(&self) -> &'static str {
        match self.compression {
            Compression::SNAPPY => "snappy.parquet",
            Compression::ZSTD(_) => "zstd.parquet",
            Compression::GZIP(_) => "gz.parquet",
            _ => "parquet",
        }
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// In-memory Parquet encoder
pub struct ParquetWriter {
    writer: ArrowWriter<Vec<u8>>,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(schema: SchemaRef, config: &ParquetWriterConfig) -> Result<Self> {
        let writer = ArrowWriter::try_new(Vec::new(), schema, Some(config.build_properties()))?;
        Ok(Self { writer })
    }

    /// Write a RecordBatch
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch)?;
        Ok(())
    }

    /// Finish the file and return its bytes
    pub fn finish(self) -> Result<Bytes> {
        let buf = self.writer.into_inner()?;
        Ok(Bytes::from(buf))
    }
}

/// Encode one batch as a complete Parquet file
pub fn encode_parquet(batch: &RecordBatch, config: &ParquetWriterConfig) -> Result<Bytes> {
    let mut writer = ParquetWriter::new(batch.schema(), config)?;
    writer.write(batch)?;
    writer.finish()
}

/// What to do when the destination already holds data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Delete everything under the destination first
    #[default]
    Overwrite,
    /// Fail if anything exists under the destination
    ErrorIfExists,
}

/// Result of a table write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Destination as a display path
    pub path: String,
    /// Rows written
    pub rows: usize,
    /// Part files written
    pub files: usize,
    /// Partition directories, relative to the destination
    pub partitions: Vec<String>,
}

/// Write a table under `path`, partitioned by the given columns
///
/// Partition columns are removed from the file contents and carried in
/// `column=value` directories instead.
pub async fn write_partitioned(
    table: &Table,
    location: &StorageLocation,
    path: &str,
    partition_by: &[&str],
    mode: WriteMode,
    config: &ParquetWriterConfig,
) -> Result<WriteSummary> {
    let path = path.trim_matches('/');
    for column in partition_by {
        table.column(column)?;
    }
    if partition_by.len() == table.schema().fields().len() && !partition_by.is_empty() {
        return Err(Error::schema_mismatch(
            partition_by.join(","),
            "Cannot partition by every column",
        ));
    }

    match mode {
        WriteMode::Overwrite => {
            let removed = location.delete_prefix(path).await?;
            if removed > 0 {
                debug!(path, removed, "Cleared destination before overwrite");
            }
        }
        WriteMode::ErrorIfExists => {
            if !location.list(path).await?.is_empty() {
                return Err(Error::sink_write(
                    location.display_path(path),
                    "Destination already exists",
                ));
            }
        }
    }

    let mut files = 0;
    let mut partitions = Vec::new();

    if partition_by.is_empty() {
        files += write_parts(table.batch(), location, path, config).await?;
    } else if table.is_empty() {
        // Keep the schema readable: partition columns go last, as on read
        let data = table.drop(partition_by)?;
        let mut columns: Vec<&str> = Vec::new();
        let names = data.column_names();
        columns.extend(names.iter().map(String::as_str));
        columns.extend(partition_by.iter().copied());
        files += write_parts(table.select(&columns)?.batch(), location, path, config).await?;
    } else {
        let data = table.drop(partition_by)?;
        for (dir, indices) in group_by_partition(table, partition_by)? {
            let rows = data.take(&UInt32Array::from(indices))?;
            let dir_path = format!("{path}/{dir}");
            files += write_parts(rows.batch(), location, &dir_path, config).await?;
            partitions.push(dir);
        }
    }

    let marker = format!("{path}/{SUCCESS_MARKER}");
    let schema = encode_schema(&table.schema())
        .map_err(|e| Error::sink_write(location.display_path(&marker), e.to_string()))?;
    location.put(&marker, schema).await?;

    debug!(
        path,
        rows = table.num_rows(),
        files,
        partitions = partitions.len(),
        "Wrote table"
    );

    Ok(WriteSummary {
        path: location.display_path(path),
        rows: table.num_rows(),
        files,
        partitions,
    })
}

/// Arrow schema as an IPC stream with no batches
fn encode_schema(schema: &Schema) -> Result<Bytes> {
    let mut writer = StreamWriter::try_new(Vec::new(), schema)?;
    writer.finish()?;
    Ok(Bytes::from(writer.into_inner()?))
}

/// Schema recorded in a `_SUCCESS` marker; `None` for an empty marker
fn decode_schema(bytes: &[u8]) -> Result<Option<SchemaRef>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let reader = StreamReader::try_new(bytes, None)?;
    Ok(Some(reader.schema()))
}

/// Group row indices by their partition directory, in directory order
fn group_by_partition(table: &Table, partition_by: &[&str]) -> Result<BTreeMap<String, Vec<u32>>> {
    let values = partition_by
        .iter()
        .map(|name| {
            let column = table.column(name)?;
            let strings = compute::cast(column, &DataType::Utf8)?;
            strings
                .as_any()
                .downcast_ref::<StringArray>()
                .cloned()
                .ok_or_else(|| Error::schema_mismatch(*name, "Partition value is not a string"))
        })
        .collect::<Result<Vec<StringArray>>>()?;

    let mut groups: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for row in 0..table.num_rows() {
        let dir = partition_by
            .iter()
            .zip(&values)
            .map(|(name, array)| {
                let value = (!array.is_null(row)).then(|| array.value(row));
                partition_segment(name, value)
            })
            .collect::<Vec<_>>()
            .join("/");
        groups.entry(dir).or_default().push(row as u32);
    }
    Ok(groups)
}

/// Write one directory's rows as one or more part files
async fn write_parts(
    batch: &RecordBatch,
    location: &StorageLocation,
    dir: &str,
    config: &ParquetWriterConfig,
) -> Result<usize> {
    let limit = match config.max_rows_per_file() {
        0 => batch.num_rows().max(1),
        n => n,
    };

    let mut files = 0;
    let mut offset = 0;
    loop {
        let len = limit.min(batch.num_rows() - offset);
        let chunk = batch.slice(offset, len);
        let key = format!("{dir}/part-{files:05}.{}", config.file_extension());
        let data = encode_parquet(&chunk, config)
            .map_err(|e| Error::sink_write(location.display_path(&key), e.to_string()))?;
        location.put(&key, data).await?;

        files += 1;
        offset += len;
        if offset >= batch.num_rows() {
            break;
        }
    }
    Ok(files)
}

/// One part file plus the partition values from its directory
struct PartFile {
    batch: RecordBatch,
    partition_values: Vec<(String, Option<String>)>,
}

/// Read a table previously written by `write_partitioned`
///
/// Fails with `MissingUpstreamTable` when the `_SUCCESS` marker is absent.
pub async fn read_parquet_table(
    location: &StorageLocation,
    path: &str,
    table_name: &str,
) -> Result<Table> {
    let path = path.trim_matches('/');
    let marker = format!("{path}/{SUCCESS_MARKER}");
    if !location.exists(&marker).await? {
        return Err(Error::missing_upstream(
            table_name,
            location.display_path(path),
        ));
    }
    let written = decode_schema(&location.get(&marker).await?)
        .map_err(|e| Error::source_read(location.display_path(&marker), e.to_string()))?;

    let mut keys: Vec<String> = location
        .list(path)
        .await?
        .iter()
        .map(|meta| location.relative_key(&meta.location))
        .filter(|key| is_part_file(key))
        .collect();
    keys.sort();

    let mut parts = Vec::with_capacity(keys.len());
    for key in &keys {
        let bytes = location.get(key).await?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)
            .map_err(|e| Error::source_read(location.display_path(key), e.to_string()))?;
        let schema = Arc::clone(builder.schema());
        let batches = builder
            .build()?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let batch = compute::concat_batches(&schema, &batches)?;

        let relative = key
            .strip_prefix(path)
            .unwrap_or(key)
            .trim_start_matches('/');
        let partition_values = relative
            .split('/')
            .filter_map(parse_partition_segment)
            .collect();

        parts.push(PartFile {
            batch,
            partition_values,
        });
    }

    let Some(first) = parts.first() else {
        return Err(Error::missing_upstream(
            table_name,
            location.display_path(path),
        ));
    };

    let partition_names: Vec<String> = parts
        .iter()
        .flat_map(|p| p.partition_values.iter().map(|(k, _)| k.clone()))
        .fold(Vec::new(), |mut acc, name| {
            if !acc.contains(&name) {
                acc.push(name);
            }
            acc
        });

    let mut fields: Vec<Field> = first
        .batch
        .schema()
        .fields()
        .iter()
        .filter(|f| !partition_names.contains(f.name()))
        .map(|f| f.as_ref().clone())
        .collect();
    for name in &partition_names {
        fields.push(Field::new(
            name,
            partition_type(&parts, name, &first.batch, written.as_deref()),
            true,
        ));
    }
    let schema = Arc::new(Schema::new(fields));

    let batches = parts
        .iter()
        .map(|part| align_part(part, &schema))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        path,
        files = parts.len(),
        rows = batches.iter().map(RecordBatch::num_rows).sum::<usize>(),
        "Read table"
    );

    Table::from_batches(schema, &batches)
}

fn is_part_file(key: &str) -> bool {
    let name = key.rsplit('/').next().unwrap_or(key);
    name.ends_with(".parquet") && !name.starts_with(['_', '.'])
}

/// The type recorded at write time, else Int64 when every directory value
/// parses as an integer and Utf8 otherwise
fn partition_type(
    parts: &[PartFile],
    name: &str,
    first: &RecordBatch,
    written: Option<&Schema>,
) -> DataType {
    if let Some(field) = written.and_then(|s| s.field_with_name(name).ok()) {
        return field.data_type().clone();
    }

    let mut values = parts
        .iter()
        .flat_map(|p| p.partition_values.iter())
        .filter(|(k, _)| k == name)
        .filter_map(|(_, v)| v.as_deref())
        .peekable();

    if values.peek().is_none() {
        return first
            .schema()
            .field_with_name(name)
            .map_or(DataType::Utf8, |f| f.data_type().clone());
    }
    if values.all(|v| v.parse::<i64>().is_ok()) {
        DataType::Int64
    } else {
        DataType::Utf8
    }
}

/// Project a part file onto the table schema, filling partition columns
fn align_part(part: &PartFile, schema: &SchemaRef) -> Result<RecordBatch> {
    let rows = part.batch.num_rows();
    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let from_dir = part
                .partition_values
                .iter()
                .find(|(k, _)| k == field.name())
                .map(|(_, v)| v.as_deref());

            let array: ArrayRef = match (from_dir, part.batch.column_by_name(field.name())) {
                (Some(value), _) => partition_array(value, field.data_type(), rows)?,
                (None, Some(column)) if column.data_type() == field.data_type() => {
                    Arc::clone(column)
                }
                (None, Some(column)) => compute::cast(column, field.data_type())?,
                (None, None) => new_null_array(field.data_type(), rows),
            };
            Ok(array)
        })
        .collect::<Result<Vec<_>>>()?;

    let options = arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(rows));
    Ok(RecordBatch::try_new_with_options(
        Arc::clone(schema),
        columns,
        &options,
    )?)
}

/// Repeat a directory value `rows` times as `data_type`
///
/// Values that do not parse as the target type become nulls.
fn partition_array(value: Option<&str>, data_type: &DataType, rows: usize) -> Result<ArrayRef> {
    let Some(value) = value else {
        return Ok(new_null_array(data_type, rows));
    };
    let strings: ArrayRef = Arc::new(StringArray::from(vec![value; rows]));
    if data_type == &DataType::Utf8 {
        return Ok(strings);
    }
    Ok(compute::cast(&strings, data_type)?)
}
