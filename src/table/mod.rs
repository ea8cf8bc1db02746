//! Table module
//!
//! A small tabular engine over Arrow: the record source and sink the
//! transformers run against.
//!
//! # Overview
//!
//! This module provides:
//! - `read_json` - schema-inferring read of JSON Lines files by glob
//! - `Table` - select, filter, deduplicate, derived columns, equi-join
//! - `write_partitioned` - Hive-partitioned Parquet output with overwrite
//! - `read_parquet_table` - read a written table back, partitions included

mod frame;
mod json;
mod partition;
mod sink;

pub use frame::{JoinKind, Table};
pub use json::{decode_json_lines, infer_schema, json_to_arrow, read_json};
pub use partition::{
    escape_partition_value, parse_partition_segment, partition_segment,
    unescape_partition_value, DEFAULT_PARTITION_NAME,
};
pub use sink::{
    encode_parquet, read_parquet_table, write_partitioned, ParquetWriter, ParquetWriterConfig,
    WriteMode, WriteSummary, SUCCESS_MARKER,
};

#[cfg(test)]
mod tests;
