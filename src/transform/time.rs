//! Timestamp derivation
//!
//! Event `ts` values are milliseconds since the Unix epoch, interpreted as
//! UTC.

use crate::error::{Error, Result};
use arrow::array::{Array, ArrayRef, Int32Array, Int64Array, TimestampMillisecondArray};
use arrow::compute::{self, CastOptions};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::sync::Arc;

/// Calendar parts of one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    /// The instant itself
    pub start_time: DateTime<Utc>,
    /// Hour of day, 0-23
    pub hour: u32,
    /// Day of month, 1-31
    pub day: u32,
    /// ISO-8601 week of year
    pub week: u32,
    /// Month, 1-12
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// 1 = Sunday ... 7 = Saturday
    pub weekday: u32,
}

/// Split epoch milliseconds into calendar parts
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn time_parts(epoch_millis: i64) -> Option<TimeParts> {
    let start_time = DateTime::<Utc>::from_timestamp_millis(epoch_millis)?;
    Some(TimeParts {
        start_time,
        hour: start_time.hour(),
        day: start_time.day(),
        week: start_time.iso_week().week(),
        month: start_time.month(),
        year: start_time.year(),
        weekday: start_time.weekday().number_from_sunday(),
    })
}

/// Read the `ts` column as Int64 epoch milliseconds
fn epoch_millis(ts: &ArrayRef) -> Result<Int64Array> {
    let options = CastOptions {
        safe: false,
        ..CastOptions::default()
    };
    let casted = compute::cast_with_options(ts, &DataType::Int64, &options).map_err(|e| {
        Error::schema_mismatch("ts", format!("Cannot read as epoch milliseconds: {e}"))
    })?;
    casted
        .as_any()
        .downcast_ref::<Int64Array>()
        .cloned()
        .ok_or_else(|| Error::schema_mismatch("ts", "Expected Int64 after cast"))
}

/// Build `start_time` from a `ts` column
pub fn start_time_column(ts: &ArrayRef) -> Result<ArrayRef> {
    let millis = epoch_millis(ts)?;
    let start_time: TimestampMillisecondArray = millis
        .iter()
        .map(|v| v.and_then(time_parts).map(|p| p.start_time.timestamp_millis()))
        .collect();
    Ok(Arc::new(start_time.with_timezone("UTC")))
}

/// Names of the derived time columns, in output order
pub const TIME_PART_COLUMNS: [&str; 6] = ["hour", "day", "week", "month", "year", "weekday"];

/// Derive one time-part column from `start_time`
///
/// Null instants yield null parts.
pub fn time_part_column(start_time: &ArrayRef, part: &str) -> Result<ArrayRef> {
    let start_time = start_time
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .ok_or_else(|| {
            Error::schema_mismatch(
                "start_time",
                format!(
                    "Expected {:?}, found {:?}",
                    DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
                    start_time.data_type()
                ),
            )
        })?;

    let extract: fn(&TimeParts) -> i32 = match part {
        "hour" => |p| p.hour as i32,
        "day" => |p| p.day as i32,
        "week" => |p| p.week as i32,
        "month" => |p| p.month as i32,
        "year" => |p| p.year,
        "weekday" => |p| p.weekday as i32,
        other => return Err(Error::schema_mismatch(other, "Unknown time part")),
    };

    let values: Int32Array = (0..start_time.len())
        .map(|i| {
            if start_time.is_null(i) {
                None
            } else {
                time_parts(start_time.value(i)).map(|p| extract(&p))
            }
        })
        .collect();
    Ok(Arc::new(values))
}
