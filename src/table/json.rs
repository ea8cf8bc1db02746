//! Line-delimited JSON source
//!
//! Reads JSON Lines objects from a storage location, infers an Arrow schema
//! across every record and builds a single RecordBatch.

use super::frame::Table;
use crate::error::{Error, Result};
use crate::storage::{GlobPattern, StorageLocation};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, ListArray, NullArray, StringArray,
    StructArray,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Read every JSON Lines file matching `pattern` under `location`
///
/// Fails when nothing matches or any line is not valid JSON.
pub async fn read_json(location: &StorageLocation, pattern: &str) -> Result<Table> {
    let glob = GlobPattern::new(pattern)?;
    let keys = location.glob(&glob).await?;
    if keys.is_empty() {
        return Err(Error::source_read(
            location.display_path(glob.as_str()),
            "No files match the pattern",
        ));
    }

    let mut records = Vec::new();
    for key in &keys {
        let bytes = location.get(key).await?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| Error::source_read(location.display_path(key), e.to_string()))?;
        let decoded = decode_json_lines(text)
            .map_err(|message| Error::source_read(location.display_path(key), message))?;
        records.extend(decoded);
    }

    debug!(
        files = keys.len(),
        records = records.len(),
        pattern = glob.as_str(),
        "Decoded JSON source"
    );

    Ok(Table::new(json_to_arrow(&records, None)?))
}

/// Split a JSON Lines body into records
///
/// A line holding an array contributes each of its elements.
pub fn decode_json_lines(body: &str) -> std::result::Result<Vec<Value>, String> {
    let mut records = Vec::new();

    for (line_num, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line)
            .map_err(|e| format!("Failed to parse JSON at line {}: {e}", line_num + 1))?;

        match value {
            Value::Object(_) => records.push(value),
            Value::Array(items) => {
                for item in items {
                    if !item.is_object() {
                        return Err(format!(
                            "Expected JSON objects in array at line {}",
                            line_num + 1
                        ));
                    }
                    records.push(item);
                }
            }
            _ => {
                return Err(format!("Expected a JSON object at line {}", line_num + 1));
            }
        }
    }

    Ok(records)
}

/// Infer an Arrow schema from a set of JSON records
///
/// Fields are sorted by name. Every field is nullable, and a field that is
/// null in every record is typed as Utf8.
pub fn infer_schema(records: &[Value]) -> Schema {
    let mut field_types: BTreeMap<String, DataType> = BTreeMap::new();

    for record in records {
        if let Value::Object(obj) = record {
            for (key, value) in obj {
                let inferred_type = infer_type(value);
                field_types
                    .entry(key.clone())
                    .and_modify(|existing| {
                        *existing = merge_types(existing, &inferred_type);
                    })
                    .or_insert(inferred_type);
            }
        }
    }

    let fields: Vec<Field> = field_types
        .into_iter()
        .map(|(name, dtype)| {
            let dtype = if dtype == DataType::Null {
                DataType::Utf8
            } else {
                dtype
            };
            Field::new(name, dtype, true)
        })
        .collect();

    Schema::new(fields)
}

/// Convert JSON records to an Arrow RecordBatch
///
/// Uses the provided schema or infers one from the data.
pub fn json_to_arrow(records: &[Value], schema: Option<&Schema>) -> Result<RecordBatch> {
    let schema = match schema {
        Some(schema) => schema.clone(),
        None => infer_schema(records),
    };

    if records.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(schema)));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let values: Vec<Option<&Value>> = records
            .iter()
            .map(|record| record.as_object().and_then(|obj| obj.get(field.name())))
            .collect();

        columns.push(build_array(&values, field.data_type())?);
    }

    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

/// Infer Arrow DataType from a JSON value
fn infer_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        Value::String(_) => DataType::Utf8,
        Value::Array(arr) => {
            let element_type = arr
                .iter()
                .map(infer_type)
                .reduce(|a, b| merge_types(&a, &b))
                .unwrap_or(DataType::Null);
            DataType::List(Arc::new(Field::new("item", element_type, true)))
        }
        Value::Object(obj) => {
            let fields: Vec<Field> = obj
                .iter()
                .map(|(k, v)| Field::new(k, infer_type(v), true))
                .collect();
            DataType::Struct(Fields::from(fields))
        }
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        // Null can merge with anything
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        // Numbers can merge (prefer Float64 for mixed)
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        (DataType::List(a), DataType::List(b)) => {
            let item = merge_types(a.data_type(), b.data_type());
            DataType::List(Arc::new(Field::new("item", item, true)))
        }

        (DataType::Struct(a), DataType::Struct(b)) => {
            let mut merged: BTreeMap<String, DataType> = a
                .iter()
                .map(|f| (f.name().clone(), f.data_type().clone()))
                .collect();
            for field in b {
                merged
                    .entry(field.name().clone())
                    .and_modify(|existing| *existing = merge_types(existing, field.data_type()))
                    .or_insert_with(|| field.data_type().clone());
            }
            let fields: Vec<Field> = merged
                .into_iter()
                .map(|(name, dtype)| Field::new(name, dtype, true))
                .collect();
            DataType::Struct(Fields::from(fields))
        }

        // Different types -> fall back to String (most flexible)
        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&Value>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(Arc::new(NullArray::new(values.len()))),

        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.and_then(|v| match v {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        _ => Some(v.to_string()),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::List(field) => build_list_array(values, field),

        DataType::Struct(fields) => build_struct_array(values, fields),

        other => Err(Error::schema_mismatch(
            "",
            format!("Unsupported JSON column type {other}"),
        )),
    }
}

/// Build a list array from JSON arrays
fn build_list_array(values: &[Option<&Value>], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut all_items: Vec<Option<&Value>> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];
    let mut validity: Vec<bool> = Vec::with_capacity(values.len());

    for value in values {
        if let Some(Value::Array(arr)) = value {
            all_items.extend(arr.iter().map(Some));
            validity.push(true);
        } else {
            validity.push(false);
        }
        let offset = i32::try_from(all_items.len())
            .map_err(|_| Error::Other("Array too large for i32 offset".to_string()))?;
        offsets.push(offset);
    }

    let items_array = build_array(&all_items, field.data_type())?;
    let list_array = ListArray::try_new(
        Arc::clone(field),
        OffsetBuffer::new(offsets.into()),
        items_array,
        Some(validity.into()),
    )?;
    Ok(Arc::new(list_array))
}

/// Build a struct array from JSON objects
fn build_struct_array(values: &[Option<&Value>], fields: &Fields) -> Result<ArrayRef> {
    let mut child_arrays: Vec<ArrayRef> = Vec::with_capacity(fields.len());

    for field in fields {
        let child_values: Vec<Option<&Value>> = values
            .iter()
            .map(|v| v.and_then(|v| v.as_object()).and_then(|obj| obj.get(field.name())))
            .collect();

        child_arrays.push(build_array(&child_values, field.data_type())?);
    }

    let validity: Vec<bool> = values
        .iter()
        .map(|v| matches!(v, Some(Value::Object(_))))
        .collect();

    let struct_array = StructArray::try_new(fields.clone(), child_arrays, Some(validity.into()))?;
    Ok(Arc::new(struct_array))
}
