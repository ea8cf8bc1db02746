//! In-memory table over a single Arrow RecordBatch
//!
//! Every operation returns a new `Table`; the input is never mutated.

use crate::error::{Error, Result};
use arrow::array::{Array, ArrayRef, BooleanArray, Int64Array, StringArray, UInt32Array};
use arrow::compute::{self, kernels::cmp};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, Rows, SortField};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Join variants supported by `Table::join`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// Keep only left rows with at least one match
    #[default]
    Inner,
    /// Keep every left row; unmatched rows get null right columns
    Left,
}

/// A materialized table
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Wrap a RecordBatch
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// A table with the given schema and no rows
    pub fn empty(schema: SchemaRef) -> Self {
        Self::new(RecordBatch::new_empty(schema))
    }

    /// Concatenate batches sharing one schema
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        Ok(Self::new(compute::concat_batches(&schema, batches)?))
    }

    /// The underlying batch
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consume the table, returning the batch
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// Table schema
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| missing_column(name, &self.batch))
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.batch
            .schema()
            .index_of(name)
            .map_err(|_| missing_column(name, &self.batch))
    }

    /// Project the named columns, in the given order
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        let indices = columns
            .iter()
            .map(|name| self.index_of(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(self.batch.project(&indices)?))
    }

    /// Remove the named columns; names that are not present are ignored
    pub fn drop(&self, columns: &[&str]) -> Result<Self> {
        let schema = self.batch.schema();
        let indices: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| !columns.contains(&f.name().as_str()))
            .map(|(i, _)| i)
            .collect();
        Ok(Self::new(self.batch.project(&indices)?))
    }

    /// Keep rows where `predicate` is true; null counts as false
    pub fn filter(&self, predicate: &BooleanArray) -> Result<Self> {
        if predicate.len() != self.num_rows() {
            return Err(Error::Other(format!(
                "Filter predicate has {} rows, table has {}",
                predicate.len(),
                self.num_rows()
            )));
        }
        Ok(Self::new(compute::filter_record_batch(
            &self.batch,
            predicate,
        )?))
    }

    /// Keep rows where a column's string form equals `value`
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<Self> {
        let array = self.column(column)?;
        let array = if array.data_type() == &DataType::Utf8 {
            Arc::clone(array)
        } else {
            compute::cast(array, &DataType::Utf8)?
        };
        let predicate = cmp::eq(&array, &StringArray::new_scalar(value))?;
        self.filter(&predicate)
    }

    /// Drop rows where any of the named columns is null
    pub fn drop_nulls(&self, columns: &[&str]) -> Result<Self> {
        let mut keep: Option<BooleanArray> = None;
        for name in columns {
            let not_null = compute::is_not_null(self.column(name)?)?;
            keep = Some(match keep {
                Some(acc) => compute::and(&acc, &not_null)?,
                None => not_null,
            });
        }
        match keep {
            Some(predicate) => self.filter(&predicate),
            None => Ok(self.clone()),
        }
    }

    /// Remove rows that duplicate an earlier row across every column
    ///
    /// The first occurrence is kept and row order is otherwise preserved.
    /// Nulls compare equal to each other.
    pub fn deduplicate(&self) -> Result<Self> {
        if self.batch.num_columns() == 0 || self.num_rows() < 2 {
            return Ok(self.clone());
        }

        let rows = encode_rows(self.batch.columns())?;
        let mut seen = HashSet::with_capacity(rows.num_rows());
        let keep: Vec<u32> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| seen.insert(*row))
            .map(|(i, _)| i as u32)
            .collect();

        if keep.len() == self.num_rows() {
            return Ok(self.clone());
        }
        self.take(&UInt32Array::from(keep))
    }

    /// Append a column computed from the whole batch, replacing any column
    /// with the same name in place
    pub fn with_column<F>(&self, name: &str, compute_fn: F) -> Result<Self>
    where
        F: FnOnce(&RecordBatch) -> Result<ArrayRef>,
    {
        let array = compute_fn(&self.batch)?;
        if array.len() != self.num_rows() {
            return Err(Error::schema_mismatch(
                name,
                format!(
                    "Derived column has {} rows, table has {}",
                    array.len(),
                    self.num_rows()
                ),
            ));
        }

        let schema = self.batch.schema();
        let field = Arc::new(Field::new(name, array.data_type().clone(), true));
        let mut fields: Vec<Arc<Field>> = schema.fields().iter().cloned().collect();
        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();

        if let Ok(idx) = schema.index_of(name) {
            fields[idx] = field;
            columns[idx] = array;
        } else {
            fields.push(field);
            columns.push(array);
        }

        Ok(Self::new(RecordBatch::try_new(
            Arc::new(Schema::new(fields)),
            columns,
        )?))
    }

    /// Add a unique Int64 key built from a partition index and a counter
    ///
    /// Rows are split into consecutive partitions of `rows_per_partition`;
    /// the key is `(partition << 33) + position_in_partition`. Keys are
    /// unique and increasing within one table; nothing is promised across
    /// runs.
    pub fn with_surrogate_key(&self, name: &str, rows_per_partition: usize) -> Result<Self> {
        let per_partition = i64::try_from(rows_per_partition.max(1))
            .ok()
            .filter(|n| *n < (1_i64 << 33))
            .ok_or_else(|| {
                Error::config(format!(
                    "rows_per_partition must be below 2^33, got {rows_per_partition}"
                ))
            })?;

        let num_rows = self.num_rows() as i64;
        self.with_column(name, |_| {
            let ids = (0..num_rows)
                .map(|i| {
                    surrogate_key(i, per_partition).ok_or_else(|| {
                        Error::config(format!("surrogate key overflows i64 at row {i}"))
                    })
                })
                .collect::<Result<Int64Array>>()?;
            Ok(Arc::new(ids) as ArrayRef)
        })
    }

    /// Equi-join with another table
    ///
    /// `on` pairs a left column with a right column; all pairs must be equal
    /// for rows to match. Null keys never match. Right key columns are cast
    /// to the left key type when they differ. The output holds every left
    /// column followed by every right column, except right keys that share
    /// their left key's name.
    pub fn join(&self, right: &Table, on: &[(&str, &str)], kind: JoinKind) -> Result<Self> {
        if on.is_empty() {
            return Err(Error::schema_mismatch(
                "",
                "Join requires at least one key pair",
            ));
        }

        let left_keys = on
            .iter()
            .map(|(l, _)| self.column(l).cloned())
            .collect::<Result<Vec<_>>>()?;
        let right_keys = on
            .iter()
            .zip(&left_keys)
            .map(|((_, r), left)| {
                let array = right.column(r)?;
                if array.data_type() == left.data_type() {
                    Ok(Arc::clone(array))
                } else {
                    compute::cast(array, left.data_type()).map_err(|e| {
                        Error::schema_mismatch(
                            *r,
                            format!("Cannot compare with {}: {e}", left.data_type()),
                        )
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let converter = RowConverter::new(
            left_keys
                .iter()
                .map(|a| SortField::new(a.data_type().clone()))
                .collect(),
        )?;
        let left_rows = converter.convert_columns(&left_keys)?;
        let right_rows = converter.convert_columns(&right_keys)?;

        let mut index: HashMap<_, Vec<u32>> = HashMap::new();
        for (i, row) in right_rows.iter().enumerate() {
            if !any_null(&right_keys, i) {
                index.entry(row).or_default().push(i as u32);
            }
        }

        let mut left_indices: Vec<u32> = Vec::new();
        let mut right_indices: Vec<Option<u32>> = Vec::new();
        for (i, row) in left_rows.iter().enumerate() {
            let matches = if any_null(&left_keys, i) {
                None
            } else {
                index.get(&row)
            };
            match matches {
                Some(rows) => {
                    for r in rows {
                        left_indices.push(i as u32);
                        right_indices.push(Some(*r));
                    }
                }
                None if kind == JoinKind::Left => {
                    left_indices.push(i as u32);
                    right_indices.push(None);
                }
                None => {}
            }
        }

        let left_indices = UInt32Array::from(left_indices);
        let right_indices = UInt32Array::from(right_indices);

        let shared_keys: HashSet<&str> = on
            .iter()
            .filter(|(l, r)| l == r)
            .map(|(_, r)| *r)
            .collect();

        let left_schema = self.schema();
        let mut fields: Vec<Arc<Field>> = left_schema.fields().iter().cloned().collect();
        let mut columns: Vec<ArrayRef> = self
            .batch
            .columns()
            .iter()
            .map(|c| compute::take(c.as_ref(), &left_indices, None))
            .collect::<std::result::Result<_, _>>()?;

        let right_schema = right.schema();
        for (field, column) in right_schema.fields().iter().zip(right.batch.columns()) {
            if shared_keys.contains(field.name().as_str()) {
                continue;
            }
            if left_schema.index_of(field.name()).is_ok() {
                return Err(Error::schema_mismatch(
                    field.name(),
                    "Column exists on both sides of the join",
                ));
            }
            let field = match kind {
                JoinKind::Inner => Arc::clone(field),
                JoinKind::Left => Arc::new(field.as_ref().clone().with_nullable(true)),
            };
            fields.push(field);
            columns.push(compute::take(column.as_ref(), &right_indices, None)?);
        }

        let options =
            arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(left_indices.len()));
        Ok(Self::new(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            columns,
            &options,
        )?))
    }

    /// Gather rows by index
    pub fn take(&self, indices: &UInt32Array) -> Result<Self> {
        let columns = self
            .batch
            .columns()
            .iter()
            .map(|c| compute::take(c.as_ref(), indices, None))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let options =
            arrow::record_batch::RecordBatchOptions::new().with_row_count(Some(indices.len()));
        Ok(Self::new(RecordBatch::try_new_with_options(
            self.batch.schema(),
            columns,
            &options,
        )?))
    }

    /// Rows as JSON objects, for inspection and tests
    pub fn to_json_rows(&self) -> Result<Vec<serde_json::Value>> {
        let mut writer = arrow::json::ArrayWriter::new(Vec::new());
        writer.write(&self.batch)?;
        writer.finish()?;
        let buf = writer.into_inner();
        if buf.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&buf)?)
    }
}

/// Encode columns into comparable, hashable rows
/// `(row / per_partition) << 33` plus the row's position in its partition,
/// or `None` when that does not fit in an i64
pub(crate) fn surrogate_key(row: i64, per_partition: i64) -> Option<i64> {
    (row / per_partition)
        .checked_mul(1_i64 << 33)?
        .checked_add(row % per_partition)
}

fn encode_rows(columns: &[ArrayRef]) -> Result<Rows> {
    let converter = RowConverter::new(
        columns
            .iter()
            .map(|c| SortField::new(c.data_type().clone()))
            .collect(),
    )?;
    Ok(converter.convert_columns(columns)?)
}

fn any_null(columns: &[ArrayRef], row: usize) -> bool {
    columns.iter().any(|c| c.is_null(row))
}

fn missing_column(name: &str, batch: &RecordBatch) -> Error {
    let available: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    Error::schema_mismatch(
        name,
        format!("Column not found; available: {}", available.join(", ")),
    )
}
