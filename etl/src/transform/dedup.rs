use crate::models::Table;
use arrow::array::{ArrayRef, AsArray, UInt32Array};
use arrow::compute::take_record_batch;
use arrow::datatypes::{DataType, Float32Type, Float64Type};
use arrow::record_batch::RecordBatch;
use arrow::row::{OwnedRow, RowConverter, SortField};
use chrono::{DateTime, Utc};
use common::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Collapses rows that are identical across every column.
///
/// The first occurrence of each distinct row is kept and surviving rows keep
/// their relative order, so the output order is a pure function of the input.
/// Nulls compare equal to each other, as do `0.0` and `-0.0`, and any two NaNs.
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Self
    }

    pub fn deduplicate(&self, table: &Table) -> Result<(Table, DedupMetrics)> {
        let start_time = Utc::now();
        let batch = table.batch();
        let total_records = batch.num_rows();

        let fields = batch
            .schema()
            .fields()
            .iter()
            .map(|f| SortField::new(f.data_type().clone()))
            .collect();
        let converter = RowConverter::new(fields)?;
        let rows = converter.convert_columns(&comparison_columns(batch))?;

        let mut seen: HashSet<OwnedRow> = HashSet::with_capacity(total_records);
        let mut keep = Vec::with_capacity(total_records);
        for (index, row) in rows.iter().enumerate() {
            if seen.insert(row.owned()) {
                let index = u32::try_from(index).map_err(|_| {
                    Error::InvalidInput(format!(
                        "Table '{}' has too many rows to deduplicate",
                        table.name()
                    ))
                })?;
                keep.push(index);
            }
        }

        let deduplicated = if keep.len() == total_records {
            table.clone()
        } else {
            let indices = UInt32Array::from(keep);
            Table::new(table.name(), take_record_batch(batch, &indices)?)
        };

        let processed_at = Utc::now();
        let metrics = DedupMetrics {
            total_records,
            duplicate_count: total_records - deduplicated.num_rows(),
            unique_count: deduplicated.num_rows(),
            processing_time_ms: (processed_at - start_time).num_milliseconds(),
            processed_at,
        };
        metrics.log(table.name());

        Ok((deduplicated, metrics))
    }
}

/// Columns used only for comparison. Row bytes order floats by their bit
/// pattern, so signed zeros and NaN payloads are folded first.
fn comparison_columns(batch: &RecordBatch) -> Vec<ArrayRef> {
    batch
        .columns()
        .iter()
        .map(|column| match column.data_type() {
            DataType::Float64 => Arc::new(
                column
                    .as_primitive::<Float64Type>()
                    .unary::<_, Float64Type>(canonical_f64),
            ) as ArrayRef,
            DataType::Float32 => Arc::new(
                column
                    .as_primitive::<Float32Type>()
                    .unary::<_, Float32Type>(canonical_f32),
            ) as ArrayRef,
            _ => column.clone(),
        })
        .collect()
}

fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

fn canonical_f32(v: f32) -> f32 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f32::NAN
    } else {
        v
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct DedupMetrics {
    pub total_records: usize,
    pub duplicate_count: usize,
    pub unique_count: usize,
    pub processing_time_ms: i64,
    pub processed_at: DateTime<Utc>,
}

impl DedupMetrics {
    pub fn duplicate_percentage(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (self.duplicate_count as f64 / self.total_records as f64) * 100.0
    }

    fn log(&self, table: &str) {
        info!(
            table,
            total_records = self.total_records,
            duplicate_count = self.duplicate_count,
            unique_count = self.unique_count,
            duplicate_percentage = self.duplicate_percentage(),
            processing_time_ms = self.processing_time_ms,
            processed_at = %self.processed_at,
            "Deduplication complete"
        );
    }
}
