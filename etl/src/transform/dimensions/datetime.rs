use super::{DimensionBuilder, finish_dimension, require_trip_id};
use crate::models::schema::{DROPOFF_DATETIME, PICKUP_DATETIME, TRIP_ID};
use crate::models::{DimensionType, Table};
use arrow::array::{Array, ArrayRef, AsArray, Int32Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit, TimestampNanosecondType};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, Timelike, Utc};
use common::Result;
use std::sync::Arc;

/// Splits pickup and dropoff timestamps into calendar parts.
///
/// Timestamps are normalised to nanosecond precision without a time zone.
/// Values that cannot be parsed become null, as do all parts derived from
/// them. Weekdays count from Sunday = 1 to Saturday = 7.
pub struct DateTimeDimension;

#[derive(Debug, Clone, Copy)]
enum Part {
    Hour,
    Day,
    Month,
    Year,
    Weekday,
}

impl Part {
    const ALL: [Part; 5] = [Part::Hour, Part::Day, Part::Month, Part::Year, Part::Weekday];

    fn suffix(&self) -> &'static str {
        match self {
            Part::Hour => "hour",
            Part::Day => "day",
            Part::Month => "month",
            Part::Year => "year",
            Part::Weekday => "weekday",
        }
    }

    fn extract(&self, ts: &DateTime<Utc>) -> i32 {
        match self {
            Part::Hour => ts.hour() as i32,
            Part::Day => ts.day() as i32,
            Part::Month => ts.month() as i32,
            Part::Year => ts.year(),
            Part::Weekday => ts.weekday().number_from_sunday() as i32,
        }
    }
}

fn to_timestamps(array: &ArrayRef) -> Result<ArrayRef> {
    Ok(cast(array, &DataType::Timestamp(TimeUnit::Nanosecond, None))?)
}

fn date_parts(timestamps: &ArrayRef) -> Vec<ArrayRef> {
    let values = timestamps.as_primitive::<TimestampNanosecondType>();
    Part::ALL
        .iter()
        .map(|part| {
            let parts: Int32Array = values
                .iter()
                .map(|v| v.map(|nanos| part.extract(&DateTime::from_timestamp_nanos(nanos))))
                .collect();
            Arc::new(parts) as ArrayRef
        })
        .collect()
}

impl DimensionBuilder for DateTimeDimension {
    fn dimension(&self) -> DimensionType {
        DimensionType::DateTime
    }

    fn build(&self, trips: &Table) -> Result<Table> {
        require_trip_id(trips)?;

        let trip_ids = trips.column(TRIP_ID)?;
        let mut fields = vec![Field::new(TRIP_ID, trip_ids.data_type().clone(), false)];
        let mut columns = vec![trip_ids.clone()];

        let mut part_fields = Vec::new();
        let mut part_columns = Vec::new();

        for (source, prefix) in [(PICKUP_DATETIME, "pickup"), (DROPOFF_DATETIME, "dropoff")] {
            let timestamps = to_timestamps(trips.column(source)?)?;
            fields.push(Field::new(
                format!("{}_datetime", prefix),
                timestamps.data_type().clone(),
                true,
            ));
            columns.push(timestamps.clone());

            for (part, array) in Part::ALL.iter().zip(date_parts(&timestamps)) {
                part_fields.push(Field::new(
                    format!("{}_{}", prefix, part.suffix()),
                    DataType::Int32,
                    true,
                ));
                part_columns.push(array);
            }
        }

        fields.extend(part_fields);
        columns.extend(part_columns);

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        finish_dimension(self.dimension(), Table::new(trips.name(), batch))
    }
}
