use super::{DimensionBuilder, finish_dimension, require_trip_id};
use crate::models::schema::{PAYMENT_TYPE, RATECODE_ID, TRIP_ID};
use crate::models::{DimensionType, Table};
use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use common::Result;
use std::marker::PhantomData;
use std::sync::Arc;

/// A closed enumeration of integer codes with human readable labels.
pub trait Category: Sized + Send + Sync + 'static {
    const DIMENSION: DimensionType;
    /// Raw source column holding the code.
    const SOURCE_COLUMN: &'static str;
    /// Output column for the code.
    const CODE_COLUMN: &'static str;
    /// Output column for the decoded label.
    const NAME_COLUMN: &'static str;

    fn from_code(code: i64) -> Option<Self>;

    fn label(&self) -> &'static str;

    /// Total decoder: codes outside the enumeration have no label.
    fn decode(code: Option<i64>) -> Option<&'static str> {
        code.and_then(Self::from_code).map(|c| c.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateCode {
    StandardRate,
    Jfk,
    Newark,
    NassauOrWestchester,
    NegotiatedFare,
    GroupRide,
}

impl Category for RateCode {
    const DIMENSION: DimensionType = DimensionType::RateCode;
    const SOURCE_COLUMN: &'static str = RATECODE_ID;
    const CODE_COLUMN: &'static str = "ratecode";
    const NAME_COLUMN: &'static str = "ratecode_name";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::StandardRate),
            2 => Some(Self::Jfk),
            3 => Some(Self::Newark),
            4 => Some(Self::NassauOrWestchester),
            5 => Some(Self::NegotiatedFare),
            6 => Some(Self::GroupRide),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::StandardRate => "Standard rate",
            Self::Jfk => "JFK",
            Self::Newark => "Newark",
            Self::NassauOrWestchester => "Nassau or Westchester",
            Self::NegotiatedFare => "Negotiated fare",
            Self::GroupRide => "Group ride",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentType {
    CreditCard,
    Cash,
    NoCharge,
    Dispute,
    Unknown,
    VoidedTrip,
}

impl Category for PaymentType {
    const DIMENSION: DimensionType = DimensionType::PaymentType;
    const SOURCE_COLUMN: &'static str = PAYMENT_TYPE;
    const CODE_COLUMN: &'static str = "payment_type";
    const NAME_COLUMN: &'static str = "payment_type_name";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::CreditCard),
            2 => Some(Self::Cash),
            3 => Some(Self::NoCharge),
            4 => Some(Self::Dispute),
            5 => Some(Self::Unknown),
            6 => Some(Self::VoidedTrip),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::Cash => "Cash",
            Self::NoCharge => "No Charge",
            Self::Dispute => "Dispute",
            Self::Unknown => "Unknown",
            Self::VoidedTrip => "Voided Trip",
        }
    }
}

/// Dimension holding a category code and its decoded label.
pub struct CategoryDimension<C: Category> {
    _category: PhantomData<C>,
}

impl<C: Category> CategoryDimension<C> {
    pub fn new() -> Self {
        Self {
            _category: PhantomData,
        }
    }
}

impl<C: Category> Default for CategoryDimension<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Category> DimensionBuilder for CategoryDimension<C> {
    fn dimension(&self) -> DimensionType {
        C::DIMENSION
    }

    fn build(&self, trips: &Table) -> Result<Table> {
        require_trip_id(trips)?;

        let trip_ids = trips.column(TRIP_ID)?;
        let raw = trips.column(C::SOURCE_COLUMN)?;

        let names: StringArray = integral_codes(raw)?.into_iter().map(C::decode).collect();

        let schema = Schema::new(vec![
            Field::new(TRIP_ID, trip_ids.data_type().clone(), false),
            Field::new(C::CODE_COLUMN, raw.data_type().clone(), true),
            Field::new(C::NAME_COLUMN, DataType::Utf8, true),
        ]);
        let columns: Vec<ArrayRef> = vec![trip_ids.clone(), raw.clone(), Arc::new(names)];
        let batch = RecordBatch::try_new(Arc::new(schema), columns)?;

        finish_dimension(self.dimension(), Table::new(trips.name(), batch))
    }
}

/// Reads codes as integers. Fractional and non-numeric values are not codes.
fn integral_codes(raw: &ArrayRef) -> Result<Vec<Option<i64>>> {
    if raw.data_type().is_integer() {
        let codes = cast(raw, &DataType::Int64)?;
        return Ok(codes.as_primitive::<Int64Type>().iter().collect());
    }

    let codes = cast(raw, &DataType::Float64)?;
    Ok(codes
        .as_primitive::<Float64Type>()
        .iter()
        .map(|v| v.filter(|v| v.fract() == 0.0).map(|v| v as i64))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::dimensions::test_support::indexed_trips;
    use arrow::array::Float64Array;

    fn names(table: &Table, column: &str) -> Vec<Option<String>> {
        table
            .column(column)
            .unwrap()
            .as_string::<i32>()
            .iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_rate_code_labels() {
        let expected = [
            (1, "Standard rate"),
            (2, "JFK"),
            (3, "Newark"),
            (4, "Nassau or Westchester"),
            (5, "Negotiated fare"),
            (6, "Group ride"),
        ];
        for (code, label) in expected {
            assert_eq!(RateCode::decode(Some(code)), Some(label));
        }
    }

    #[test]
    fn test_payment_type_labels() {
        let expected = [
            (1, "Credit Card"),
            (2, "Cash"),
            (3, "No Charge"),
            (4, "Dispute"),
            (5, "Unknown"),
            (6, "Voided Trip"),
        ];
        for (code, label) in expected {
            assert_eq!(PaymentType::decode(Some(code)), Some(label));
        }
    }

    #[test]
    fn test_decoding_is_total() {
        for code in [-1, 0, 7, 99, i64::MAX] {
            assert_eq!(RateCode::decode(Some(code)), None);
            assert_eq!(PaymentType::decode(Some(code)), None);
        }
        assert_eq!(RateCode::decode(None), None);
    }

    #[test]
    fn test_out_of_range_rate_code_has_no_name() {
        // indexed_trips cycles codes 1..=7, so row 6 carries rate code 7
        let dim = CategoryDimension::<RateCode>::new()
            .build(&indexed_trips(7))
            .unwrap();

        assert_eq!(dim.name(), "ratecode_dim");
        assert_eq!(
            dim.column_names(),
            vec!["ratecode_id", "trip_id", "ratecode", "ratecode_name"]
        );
        let labels = names(&dim, "ratecode_name");
        assert_eq!(labels[0].as_deref(), Some("Standard rate"));
        assert_eq!(labels[5].as_deref(), Some("Group ride"));
        assert_eq!(labels[6], None);
    }

    #[test]
    fn test_float_codes_are_decoded() {
        let trips = indexed_trips(4);
        let codes: ArrayRef =
            Arc::new(Float64Array::from(vec![Some(2.0), None, Some(1.5), Some(2.9)]));
        let trips = trips
            .select("trips", &[TRIP_ID])
            .unwrap()
            .with_column(PAYMENT_TYPE, codes)
            .unwrap();

        let dim = CategoryDimension::<PaymentType>::new().build(&trips).unwrap();

        assert_eq!(
            dim.column_names(),
            vec!["payment_type_id", "trip_id", "payment_type", "payment_type_name"]
        );
        assert_eq!(dim.column("payment_type").unwrap().data_type(), &DataType::Float64);
        assert_eq!(
            names(&dim, "payment_type_name"),
            vec![Some("Cash".to_string()), None, None, None]
        );
    }

    #[test]
    fn test_text_codes_are_decoded_when_integral() {
        let trips = indexed_trips(3);
        let codes: ArrayRef =
            Arc::new(StringArray::from(vec![Some("2"), Some("1.5"), Some("n/a")]));
        let trips = trips
            .select("trips", &[TRIP_ID])
            .unwrap()
            .with_column(RATECODE_ID, codes)
            .unwrap();

        let dim = CategoryDimension::<RateCode>::new().build(&trips).unwrap();

        assert_eq!(names(&dim, "ratecode_name"), vec![Some("JFK".to_string()), None, None]);
    }
}
