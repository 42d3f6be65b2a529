mod category;
mod datetime;
mod projection;

pub use category::{CategoryDimension, PaymentType, RateCode};
pub use datetime::DateTimeDimension;
pub use projection::ProjectionDimension;

use super::keys::assign_surrogate_key;
use crate::models::schema::TRIP_ID;
use crate::models::{DimensionType, Table};
use common::{Error, Result};
use tracing::debug;

/// Derives one dimension table from the indexed trip table.
///
/// Builders never filter, reorder or aggregate: the output has one row per
/// trip, in trip order, and carries the originating `trip_id`.
pub trait DimensionBuilder: Send + Sync {
    fn dimension(&self) -> DimensionType;

    fn build(&self, trips: &Table) -> Result<Table>;
}

/// Builders for every dimension of the star schema.
pub fn builders() -> Vec<Box<dyn DimensionBuilder>> {
    vec![
        Box::new(DateTimeDimension),
        Box::new(ProjectionDimension::passenger_count()),
        Box::new(ProjectionDimension::trip_distance()),
        Box::new(ProjectionDimension::pickup_location()),
        Box::new(ProjectionDimension::dropoff_location()),
        Box::new(CategoryDimension::<RateCode>::new()),
        Box::new(CategoryDimension::<PaymentType>::new()),
    ]
}

pub fn build_dimensions(trips: &Table) -> Result<Vec<(DimensionType, Table)>> {
    builders()
        .iter()
        .map(|builder| {
            let table = builder.build(trips)?;
            debug!(
                dimension = table.name(),
                rows = table.num_rows(),
                "Built dimension table"
            );
            Ok((builder.dimension(), table))
        })
        .collect()
}

/// Assigns the dimension's surrogate key to `attributes` and moves the key
/// and `trip_id` to the front.
///
/// `attributes` must already contain `trip_id` and be in trip order.
fn finish_dimension(dimension: DimensionType, attributes: Table) -> Result<Table> {
    let key = dimension.key_column();
    let keyed = assign_surrogate_key(&attributes, key)?;

    let mut order = vec![key, TRIP_ID];
    let names = attributes.column_names();
    order.extend(
        names
            .iter()
            .map(String::as_str)
            .filter(|name| *name != TRIP_ID),
    );

    keyed.select(dimension.table_name(), &order)
}

fn require_trip_id(trips: &Table) -> Result<()> {
    if trips.has_column(TRIP_ID) {
        return Ok(());
    }
    Err(Error::MissingColumn {
        table: trips.name().to_string(),
        column: TRIP_ID.to_string(),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::indexed_trips;
    use super::*;
    use arrow::array::AsArray;
    use arrow::datatypes::Int64Type;

    #[test]
    fn test_every_dimension_has_one_row_per_trip() {
        let trips = indexed_trips(10);
        let dimensions = build_dimensions(&trips).unwrap();

        assert_eq!(dimensions.len(), DimensionType::ALL.len());
        for (dimension, table) in &dimensions {
            assert_eq!(table.name(), dimension.table_name());
            assert_eq!(table.num_rows(), 10);

            let names = table.column_names();
            assert_eq!(names[0], dimension.key_column());
            assert_eq!(names[1], TRIP_ID);

            let keys = table.column(dimension.key_column()).unwrap().as_primitive::<Int64Type>();
            let trip_ids = table.column(TRIP_ID).unwrap().as_primitive::<Int64Type>();
            assert_eq!(keys.values(), trip_ids.values());
        }
    }

    #[test]
    fn test_builders_require_trip_id() {
        let trips = indexed_trips(3);
        let unindexed = trips
            .select(
                "trips",
                &trips
                    .column_names()
                    .iter()
                    .map(String::as_str)
                    .filter(|c| *c != TRIP_ID)
                    .collect::<Vec<_>>(),
            )
            .unwrap();

        for builder in builders() {
            let err = builder.build(&unindexed).unwrap_err();
            assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == TRIP_ID));
        }
    }
}
