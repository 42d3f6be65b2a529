use super::{DimensionBuilder, finish_dimension, require_trip_id};
use crate::models::schema::*;
use crate::models::{DimensionType, Table};
use common::Result;

/// Dimension that copies source columns unchanged.
pub struct ProjectionDimension {
    dimension: DimensionType,
    columns: &'static [&'static str],
}

impl ProjectionDimension {
    pub fn passenger_count() -> Self {
        Self {
            dimension: DimensionType::PassengerCount,
            columns: &[PASSENGER_COUNT],
        }
    }

    pub fn trip_distance() -> Self {
        Self {
            dimension: DimensionType::TripDistance,
            columns: &[TRIP_DISTANCE],
        }
    }

    pub fn pickup_location() -> Self {
        Self {
            dimension: DimensionType::PickupLocation,
            columns: &[PICKUP_LATITUDE, PICKUP_LONGITUDE],
        }
    }

    pub fn dropoff_location() -> Self {
        Self {
            dimension: DimensionType::DropoffLocation,
            columns: &[DROPOFF_LATITUDE, DROPOFF_LONGITUDE],
        }
    }
}

impl DimensionBuilder for ProjectionDimension {
    fn dimension(&self) -> DimensionType {
        self.dimension
    }

    fn build(&self, trips: &Table) -> Result<Table> {
        require_trip_id(trips)?;

        let mut columns = vec![TRIP_ID];
        columns.extend_from_slice(self.columns);
        let attributes = trips.select(trips.name(), &columns)?;

        finish_dimension(self.dimension, attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::dimensions::test_support::indexed_trips;
    use arrow::array::AsArray;
    use arrow::datatypes::Float64Type;
    use common::Error;

    #[test]
    fn test_location_dimensions() {
        let trips = indexed_trips(4);

        let pickup = ProjectionDimension::pickup_location().build(&trips).unwrap();
        assert_eq!(pickup.name(), "pickup_location_dim");
        assert_eq!(
            pickup.column_names(),
            vec!["pickup_location_id", "trip_id", "pickup_latitude", "pickup_longitude"]
        );

        let dropoff = ProjectionDimension::dropoff_location().build(&trips).unwrap();
        assert_eq!(
            dropoff.column_names(),
            vec!["dropoff_location_id", "trip_id", "dropoff_latitude", "dropoff_longitude"]
        );
        assert_eq!(
            dropoff.column("dropoff_latitude").unwrap().as_primitive::<Float64Type>().values(),
            trips.column(DROPOFF_LATITUDE).unwrap().as_primitive::<Float64Type>().values()
        );
    }

    #[test]
    fn test_single_column_dimensions() {
        let trips = indexed_trips(3);

        let passengers = ProjectionDimension::passenger_count().build(&trips).unwrap();
        assert_eq!(
            passengers.column_names(),
            vec!["passenger_count_id", "trip_id", "passenger_count"]
        );

        let distance = ProjectionDimension::trip_distance().build(&trips).unwrap();
        assert_eq!(distance.name(), "trip_distance_dim");
        assert_eq!(distance.num_rows(), 3);
    }

    #[test]
    fn test_missing_source_column() {
        let trips = indexed_trips(2).select("trips", &[TRIP_ID]).unwrap();
        let err = ProjectionDimension::trip_distance().build(&trips).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == TRIP_DISTANCE));
    }
}
