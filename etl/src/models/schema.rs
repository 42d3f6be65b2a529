//! Column names of the raw trip file and of the star schema built from it.

pub const TRIPS_TABLE: &str = "trips";
pub const FACT_TABLE: &str = "fact";

pub const TRIP_ID: &str = "trip_id";

// Raw source columns
pub const VENDOR_ID: &str = "VendorID";
pub const PICKUP_DATETIME: &str = "tpep_pickup_datetime";
pub const DROPOFF_DATETIME: &str = "tpep_dropoff_datetime";
pub const PASSENGER_COUNT: &str = "passenger_count";
pub const TRIP_DISTANCE: &str = "trip_distance";
pub const PICKUP_LATITUDE: &str = "pickup_latitude";
pub const PICKUP_LONGITUDE: &str = "pickup_longitude";
pub const DROPOFF_LATITUDE: &str = "dropoff_latitude";
pub const DROPOFF_LONGITUDE: &str = "dropoff_longitude";
pub const RATECODE_ID: &str = "RatecodeID";
pub const PAYMENT_TYPE: &str = "payment_type";

pub const FARE_COLUMNS: [&str; 6] = [
    "fare_amount",
    "extra",
    "mta_tax",
    "tip_amount",
    "improvement_surcharge",
    "total_amount",
];

/// Every source column the star schema reads.
pub fn required_source_columns() -> Vec<&'static str> {
    let mut columns = vec![
        VENDOR_ID,
        PICKUP_DATETIME,
        DROPOFF_DATETIME,
        PASSENGER_COUNT,
        TRIP_DISTANCE,
        PICKUP_LATITUDE,
        PICKUP_LONGITUDE,
        DROPOFF_LATITUDE,
        DROPOFF_LONGITUDE,
        RATECODE_ID,
        PAYMENT_TYPE,
    ];
    columns.extend(FARE_COLUMNS);
    columns
}

/// The dimension tables of the star schema, in the order the fact table
/// references them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionType {
    DateTime,
    PassengerCount,
    TripDistance,
    PickupLocation,
    DropoffLocation,
    RateCode,
    PaymentType,
}

impl DimensionType {
    pub const ALL: [DimensionType; 7] = [
        Self::DateTime,
        Self::PassengerCount,
        Self::TripDistance,
        Self::PickupLocation,
        Self::DropoffLocation,
        Self::RateCode,
        Self::PaymentType,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            Self::DateTime => "date_time_dim",
            Self::PassengerCount => "passenger_count_dim",
            Self::TripDistance => "trip_distance_dim",
            Self::PickupLocation => "pickup_location_dim",
            Self::DropoffLocation => "dropoff_location_dim",
            Self::RateCode => "ratecode_dim",
            Self::PaymentType => "payment_type_dim",
        }
    }

    /// Surrogate key column, also the foreign key column in the fact table.
    pub fn key_column(&self) -> &'static str {
        match self {
            Self::DateTime => "date_time_id",
            Self::PassengerCount => "passenger_count_id",
            Self::TripDistance => "trip_distance_id",
            Self::PickupLocation => "pickup_location_id",
            Self::DropoffLocation => "dropoff_location_id",
            Self::RateCode => "ratecode_id",
            Self::PaymentType => "payment_type_id",
        }
    }
}
