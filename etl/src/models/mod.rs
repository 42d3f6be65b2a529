pub mod schema;
mod table;

pub use schema::DimensionType;
pub use table::Table;
