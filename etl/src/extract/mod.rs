mod csv;

pub use csv::CsvSource;

use crate::models::Table;
use async_trait::async_trait;
use common::Result;

/// Produces the raw trip table the rest of the pipeline works on.
#[async_trait]
pub trait TabularSource: Send + Sync {
    async fn read(&self) -> Result<Table>;

    /// Human readable location, used for logging and the run manifest.
    fn location(&self) -> String;
}
