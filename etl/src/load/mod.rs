mod csv;
pub mod manifest;

pub use csv::CsvSink;
pub use manifest::{RunManifest, TableManifest};

use crate::models::Table;
use async_trait::async_trait;
use common::Result;

#[async_trait]
pub trait TableSink: Send + Sync {
    /// Serializes one table. Tables written before a failure stay written.
    async fn write_table(&self, table: &Table) -> Result<TableManifest>;

    /// Marks the run complete. Called once, after every table was written.
    async fn write_marker(&self, manifest: &RunManifest) -> Result<()>;

    fn location(&self) -> String;
}
