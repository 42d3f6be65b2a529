use super::TabularSource;
use crate::models::Table;
use crate::storage::StorageLocation;
use arrow::datatypes::Schema;
use async_trait::async_trait;
use common::config::SourceConfig;
use common::{Error, Result};
use datafusion::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Reads a delimited file with a header row, inferring column types.
///
/// Inference scans the whole file unless a sample size is set. A column with
/// any value that does not fit a narrower type is read as text, and the
/// dimension builders turn those values into nulls.
pub struct CsvSource {
    location: StorageLocation,
    table_name: String,
    delimiter: u8,
    infer_schema_records: Option<usize>,
    required_columns: Vec<String>,
}

impl CsvSource {
    pub fn new(location: StorageLocation, table_name: &str) -> Self {
        Self {
            location,
            table_name: table_name.to_string(),
            delimiter: b',',
            infer_schema_records: None,
            required_columns: Vec::new(),
        }
    }

    pub fn from_config(config: &SourceConfig, table_name: &str) -> Result<Self> {
        let location = StorageLocation::parse(&config.location)?;
        if !config.delimiter.is_ascii() {
            return Err(Error::InvalidInput(format!(
                "Delimiter '{}' is not a single-byte character",
                config.delimiter
            )));
        }

        Ok(Self::new(location, table_name)
            .with_delimiter(config.delimiter as u8)
            .with_infer_schema_records(config.infer_schema_records))
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_infer_schema_records(mut self, records: Option<usize>) -> Self {
        self.infer_schema_records = records;
        self
    }

    /// Columns that must be present in the header; reading fails otherwise.
    pub fn with_required_columns(mut self, columns: &[&str]) -> Self {
        self.required_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    fn unavailable(&self, reason: impl ToString) -> Error {
        Error::SourceUnavailable {
            location: self.location.to_string(),
            reason: reason.to_string(),
        }
    }

    fn check_required_columns(&self, table: &Table) -> Result<()> {
        for column in &self.required_columns {
            if !table.has_column(column) {
                return Err(Error::MissingColumn {
                    table: table.name().to_string(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TabularSource for CsvSource {
    async fn read(&self) -> Result<Table> {
        let path = self.location.path();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| self.unavailable(e))?;
        if !metadata.is_file() {
            return Err(self.unavailable("not a regular file"));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| self.unavailable("path is not valid UTF-8"))?;

        // The listing table filters files by extension, so match the actual one.
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        // A single partition keeps the collected batches in file order.
        let ctx = SessionContext::new_with_config(SessionConfig::new().with_target_partitions(1));
        let options = CsvReadOptions::new()
            .has_header(true)
            .delimiter(self.delimiter)
            .schema_infer_max_records(self.infer_schema_records.unwrap_or(usize::MAX))
            .file_extension(&extension);

        debug!(location = %self.location, "Reading delimited source");
        let df = ctx
            .read_csv(path_str, options)
            .await
            .map_err(|e| self.unavailable(e))?;

        let schema = Arc::new(Schema::from(df.schema()));
        // Values contradicting a sampled schema fail here
        let batches = df.collect().await.map_err(|e| self.unavailable(e))?;
        let table = Table::from_batches(self.table_name.as_str(), schema, &batches)?;

        self.check_required_columns(&table)?;

        info!(
            location = %self.location,
            rows = table.num_rows(),
            columns = table.schema().fields().len(),
            "Loaded source table"
        );
        Ok(table)
    }

    fn location(&self) -> String {
        self.location.to_string()
    }
}
