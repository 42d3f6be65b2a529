use super::TableSink;
use super::manifest::{MARKER_FILE, RunManifest, TableManifest};
use crate::models::Table;
use crate::storage::StorageLocation;
use arrow::csv::WriterBuilder;
use async_trait::async_trait;
use common::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

/// Writes each table to `<destination>/<table>.csv` with a header row and no
/// index column.
pub struct CsvSink {
    destination: StorageLocation,
}

impl CsvSink {
    pub fn new(destination: StorageLocation) -> Self {
        Self { destination }
    }

    fn unavailable(&self, path: &Path, reason: impl ToString) -> Error {
        Error::SinkUnavailable {
            location: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn serialize(table: &Table) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new().with_header(true).build(Vec::new());
        writer.write(table.batch())?;
        Ok(writer.into_inner())
    }
}

#[async_trait]
impl TableSink for CsvSink {
    async fn write_table(&self, table: &Table) -> Result<TableManifest> {
        let file = format!("{}.csv", table.name());
        let path = self.destination.join(&file);

        let bytes = Self::serialize(table)?;
        let sha256 = format!("{:x}", Sha256::digest(&bytes));

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| self.unavailable(&path, e))?;

        info!(
            table = table.name(),
            rows = table.num_rows(),
            path = %path.display(),
            "Wrote table"
        );

        Ok(TableManifest {
            name: table.name().to_string(),
            file,
            row_count: table.num_rows(),
            columns: table.column_names(),
            sha256,
        })
    }

    async fn write_marker(&self, manifest: &RunManifest) -> Result<()> {
        let path = self.destination.join(MARKER_FILE);
        let marker_json = serde_json::to_vec_pretty(manifest)?;

        tokio::fs::write(&path, marker_json)
            .await
            .map_err(|e| self.unavailable(&path, e))?;

        info!(
            run_id = %manifest.run_id,
            tables = manifest.tables.len(),
            path = %path.display(),
            "Wrote run marker"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.destination.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{CsvSource, TabularSource};
    use crate::transform::dimensions::test_support::indexed_trips;
    use std::fs;
    use tempfile::TempDir;

    fn sink_at(dir: &TempDir) -> CsvSink {
        CsvSink::new(StorageLocation::parse(dir.path().to_str().unwrap()).unwrap())
    }

    #[tokio::test]
    async fn test_writes_header_without_index() {
        let dir = TempDir::new().unwrap();
        let table = indexed_trips(2)
            .select("passenger_count_dim", &["trip_id", "passenger_count"])
            .unwrap();

        let manifest = sink_at(&dir).write_table(&table).await.unwrap();

        let written = fs::read_to_string(dir.path().join("passenger_count_dim.csv")).unwrap();
        assert_eq!(written, "trip_id,passenger_count\n1,1\n2,2\n");
        assert_eq!(manifest.file, "passenger_count_dim.csv");
        assert_eq!(manifest.row_count, 2);
        assert_eq!(manifest.sha256.len(), 64);
    }

    #[tokio::test]
    async fn test_written_table_reads_back() {
        let dir = TempDir::new().unwrap();
        let table = indexed_trips(5).renamed("trips_copy");

        sink_at(&dir).write_table(&table).await.unwrap();

        let location =
            StorageLocation::parse(dir.path().join("trips_copy.csv").to_str().unwrap()).unwrap();
        let read_back = CsvSource::new(location, "trips_copy").read().await.unwrap();
        assert_eq!(read_back.num_rows(), table.num_rows());
        assert_eq!(read_back.column_names(), table.column_names());
    }

    #[tokio::test]
    async fn test_missing_destination_is_sink_unavailable() {
        let dir = TempDir::new().unwrap();
        let location =
            StorageLocation::parse(dir.path().join("not-mounted").to_str().unwrap()).unwrap();

        let err = CsvSink::new(location)
            .write_table(&indexed_trips(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SinkUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_marker_round_trips() {
        let dir = TempDir::new().unwrap();
        let sink = sink_at(&dir);
        let mut manifest = RunManifest::new("/mnt/data/uber_data.csv", 10, 2);
        manifest
            .tables
            .push(sink.write_table(&indexed_trips(3)).await.unwrap());

        sink.write_marker(&manifest).await.unwrap();

        let marker = fs::read(dir.path().join(MARKER_FILE)).unwrap();
        let parsed: RunManifest = serde_json::from_slice(&marker).unwrap();
        assert_eq!(parsed.run_id, manifest.run_id);
        assert_eq!(parsed.duplicate_records, 2);
        assert_eq!(parsed.table("trips"), manifest.table("trips"));
        assert_eq!(parsed.table("trips").unwrap().row_count, 3);
    }
}
