use crate::extract::{CsvSource, TabularSource};
use crate::load::{CsvSink, RunManifest, TableSink};
use crate::models::schema::{TRIPS_TABLE, required_source_columns};
use crate::storage::{LocalMount, StorageLocation, StorageMount};
use crate::transform::{StarSchema, StarSchemaTransformer};
use common::Result;
use common::config::Settings;
use tracing::info;

/// One batch run: read, transform, write.
pub struct StarSchemaPipeline {
    source: Box<dyn TabularSource>,
    sink: Box<dyn TableSink>,
    transformer: StarSchemaTransformer,
}

impl StarSchemaPipeline {
    pub fn new(source: Box<dyn TabularSource>, sink: Box<dyn TableSink>) -> Self {
        Self {
            source,
            sink,
            transformer: StarSchemaTransformer::new(),
        }
    }

    /// Mounts both locations and wires the CSV source and sink from settings.
    pub async fn from_settings(settings: &Settings, mount: &dyn StorageMount) -> Result<Self> {
        let credentials = settings.storage.credentials.as_ref();

        let source_location = StorageLocation::parse(&settings.source.location)?;
        mount
            .ensure_source_mounted(&source_location, credentials)
            .await?;

        let destination = StorageLocation::parse(&settings.destination.location)?;
        mount
            .ensure_destination_mounted(&destination, credentials)
            .await?;

        let source = CsvSource::from_config(&settings.source, TRIPS_TABLE)?
            .with_required_columns(&required_source_columns());

        Ok(Self::new(Box::new(source), Box::new(CsvSink::new(destination))))
    }

    pub async fn run(&self) -> Result<RunManifest> {
        info!(
            source = %self.source.location(),
            destination = %self.sink.location(),
            "Starting star schema pipeline"
        );

        let raw = self.source.read().await?;
        let schema = self.transformer.transform(&raw).await?;
        let manifest = self.load(&schema).await?;

        info!(
            run_id = %manifest.run_id,
            trips = schema.fact.num_rows(),
            tables = manifest.tables.len(),
            "Star schema pipeline finished"
        );
        Ok(manifest)
    }

    async fn load(&self, schema: &StarSchema) -> Result<RunManifest> {
        let mut manifest = RunManifest::new(
            &self.source.location(),
            schema.dedup_metrics.total_records,
            schema.dedup_metrics.duplicate_count,
        );

        for table in schema.tables() {
            manifest.tables.push(self.sink.write_table(table).await?);
        }

        self.sink.write_marker(&manifest).await?;
        Ok(manifest)
    }
}

/// Runs the pipeline once against locally mounted storage.
pub async fn run_from_config(settings: &Settings) -> Result<RunManifest> {
    let pipeline = StarSchemaPipeline::from_settings(settings, &LocalMount).await?;
    pipeline.run().await
}
