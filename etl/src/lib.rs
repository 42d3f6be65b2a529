pub mod extract;
pub mod load;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod telemetry;
pub mod transform;

use common::Result;
use common::config::Settings;
use load::RunManifest;

/// Runs the complete trip star-schema pipeline once
pub async fn run_etl_pipeline(config_path: &str) -> Result<RunManifest> {
    // Load configuration
    let config = Settings::new(config_path)?;

    telemetry::init_tracing(&config.logging);

    pipeline::run_from_config(&config).await
}
