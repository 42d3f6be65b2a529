use config::{Config, ConfigError};
use serde::Deserialize;
use std::fmt;
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Path or `file://` URI of the raw trip file.
    pub location: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Rows sampled for type inference. Unset scans the whole file, so a
    /// malformed value anywhere widens its column instead of failing the read.
    #[serde(default)]
    pub infer_schema_records: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DestinationConfig {
    /// Directory that receives one CSV file per output table.
    pub location: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Opaque storage access handle. Handed to the mount collaborator as-is.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("ETL").separator("__"));

        // Build the configuration
        let config = builder.build()?;

        let settings: Settings = config.try_deserialize()?;

        debug!(
            source = %settings.source.location,
            destination = %settings.destination.location,
            credentials = ?settings.storage.credentials,
            "Parsed pipeline settings"
        );

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_settings_apply_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.toml");
        fs::write(
            &path,
            r#"
[source]
location = "/mnt/data/uber_data.csv"

[destination]
location = "/mnt/transformed-data"
"#,
        )
        .unwrap();

        let settings = Settings::new(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.source.location, "/mnt/data/uber_data.csv");
        assert_eq!(settings.source.delimiter, ',');
        assert_eq!(settings.source.infer_schema_records, None);
        assert_eq!(settings.destination.location, "/mnt/transformed-data");
        assert!(settings.storage.credentials.is_none());
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_credentials_are_redacted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.toml");
        fs::write(
            &path,
            r#"
[source]
location = "in.csv"
delimiter = ";"

[destination]
location = "out"

[storage]
credentials = "account-key-123"
"#,
        )
        .unwrap();

        let settings = Settings::new(path.to_str().unwrap()).unwrap();
        let credentials = settings.storage.credentials.unwrap();
        assert_eq!(settings.source.delimiter, ';');
        assert_eq!(credentials.expose(), "account-key-123");
        assert!(!format!("{:?}", credentials).contains("account-key-123"));
    }
}
