use async_trait::async_trait;
use common::config::Credentials;
use common::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// A filesystem location given either as a plain path or as a `file://` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    raw: String,
    path: PathBuf,
}

impl StorageLocation {
    pub fn parse(location: &str) -> Result<Self> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("Storage location is empty".to_string()));
        }

        let path = if trimmed.contains("://") {
            let url = Url::parse(trimmed)?;
            if url.scheme() != "file" {
                return Err(Error::InvalidInput(format!(
                    "Unsupported storage scheme '{}' in '{}'",
                    url.scheme(),
                    trimmed
                )));
            }
            url.to_file_path().map_err(|_| {
                Error::InvalidInput(format!("'{}' does not name a local file path", trimmed))
            })?
        } else {
            PathBuf::from(trimmed)
        };

        Ok(Self {
            raw: trimmed.to_string(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Makes a storage location reachable before the pipeline touches it.
///
/// Implementations must be idempotent: calling either method on a location
/// that is already available is a no-op.
#[async_trait]
pub trait StorageMount: Send + Sync {
    async fn ensure_source_mounted(
        &self,
        location: &StorageLocation,
        credentials: Option<&Credentials>,
    ) -> Result<()>;

    async fn ensure_destination_mounted(
        &self,
        location: &StorageLocation,
        credentials: Option<&Credentials>,
    ) -> Result<()>;
}

/// Mount manager for locations on a locally mounted filesystem. Credentials
/// are not needed once the filesystem is mounted and are ignored.
pub struct LocalMount;

#[async_trait]
impl StorageMount for LocalMount {
    async fn ensure_source_mounted(
        &self,
        location: &StorageLocation,
        _credentials: Option<&Credentials>,
    ) -> Result<()> {
        match tokio::fs::metadata(location.path()).await {
            Ok(meta) if meta.is_file() => {
                debug!(location = %location, "Source already mounted");
                Ok(())
            }
            Ok(_) => Err(Error::SourceUnavailable {
                location: location.to_string(),
                reason: "not a regular file".to_string(),
            }),
            Err(e) => Err(Error::SourceUnavailable {
                location: location.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn ensure_destination_mounted(
        &self,
        location: &StorageLocation,
        _credentials: Option<&Credentials>,
    ) -> Result<()> {
        if let Ok(meta) = tokio::fs::metadata(location.path()).await {
            if meta.is_dir() {
                debug!(location = %location, "Destination already mounted");
                return Ok(());
            }
            return Err(Error::SinkUnavailable {
                location: location.to_string(),
                reason: "exists and is not a directory".to_string(),
            });
        }

        tokio::fs::create_dir_all(location.path())
            .await
            .map_err(|e| Error::SinkUnavailable {
                location: location.to_string(),
                reason: e.to_string(),
            })?;
        info!(location = %location, "Created destination directory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_plain_path_and_file_uri() {
        let plain = StorageLocation::parse("/mnt/data/uber_data.csv").unwrap();
        assert_eq!(plain.path(), Path::new("/mnt/data/uber_data.csv"));

        let uri = StorageLocation::parse("file:///mnt/transformed-data").unwrap();
        assert_eq!(uri.path(), Path::new("/mnt/transformed-data"));
        assert_eq!(uri.to_string(), "file:///mnt/transformed-data");
    }

    #[test]
    fn test_parse_rejects_remote_schemes() {
        let err = StorageLocation::parse("wasbs://data@account.blob.core.windows.net").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(StorageLocation::parse("   ").is_err());
    }

    #[tokio::test]
    async fn test_missing_source_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let location =
            StorageLocation::parse(dir.path().join("absent.csv").to_str().unwrap()).unwrap();

        let err = LocalMount
            .ensure_source_mounted(&location, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_destination_mount_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("transformed-data");
        let location = StorageLocation::parse(target.to_str().unwrap()).unwrap();
        let credentials = Credentials::new("key");

        LocalMount
            .ensure_destination_mounted(&location, Some(&credentials))
            .await
            .unwrap();
        LocalMount
            .ensure_destination_mounted(&location, Some(&credentials))
            .await
            .unwrap();
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_destination_that_is_a_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("occupied");
        std::fs::write(&target, b"x").unwrap();
        let location = StorageLocation::parse(target.to_str().unwrap()).unwrap();

        let err = LocalMount
            .ensure_destination_mounted(&location, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SinkUnavailable { .. }));
    }
}
