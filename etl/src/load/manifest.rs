use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MARKER_FILE: &str = "_SUCCESS";

/// Contents of the `_SUCCESS` marker written after a complete run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub source_location: String,
    pub created_at: DateTime<Utc>,
    pub source_records: usize,
    pub duplicate_records: usize,
    pub tables: Vec<TableManifest>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TableManifest {
    pub name: String,
    pub file: String,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub sha256: String,
}

impl RunManifest {
    pub fn new(source_location: &str, source_records: usize, duplicate_records: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            source_location: source_location.to_string(),
            created_at: Utc::now(),
            source_records,
            duplicate_records,
            tables: Vec::new(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableManifest> {
        self.tables.iter().find(|t| t.name == name)
    }
}
