pub mod dedup;
pub mod dimensions;
pub mod fact;
pub mod keys;

pub use dedup::{DedupMetrics, Deduplicator};
pub use dimensions::{DimensionBuilder, build_dimensions};
pub use fact::FactAssembler;
pub use keys::assign_surrogate_key;

use crate::models::schema::TRIP_ID;
use crate::models::{DimensionType, Table};
use common::Result;
use tracing::info;

/// The output of one pipeline run: the fact table and every dimension.
#[derive(Debug, Clone)]
pub struct StarSchema {
    pub fact: Table,
    pub dimensions: Vec<(DimensionType, Table)>,
    pub dedup_metrics: DedupMetrics,
}

impl StarSchema {
    /// Tables in the order they are written: fact first, then dimensions.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        std::iter::once(&self.fact).chain(self.dimensions.iter().map(|(_, t)| t))
    }

    pub fn dimension(&self, dimension: DimensionType) -> Option<&Table> {
        self.dimensions
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, t)| t)
    }
}

/// Deduplicates the raw trips, assigns `trip_id`, derives every dimension
/// and assembles the fact table.
pub struct StarSchemaTransformer {
    deduplicator: Deduplicator,
    assembler: FactAssembler,
}

impl StarSchemaTransformer {
    pub fn new() -> Self {
        Self {
            deduplicator: Deduplicator::new(),
            assembler: FactAssembler::new(),
        }
    }

    pub async fn transform(&self, raw: &Table) -> Result<StarSchema> {
        let (unique, dedup_metrics) = self.deduplicator.deduplicate(raw)?;

        let trips = assign_surrogate_key(&unique, TRIP_ID)?;
        info!(rows = trips.num_rows(), "Indexed trips");

        let dimensions = build_dimensions(&trips)?;
        let fact = self.assembler.assemble(&trips, &dimensions).await?;

        Ok(StarSchema {
            fact,
            dimensions,
            dedup_metrics,
        })
    }
}

impl Default for StarSchemaTransformer {
    fn default() -> Self {
        Self::new()
    }
}
