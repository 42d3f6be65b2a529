use crate::models::schema::{FACT_TABLE, FARE_COLUMNS, TRIP_ID, TRIPS_TABLE, VENDOR_ID};
use crate::models::{DimensionType, Table};
use arrow::array::Array;
use arrow::datatypes::Schema;
use common::{Error, Result};
use datafusion::common::Column;
use datafusion::logical_expr::JoinType;
use datafusion::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds the fact table from the indexed trips and their dimensions.
///
/// Each dimension is joined on its `trip_id` foreign key, never on its own
/// surrogate key, so the result does not depend on dimension row order.
pub struct FactAssembler {
    ctx: SessionContext,
}

/// Column reference that bypasses identifier normalisation, so mixed-case
/// source names such as `VendorID` resolve as written.
fn qualified(table: &str, column: &str) -> Expr {
    Expr::Column(Column::new(Some(table), column))
}

impl FactAssembler {
    pub fn new() -> Self {
        Self {
            ctx: SessionContext::new(),
        }
    }

    pub async fn assemble(
        &self,
        trips: &Table,
        dimensions: &[(DimensionType, Table)],
    ) -> Result<Table> {
        self.check_row_counts(trips, dimensions)?;

        self.ctx.register_batch(TRIPS_TABLE, trips.batch().clone())?;
        for (dimension, table) in dimensions {
            self.ctx
                .register_batch(dimension.table_name(), table.batch().clone())?;
        }

        let result = self.join_dimensions(dimensions).await;

        self.ctx.deregister_table(TRIPS_TABLE)?;
        for (dimension, _) in dimensions {
            self.ctx.deregister_table(dimension.table_name())?;
        }

        let fact = result?;
        self.check_fact(trips, dimensions, &fact)?;

        info!(
            rows = fact.num_rows(),
            dimensions = dimensions.len(),
            "Assembled fact table"
        );
        Ok(fact)
    }

    fn check_row_counts(&self, trips: &Table, dimensions: &[(DimensionType, Table)]) -> Result<()> {
        for (_, table) in dimensions {
            if table.num_rows() != trips.num_rows() {
                return Err(Error::RowCountMismatch {
                    table: table.name().to_string(),
                    expected: trips.num_rows(),
                    actual: table.num_rows(),
                });
            }
        }
        Ok(())
    }

    async fn join_dimensions(&self, dimensions: &[(DimensionType, Table)]) -> Result<Table> {
        let mut df = self.ctx.table(TRIPS_TABLE).await?;

        for (dimension, _) in dimensions {
            let name = dimension.table_name();
            let keys = self.ctx.table(name).await?.select(vec![
                qualified(name, TRIP_ID),
                qualified(name, dimension.key_column()),
            ])?;

            debug!(dimension = name, "Joining dimension on trip_id");
            df = df.join_on(
                keys,
                JoinType::Left,
                [qualified(TRIPS_TABLE, TRIP_ID).eq(qualified(name, TRIP_ID))],
            )?;
        }

        let mut columns = vec![qualified(TRIPS_TABLE, TRIP_ID).alias(TRIP_ID)];
        for dimension in DimensionType::ALL {
            if dimensions.iter().any(|(d, _)| *d == dimension) {
                let key = dimension.key_column();
                columns.push(qualified(dimension.table_name(), key).alias(key));
            }
        }
        columns.push(qualified(TRIPS_TABLE, VENDOR_ID).alias("vendor_id"));
        for fare in FARE_COLUMNS {
            columns.push(qualified(TRIPS_TABLE, fare).alias(fare));
        }

        let df = df
            .select(columns)?
            .sort(vec![col(TRIP_ID).sort(true, false)])?;

        let schema = Arc::new(Schema::from(df.schema()));
        let batches = df.collect().await?;
        Table::from_batches(FACT_TABLE, schema, &batches)
    }

    fn check_fact(
        &self,
        trips: &Table,
        dimensions: &[(DimensionType, Table)],
        fact: &Table,
    ) -> Result<()> {
        // A dimension repeating a trip_id multiplies fact rows.
        if fact.num_rows() != trips.num_rows() {
            return Err(Error::RowCountMismatch {
                table: FACT_TABLE.to_string(),
                expected: trips.num_rows(),
                actual: fact.num_rows(),
            });
        }

        for (dimension, _) in dimensions {
            let missing = fact.column(dimension.key_column())?.null_count();
            if missing > 0 {
                return Err(Error::MissingDimensionKey {
                    dimension: dimension.table_name().to_string(),
                    count: missing,
                });
            }
        }
        Ok(())
    }
}

impl Default for FactAssembler {
    fn default() -> Self {
        Self::new()
    }
}
