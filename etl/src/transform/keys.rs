use crate::models::Table;
use arrow::array::{ArrayRef, Int64Array};
use common::{Error, Result};
use std::sync::Arc;

/// Appends `column` holding `1..=n` in the table's current row order.
///
/// Two tables derived from the same source in the same order receive the
/// same keys row for row.
pub fn assign_surrogate_key(table: &Table, column: &str) -> Result<Table> {
    if table.has_column(column) {
        return Err(Error::DuplicateColumnName {
            table: table.name().to_string(),
            column: column.to_string(),
        });
    }

    let rows = i64::try_from(table.num_rows()).map_err(|_| {
        Error::InvalidInput(format!("Table '{}' is too large to key", table.name()))
    })?;
    let keys: ArrayRef = Arc::new(Int64Array::from_iter_values(1..=rows));
    table.with_column(column, keys)
}
