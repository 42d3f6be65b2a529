use arrow::array::ArrayRef;
use arrow::compute::concat_batches;
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use common::{Error, Result};
use std::sync::Arc;

/// A named, fully materialized table.
///
/// Every stage of the pipeline consumes tables by reference and produces new
/// ones; nothing here mutates the underlying batch.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    batch: RecordBatch,
}

impl Table {
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    /// Concatenates `batches` into a single table. `schema` is used when
    /// there are no batches at all.
    pub fn from_batches(
        name: impl Into<String>,
        schema: SchemaRef,
        batches: &[RecordBatch],
    ) -> Result<Self> {
        let schema = batches.first().map(|b| b.schema()).unwrap_or(schema);
        let batch = concat_batches(&schema, batches)?;
        Ok(Self::new(name, batch))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.batch.schema().index_of(column).is_ok()
    }

    pub fn column(&self, column: &str) -> Result<&ArrayRef> {
        let index = self
            .batch
            .schema()
            .index_of(column)
            .map_err(|_| self.missing(column))?;
        Ok(self.batch.column(index))
    }

    /// Returns a copy of the table under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.batch.clone())
    }

    /// Appends `array` as a new trailing column.
    pub fn with_column(&self, column: &str, array: ArrayRef) -> Result<Self> {
        if self.has_column(column) {
            return Err(Error::DuplicateColumnName {
                table: self.name.clone(),
                column: column.to_string(),
            });
        }

        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        fields.push(Field::new(column, array.data_type().clone(), array.null_count() > 0));

        let mut columns = self.batch.columns().to_vec();
        columns.push(array);

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        Ok(Self::new(self.name.clone(), batch))
    }

    /// Builds a new table from `(source column, output column)` pairs, in
    /// the given order.
    pub fn select_as(&self, name: impl Into<String>, columns: &[(&str, &str)]) -> Result<Self> {
        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays = Vec::with_capacity(columns.len());

        for (source, output) in columns {
            let array = self.column(source)?;
            let nullable = self
                .batch
                .schema()
                .field_with_name(source)
                .map(|f| f.is_nullable())
                .unwrap_or(true);
            fields.push(Field::new(*output, array.data_type().clone(), nullable));
            arrays.push(array.clone());
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self::new(name, batch))
    }

    /// Like [`Table::select_as`] with every column keeping its name.
    pub fn select(&self, name: impl Into<String>, columns: &[&str]) -> Result<Self> {
        let pairs: Vec<(&str, &str)> = columns.iter().map(|c| (*c, *c)).collect();
        self.select_as(name, &pairs)
    }

    fn missing(&self, column: &str) -> Error {
        Error::MissingColumn {
            table: self.name.clone(),
            column: column.to_string(),
        }
    }
}
