//! In-memory dataset and column access.
//!
//! A [`Dataset`] wraps a single Arrow [`RecordBatch`]. Row order is
//! significant: positions inside the batch are what checks report back, after
//! translation through [`reported_row_number`].

use crate::prelude::*;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, Field, Float32Type, Float64Type, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use std::sync::Arc;

/// Number of header rows that precede the data in the source file.
pub const HEADER_ROWS: usize = 1;

/// Translates a zero-based row index into the row number a user sees in the
/// source spreadsheet (one-based, header included).
pub fn reported_row_number(index: usize) -> usize {
    index + HEADER_ROWS + 1
}

/// Normalizes a column or field name for lookup.
pub fn sanitize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A read-only table of named columns.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Wraps a record batch, normalizing large and view string columns to `Utf8`.
    pub fn new(batch: RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let mut fields = Vec::with_capacity(schema.fields().len());
        let mut columns = Vec::with_capacity(batch.num_columns());

        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            match field.data_type() {
                DataType::LargeUtf8 | DataType::Utf8View => {
                    columns.push(cast(array, &DataType::Utf8)?);
                    fields.push(Field::new(field.name(), DataType::Utf8, field.is_nullable()));
                }
                _ => {
                    columns.push(Arc::clone(array));
                    fields.push(field.as_ref().clone());
                }
            }
        }

        let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)?;
        Ok(Self { batch })
    }

    /// Concatenates the batches produced by a scan into one dataset.
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let batch = concat_batches(&schema, batches)?;
        Self::new(batch)
    }

    /// Builds a dataset from `(name, array)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        Self::new(RecordBatch::try_from_iter(columns)?)
    }

    /// The underlying record batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of data rows (header excluded).
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    /// Finds the real column name matching `name` case- and whitespace-insensitively.
    pub fn resolve_column(&self, name: &str) -> Option<&str> {
        let wanted = sanitize_name(name);
        self.column_names()
            .into_iter()
            .find(|candidate| sanitize_name(candidate) == wanted)
    }

    /// Returns the column matching `name`, or `ColumnNotFound`.
    pub fn column(&self, name: &str) -> Result<Column<'_>> {
        let schema = self.batch.schema_ref();
        let wanted = sanitize_name(name);
        schema
            .fields()
            .iter()
            .position(|f| sanitize_name(f.name()) == wanted)
            .map(|idx| Column {
                name: schema.field(idx).name(),
                array: self.batch.column(idx),
            })
            .ok_or_else(|| EdaError::ColumnNotFound {
                column: name.to_string(),
            })
    }
}

/// A borrowed view over one dataset column.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    name: &'a str,
    array: &'a ArrayRef,
}

impl<'a> Column<'a> {
    /// The real column name as it appears in the dataset.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The Arrow array backing the column.
    pub fn array(&self) -> &'a ArrayRef {
        self.array
    }

    /// The Arrow data type of the column.
    pub fn data_type(&self) -> &'a DataType {
        self.array.data_type()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Returns true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Returns true for string-typed columns.
    pub fn is_text(&self) -> bool {
        matches!(
            self.data_type(),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
        )
    }

    /// Returns true if the row holds no value at all (null, or a floating NaN).
    pub fn is_missing(&self, row: usize) -> bool {
        if self.array.is_null(row) {
            return true;
        }
        match self.array.data_type() {
            DataType::Float64 => self.array.as_primitive::<Float64Type>().value(row).is_nan(),
            DataType::Float32 => self.array.as_primitive::<Float32Type>().value(row).is_nan(),
            _ => false,
        }
    }

    /// Number of missing rows.
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_missing(row)).count()
    }

    /// Renders every row as text; missing rows are `None`.
    pub fn texts(&self) -> Result<Vec<Option<String>>> {
        let options = FormatOptions::default();
        let formatter = ArrayFormatter::try_new(self.array.as_ref(), &options)?;
        Ok((0..self.len())
            .map(|row| {
                if self.is_missing(row) {
                    None
                } else {
                    Some(formatter.value(row).to_string())
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, LargeStringArray, StringArray};

    fn sample() -> Dataset {
        Dataset::from_columns(vec![
            (
                " Customer_ID ",
                Arc::new(Int64Array::from(vec![Some(1), None, Some(3)])) as ArrayRef,
            ),
            (
                "name",
                Arc::new(StringArray::from(vec![Some("Ana"), Some(" "), None])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_reported_row_number_accounts_for_header() {
        assert_eq!(reported_row_number(0), 2);
        assert_eq!(reported_row_number(9), 11);
    }

    #[test]
    fn test_resolve_column_is_case_and_whitespace_insensitive() {
        let dataset = sample();
        assert_eq!(dataset.resolve_column("customer_id"), Some(" Customer_ID "));
        assert_eq!(dataset.resolve_column("  NAME"), Some("name"));
        assert_eq!(dataset.resolve_column("missing"), None);
    }

    #[test]
    fn test_column_not_found() {
        let err = sample().column("nope").unwrap_err();
        assert!(matches!(err, EdaError::ColumnNotFound { column } if column == "nope"));
    }

    #[test]
    fn test_texts_and_missing() {
        let dataset = sample();
        let column = dataset.column("customer_id").unwrap();
        assert!(!column.is_text());
        assert_eq!(column.missing_count(), 1);
        assert_eq!(
            column.texts().unwrap(),
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let dataset = Dataset::from_columns(vec![(
            "x",
            Arc::new(Float64Array::from(vec![1.0, f64::NAN])) as ArrayRef,
        )])
        .unwrap();
        let column = dataset.column("x").unwrap();
        assert!(!column.is_missing(0));
        assert!(column.is_missing(1));
    }

    #[test]
    fn test_large_strings_are_normalized() {
        let dataset = Dataset::from_columns(vec![(
            "s",
            Arc::new(LargeStringArray::from(vec!["a", "b"])) as ArrayRef,
        )])
        .unwrap();
        assert_eq!(dataset.column("s").unwrap().data_type(), &DataType::Utf8);
    }
}
