//! Numeric coercion shared by the zero, negative and range checks.
//!
//! Every non-missing value is rendered as text, a comma decimal separator is
//! replaced by a dot, and the result is parsed as `f64`. Values that parse go
//! to the numeric side with their row position; the rest are kept untouched on
//! the non-numeric side. Missing values belong to neither side.

use crate::core::Column;
use crate::prelude::*;
use arrow::datatypes::DataType;

/// A value that survived coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericValue {
    /// Zero-based row position in the dataset
    pub row: usize,
    /// Parsed value
    pub value: f64,
    /// Text the value was parsed from
    pub raw: String,
}

/// The numeric and non-numeric split of one column.
#[derive(Debug, Clone)]
pub struct NumericColumn {
    data_type: DataType,
    numeric: Vec<NumericValue>,
    non_numeric: Vec<(usize, String)>,
}

/// Parses `text` as a number, accepting a comma as decimal separator.
///
/// Only finite values are accepted.
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Splits `column` into numeric and non-numeric values.
pub fn coerce(column: &Column<'_>) -> Result<NumericColumn> {
    let mut numeric = Vec::new();
    let mut non_numeric = Vec::new();

    for (row, text) in column.texts()?.into_iter().enumerate() {
        let Some(text) = text else { continue };
        match parse_decimal(&text) {
            Some(value) => numeric.push(NumericValue {
                row,
                value,
                raw: text,
            }),
            None => non_numeric.push((row, text)),
        }
    }

    Ok(NumericColumn {
        data_type: column.data_type().clone(),
        numeric,
        non_numeric,
    })
}

impl NumericColumn {
    /// Arrow type of the source column.
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn numeric(&self) -> &[NumericValue] {
        &self.numeric
    }

    pub fn non_numeric(&self) -> &[(usize, String)] {
        &self.non_numeric
    }

    /// Count of values that coerced successfully.
    pub fn numeric_count(&self) -> usize {
        self.numeric.len()
    }

    /// False when the column holds values but none of them is numeric.
    pub fn is_numeric(&self) -> bool {
        !self.numeric.is_empty() || self.non_numeric.is_empty()
    }

    /// Fails with `TypeMismatch` when the column is not numeric.
    pub fn ensure_numeric(&self) -> Result<&Self> {
        if self.is_numeric() {
            Ok(self)
        } else {
            Err(EdaError::TypeMismatch {
                expected: "numeric".to_string(),
                found: format!(
                    "{} ({} non-numeric values)",
                    self.data_type,
                    self.non_numeric.len()
                ),
            })
        }
    }

    /// Number of numeric values satisfying `predicate`.
    pub fn count_where(&self, predicate: impl Fn(f64) -> bool) -> usize {
        self.numeric.iter().filter(|v| predicate(v.value)).count()
    }

    /// First numeric value, in row order, satisfying `predicate`.
    pub fn first_where(&self, predicate: impl Fn(f64) -> bool) -> Option<&NumericValue> {
        self.numeric.iter().find(|v| predicate(v.value))
    }
}
