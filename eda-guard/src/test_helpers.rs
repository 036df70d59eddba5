//! Small dataset builders shared by unit tests.

use crate::core::{Dataset, FieldDescriptor, FieldTable};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use std::sync::Arc;

pub fn int_dataset(name: &str, values: Vec<Option<i64>>) -> Dataset {
    single_column(name, Arc::new(Int64Array::from(values)))
}

pub fn float_dataset(name: &str, values: Vec<Option<f64>>) -> Dataset {
    single_column(name, Arc::new(Float64Array::from(values)))
}

pub fn string_dataset(name: &str, values: Vec<Option<&str>>) -> Dataset {
    single_column(name, Arc::new(StringArray::from(values)))
}

/// A field table holding only `field`.
pub fn table_of(field: &FieldDescriptor) -> FieldTable {
    FieldTable::new(vec![field.clone()])
}

fn single_column(name: &str, array: ArrayRef) -> Dataset {
    Dataset::from_columns(vec![(name, array)]).expect("valid single-column dataset")
}
