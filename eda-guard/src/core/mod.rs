//! Core types: the dataset, the field table, check results and the run
//! orchestration that ties them together.
//!
//! ## Overview
//!
//! - **[`Dataset`]**: the loaded data, one Arrow batch with named columns
//! - **[`FieldTable`]**: one [`FieldDescriptor`] per field, declaring its rules
//! - **[`resolve`]**: turns a descriptor into the ordered list of check tags
//! - **[`CheckResult`]**: the `(evidence, status, details)` triple every check returns
//! - **[`Validator`]**: runs every resolved check and builds a [`ValidationReport`]
//!
//! ```text
//! FieldTable ──► resolve() ──► ["int", "no-null", "range", ...]
//!                                      │
//! Dataset ─────────────────────► CheckRegistry ──► CheckResult ──► ValidationReport
//! ```

mod dataset;
mod field;
mod report;
mod resolver;
mod result;
mod runner;

pub use dataset::{reported_row_number, sanitize_name, Column, Dataset, HEADER_ROWS};
pub use field::{flag_is, non_blank, FieldDescriptor, FieldTable, UNDEFINED_SUBTYPE};
pub use report::{ReportEntry, ReportMetrics, SkippedTag, ValidationReport};
pub use resolver::{resolve, tags};
pub use result::{CheckResult, CheckStatus};
pub use runner::Validator;

pub(crate) use result::percent;
