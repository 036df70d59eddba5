//! # eda-guard - Metadata-driven data quality checks
//!
//! eda-guard validates a tabular dataset against a separate *field table*:
//! one row per dataset column declaring its type and the rules it must obey
//! (no nulls, no zeros, no negatives, a regex format, a numeric range, a list
//! of allowed values, primary-key uniqueness). For every field the rules are
//! resolved into an ordered list of check tags, each check runs against the
//! column, and every outcome is reported as the same three-part result:
//! evidence, status and details.
//!
//! ## Quick Start
//!
//! ```rust
//! use eda_guard::core::{CheckStatus, Dataset, FieldDescriptor, FieldTable, Validator};
//! use arrow::array::{ArrayRef, StringArray};
//! use std::sync::Arc;
//!
//! let dataset = Dataset::from_columns(vec![
//!     ("qty", Arc::new(StringArray::from(vec![Some("10"), Some("0"), None])) as ArrayRef),
//! ]).unwrap();
//!
//! let fields = FieldTable::new(vec![
//!     FieldDescriptor::new("qty", "int")
//!         .with_null("no")
//!         .with_zero("no")
//!         .with_range("de 1 a 100"),
//! ]);
//!
//! let report = Validator::new().validate("orders", &dataset, &fields).unwrap();
//! for entry in &report.entries {
//!     println!("{} {}: {} [{}]", entry.field, entry.check, entry.evidence, entry.status);
//! }
//! assert_eq!(report.entries[0].evidence, "1 absences (33.33%)");
//! assert_eq!(report.entries[1].status, CheckStatus::Fail);
//! ```
//!
//! ## Loading from files
//!
//! ```rust,no_run
//! use eda_guard::config::AppConfig;
//! use eda_guard::core::Validator;
//! use eda_guard::sources::{CsvSource, DataSource, FieldTableSource};
//!
//! # async fn example() -> eda_guard::Result<()> {
//! let config = AppConfig::load("config/config.json")?;
//! let dataset = CsvSource::from_config(&config).load().await?;
//! let fields = FieldTableSource::from_config(&config).load().await?;
//! let report = Validator::new().validate("sales", &dataset, &fields)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`core`**: dataset, field table, rule resolver, results and the run orchestrator
//! - **`checks`**: the check functions and the registry that dispatches them by tag
//! - **`sources`**: CSV dataset loading and field table loading
//! - **`config`**: the JSON settings file
//! - **`formatters`**: human, JSON and Markdown report output
//! - **`logging`**: `tracing` setup and the run event log

pub mod checks;
pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod sources;

pub use error::{EdaError, Result};

#[cfg(test)]
mod test_helpers;
