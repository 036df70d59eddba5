//! Loaders for the dataset and the field table.
//!
//! Delimited files are read through DataFusion. Every column is read as text
//! so that values reach the checks exactly as written in the file; the checks
//! coerce on their own. Field tables may also come from a JSON workbook or a
//! spreadsheet workbook.

use crate::core::Dataset;
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::arrow::datatypes::Schema;
use datafusion::prelude::{SessionConfig, SessionContext};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

mod csv;
pub mod excel;
mod fields;
pub mod text;

pub use csv::{CsvOptions, CsvSource};
pub use fields::FieldTableSource;

/// Table name used by [`DataSource::load`].
pub const LOAD_TABLE: &str = "dataset";

/// A data source that can be registered with a DataFusion context.
///
/// # Examples
///
/// ```rust,no_run
/// use eda_guard::sources::{CsvSource, DataSource};
///
/// # async fn example() -> eda_guard::Result<()> {
/// let source = CsvSource::new("data/sales.csv");
/// let dataset = source.load().await?;
/// println!("{} rows", dataset.num_rows());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Registers this source as `table_name` in `ctx`.
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()>;

    /// Reads the whole source into a [`Dataset`], preserving row order.
    async fn load(&self) -> Result<Dataset> {
        debug!(source = %self.description(), "Loading data source");
        let ctx = session_context();
        self.register(&ctx, LOAD_TABLE).await?;
        let df = ctx.table(LOAD_TABLE).await?;
        let schema = df.schema().inner().clone();
        let batches = df.collect().await.map_err(|e| {
            EdaError::data_source_with_source(
                self.source_type(),
                format!("failed to read {}", self.description()),
                Box::new(e),
            )
        })?;
        debug!(
            source = %self.description(),
            batches = batches.len(),
            "Collected record batches"
        );
        Dataset::from_batches(schema, &batches)
    }

    /// Returns the schema of this source if it is already known.
    fn schema(&self) -> Option<Arc<Schema>>;

    /// Short type tag used in errors, e.g. `"csv"`.
    fn source_type(&self) -> &'static str;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;
}

/// A session that scans with a single partition, so batches come back in
/// file order.
pub fn session_context() -> SessionContext {
    SessionContext::new_with_config(SessionConfig::new().with_target_partitions(1))
}

/// Formats a byte count with binary units, e.g. `1536` → `"1.50 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", UNITS[unit])
}
