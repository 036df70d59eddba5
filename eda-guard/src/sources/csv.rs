//! CSV file source implementation.

use super::text;
use super::{format_file_size, DataSource};
use crate::config::{AppConfig, Encoding, Separator};
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use datafusion::prelude::*;
use once_cell::sync::OnceCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Options for reading a delimited file.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvOptions {
    /// Field separator, or `Auto` to sniff it from the header
    pub separator: Separator,
    /// File encoding, or `Auto` to detect UTF-8 vs Latin-1
    pub encoding: Encoding,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: Separator::Auto,
            encoding: Encoding::Auto,
            quote: b'"',
        }
    }
}

impl CsvOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            separator: config.separator,
            encoding: config.encoding,
            ..Self::default()
        }
    }
}

/// What the first read of the file found out.
#[derive(Debug)]
struct Staged {
    /// File handed to DataFusion; a UTF-8 copy when the source is Latin-1
    /// or has short records
    location: PathBuf,
    separator: u8,
    schema: SchemaRef,
    encoding: Encoding,
    size: u64,
    padded_rows: usize,
    _copy: Option<NamedTempFile>,
}

/// A delimited text file with one header row.
///
/// The header decides the column names; every column is read as nullable
/// text and empty cells become nulls, as do the trailing cells of records
/// that end early. The file is inspected once, on first registration, to
/// settle encoding and separator.
///
/// # Examples
///
/// ```rust,no_run
/// use eda_guard::config::{Encoding, Separator};
/// use eda_guard::sources::{CsvOptions, CsvSource, DataSource};
///
/// # async fn example() -> eda_guard::Result<()> {
/// let options = CsvOptions {
///     separator: Separator::Char(b';'),
///     encoding: Encoding::Latin1,
///     ..Default::default()
/// };
/// let dataset = CsvSource::with_options("data/vendas.csv", options).load().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
    staged: OnceCell<Staged>,
}

impl CsvSource {
    /// Creates a CSV source with detected separator and encoding.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, CsvOptions::default())
    }

    pub fn with_options(path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
            staged: OnceCell::new(),
        }
    }

    /// Creates the dataset source described by `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_options(config.data_path.clone(), CsvOptions::from_config(config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Separator in use, once the file has been read.
    pub fn separator(&self) -> Option<u8> {
        self.staged.get().map(|s| s.separator)
    }

    /// Encoding in use, once the file has been read.
    pub fn encoding(&self) -> Option<Encoding> {
        self.staged.get().map(|s| s.encoding)
    }

    /// Number of records that had fewer cells than the header, once the file
    /// has been read.
    pub fn padded_rows(&self) -> Option<usize> {
        self.staged.get().map(|s| s.padded_rows)
    }

    /// File size in bytes, once the file has been read.
    pub fn file_size(&self) -> Option<u64> {
        self.staged.get().map(|s| s.size)
    }

    #[instrument(skip(self), fields(source.path = %self.path.display()))]
    async fn stage(&self) -> Result<&Staged> {
        if let Some(staged) = self.staged.get() {
            return Ok(staged);
        }
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Err(EdaError::SourceNotFound {
                path: self.path.display().to_string(),
            });
        }

        let bytes = tokio::fs::read(&self.path).await?;
        let size = bytes.len() as u64;
        let decoded = text::decode(&bytes, self.options.encoding)?;

        let header = text::first_line(&decoded.text);
        if header.trim().is_empty() {
            return Err(EdaError::data_source(
                "csv",
                format!("{} has no header line", self.path.display()),
            ));
        }
        let separator = match self.options.separator {
            Separator::Char(c) => c,
            Separator::Auto => text::sniff_separator(header, self.options.quote),
        };
        let names = text::unique_column_names(text::split_line(
            header,
            separator,
            self.options.quote,
        ));
        debug!(columns = ?names, "Parsed header");
        let schema = Arc::new(Schema::new(
            names
                .into_iter()
                .map(|name| Field::new(name, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));

        let (body, padded_rows) = text::pad_short_records(
            &decoded.text,
            separator,
            self.options.quote,
            schema.fields().len(),
        );
        if padded_rows > 0 {
            debug!(rows = padded_rows, "Padded records shorter than the header");
        }
        let copy = if decoded.encoding == Encoding::Latin1 || padded_rows > 0 {
            Some(write_utf8_copy(&body)?)
        } else {
            None
        };
        let location = copy
            .as_ref()
            .map(|file| file.path().to_path_buf())
            .unwrap_or_else(|| self.path.clone());

        info!(
            source.path = %self.path.display(),
            source.size = %format_file_size(size),
            source.encoding = %decoded.encoding,
            source.bom = decoded.had_bom,
            source.separator = %Separator::Char(separator),
            source.columns = schema.fields().len(),
            source.padded_rows = padded_rows,
            "Inspected CSV file"
        );

        Ok(self.staged.get_or_init(|| Staged {
            location,
            separator,
            schema,
            encoding: decoded.encoding,
            size,
            padded_rows,
            _copy: copy,
        }))
    }
}

/// Writes decoded text to a temporary UTF-8 file DataFusion can read.
fn write_utf8_copy(text: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("eda-guard-")
        .suffix(".csv")
        .tempfile()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self, ctx), fields(source.kind = "csv"))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        let staged = self.stage().await?;
        let location = staged.location.to_str().ok_or_else(|| {
            EdaError::Configuration(format!(
                "path is not valid UTF-8: {}",
                staged.location.display()
            ))
        })?;
        let extension = staged
            .location
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let options = CsvReadOptions::new()
            .has_header(true)
            .delimiter(staged.separator)
            .quote(self.options.quote)
            .schema(staged.schema.as_ref())
            .file_extension(&extension);

        ctx.register_csv(table_name, location, options)
            .await
            .map_err(|e| {
                EdaError::data_source_with_source(
                    "csv",
                    format!("failed to register {}", self.path.display()),
                    Box::new(e),
                )
            })?;
        Ok(())
    }

    fn schema(&self) -> Option<Arc<Schema>> {
        self.staged.get().map(|s| Arc::clone(&s.schema))
    }

    fn source_type(&self) -> &'static str {
        "csv"
    }

    fn description(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}
