//! Error types for the eda-guard validation library.
//!
//! All fallible operations in the crate return [`EdaError`]. Check functions
//! never surface these to the orchestrator directly: a check that cannot be
//! evaluated converts its error into a [`CheckResult`](crate::core::CheckResult)
//! with an `error` status. Loader errors (missing files, missing sheets,
//! unparsable input) propagate to the caller.

use thiserror::Error;

/// The main error type for eda-guard.
#[derive(Error, Debug)]
pub enum EdaError {
    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A field descriptor lacks a required attribute.
    #[error("Invalid field descriptor '{field}': {message}")]
    InvalidFieldDescriptor {
        /// Name of the field, or `<unnamed>` if the name itself is missing
        field: String,
        /// What is wrong with the descriptor
        message: String,
    },

    /// A rule attached to a field cannot be interpreted (bad range, regex, list).
    #[error("Invalid rule for field '{field}': {message}")]
    InvalidRule {
        /// Name of the field carrying the rule
        field: String,
        /// Detailed error message
        message: String,
    },

    /// The input file does not exist.
    #[error("Source not found: {path}")]
    SourceNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The input workbook exists but does not contain the requested sheet.
    #[error("Sheet '{sheet}' not found in {path}")]
    SheetNotFound {
        /// Requested sheet name
        sheet: String,
        /// Workbook path
        path: String,
    },

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "JSON")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error when a required column is not found in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Error when data types don't match expected types.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Error when parsing or processing data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, EdaError>`.
pub type Result<T> = std::result::Result<T, EdaError>;

impl From<serde_json::Error> for EdaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for EdaError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Internal(format!("failed to format output: {err}"))
    }
}

impl EdaError {
    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new invalid rule error.
    pub fn invalid_rule(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid field descriptor error.
    pub fn invalid_descriptor(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFieldDescriptor {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<EdaError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            EdaError::Internal(inner) => EdaError::Internal(format!("{msg}: {inner}")),
            other => EdaError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                EdaError::Internal(inner) => EdaError::Internal(format!("{msg}: {inner}")),
                other => EdaError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_rule_error() {
        let err = EdaError::invalid_rule("amount", "expected 'de <min> a <max>'");
        assert_eq!(
            err.to_string(),
            "Invalid rule for field 'amount': expected 'de <min> a <max>'"
        );
    }

    #[test]
    fn test_data_source_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes");
        let err = EdaError::data_source_with_source("CSV", "Could not parse", Box::new(source));
        assert_eq!(err.to_string(), "Data source error: Could not parse");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_sheet_not_found() {
        let err = EdaError::SheetNotFound {
            sheet: "fields".to_string(),
            path: "rules.json".to_string(),
        };
        assert_eq!(err.to_string(), "Sheet 'fields' not found in rules.json");
    }

    #[test]
    fn test_column_not_found() {
        let err = EdaError::ColumnNotFound {
            column: "user_id".to_string(),
        };
        assert_eq!(err.to_string(), "Column 'user_id' not found in dataset");
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: EdaError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, EdaError::Serialization(_)));
    }

    #[test]
    fn test_error_context() {
        fn failing_operation() -> Result<()> {
            Err(EdaError::Internal("Something went wrong".to_string()))
        }

        let err = failing_operation()
            .context("While loading field table")
            .unwrap_err();
        assert!(err.to_string().contains("While loading field table"));
        assert!(err.to_string().contains("Something went wrong"));
    }
}
