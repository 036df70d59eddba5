//! Run configuration loaded from a JSON settings file.
//!
//! ```json
//! {
//!   "data_path": "data/sales.csv",
//!   "eda_config_path": "config/fields.json",
//!   "fields_sheet": "fields",
//!   "separator": ";",
//!   "encoding": "auto",
//!   "log_path": "./logs"
//! }
//! ```
//!
//! Unknown keys are ignored so settings files shared with other tools still load.
//! That includes `file_format`: the dataset is always a delimited text file.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Explicit configuration passed to the loaders and the event log.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Dataset file to validate
    pub data_path: PathBuf,
    /// Field table file (spreadsheet, JSON workbook or CSV)
    pub eda_config_path: PathBuf,
    /// Sheet holding the field descriptors in a workbook
    #[serde(default = "default_fields_sheet")]
    pub fields_sheet: String,
    #[serde(default)]
    pub separator: Separator,
    #[serde(default)]
    pub encoding: Encoding,
    /// Directory for the event log
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

fn default_fields_sheet() -> String {
    "fields".to_string()
}

fn default_log_path() -> PathBuf {
    PathBuf::from("./logs")
}

impl AppConfig {
    pub fn new(data_path: impl Into<PathBuf>, eda_config_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            eda_config_path: eda_config_path.into(),
            fields_sheet: default_fields_sheet(),
            separator: Separator::default(),
            encoding: Encoding::default(),
            log_path: default_log_path(),
        }
    }

    /// Reads and validates a settings file.
    #[instrument(skip_all, fields(config.path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EdaError::SourceNotFound {
                path: path.display().to_string(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text).map_err(|e| {
            EdaError::Configuration(format!("invalid settings file {}: {e}", path.display()))
        })?;
        config.validate()?;
        debug!(
            config.data_path = %config.data_path.display(),
            config.fields_path = %config.eda_config_path.display(),
            config.separator = %config.separator,
            config.encoding = %config.encoding,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Rejects empty paths and a blank sheet name.
    pub fn validate(&self) -> Result<()> {
        if self.data_path.as_os_str().is_empty() {
            return Err(EdaError::Configuration("data_path is empty".to_string()));
        }
        if self.eda_config_path.as_os_str().is_empty() {
            return Err(EdaError::Configuration(
                "eda_config_path is empty".to_string(),
            ));
        }
        if self.fields_sheet.trim().is_empty() {
            return Err(EdaError::Configuration("fields_sheet is blank".to_string()));
        }
        Ok(())
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_fields_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.eda_config_path = path.into();
        self
    }

    pub fn with_fields_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.fields_sheet = sheet.into();
        self
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }
}

/// Field separator of a delimited file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Separator {
    /// Sniff the separator from the header line
    #[default]
    Auto,
    Char(u8),
}

impl Separator {
    /// Separators considered when sniffing.
    pub const CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
}

impl TryFrom<String> for Separator {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "" | "auto" => Ok(Separator::Auto),
            "\\t" | "tab" => Ok(Separator::Char(b'\t')),
            s if s.len() == 1 && s.is_ascii() => Ok(Separator::Char(s.as_bytes()[0])),
            other => Err(format!(
                "separator must be a single ASCII character or \"auto\", got \"{other}\""
            )),
        }
    }
}

impl From<Separator> for String {
    fn from(value: Separator) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separator::Auto => f.write_str("auto"),
            Separator::Char(b'\t') => f.write_str("\\t"),
            Separator::Char(c) => write!(f, "{}", *c as char),
        }
    }
}

/// Text encoding of the dataset file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Encoding {
    /// UTF-8 when the bytes are valid UTF-8, Latin-1 otherwise
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "utf-8", alias = "utf8", alias = "UTF-8")]
    Utf8,
    #[serde(
        rename = "latin-1",
        alias = "latin1",
        alias = "iso-8859-1",
        alias = "ISO-8859-1"
    )]
    Latin1,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Auto => "auto",
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config: AppConfig = serde_json::from_str(
            r#"{"data_path": "data.csv", "eda_config_path": "fields.json"}"#,
        )
        .unwrap();
        assert_eq!(config.fields_sheet, "fields");
        assert_eq!(config.separator, Separator::Auto);
        assert_eq!(config.encoding, Encoding::Auto);
        assert_eq!(config.log_path, PathBuf::from("./logs"));
    }

    #[test]
    fn test_explicit_values_and_unknown_keys() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "data_path": "data.csv",
                "eda_config_path": "fields.csv",
                "file_format": "csv",
                "separator": ";",
                "encoding": "latin1",
                "decimal_separator": ",",
                "date_format": "%d/%m/%Y"
            }"#,
        )
        .unwrap();
        assert_eq!(config.separator, Separator::Char(b';'));
        assert_eq!(config.encoding, Encoding::Latin1);
        assert!(!serde_json::to_string(&config)
            .unwrap()
            .contains("file_format"));
    }

    #[test]
    fn test_separator_parsing() {
        assert_eq!(
            Separator::try_from("\\t".to_string()).unwrap(),
            Separator::Char(b'\t')
        );
        assert!(Separator::try_from(";;".to_string()).is_err());
        assert_eq!(String::from(Separator::Char(b'|')), "|");
    }

    #[test]
    fn test_validate_rejects_blank_sheet() {
        let config = AppConfig::new("a.csv", "b.json").with_fields_sheet("  ");
        assert!(matches!(
            config.validate(),
            Err(EdaError::Configuration(_))
        ));
        assert!(AppConfig::new("", "b.json").validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(EdaError::SourceNotFound { .. })));
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config =
            AppConfig::new("data.csv", "fields.csv").with_separator(Separator::Char(b'\t'));
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"data_path": 3}"#).unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(EdaError::Configuration(_))
        ));
    }
}
