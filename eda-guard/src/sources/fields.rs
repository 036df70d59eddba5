//! Field table loader.

use super::{excel, CsvOptions, CsvSource, DataSource};
use crate::config::AppConfig;
use crate::core::{FieldDescriptor, FieldTable};
use crate::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Loads field descriptors from a spreadsheet workbook, a JSON workbook or a
/// CSV file.
///
/// Spreadsheets (see [`excel::WORKBOOK_EXTENSIONS`]) are read from the named
/// sheet, with the first row as header. A JSON workbook maps sheet names to arrays of descriptor objects:
///
/// ```json
/// {
///   "fields": [
///     { "field": "uf", "type": "string", "null": "no", "values": "SP|RJ|MG" }
///   ]
/// }
/// ```
///
/// A JSON file holding a bare array is treated as a single-sheet workbook.
/// CSV files have one descriptor per row and no sheets.
#[derive(Debug, Clone)]
pub struct FieldTableSource {
    path: PathBuf,
    sheet: String,
    csv_options: CsvOptions,
}

impl FieldTableSource {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
            csv_options: CsvOptions::default(),
        }
    }

    /// Creates the field table source described by `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.eda_config_path.clone(), config.fields_sheet.clone())
    }

    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv_options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    /// Reads the field table. Rows with neither a field name nor a type are
    /// dropped; anything else malformed is left for the resolver to reject.
    #[instrument(skip(self), fields(source.path = %self.path.display(), source.sheet = %self.sheet))]
    pub async fn load(&self) -> Result<FieldTable> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Err(EdaError::SourceNotFound {
                path: self.path.display().to_string(),
            });
        }

        let table = if excel::is_workbook(&self.path) {
            let path = self.path.clone();
            let sheet = self.sheet.clone();
            let dataset = tokio::task::spawn_blocking(move || excel::read_sheet(&path, &sheet))
                .await
                .map_err(|e| {
                    EdaError::data_source_with_source(
                        "excel",
                        format!("failed to read {}", self.path.display()),
                        Box::new(e),
                    )
                })??;
            FieldTable::from_dataset(&dataset)?
        } else if self.is_json() {
            let text = tokio::fs::read_to_string(&self.path).await?;
            self.parse_workbook(&text)?
        } else {
            debug!("Reading field table as CSV; sheet name not used");
            let sheet = CsvSource::with_options(&self.path, self.csv_options.clone())
                .load()
                .await?;
            FieldTable::from_dataset(&sheet)?
        };

        let before = table.len();
        let table = FieldTable::new(
            table
                .iter()
                .filter(|f| !(f.field.trim().is_empty() && f.field_type.trim().is_empty()))
                .cloned()
                .collect(),
        );
        info!(
            fields.count = table.len(),
            fields.dropped = before - table.len(),
            "Loaded field table"
        );
        Ok(table)
    }

    fn parse_workbook(&self, text: &str) -> Result<FieldTable> {
        let workbook: Value = serde_json::from_str(text).map_err(|e| {
            EdaError::Configuration(format!("{} is not valid JSON: {e}", self.path.display()))
        })?;

        let rows = match workbook {
            Value::Array(rows) => rows,
            Value::Object(mut sheets) => {
                let wanted = self.sheet.trim();
                let key = sheets
                    .keys()
                    .find(|name| name.trim().eq_ignore_ascii_case(wanted))
                    .cloned()
                    .ok_or_else(|| EdaError::SheetNotFound {
                        sheet: self.sheet.clone(),
                        path: self.path.display().to_string(),
                    })?;
                match sheets.remove(&key) {
                    Some(Value::Array(rows)) => rows,
                    _ => {
                        return Err(EdaError::Configuration(format!(
                            "sheet '{key}' in {} is not an array of field descriptors",
                            self.path.display()
                        )))
                    }
                }
            }
            _ => {
                return Err(EdaError::Configuration(format!(
                    "{} must hold an object of sheets or an array of field descriptors",
                    self.path.display()
                )))
            }
        };

        let fields = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| {
                serde_json::from_value::<FieldDescriptor>(row).map_err(|e| {
                    EdaError::Configuration(format!(
                        "field descriptor #{} in sheet '{}': {e}",
                        idx + 1,
                        self.sheet
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FieldTable::new(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_json_workbook_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "eda.json",
            r#"{
                "validations": [],
                "Fields": [
                    {"field": "id", "type": "int", "pk": "yes", "null": "no"},
                    {"field": "uf", "type": "string", "values": ["SP", "RJ"], "zero": null},
                    {"field": "", "type": ""}
                ]
            }"#,
        );

        let table = FieldTableSource::new(&path, "fields").load().await.unwrap();
        assert_eq!(table.len(), 2);
        let id = table.get("ID").unwrap();
        assert_eq!(id.pk.as_deref(), Some("yes"));
        assert_eq!(id.nullable.as_deref(), Some("no"));
        assert!(table.get("uf").unwrap().values().is_some());
    }

    fn write_xlsx(path: &Path, sheet: &str, rows: &[&[&str]]) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                let written = match cell.parse::<f64>() {
                    Ok(number) => worksheet.write_number(r as u32, c as u16, number),
                    Err(_) => worksheet.write_string(r as u32, c as u16, *cell),
                };
                written.unwrap();
            }
        }
        workbook.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_xlsx_fields_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eda.xlsx");
        write_xlsx(
            &path,
            "Fields",
            &[
                &["field", "type", "subtype", "null", "pk", "range", "values"],
                &["id", "int", "", "no", "yes", "", ""],
                &["2024", "float", "money", "", "", "de 0 a 1.000", ""],
                &["uf", "string", "undefined", "", "", "", "SP|RJ"],
                &["", "", "", "", "", "", ""],
            ],
        );

        let table = FieldTableSource::new(&path, " fields ").load().await.unwrap();
        assert_eq!(table.len(), 3);
        let id = table.get("id").unwrap();
        assert_eq!(id.nullable.as_deref(), Some("no"));
        assert_eq!(id.pk.as_deref(), Some("yes"));
        assert_eq!(id.subtype(), None);

        let year = table.get("2024").unwrap();
        assert_eq!(year.subtype(), Some("money"));
        assert_eq!(year.range(), Some("de 0 a 1.000"));
        assert_eq!(table.get("uf").unwrap().values(), Some("SP|RJ"));
    }

    #[tokio::test]
    async fn test_xlsx_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eda.xlsx");
        write_xlsx(&path, "validations", &[&["field", "type"], &["id", "int"]]);

        let result = FieldTableSource::new(&path, "fields").load().await;
        assert!(matches!(
            result,
            Err(EdaError::SheetNotFound { ref sheet, .. }) if sheet == "fields"
        ));
    }

    #[tokio::test]
    async fn test_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "eda.json", r#"{"validations": []}"#);
        let result = FieldTableSource::new(&path, "fields").load().await;
        assert!(matches!(
            result,
            Err(EdaError::SheetNotFound { ref sheet, .. }) if sheet == "fields"
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FieldTableSource::new(dir.path().join("eda.json"), "fields")
            .load()
            .await;
        assert!(matches!(result, Err(EdaError::SourceNotFound { .. })));
    }

    #[tokio::test]
    async fn test_csv_field_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "fields.csv",
            "field;type;subtype;null;zero;format;range\n\
             qty;int;undefined;no;no;;de 1 a 1.000\n\
             cep;string;;;;\\d{8};\n",
        );

        let table = FieldTableSource::new(&path, "ignored").load().await.unwrap();
        assert_eq!(table.len(), 2);
        let qty = table.get("qty").unwrap();
        assert_eq!(qty.subtype(), None);
        assert_eq!(qty.range(), Some("de 1 a 1.000"));
        assert_eq!(table.get("cep").unwrap().format_regex(), Some(r"\d{8}"));
    }

    #[tokio::test]
    async fn test_csv_without_type_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "fields.csv", "field,null\nqty,no\n");
        assert!(matches!(
            FieldTableSource::new(&path, "fields").load().await,
            Err(EdaError::Configuration(_))
        ));
    }
}
