//! Validates a small CSV file against an inline field table.
//!
//! Run with: `cargo run --example validate_csv`

use eda_guard::core::{FieldDescriptor, FieldTable, Validator};
use eda_guard::formatters::{HumanFormatter, ReportFormatter};
use eda_guard::logging::setup::{init_logging, LoggingConfig};
use eda_guard::sources::{CsvSource, DataSource};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default())?;

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    writeln!(file, "pedido;uf;valor;cep")?;
    writeln!(file, "1;SP;150,00;01310100")?;
    writeln!(file, "2;RJ;0;2004000")?;
    writeln!(file, "2;;-35,90;30130010")?;
    file.flush()?;

    let dataset = CsvSource::new(file.path()).load().await?;
    let fields = FieldTable::new(vec![
        FieldDescriptor::new("pedido", "int").with_pk("yes"),
        FieldDescriptor::new("uf", "string")
            .with_null("no")
            .with_values("SP|RJ|MG"),
        FieldDescriptor::new("valor", "float")
            .with_subtype("money")
            .with_zero("no")
            .with_negative("no")
            .with_range("de 0 a 1.000"),
        FieldDescriptor::new("cep", "string").with_format(r"\d{8}"),
    ]);

    let report = Validator::new().validate("pedidos", &dataset, &fields)?;
    println!("{}", HumanFormatter::new().format(&report)?);
    Ok(())
}
