//! Configuration loading and output rendering for the `workforce` binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use workforce_client::{ClientConfig, SourceDescriptor};
use workforce_report::table::{cell_text, Table};
use workforce_report::{ReportConfig, ValidationReport};

/// Everything the binary can be configured with from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub report: ReportConfig,
}

impl CliConfig {
    /// Loads a JSON config file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Loads `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Applies the `--strict` switch to a report's validation result. Advisory
/// by default: mismatches are already logged by the builder.
pub fn check_validation(validation: &ValidationReport, strict: bool) -> Result<()> {
    if strict {
        validation
            .clone()
            .into_result()
            .context("Definition table does not match the fetched data")?;
    }
    Ok(())
}

/// Writes a table as CSV: one header row, then one row per record.
pub fn write_table<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    csv_writer.write_record(&table.headers)?;
    for row in &table.rows {
        csv_writer.write_record(row.iter().map(cell_text))?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Writes sheet descriptors as a `name,id` CSV.
pub fn write_descriptors<W: Write>(writer: W, descriptors: &[SourceDescriptor]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["name", "id"])?;
    for descriptor in descriptors {
        csv_writer.write_record([&descriptor.name, &descriptor.id])?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}
