//! User-authored column definitions.
//!
//! A definition table has two columns: the data source (the member source
//! name or a sheet name) and the field to pull from it. Row order is
//! output column order.

use crate::error::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Rows past this point are ignored.
pub const MAX_DEFINITION_ROWS: usize = 1000;

/// One output column: a field taken from a named data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Definition {
    pub data_source: String,
    pub field_name: String,
}

impl Definition {
    pub fn new(data_source: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            field_name: field_name.into(),
        }
    }
}

/// Parses definition rows. Cells are trimmed; rows with a blank or missing
/// source or field cell are skipped.
pub fn parse_definitions<I, R, S>(rows: I) -> ReportResult<Vec<Definition>>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let definitions: Vec<Definition> = rows
        .into_iter()
        .take(MAX_DEFINITION_ROWS)
        .filter_map(|row| {
            let cells = row.as_ref();
            let data_source = cells.first()?.as_ref().trim();
            let field_name = cells.get(1)?.as_ref().trim();
            if data_source.is_empty() || field_name.is_empty() {
                return None;
            }
            Some(Definition::new(data_source, field_name))
        })
        .collect();

    if definitions.is_empty() {
        return Err(ReportError::Configuration(
            "no valid definitions found: put the data source in column 1 and the field name in column 2"
                .to_string(),
        ));
    }

    Ok(definitions)
}

/// Reads a headerless two-column CSV definition table.
pub fn read_definitions_csv<R: Read>(reader: R) -> ReportResult<Vec<Definition>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    // Blank lines produce no record, so the window is counted in physical lines.
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        if line > MAX_DEFINITION_ROWS as u64 {
            break;
        }
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    parse_definitions(rows)
}

/// Distinct data-source names, in order of first reference.
pub fn required_sources(definitions: &[Definition]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for definition in definitions {
        if !sources.contains(&definition.data_source) {
            sources.push(definition.data_source.clone());
        }
    }
    sources
}

/// Column headers: each definition's field name, in order.
pub fn headers(definitions: &[Definition]) -> Vec<String> {
    definitions.iter().map(|d| d.field_name.clone()).collect()
}
