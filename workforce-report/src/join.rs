//! Outer join across normalized sources, projection, and validation.

use crate::definition::Definition;
use crate::normalize::{EntityKey, Record, SourceTable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Normalized tables by data-source name.
pub type SourceTables = IndexMap<String, SourceTable>;

/// Per entity, the record each source holds for it. Sources without the
/// entity are simply absent.
pub type JoinedTable = IndexMap<EntityKey, IndexMap<String, Record>>;

/// One output row: a value per definition, in definition order.
pub type ProjectedRow = Vec<Value>;

/// Value written where a source or field is missing.
pub fn empty_cell() -> Value {
    Value::String(String::new())
}

/// Outer-joins the tables. The key set is the union of every table's keys,
/// in first-seen order.
pub fn combine(sources: &SourceTables) -> JoinedTable {
    let mut joined = JoinedTable::new();
    for (name, table) in sources {
        for (key, record) in table {
            joined
                .entry(key.clone())
                .or_default()
                .insert(name.clone(), record.clone());
        }
    }
    joined
}

/// Projects every joined entity through `definitions`.
pub fn project(joined: &JoinedTable, definitions: &[Definition]) -> Vec<ProjectedRow> {
    joined
        .values()
        .map(|by_source| {
            definitions
                .iter()
                .map(|definition| lookup(by_source, definition))
                .collect()
        })
        .collect()
}

fn lookup(by_source: &IndexMap<String, Record>, definition: &Definition) -> Value {
    by_source
        .get(&definition.data_source)
        .and_then(|record| record.get(&definition.field_name))
        .cloned()
        .unwrap_or_else(empty_cell)
}

/// A definition that does not resolve against the fetched sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    SourceNotFound {
        row: usize,
        data_source: String,
    },
    FieldNotFound {
        row: usize,
        data_source: String,
        field_name: String,
    },
}

impl ValidationIssue {
    /// 1-based position of the offending definition.
    pub fn row(&self) -> usize {
        match self {
            ValidationIssue::SourceNotFound { row, .. } | ValidationIssue::FieldNotFound { row, .. } => *row,
        }
    }

    pub fn data_source(&self) -> &str {
        match self {
            ValidationIssue::SourceNotFound { data_source, .. }
            | ValidationIssue::FieldNotFound { data_source, .. } => data_source,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::SourceNotFound { row, data_source } => {
                write!(f, "row {row}: data source \"{data_source}\" not found")
            }
            ValidationIssue::FieldNotFound {
                row,
                data_source,
                field_name,
            } => write!(
                f,
                "row {row}: field \"{field_name}\" not found in data source \"{data_source}\""
            ),
        }
    }
}

/// Outcome of [`validate`]. Advisory: projection works regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Turns a failed report into [`ReportError::Validation`](crate::ReportError::Validation).
    pub fn into_result(self) -> crate::ReportResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(crate::ReportError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Checks that each definition's source was collected and that the
/// source's first record carries the field. Sources with no records skip
/// the field check.
pub fn validate(definitions: &[Definition], sources: &SourceTables) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (index, definition) in definitions.iter().enumerate() {
        let row = index + 1;
        let Some(table) = sources.get(&definition.data_source) else {
            report.issues.push(ValidationIssue::SourceNotFound {
                row,
                data_source: definition.data_source.clone(),
            });
            continue;
        };

        if let Some(sample) = table.values().next() {
            if !sample.contains_key(&definition.field_name) {
                report.issues.push(ValidationIssue::FieldNotFound {
                    row,
                    data_source: definition.data_source.clone(),
                    field_name: definition.field_name.clone(),
                });
            }
        }
    }

    report
}
