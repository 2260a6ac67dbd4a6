//! Header-plus-rows views handed to the presentation layer.

use crate::builder::CustomReport;
use crate::join::empty_cell;
use crate::normalize::{MEMBER_DATA_FIELD, SHEET_DATA_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use workforce_client::source::scalar_text;
use workforce_client::{MemberInfo, SheetInfo};

/// Headers used when the member layout lists no fields.
pub const DEFAULT_MEMBER_HEADERS: [&str; 3] = ["ID", "名前", "メールアドレス"];
/// Member fields read when the member layout lists no fields.
pub const DEFAULT_MEMBER_FIELDS: [&str; 3] = ["id", "name", "email"];
/// Header used when a sheet has no layout fields.
pub const DEFAULT_SHEET_HEADER: &str = "データ";

/// A rectangular result: one header per column, one value per cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// A layout field: the record key to read and the label to show.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LayoutField {
    id: String,
    label: String,
}

fn layout_fields(fields: Option<&Value>) -> Vec<LayoutField> {
    fields
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(|field| {
                    let id = field.get("id").and_then(scalar_text)?;
                    let label = field
                        .get("name")
                        .and_then(scalar_text)
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| id.clone());
                    Some(LayoutField { id, label })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn records<'a>(payload: &'a Value, array_field: &str) -> impl Iterator<Item = &'a serde_json::Map<String, Value>> {
    payload
        .get(array_field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn cell(record: &serde_json::Map<String, Value>, field: &str) -> Value {
    match record.get(field) {
        Some(Value::Null) | None => empty_cell(),
        Some(value) => value.clone(),
    }
}

/// Member list laid out by the member layout's basic then custom fields.
pub fn member_table(info: &MemberInfo) -> Table {
    let layout = info.layouts.get("member_layout");
    let mut fields = layout_fields(layout.and_then(|l| l.get("basic_fields")));
    fields.extend(layout_fields(layout.and_then(|l| l.get("custom_fields"))));

    if fields.is_empty() {
        fields = DEFAULT_MEMBER_FIELDS
            .iter()
            .zip(DEFAULT_MEMBER_HEADERS)
            .map(|(id, label)| LayoutField {
                id: id.to_string(),
                label: label.to_string(),
            })
            .collect();
    }

    Table {
        headers: fields.iter().map(|f| f.label.clone()).collect(),
        rows: records(&info.members, MEMBER_DATA_FIELD)
            .map(|record| fields.iter().map(|f| cell(record, &f.id)).collect())
            .collect(),
    }
}

/// Sheet contents laid out by the sheet's layout fields. Without a layout,
/// each record's values are emitted in their received order.
pub fn sheet_table(info: &SheetInfo) -> Table {
    let fields = layout_fields(info.layout.as_ref().and_then(|l| l.get("fields")));

    if fields.is_empty() {
        return Table {
            headers: vec![DEFAULT_SHEET_HEADER.to_string()],
            rows: records(&info.data, SHEET_DATA_FIELD)
                .map(|record| {
                    record
                        .values()
                        .map(|v| if v.is_null() { empty_cell() } else { v.clone() })
                        .collect()
                })
                .collect(),
        };
    }

    Table {
        headers: fields.iter().map(|f| f.label.clone()).collect(),
        rows: records(&info.data, SHEET_DATA_FIELD)
            .map(|record| fields.iter().map(|f| cell(record, &f.id)).collect())
            .collect(),
    }
}

/// The projected custom report.
pub fn custom_table(report: &CustomReport) -> Table {
    Table {
        headers: report.headers.clone(),
        rows: report.rows.clone(),
    }
}

/// Text shown for a cell: strings as-is, nulls empty, everything else as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
