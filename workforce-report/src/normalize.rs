//! Converts raw payloads into tables keyed by entity identity.
//!
//! Member and sheet payloads name their identity fields differently, so each
//! record type has its own ordered list of candidate key fields. The first
//! candidate holding a non-empty string or a number becomes the record's
//! [`EntityKey`]; records with no usable candidate are dropped.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use workforce_client::MemberInfo;

/// Identity of one entity (employee) across sources.
pub type EntityKey = String;

/// One entity's fields from one source, passed through as received.
pub type Record = Map<String, Value>;

/// All records of one source, keyed by entity.
pub type SourceTable = IndexMap<EntityKey, Record>;

/// Ordered candidate fields for extracting an [`EntityKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFields(pub &'static [&'static str]);

/// Member records: `code`, then `id`, then `email`.
pub const MEMBER_KEY_FIELDS: KeyFields = KeyFields(&["code", "id", "email"]);

/// Sheet records: `member_code`, then `member_id`, then `code`.
pub const SHEET_KEY_FIELDS: KeyFields = KeyFields(&["member_code", "member_id", "code"]);

/// Payload array holding member records.
pub const MEMBER_DATA_FIELD: &str = "member_data";

/// Payload array holding sheet records.
pub const SHEET_DATA_FIELD: &str = "sheet_data";

impl KeyFields {
    pub fn fields(&self) -> &'static [&'static str] {
        self.0
    }

    /// Key from the first candidate that holds a usable value.
    pub fn extract(&self, record: &Record) -> Option<EntityKey> {
        self.0
            .iter()
            .find_map(|field| record.get(*field).and_then(key_text))
    }
}

fn key_text(value: &Value) -> Option<EntityKey> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Keys every object in `payload[array_field]`. A later record with the
/// same key replaces the earlier one.
pub fn normalize_records(payload: &Value, array_field: &str, keys: KeyFields) -> SourceTable {
    let mut table = SourceTable::new();
    let Some(records) = payload.get(array_field).and_then(Value::as_array) else {
        debug!("Payload has no {} array", array_field);
        return table;
    };

    let mut dropped = 0usize;
    let mut replaced = 0usize;
    for record in records.iter().filter_map(Value::as_object) {
        match keys.extract(record) {
            Some(key) => {
                if table.insert(key, record.clone()).is_some() {
                    replaced += 1;
                }
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("Dropped {} {} records without an identity key", dropped, array_field);
    }
    if replaced > 0 {
        warn!(
            "{} {} records shared a key with an earlier record and replaced it",
            replaced, array_field
        );
    }

    table
}

/// Normalizes a raw member list (`{"member_data": [...]}`).
pub fn normalize_members(members: &Value) -> SourceTable {
    normalize_records(members, MEMBER_DATA_FIELD, MEMBER_KEY_FIELDS)
}

/// Normalizes raw sheet contents (`{"sheet_data": [...]}`).
pub fn normalize_sheet(sheet: &Value) -> SourceTable {
    normalize_records(sheet, SHEET_DATA_FIELD, SHEET_KEY_FIELDS)
}

/// Normalizes the member list carried by a [`MemberInfo`].
pub fn normalize_member_info(info: &MemberInfo) -> SourceTable {
    normalize_members(&info.members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_text_rejects_empty_and_non_scalars() {
        assert_eq!(key_text(&json!("")), None);
        assert_eq!(key_text(&json!(null)), None);
        assert_eq!(key_text(&json!(true)), None);
        assert_eq!(key_text(&json!({"a": 1})), None);
        assert_eq!(key_text(&json!(17)), Some("17".to_string()));
        assert_eq!(key_text(&json!("E1")), Some("E1".to_string()));
    }
}
