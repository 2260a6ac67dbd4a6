//! The logical resources the API exposes, and typed views over them.

use crate::error::ClientResult;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Member layout catalog plus the raw member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub layouts: Value,
    pub members: Value,
}

/// One sheet's contents and its entry from the sheet layout catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub layout: Option<Value>,
    pub data: Value,
}

/// Per-id outcome of a batch sheet fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetFetch {
    Loaded(SheetInfo),
    Failed { error: String },
}

impl SheetFetch {
    pub fn is_loaded(&self) -> bool {
        matches!(self, SheetFetch::Loaded(_))
    }

    pub fn info(&self) -> Option<&SheetInfo> {
        match self {
            SheetFetch::Loaded(info) => Some(info),
            SheetFetch::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SheetFetch::Failed { error } => Some(error),
            SheetFetch::Loaded(_) => None,
        }
    }
}

/// A fetchable sheet: its display name and backend id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub id: String,
}

/// The `sheet_layouts` array of a layout catalog, if the catalog has one.
pub fn catalog_entries(catalog: &Value) -> Option<&Vec<Value>> {
    catalog.get("sheet_layouts").and_then(Value::as_array)
}

/// Finds the layout whose `id` equals `sheet_id`. Numeric ids compare by their decimal text.
pub fn find_layout_by_id<'a>(catalog: &'a Value, sheet_id: &str) -> Option<&'a Value> {
    catalog_entries(catalog)?
        .iter()
        .find(|layout| layout.get("id").and_then(scalar_text).as_deref() == Some(sheet_id))
}

/// Finds the layout whose `name` is exactly `name`.
pub fn find_layout_by_name<'a>(catalog: &'a Value, name: &str) -> Option<&'a Value> {
    catalog_entries(catalog)?
        .iter()
        .find(|layout| layout.get("name").and_then(Value::as_str) == Some(name))
}

/// Lists every sheet in the catalog that has both a name and an id.
pub fn sheet_descriptors(catalog: &Value) -> Vec<SourceDescriptor> {
    catalog_entries(catalog)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|layout| {
                    Some(SourceDescriptor {
                        name: layout.get("name")?.as_str()?.to_string(),
                        id: layout.get("id").and_then(scalar_text)?,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Text form of a string or number; `None` for anything else.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read access to the workforce API's logical resources.
#[async_trait]
pub trait WorkforceApi: Send + Sync {
    /// Member layout catalog.
    async fn member_layouts(&self) -> ClientResult<Value>;

    /// Raw member list.
    async fn members(&self) -> ClientResult<Value>;

    /// Sheet layout catalog.
    async fn sheet_layouts(&self) -> ClientResult<Value>;

    /// Raw contents of one sheet.
    async fn sheet(&self, sheet_id: &str) -> ClientResult<Value>;

    async fn member_info(&self) -> ClientResult<MemberInfo> {
        let layouts = self.member_layouts().await?;
        let members = self.members().await?;
        Ok(MemberInfo { layouts, members })
    }

    async fn sheet_info(&self, sheet_id: &str) -> ClientResult<SheetInfo> {
        let layouts = self.sheet_layouts().await?;
        let data = self.sheet(sheet_id).await?;
        Ok(SheetInfo {
            layout: find_layout_by_id(&layouts, sheet_id).cloned(),
            data,
        })
    }

    /// Fetches several sheets. A failing id is recorded in its own entry
    /// and does not stop the rest of the batch.
    async fn sheet_infos(&self, sheet_ids: &[String]) -> ClientResult<IndexMap<String, SheetFetch>> {
        let layouts = self.sheet_layouts().await?;
        let mut results = IndexMap::with_capacity(sheet_ids.len());

        for sheet_id in sheet_ids {
            let outcome = match self.sheet(sheet_id).await {
                Ok(data) => SheetFetch::Loaded(SheetInfo {
                    layout: find_layout_by_id(&layouts, sheet_id).cloned(),
                    data,
                }),
                Err(e) => {
                    warn!("Failed to fetch sheet {}: {}", sheet_id, e);
                    SheetFetch::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.insert(sheet_id.clone(), outcome);
        }

        Ok(results)
    }
}
