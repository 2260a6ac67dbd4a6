//! Resolves definitions to sources, fetches them, and assembles the report.

use crate::config::ReportConfig;
use crate::definition::{headers, required_sources, Definition};
use crate::error::{ReportError, ReportResult};
use crate::join::{
    combine, project, validate, JoinedTable, ProjectedRow, SourceTables, ValidationReport,
};
use crate::normalize::{normalize_member_info, normalize_sheet};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use workforce_client::source::{catalog_entries, find_layout_by_name, scalar_text};
use workforce_client::WorkforceApi;

/// Everything a custom report run produced.
#[derive(Debug, Clone)]
pub struct CustomReport {
    pub definitions: Vec<Definition>,
    /// Normalized table per data source, in order of first reference.
    pub collected: SourceTables,
    pub joined: JoinedTable,
    pub headers: Vec<String>,
    pub rows: Vec<ProjectedRow>,
    pub validation: ValidationReport,
}

/// Builds custom reports against a [`WorkforceApi`].
pub struct ReportBuilder {
    api: Arc<dyn WorkforceApi>,
    config: ReportConfig,
}

impl ReportBuilder {
    pub fn new(api: Arc<dyn WorkforceApi>, config: ReportConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Fetches and normalizes every source the definitions reference.
    ///
    /// The member source goes through the member pipeline; any other name
    /// must match a sheet in the layout catalog exactly, or the whole
    /// collection fails with [`ReportError::SourceNotFound`].
    pub async fn collect(&self, definitions: &[Definition]) -> ReportResult<SourceTables> {
        let mut collected = SourceTables::new();
        let mut catalog: Option<Value> = None;

        for name in required_sources(definitions) {
            let table = if name == self.config.member_source_name {
                debug!("Fetching member source \"{}\"", name);
                let info = self
                    .api
                    .member_info()
                    .await
                    .map_err(ReportError::fetch("member info"))?;
                normalize_member_info(&info)
            } else {
                if catalog.is_none() {
                    let layouts = self
                        .api
                        .sheet_layouts()
                        .await
                        .map_err(ReportError::fetch("sheet layouts"))?;
                    catalog = Some(layouts);
                }
                let sheet_id = resolve_sheet(catalog.as_ref(), &name)?;

                debug!("Fetching sheet \"{}\" (id {})", name, sheet_id);
                let data = self
                    .api
                    .sheet(&sheet_id)
                    .await
                    .map_err(ReportError::fetch(format!("sheet \"{name}\"")))?;
                normalize_sheet(&data)
            };

            info!("Collected {} records from \"{}\"", table.len(), name);
            collected.insert(name, table);
        }

        Ok(collected)
    }

    /// Collects, validates, joins, and projects.
    ///
    /// Validation problems are logged and returned in the report; they do
    /// not stop the build.
    pub async fn build(&self, definitions: Vec<Definition>) -> ReportResult<CustomReport> {
        let collected = self.collect(&definitions).await?;

        let validation = validate(&definitions, &collected);
        for issue in &validation.issues {
            warn!("{}", issue);
        }

        let joined = combine(&collected);
        let rows = project(&joined, &definitions);
        info!(
            "Built report: {} rows x {} columns",
            rows.len(),
            definitions.len()
        );

        Ok(CustomReport {
            headers: headers(&definitions),
            definitions,
            collected,
            joined,
            rows,
            validation,
        })
    }
}

/// Sheet id for a sheet name, by exact match against the catalog.
fn resolve_sheet(catalog: Option<&Value>, name: &str) -> ReportResult<String> {
    let Some(catalog) = catalog.filter(|c| catalog_entries(c).is_some()) else {
        return Err(ReportError::InvalidCatalog(
            "response has no sheet_layouts array".to_string(),
        ));
    };

    let layout = find_layout_by_name(catalog, name).ok_or_else(|| ReportError::SourceNotFound {
        name: name.to_string(),
    })?;

    layout
        .get("id")
        .and_then(scalar_text)
        .ok_or_else(|| ReportError::InvalidCatalog(format!("sheet \"{name}\" has no id")))
}
