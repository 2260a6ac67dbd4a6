//! Report configuration.

use serde::{Deserialize, Serialize};

/// Settings for custom report building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Data-source name that selects the basic member list rather than a sheet.
    pub member_source_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            member_source_name: "基本情報".to_string(),
        }
    }
}
