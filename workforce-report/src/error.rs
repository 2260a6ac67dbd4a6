//! Error types for report building.

use crate::join::ValidationReport;
use thiserror::Error;
use workforce_client::ClientError;

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors that can occur while building a custom report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The definition table yielded nothing usable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A definition names a source that is neither the member source nor a known sheet.
    #[error("data source \"{name}\" not found")]
    SourceNotFound { name: String },

    /// The sheet layout catalog is missing or malformed.
    #[error("invalid sheet layout catalog: {0}")]
    InvalidCatalog(String),

    /// One or more definitions do not resolve against the fetched data.
    #[error("definition validation failed:\n{0}")]
    Validation(ValidationReport),

    /// A fetch stage failed.
    #[error("failed to fetch {stage}: {source}")]
    Fetch {
        stage: String,
        #[source]
        source: ClientError,
    },

    /// Definition table could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ReportError {
    pub(crate) fn fetch(stage: impl Into<String>) -> impl FnOnce(ClientError) -> Self {
        let stage = stage.into();
        move |source| ReportError::Fetch { stage, source }
    }
}
