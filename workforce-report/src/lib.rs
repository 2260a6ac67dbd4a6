//! Multi-source workforce reports.
//!
//! A report is driven by an ordered list of [`Definition`]s, each naming a
//! data source (the basic member list or a sheet) and a field. The builder
//! fetches every referenced source, normalizes each into a table keyed by
//! entity identity, outer-joins the tables, and projects one row per entity.
//!
//! ## Pipeline
//!
//! 1. **Definitions**: parsed from a two-column table
//! 2. **Collect**: member source via the member pipeline, other names
//!    resolved against the sheet layout catalog
//! 3. **Normalize**: records keyed by the first usable candidate field
//! 4. **Combine**: union of all keys (outer join)
//! 5. **Project**: one value per definition, empty where unresolved
//! 6. **Validate**: advisory check that each definition resolves

pub mod builder;
pub mod config;
pub mod definition;
mod error;
pub mod join;
pub mod normalize;
pub mod table;

pub use builder::{CustomReport, ReportBuilder};
pub use config::ReportConfig;
pub use definition::{parse_definitions, read_definitions_csv, required_sources, Definition};
pub use error::{ReportError, ReportResult};
pub use join::{
    combine, project, validate, JoinedTable, ProjectedRow, SourceTables, ValidationIssue,
    ValidationReport,
};
pub use normalize::{normalize_members, normalize_sheet, EntityKey, KeyFields, Record, SourceTable};
pub use table::{custom_table, member_table, sheet_table, Table};
