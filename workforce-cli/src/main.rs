//! Workforce data export
//!
//! Pulls member and sheet data from the workforce API and writes it as CSV,
//! or builds a custom report that joins fields from several sources.
//!
//! Usage:
//!   workforce members
//!   workforce sheet --name Skills
//!   workforce report --definitions report.csv
//!
//! Credentials are read from WORKFORCE_CONSUMER_KEY / WORKFORCE_CONSUMER_SECRET.

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use workforce_cli::{check_validation, write_descriptors, write_table, CliConfig};
use workforce_client::credential::{CONSUMER_KEY_VAR, CONSUMER_SECRET_VAR};
use workforce_client::source::{find_layout_by_name, scalar_text, sheet_descriptors};
use workforce_client::{
    has_credential, CredentialCache, EnvCredentialStore, RemoteSource, ResponseCache, WorkforceApi,
};
use workforce_report::{custom_table, member_table, read_definitions_csv, sheet_table, ReportBuilder};

#[derive(Parser, Debug)]
#[command(name = "workforce")]
#[command(about = "Export workforce member, sheet and custom report data as CSV")]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the member list laid out by the member layout
    Members,
    /// List available sheets (name, id)
    Layouts,
    /// Export a single sheet
    Sheet(SheetArgs),
    /// Fetch several sheets as JSON; failures are reported per id
    Sheets {
        /// Sheet ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Build a custom report from a two-column definition CSV
    Report {
        /// Definition table: data source, field name
        #[arg(short, long)]
        definitions: PathBuf,

        /// Fail instead of warning when a definition does not resolve
        #[arg(long)]
        strict: bool,
    },
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
struct SheetArgs {
    /// Sheet id
    #[arg(long)]
    id: Option<String>,

    /// Sheet name, matched exactly
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = CliConfig::load_or_default(args.config.as_deref())?;

    let store = Arc::new(EnvCredentialStore::new());
    if !has_credential(store.as_ref()) {
        bail!(
            "No credential configured: set {} and {}",
            CONSUMER_KEY_VAR,
            CONSUMER_SECRET_VAR
        );
    }

    let credentials = Arc::new(CredentialCache::from_config(&config.client, store)?);
    let source = Arc::new(RemoteSource::new(
        config.client.clone(),
        credentials,
        Arc::new(ResponseCache::new()),
    )?);

    let stdout = io::stdout().lock();

    match args.command {
        Command::Members => {
            let info = source
                .member_info()
                .await
                .context("Failed to fetch member info")?;
            write_table(stdout, &member_table(&info))?;
        }
        Command::Layouts => {
            let catalog = source
                .sheet_layouts()
                .await
                .context("Failed to fetch sheet layouts")?;
            write_descriptors(stdout, &sheet_descriptors(&catalog))?;
        }
        Command::Sheet(sheet) => {
            let sheet_id = match (sheet.id, sheet.name) {
                (Some(id), _) => id,
                (None, Some(name)) => resolve_sheet_id(source.as_ref(), &name).await?,
                (None, None) => bail!("Pass --id or --name"),
            };
            let info = source
                .sheet_info(&sheet_id)
                .await
                .with_context(|| format!("Failed to fetch sheet {sheet_id}"))?;
            write_table(stdout, &sheet_table(&info))?;
        }
        Command::Sheets { ids } => {
            let results = source
                .sheet_infos(&ids)
                .await
                .context("Failed to fetch sheets")?;
            let failed = results.values().filter(|r| !r.is_loaded()).count();
            if failed > 0 {
                warn!("{} of {} sheets failed", failed, results.len());
            }
            serde_json::to_writer_pretty(stdout, &results)?;
            println!();
        }
        Command::Report {
            definitions,
            strict,
        } => {
            let file = File::open(&definitions).with_context(|| {
                format!("Failed to open definition file {}", definitions.display())
            })?;
            let definitions =
                read_definitions_csv(file).context("Failed to parse definition table")?;

            let builder = ReportBuilder::new(source, config.report);
            let report = builder
                .build(definitions)
                .await
                .context("Failed to create custom report")?;

            check_validation(&report.validation, strict)?;

            info!(
                "Report ready: {} rows from {} sources",
                report.rows.len(),
                report.collected.len()
            );
            write_table(stdout, &custom_table(&report))?;
        }
    }

    Ok(())
}

/// Logs go to stderr so CSV on stdout stays clean.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

async fn resolve_sheet_id(source: &RemoteSource, name: &str) -> Result<String> {
    let catalog = source
        .sheet_layouts()
        .await
        .context("Failed to fetch sheet layouts")?;
    find_layout_by_name(&catalog, name)
        .and_then(|layout| layout.get("id"))
        .and_then(scalar_text)
        .with_context(|| format!("Sheet \"{name}\" not found"))
}
