//! Query command - run one query and print the diff as JSON.

use chrono::Utc;
use clap::Args;
use geowindow::app::QueryBackend;
use geowindow::config::ConfigFile;
use geowindow::store::StorePool;

use super::common::{resolve_query, SourceArgs, WindowArgs};
use crate::error::CliError;

/// Arguments for the query command.
#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub window: WindowArgs,
}

/// Run the query command.
///
/// Prints what a newly connected client would receive: every result in
/// the window as `added`.
pub fn run(args: QueryArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let query = resolve_query(&args.source, None, &config)?;

    let pool = StorePool::new();
    let backend = QueryBackend::open(&query, &pool)?;
    let diff = backend.query_once(&args.window.to_update(), Utc::now())?;

    let json =
        serde_json::to_string_pretty(&diff).map_err(|e| CliError::Output(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
