//! Serve command - run a query service with one simulated client.

use clap::Args;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use geowindow::app::{AdvertiseAppConfig, AppConfig, GeowindowApp};

use super::common::{resolve_query, SourceArgs, WindowArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Client id of the simulated client.
const CLIENT_ID: u64 = 1;

/// Arguments for the serve command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Poll period in milliseconds (default: query.poll_interval_ms)
    #[arg(long)]
    pub poll_ms: Option<u64>,

    #[command(flatten)]
    pub window: WindowArgs,
}

/// Run the serve command.
///
/// When `[advertise]` has an address and `[directory]` an interval, an
/// in-process directory is started too and the service advertises itself
/// to it.
pub fn run(args: ServeArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("serve");
    let config = runner.config();

    let query = resolve_query(&args.source, args.poll_ms, config)?;
    let mut app_config = AppConfig::new().with_query(query);

    if let Some(advertise) = AdvertiseAppConfig::from_config_file(config)? {
        match AppConfig::directory_from(config) {
            Ok(directory) => {
                app_config = app_config.with_directory(directory).with_advertise(advertise);
            }
            Err(e) => warn!(error = %e, "Self-advertisement disabled"),
        }
    }

    let update = args.window.to_update();
    let shutdown = runner.shutdown();

    runner.runtime().block_on(async move {
        let app = GeowindowApp::start(app_config).await?;
        let Some(handle) = app.query().cloned() else {
            app.shutdown().await;
            return Err(CliError::Runtime("query service did not start".to_string()));
        };

        let mut updates = handle.subscribe();
        let connected = async {
            handle.connect(CLIENT_ID).await?;
            handle.update(CLIENT_ID, update).await
        };
        if let Err(e) = connected.await {
            app.shutdown().await;
            return Err(CliError::Runtime(e.to_string()));
        }

        println!("Serving. Press Ctrl-C to stop.");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                update = updates.recv() => match update {
                    Ok(update) => {
                        info!(
                            client_id = update.client_id,
                            added = update.diff.added.len(),
                            removed = update.diff.removed.len(),
                            changed = update.diff.changed.len(),
                            "Results updated"
                        );
                        for handle in &update.diff.added {
                            println!("+ {} {:?}", handle.id(), handle.fields());
                        }
                        for handle in &update.diff.changed {
                            println!("~ {} {:?}", handle.id(), handle.fields());
                        }
                        for handle in &update.diff.removed {
                            println!("- {}", handle.id());
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Dropped updates; output fell behind");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        app.shutdown().await;
        Ok(())
    })
}
