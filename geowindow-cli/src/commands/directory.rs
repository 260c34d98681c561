//! Directory command - run an advertisement directory.

use clap::Args;
use geowindow::app::{AppConfig, GeowindowApp};
use geowindow::directory::{Contact, ConsumerView, DirectoryChange};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the directory command.
#[derive(Debug, Args)]
pub struct DirectoryArgs {
    /// Apply period in milliseconds (default: directory.advertise_interval_ms)
    #[arg(long, allow_hyphen_values = true)]
    pub interval_ms: Option<i64>,

    /// Advertise SERVICE@ADDRESS once at start-up; may be repeated
    #[arg(long = "advertise", value_name = "SERVICE@ADDRESS")]
    pub advertise: Vec<String>,

    /// TTL for --advertise entries in milliseconds (default: advertise.ttl_ms)
    #[arg(long)]
    pub ttl_ms: Option<i64>,

    /// Description for --advertise entries
    #[arg(long, default_value = "")]
    pub description: String,
}

/// Parses `service@address`.
pub fn parse_contact(text: &str) -> Result<Contact, CliError> {
    match text.split_once('@') {
        Some((service, address)) if !service.is_empty() && !address.is_empty() => {
            Ok(Contact::new(address, service))
        }
        _ => Err(CliError::Config(format!(
            "'{}' is not SERVICE@ADDRESS",
            text
        ))),
    }
}

/// Run the directory command.
pub fn run(args: DirectoryArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("directory");

    let mut file = runner.config().clone();
    if let Some(ms) = args.interval_ms {
        file.directory.advertise_interval_ms = Some(ms);
    }
    let directory_config = AppConfig::directory_from(&file)?;
    let apply_ms = directory_config.apply_interval.as_millis();
    let ttl_ms = args.ttl_ms.unwrap_or(file.advertise.ttl_ms);
    let seeds = args
        .advertise
        .iter()
        .map(|s| parse_contact(s))
        .collect::<Result<Vec<_>, _>>()?;

    let shutdown = runner.shutdown();
    runner.runtime().block_on(async move {
        let app = GeowindowApp::start(AppConfig::new().with_directory(directory_config)).await?;
        let (Some(field), Some(advertiser)) = (app.directory().cloned(), app.advertiser().cloned())
        else {
            app.shutdown().await;
            return Err(CliError::Runtime("directory service did not start".to_string()));
        };

        for contact in seeds {
            advertiser
                .advertise(contact, args.description.clone(), Some(ttl_ms))
                .await
                .map_err(|e| CliError::Runtime(e.to_string()))?;
        }

        println!("Directory running, applying every {} ms. Press Ctrl-C to stop.", apply_ms);

        let mut subscriber = field.subscribe();
        let (mut view, initial) = ConsumerView::initial(&field.get());
        print_change(&initial);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                snapshot = subscriber.changed() => match snapshot {
                    Some(snapshot) => print_change(&view.update(&snapshot)),
                    None => break,
                },
            }
        }

        app.shutdown().await;
        Ok(())
    })
}

fn print_change(change: &DirectoryChange) {
    for (contact, description) in &change.added {
        println!("+ {}  {}", contact, description);
    }
    for contact in change.removed.keys() {
        println!("- {}", contact);
    }
}
