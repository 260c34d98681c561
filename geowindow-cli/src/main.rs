//! Geowindow CLI - Command-line interface
//!
//! Runs a directory service, a query service, or a one-shot query, and
//! edits the configuration file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::directory::DirectoryArgs;
use commands::query::QueryArgs;
use commands::serve::ServeArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "geowindow", version, about = "Incremental spatiotemporal queries and service discovery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run an advertisement directory and print its changes
    Directory(DirectoryArgs),

    /// Run a query service with one simulated client
    Serve(ServeArgs),

    /// Run a single query and print the result as JSON
    Query(QueryArgs),

    /// View or edit configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Directory(args) => commands::directory::run(args),
        Commands::Serve(args) => commands::serve::run(args),
        Commands::Query(args) => commands::query::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
