//! CLI subcommands.

pub mod common;
pub mod config;
pub mod directory;
pub mod query;
pub mod serve;
