//! Sumo Logic cli cmdlets.
//!
//! `delete_source` backs up a collector source to a local JSON file, then deletes it
//! through the Sumo Logic REST API.

/// Command line flags and entry point
pub mod cli;
/// Sumo Logic API client
pub mod client;
/// Cmdlet implementations
pub mod cmdlet;
/// Configuration loading and backup writing
pub mod helpers;
/// Logging setup
pub mod instrumentation;
/// Client setup and cmdlet dispatch
pub mod runtime;

pub use client::{client::SumoApiClient, errors::SumoApiError};
pub use cmdlet::delete_source::{DeleteOutcome, run_delete_source};
pub use helpers::{
    backup::BackupRecord,
    load_config::{CliOverrides, Config},
};
