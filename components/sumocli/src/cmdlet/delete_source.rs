//! delete_source - back up a source and remove it from its collector
//!
//! 1. List the sources of the parent collector.
//! 2. Copy every source whose id matches into a [`BackupRecord`].
//! 3. Write the record to the backup target, even when nothing matched.
//! 4. Delete the source, even when nothing matched. The API decides whether the id exists.

// Local crates
use crate::{
    client::client::SumoApiClient,
    helpers::{
        backup::{BackupRecord, id_key},
        load_config::Config,
    },
};

// External crates
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::path::PathBuf;
use tracing::instrument;

/// What a delete_source run did
#[derive(Debug)]
pub struct DeleteOutcome {
    /// Where the backup record was written
    pub backup_path: PathBuf,
    /// Record that was written
    pub backup: BackupRecord,
    /// Status of the delete call
    pub status: StatusCode,
}

impl DeleteOutcome {
    /// Whether the listing contained the deleted source
    pub fn backed_up(&self) -> bool {
        !self.backup.is_empty()
    }
}

/// Sources whose id matches `myself_id`, comparing ids as strings so `123` and `"123"` match
pub fn find_sources<'a>(sources: &'a [Value], myself_id: &str) -> Vec<&'a Value> {
    sources
        .iter()
        .filter(|source| {
            source
                .get("id")
                .map(|id| id_key(id) == myself_id)
                .unwrap_or(false)
        })
        .collect()
}

/// Back up then delete the configured source
#[instrument(
    name = "sumocli_cmdlet::delete_source",
    target = "cmdlet::delete_source",
    skip_all,
    fields(parent_id = %config.parent_id, source_id = %config.myself_id),
    level = "info"
)]
pub async fn run_delete_source(source: &SumoApiClient, config: &Config) -> Result<DeleteOutcome> {
    let mut backup = BackupRecord::new(&config.org_id);

    let src_items = source
        .get_sources(&config.parent_id)
        .await
        .with_context(|| format!("Failed to list sources of collector {}", config.parent_id))?;
    tracing::debug!(sources = src_items.len(), "Listed collector sources");

    for src_item in find_sources(&src_items, &config.myself_id) {
        backup.insert(src_item);
    }

    if backup.is_empty() {
        tracing::warn!("Source not found in collector listing, backup record will be empty");
    }

    let backup_path = config.backup_target();
    backup
        .write(&backup_path)
        .with_context(|| format!("Failed to back up source {}", config.myself_id))?;

    let response = source
        .delete_source(&config.parent_id, &config.myself_id)
        .await
        .with_context(|| {
            format!(
                "Failed to delete source {} from collector {}",
                config.myself_id, config.parent_id
            )
        })?;

    Ok(DeleteOutcome {
        backup_path,
        backup,
        status: response.status(),
    })
}
