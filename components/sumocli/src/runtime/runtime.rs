// Local crates
use crate::{
    client::client::SumoApiClient,
    cmdlet::delete_source::{DeleteOutcome, run_delete_source},
    helpers::load_config::Config,
};

// External crates
use anyhow::{Context, Result};
use tracing::instrument;

/// Set up the Sumo API connection from the resolved configuration, then run the cmdlet
#[instrument(
    name = "sumocli_runtime::run",
    target = "runtime::runtime",
    skip_all,
    fields(endpoint = %config.endpoint, org_id = %config.org_id),
    level = "debug"
)]
pub async fn run_cmdlet(config: &Config) -> Result<DeleteOutcome> {
    let source = SumoApiClient::new(
        &config.credentials.access_id,
        &config.credentials.access_key,
        &config.endpoint,
    )
    .context("Failed to create Sumo Logic API client")?;

    run_delete_source(&source, config).await
}
