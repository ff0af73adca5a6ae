use crate::{
    helpers::load_config::{CliOverrides, Config},
    runtime,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// delete_source is a Sumo Logic cli cmdlet deleting a specific source
#[derive(Parser, Debug)]
#[command(
    name = "sumocli_delete_source",
    about = "Sumo Logic cli cmdlet deleting a specific source",
    long_about = "Backs up a source of a Sumo Logic collector to a local JSON file, \
                  then deletes it.",
    version,
    term_width = 100,
    after_help = "\
    EXAMPLES:
        sumocli_delete_source -a <key>:<secret> -k us2_0000000000ABCDEF -p 101 -m 202
        SUMO_UID=.. SUMO_KEY=.. SUMO_LOC=us2 SUMO_ORG=.. PARENTID=101 MYSELFID=202 \\
            sumocli_delete_source"
)]
pub struct Cli {
    /// set api (format: <key>:<secret>)
    #[arg(short = 'a', value_name = "secret")]
    pub secret: Option<String>,

    /// set key (format: <site>_<orgid>)
    #[arg(short = 'k', value_name = "client")]
    pub client: Option<String>,

    /// set endpoint (format: <endpoint>)
    #[arg(short = 'e', value_name = "endpoint")]
    pub endpoint: Option<String>,

    /// provide specific id to lookup
    #[arg(short = 'm', value_name = "myselfid")]
    pub myself_id: Option<String>,

    /// provide parent id to locate with
    #[arg(short = 'p', value_name = "parentid")]
    pub parent_id: Option<String>,

    /// Increase verbosity
    #[arg(short = 'v', value_name = "verbose", default_value_t = 0)]
    pub verbose: u8,

    /// Optional TOML file with the same keys as the environment, lower-cased
    #[arg(long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Directory the backup file is written to
    #[arg(long, value_name = "dir")]
    pub backup_dir: Option<PathBuf>,

    /// Also write JSON logs to a daily rolling file in this directory
    #[arg(long, value_name = "dir")]
    pub log_dir: Option<PathBuf>,

    /// Print the resolved configuration and exit without calling the API
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            secret: self.secret.clone(),
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            myself_id: self.myself_id.clone(),
            parent_id: self.parent_id.clone(),
            backup_dir: self.backup_dir.clone(),
        }
    }
}

/// Entry function for CLI
pub async fn run(cli: Cli) -> Result<()> {
    let cfg = Config::load(cli.config.as_deref(), cli.overrides())
        .context("Failed to load sumocli configuration")?;

    if cli.show_config {
        show_config(&cfg);
        return Ok(());
    }

    let outcome = runtime::runtime::run_cmdlet(&cfg).await?;

    if cli.verbose > 0 && outcome.backed_up() {
        println!("{}", outcome.backup.to_pretty_json()?);
    }
    println!("backup: {}", outcome.backup_path.display());
    println!(
        "deleted: source {} from collector {} ({})",
        cfg.myself_id, cfg.parent_id, outcome.status
    );

    Ok(())
}

//
// ------------------------ Command Implementations ------------------------------
//

/// Show resolved configuration, the access key stays redacted
fn show_config(cfg: &Config) {
    println!("Configuration resolved:\n{:#?}", cfg);
    println!("Backup target: {}", cfg.backup_target().display());
}
