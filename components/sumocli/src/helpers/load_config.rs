// External crates
use config::{Environment, File, FileFormat, Map};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Directory backups land in unless configured otherwise
pub const DEFAULT_BACKUP_DIR: &str = "/var/tmp";

/// Configuration error handling
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required variables with no value in any configuration source
    #[error("Environment Variable Not Set :: {}", .0.join(", "))]
    MissingVariables(Vec<&'static str>),

    /// `-a` was not `<key>:<secret>`
    #[error("invalid -a value, expected <key>:<secret>")]
    MalformedSecret,

    /// `-k` was not `<site>_<orgid>`
    #[error("invalid -k value `{0}`, expected <site>_<orgid>")]
    MalformedClient(String),

    /// A configuration source could not be read or deserialized
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),
}

/// Values given on the command line. They win over every other configuration source.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// `-a <key>:<secret>`
    pub secret: Option<String>,
    /// `-k <site>_<orgid>`
    pub client: Option<String>,
    /// `-e <endpoint>`
    pub endpoint: Option<String>,
    /// `-m <myselfid>`
    pub myself_id: Option<String>,
    /// `-p <parentid>`
    pub parent_id: Option<String>,
    /// `--backup-dir <dir>`
    pub backup_dir: Option<PathBuf>,
}

/// Raw settings as they come out of the layered sources. Keys are the lower-cased
/// environment variable names, which is also what a TOML config file uses.
#[derive(Debug, Deserialize, Default)]
struct Settings {
    sumo_uid: Option<String>,
    sumo_key: Option<String>,
    sumo_loc: Option<String>,
    sumo_org: Option<String>,
    sumo_tag: Option<String>,
    sumo_end: Option<String>,
    myselfid: Option<String>,
    parentid: Option<String>,
    backup_dir: Option<PathBuf>,
}

/// Sumo Logic API credentials
#[derive(Clone, PartialEq)]
pub struct Credentials {
    /// Access id (`SUMO_UID`)
    pub access_id: String,
    /// Access key (`SUMO_KEY`), never logged
    pub access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_id", &self.access_id)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Resolved cmdlet configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,
    /// Deployment the organization lives in (`SUMO_LOC`)
    pub deployment: String,
    /// Organization id (`SUMO_ORG`)
    pub org_id: String,
    /// `<site>_<orgid>` tag (`SUMO_TAG`), informational only
    pub tag: Option<String>,
    /// Region label used for the API host and the backup file name (`SUMO_END`)
    pub endpoint: String,
    /// Source to back up and delete (`MYSELFID`)
    pub myself_id: String,
    /// Collector owning the source (`PARENTID`)
    pub parent_id: String,
    /// Directory the backup file is written to
    pub backup_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment, an optional TOML file and
    /// command line overrides
    pub fn load(file: Option<&Path>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        Self::load_from(file, None, overrides)
    }

    /// Same as [`Config::load`], but reads environment variables from `env` instead of
    /// the process environment when given
    #[instrument(
        name = "config_loader",
        target = "helpers::load_config",
        level = "trace",
        skip_all
    )]
    pub fn load_from(
        file: Option<&Path>,
        env: Option<Map<String, String>>,
        overrides: CliOverrides,
    ) -> Result<Self, ConfigError> {
        let (access_id, access_key) = match overrides.secret.as_deref() {
            Some(secret) => {
                let (id, key) = split_secret(secret)?;
                (Some(id), Some(key))
            }
            None => (None, None),
        };
        let (deployment, org_id) = match overrides.client.as_deref() {
            Some(client) => {
                let (site, org) = split_client(client)?;
                (Some(site), Some(org))
            }
            None => (None, None),
        };

        let mut builder = config::Config::builder();

        if let Some(path) = file {
            tracing::trace!(
                configuration_file_path = %path.display(),
                "Loading sumocli configuration file"
            );
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let settings: Settings = builder
            .add_source(Environment::default().try_parsing(false).source(env))
            .set_override_option("sumo_uid", access_id)?
            .set_override_option("sumo_key", access_key)?
            .set_override_option("sumo_loc", deployment)?
            .set_override_option("sumo_org", org_id)?
            .set_override_option("sumo_tag", overrides.client)?
            .set_override_option("sumo_end", overrides.endpoint)?
            .set_override_option("myselfid", overrides.myself_id)?
            .set_override_option("parentid", overrides.parent_id)?
            .set_override_option(
                "backup_dir",
                overrides
                    .backup_dir
                    .map(|dir| dir.to_string_lossy().into_owned()),
            )?
            .build()
            .inspect_err(|e| tracing::error!(error = %e, "Failed to build configuration"))?
            .try_deserialize()
            .inspect_err(|e| tracing::error!(error = %e, "Failed to deserialize configuration"))?;

        let config = Self::resolve(settings)?;
        tracing::trace!(configuration = ?config, "sumocli configuration loaded successfully");
        Ok(config)
    }

    /// Validate raw settings. Every missing required variable is reported, not just the first.
    fn resolve(settings: Settings) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut require = |value: Option<String>, name: &'static str| {
            let value = value.filter(|v| !v.is_empty());
            if value.is_none() {
                tracing::error!("Environment Variable Not Set :: {name}");
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let access_id = require(settings.sumo_uid, "SUMO_UID");
        let access_key = require(settings.sumo_key, "SUMO_KEY");
        let deployment = require(settings.sumo_loc, "SUMO_LOC");
        let org_id = require(settings.sumo_org, "SUMO_ORG");
        let myself_id = require(settings.myselfid, "MYSELFID");
        let parent_id = require(settings.parentid, "PARENTID");

        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let endpoint = settings
            .sumo_end
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| deployment.clone());

        Ok(Self {
            credentials: Credentials {
                access_id,
                access_key,
            },
            deployment,
            org_id,
            tag: settings.sumo_tag.filter(|t| !t.is_empty()),
            endpoint,
            myself_id,
            parent_id,
            backup_dir: settings
                .backup_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR)),
        })
    }

    /// `<backup_dir>/<endpoint>_<org>.<myselfid>.json`
    pub fn backup_target(&self) -> PathBuf {
        self.backup_dir.join(format!(
            "{}_{}.{}.json",
            self.endpoint, self.org_id, self.myself_id
        ))
    }
}

/// Split `<key>:<secret>`, the secret may itself contain `:`
fn split_secret(value: &str) -> Result<(String, String), ConfigError> {
    match value.split_once(':') {
        Some((id, key)) if !id.is_empty() && !key.is_empty() => {
            Ok((id.to_string(), key.to_string()))
        }
        _ => Err(ConfigError::MalformedSecret),
    }
}

/// Split `<site>_<orgid>`
fn split_client(value: &str) -> Result<(String, String), ConfigError> {
    match value.split_once('_') {
        Some((site, org)) if !site.is_empty() && !org.is_empty() && !org.contains('_') => {
            Ok((site.to_string(), org.to_string()))
        }
        _ => Err(ConfigError::MalformedClient(value.to_string())),
    }
}
