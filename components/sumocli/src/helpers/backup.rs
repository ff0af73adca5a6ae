// External crates
use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Backup writer error handling
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// The record could not be rendered as JSON
    #[error("failed to serialize backup record: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The backup file could not be written
    #[error("failed to write backup file {path}: {source}")]
    Write {
        /// Backup target
        path: PathBuf,
        /// I/O error from the write
        #[source]
        source: std::io::Error,
    },
}

/// Local copy of a source taken right before it is deleted.
///
/// ```json
/// {
///     "orgid": "<org>",
///     "source": { "<id>": { "parent": "<org>", "id": .., "name": .., "dump": {..} } }
/// }
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BackupRecord {
    /// Organization the sources belong to
    pub orgid: String,
    /// Backed-up sources keyed by id
    pub source: BTreeMap<String, SourceBackup>,
}

/// One backed-up source entry
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SourceBackup {
    /// Organization the source was taken from
    pub parent: String,
    /// Source id, JSON type preserved
    pub id: Value,
    /// Source name, JSON type preserved
    pub name: Value,
    /// Full source object as returned by the API
    pub dump: Value,
}

/// Render a JSON id the way it appears as an object key, `123` and `"123"` both become `123`
pub fn id_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl BackupRecord {
    /// Empty record for an organization
    pub fn new(orgid: &str) -> Self {
        Self {
            orgid: orgid.to_string(),
            source: BTreeMap::new(),
        }
    }

    /// Add a source to the record, a later source with the same id replaces an earlier one
    pub fn insert(&mut self, source: &Value) {
        let id = source.get("id").cloned().unwrap_or(Value::Null);
        let name = source.get("name").cloned().unwrap_or(Value::Null);

        let entry = SourceBackup {
            parent: self.orgid.clone(),
            id: id.clone(),
            name,
            dump: source.clone(),
        };
        self.source.insert(id_key(&id), entry);
    }

    /// Whether no source has been added
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Pretty-printed JSON with a 4 space indent
    pub fn to_pretty_json(&self) -> Result<String, BackupError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)
            .map_err(BackupError::Serialize)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the record to `path`, replacing whatever is already there
    #[instrument(
        name = "sumocli_backup::write",
        target = "helpers::backup",
        skip_all,
        fields(path = %path.as_ref().display(), entries = self.source.len()),
        level = "debug"
    )]
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), BackupError> {
        let path_ref = path.as_ref();
        let json = self.to_pretty_json()?;

        if let Err(e) = fs::write(path_ref, json) {
            tracing::error!(error = %e, "Failed to write backup file");
            return Err(BackupError::Write {
                path: path_ref.to_path_buf(),
                source: e,
            });
        }

        tracing::info!(backup_file = %path_ref.display(), "Backup record written");
        Ok(())
    }
}
