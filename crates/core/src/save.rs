//! Save-file persistence for the single save slot.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Schema tag written into freshly created saves.
pub const CURRENT_VERSION: u32 = 1;

/// Failures raised by [`SaveStore`]. None of them are fatal to a running session.
#[derive(Debug, Error)]
pub enum SaveError {
    /// No save file exists at the configured path.
    #[error("no save file at {}", path.display())]
    Missing {
        /// Configured save path.
        path: PathBuf,
    },
    /// The save file exists but could not be parsed.
    #[error("save file {} is corrupt: {source}", path.display())]
    Corrupt {
        /// Configured save path.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },
    /// Any other filesystem failure.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The document could not be serialised.
    #[error("failed to serialize save: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Persisted player progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    /// Monotonic schema tag.
    pub version: u32,
    /// Creation time in epoch seconds.
    pub created_at: f64,
    /// Game-defined progress values, kept verbatim.
    #[serde(default)]
    pub progress: Map<String, Value>,
    /// Unknown top-level keys, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SaveDocument {
    /// Fresh document stamped with the current time.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            version: CURRENT_VERSION,
            created_at: now.timestamp_micros() as f64 / 1_000_000.0,
            progress: Map::new(),
            extra: Map::new(),
        }
    }

    /// Creation time as a UTC timestamp, if representable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let secs = self.created_at.floor();
        let nanos = ((self.created_at - secs) * 1e9) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    }

    /// Pretty JSON used for both export and inspection.
    pub fn to_pretty_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self).map_err(SaveError::Serialize)
    }

    fn upgrade(&mut self) {
        if self.version < CURRENT_VERSION {
            debug!(from = self.version, to = CURRENT_VERSION, "Raising save version");
            self.version = CURRENT_VERSION;
        }
    }
}

impl Default for SaveDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of the save slot on disk.
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    /// Create a store for the save file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the save file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a save file is present.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the save file.
    pub fn load(&self) -> Result<SaveDocument, SaveError> {
        let content = fs::read_to_string(&self.path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SaveError::Missing {
                path: self.path.clone(),
            },
            _ => SaveError::Io {
                action: "read",
                path: self.path.clone(),
                source: err,
            },
        })?;
        let mut document: SaveDocument =
            serde_json::from_str(&content).map_err(|source| SaveError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        document.upgrade();
        info!(path = %self.path.display(), version = document.version, "Save loaded");
        Ok(document)
    }

    /// Build a fresh document and persist it before handing it out.
    pub fn create_new(&self) -> Result<SaveDocument, SaveError> {
        let document = SaveDocument::new();
        self.export(&document)?;
        info!(path = %self.path.display(), "New save created");
        Ok(document)
    }

    /// Write `document` via a sibling temp file that replaces the target on success.
    pub fn export(&self, document: &SaveDocument) -> Result<(), SaveError> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|source| SaveError::Io {
            action: "create",
            path: parent.to_path_buf(),
            source,
        })?;

        let mut serialised = serde_json::to_vec_pretty(document).map_err(SaveError::Serialize)?;
        serialised.push(b'\n');

        let io_err = |action: &'static str, source: io::Error| SaveError::Io {
            action,
            path: self.path.clone(),
            source,
        };
        // Dropping the handle on any early return removes the temp file.
        let mut temp = NamedTempFile::new_in(parent).map_err(|err| io_err("stage", err))?;
        temp.write_all(&serialised)
            .map_err(|err| io_err("write", err))?;
        temp.as_file().sync_all().map_err(|err| io_err("sync", err))?;
        temp.persist(&self.path)
            .map_err(|err| io_err("replace", err.error))?;

        debug!(path = %self.path.display(), bytes = serialised.len(), "Save exported");
        Ok(())
    }

    /// Move an unreadable save aside so a fresh one can take its place.
    pub fn quarantine(&self) -> Result<PathBuf, SaveError> {
        let stem = self
            .path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("save");
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let mut target = self
            .path
            .with_file_name(format!("{stem}.corrupt-{stamp}.json"));
        let mut attempt = 1u32;
        // rename replaces an existing target, so never reuse a name.
        while target.exists() {
            target = self
                .path
                .with_file_name(format!("{stem}.corrupt-{stamp}-{attempt}.json"));
            attempt += 1;
        }
        fs::rename(&self.path, &target).map_err(|source| SaveError::Io {
            action: "quarantine",
            path: self.path.clone(),
            source,
        })?;
        warn!(from = %self.path.display(), to = %target.display(), "Quarantined corrupt save");
        Ok(target)
    }
}
