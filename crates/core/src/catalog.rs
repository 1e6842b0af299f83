//! Static game-definition data loaded once at startup.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

/// Keys every data file must define. Empty for now; validation still runs.
pub const REQUIRED_KEYS: &[&str] = &[];

/// Failures while loading the data catalog. All of them are fatal.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The data file does not exist.
    #[error("{} not found. Please ensure the game data file exists.", path.display())]
    NotFound {
        /// Path that was probed.
        path: PathBuf,
    },
    /// The data file exists but is not a JSON object.
    #[error("{} is not valid JSON ({reason}).", path.display())]
    Malformed {
        /// Path of the offending file.
        path: PathBuf,
        /// Parser or shape error.
        reason: String,
    },
    /// A required key is absent.
    #[error("{} missing required key '{key}'.", path.display())]
    Incomplete {
        /// Path of the offending file.
        path: PathBuf,
        /// First missing key.
        key: String,
    },
}

/// Read-only mapping of game data keyed by string.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Map<String, Value>,
}

impl Catalog {
    /// Load and validate the catalog against [`REQUIRED_KEYS`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::load_with_required(path, REQUIRED_KEYS)
    }

    /// Load and validate the catalog against an explicit key list.
    pub fn load_with_required(
        path: impl AsRef<Path>,
        required: &[&str],
    ) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => CatalogError::NotFound {
                path: path.to_path_buf(),
            },
            _ => CatalogError::Malformed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|err| CatalogError::Malformed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        let Value::Object(entries) = value else {
            return Err(CatalogError::Malformed {
                path: path.to_path_buf(),
                reason: "top level must be an object".to_string(),
            });
        };

        let catalog = Self { entries };
        catalog.validate(path, required)?;
        info!(path = %path.display(), keys = catalog.len(), "Data catalog loaded");
        Ok(catalog)
    }

    fn validate(&self, path: &Path, required: &[&str]) -> Result<(), CatalogError> {
        match required.iter().find(|key| !self.entries.contains_key(**key)) {
            Some(key) => Err(CatalogError::Incomplete {
                path: path.to_path_buf(),
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog defines no keys at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn loads_object_and_exposes_keys() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"title": "Tycoon", "elements": {"H": 1}}"#)?;

        let catalog = Catalog::load(&path)?;
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("title"), Some(&json!("Tycoon")));
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["elements", "title"]);
        assert!(catalog.get("missing").is_none());
        Ok(())
    }

    #[test]
    fn missing_file_is_not_found() -> Result<()> {
        let dir = tempdir()?;
        let err = Catalog::load(dir.path().join("data.json")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
        assert!(err.to_string().contains("not found"));
        Ok(())
    }

    #[test]
    fn invalid_json_is_malformed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json")?;
        assert!(matches!(
            Catalog::load(&path),
            Err(CatalogError::Malformed { .. })
        ));

        fs::write(&path, "[1, 2, 3]")?;
        assert!(matches!(
            Catalog::load(&path),
            Err(CatalogError::Malformed { .. })
        ));
        Ok(())
    }

    #[test]
    fn required_keys_are_enforced() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"elements": []}"#)?;

        Catalog::load_with_required(&path, &["elements"])?;
        let err = Catalog::load_with_required(&path, &["elements", "markets"]).unwrap_err();
        match err {
            CatalogError::Incomplete { key, .. } => assert_eq!(key, "markets"),
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }
}
