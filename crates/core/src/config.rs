//! Application configuration loaded from defaults, a TOML file and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under the platform config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "simshell";
/// Prefix for environment overrides, e.g. `SIMSHELL_SAVE_PATH`.
pub const ENV_PREFIX: &str = "SIMSHELL";

const DEFAULT_CONFIG: &str = r#"# SimShell configuration.
# Relative paths are resolved against the working directory.

# Static game-definition data, loaded once at startup.
data_path = "data.json"

# The single save slot.
save_path = "save.json"

# Directory receiving simshell.log.
log_dir = "logs"

# Export the save when quitting with q/Esc/Ctrl-C.
autosave_on_quit = true
"#;

/// Runtime settings for the shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Location of the static data catalog.
    pub data_path: PathBuf,
    /// Location of the save document.
    pub save_path: PathBuf,
    /// Directory for the log file.
    pub log_dir: PathBuf,
    /// Whether a quit signal exports the live save before exiting.
    pub autosave_on_quit: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data.json"),
            save_path: PathBuf::from("save.json"),
            log_dir: PathBuf::from("logs"),
            autosave_on_quit: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration layering defaults, `path` (if present) and `SIMSHELL_*` variables.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("data_path", defaults.data_path.to_string_lossy().to_string())?
            .set_default("save_path", defaults.save_path.to_string_lossy().to_string())?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().to_string())?
            .set_default("autosave_on_quit", defaults.autosave_on_quit)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

/// Default path of the configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}
