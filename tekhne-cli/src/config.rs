use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{CliError, IoContext};

/// Tool configuration.
///
/// Loaded from the path given on the command line, else the
/// `TEKHNE_CONFIG` environment variable, else `tekhne.toml` in the working
/// directory, else defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Path of the SQLite database file
    pub db_path: PathBuf,

    /// Directory report documents are written into
    pub output_dir: PathBuf,

    /// Base directory for relative photo references
    pub photo_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("tekhne.db"),
            output_dir: PathBuf::from("."),
            photo_dir: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let contents = std::fs::read_to_string(path)
            .io_context(|| format!("Failed to read config file at {}", path.display()))?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match std::env::var("TEKHNE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => {
                if Path::new("tekhne.toml").exists() {
                    Self::from_file(Path::new("tekhne.toml"))
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
