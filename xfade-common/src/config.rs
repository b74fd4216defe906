//! Configuration file resolution and TOML-backed settings
//!
//! Config file resolution order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config file (`<config_dir>/xfade/config.toml`)
//! 4. System config file (`/etc/xfade/config.toml`, Linux only)
//!
//! When no file is found the caller runs on built-in defaults.

use crate::params::{value_as_double, CrossfadeSettings, SettingsSource, SECTION};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Settings parsed from a TOML document
///
/// Sections map to TOML tables:
///
/// ```toml
/// [crossfade]
/// automatic = true
/// length = 5.0
/// manual = true
/// manual_length = 0.2
/// ```
#[derive(Debug, Clone, Default)]
pub struct TomlSettings {
    table: toml::Table,
}

impl TomlSettings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let settings = content.parse::<Self>()?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Deserialize the `[crossfade]` table
    ///
    /// Missing keys take their defaults and out-of-range values are clamped.
    /// A value of the wrong type is an error, so a typo in the file is
    /// reported instead of silently ignored.
    pub fn crossfade_settings(&self) -> Result<CrossfadeSettings> {
        match self.table.get(SECTION) {
            Some(section) => {
                let settings: CrossfadeSettings = section.clone().try_into()?;
                Ok(settings.clamped())
            }
            None => Ok(CrossfadeSettings::default()),
        }
    }

    fn lookup(&self, section: &str, key: &str) -> Option<&toml::Value> {
        self.table.get(section)?.as_table()?.get(key)
    }
}

impl FromStr for TomlSettings {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let table = toml::from_str::<toml::Table>(s)?;
        Ok(Self { table })
    }
}

impl SettingsSource for TomlSettings {
    fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.lookup(section, key).and_then(|v| v.as_bool())
    }

    fn get_double(&self, section: &str, key: &str) -> Option<f64> {
        self.lookup(section, key).and_then(value_as_double)
    }
}

/// Resolve the configuration file path
///
/// Returns `None` when neither an explicit path nor a default config file
/// exists. An explicit path (CLI or environment) is returned even if it does
/// not exist, so loading it reports a proper error.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3/4: platform config locations
    default_config_paths().into_iter().find(|p| p.exists())
}

/// Platform config file candidates, most specific first
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = dirs::config_dir()
        .map(|d| d.join("xfade").join("config.toml"))
        .into_iter()
        .collect();

    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/xfade/config.toml"));
    }

    paths
}

/// Resolve and load settings, or `None` when no config file is present
pub fn load_settings(cli_arg: Option<&Path>, env_var_name: &str) -> Result<Option<TomlSettings>> {
    match resolve_config_path(cli_arg, env_var_name) {
        Some(path) => TomlSettings::load(&path).map(Some),
        None => Ok(None),
    }
}
