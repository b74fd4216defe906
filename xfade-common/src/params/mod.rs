//! Crossfade parameter management
//!
//! Crossfade settings are read from a key/value store, always under the
//! `"crossfade"` section. The engine never writes to the store; a host (or a
//! preferences UI) may update values between engine calls, and the engine
//! picks them up on its next operation.
//!
//! # Architecture
//!
//! - `SettingsSource`: read-only key/value view (bool and double lookups)
//! - `MemorySettings`: in-process store, RwLock-protected so a UI thread can
//!   update values while the audio thread reads them
//! - `TomlSettings` (see `crate::config`): values parsed from a TOML document
//! - `CrossfadeSettings`: typed snapshot with defaults applied and ranges
//!   enforced
//!
//! # Usage
//!
//! ```rust
//! use xfade_common::params::{CrossfadeSettings, MemorySettings, SECTION};
//!
//! let store = MemorySettings::new();
//! store.set_double(SECTION, "length", 3.0);
//!
//! let settings = CrossfadeSettings::load(&store);
//! assert_eq!(settings.length, 3.0);
//! assert!(settings.manual); // default
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

mod metadata;

/// Settings section holding every crossfade key
pub const SECTION: &str = "crossfade";

/// Metadata describing one crossfade parameter
///
/// `CrossfadeSettings::metadata()` is the single source of truth for key
/// names, defaults, and validation ranges.
pub struct ParamMetadata {
    pub key: &'static str,
    pub data_type: &'static str,
    pub default_value: &'static str,
    pub description: &'static str,
    pub validation_range: &'static str,
    pub validator: fn(&str) -> std::result::Result<(), String>,
}

/// Read-only key/value view over a settings store
pub trait SettingsSource: Send + Sync {
    /// Look up a boolean value; `None` when absent or of another type
    fn get_bool(&self, section: &str, key: &str) -> Option<bool>;

    /// Look up a floating point value; integers are widened
    fn get_double(&self, section: &str, key: &str) -> Option<f64>;
}

impl<T: SettingsSource + ?Sized> SettingsSource for Arc<T> {
    fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        (**self).get_bool(section, key)
    }

    fn get_double(&self, section: &str, key: &str) -> Option<f64> {
        (**self).get_double(section, key)
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for &T {
    fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        (**self).get_bool(section, key)
    }

    fn get_double(&self, section: &str, key: &str) -> Option<f64> {
        (**self).get_double(section, key)
    }
}

/// Interpret a TOML value as a double (floats and integers)
pub(crate) fn value_as_double(value: &toml::Value) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}

/// Typed crossfade configuration
///
/// | key             | type | default  | range       |
/// |-----------------|------|----------|-------------|
/// | `automatic`     | bool | true     |             |
/// | `length`        | f64  | 5.0 s    | [1, 15]     |
/// | `manual`        | bool | true     |             |
/// | `manual_length` | f64  | 0.2 s    | [0.1, 3.0]  |
/// | `trim_leading`  | bool | false    |             |
/// | `trim_trailing` | bool | false    |             |
/// | `trim_length`   | f64  | 1.0 s    | [0, 10]     |
/// | `trim_level`    | f64  | 0.015625 | [0, 1]      |
///
/// Deserializes from a `[crossfade]` TOML table; missing keys take their
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossfadeSettings {
    /// Overlap tracks on automatic advance
    pub automatic: bool,

    /// Automatic overlap duration in seconds
    pub length: f64,

    /// Overlap on manual seek or track change
    pub manual: bool,

    /// Manual overlap duration in seconds
    pub manual_length: f64,

    /// Drop silence at the start of each track
    pub trim_leading: bool,

    /// Drop silence at the end of each track before it is crossfaded
    pub trim_trailing: bool,

    /// Most silence trimmed at either end (seconds)
    pub trim_length: f64,

    /// Peak amplitude below which a frame counts as silent
    pub trim_level: f64,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            automatic: true,
            length: 5.0,
            manual: true,
            manual_length: 0.2,
            trim_leading: false,
            trim_trailing: false,
            trim_length: 1.0,
            trim_level: 0.015625,
        }
    }
}

impl CrossfadeSettings {
    /// Valid range for `length` (seconds)
    pub const LENGTH_RANGE: RangeInclusive<f64> = 1.0..=15.0;

    /// Valid range for `manual_length` (seconds)
    pub const MANUAL_LENGTH_RANGE: RangeInclusive<f64> = 0.1..=3.0;

    /// Valid range for `trim_length` (seconds)
    pub const TRIM_LENGTH_RANGE: RangeInclusive<f64> = 0.0..=10.0;

    /// Valid range for `trim_level` (linear amplitude)
    pub const TRIM_LEVEL_RANGE: RangeInclusive<f64> = 0.0..=1.0;

    /// Read a settings snapshot from `source`
    ///
    /// Missing keys fall back to their defaults. Out-of-range durations are
    /// clamped into range and logged; non-finite durations revert to the
    /// default.
    pub fn load<S: SettingsSource + ?Sized>(source: &S) -> Self {
        let defaults = Self::default();

        let settings = Self {
            automatic: source
                .get_bool(SECTION, "automatic")
                .unwrap_or(defaults.automatic),
            length: source
                .get_double(SECTION, "length")
                .unwrap_or(defaults.length),
            manual: source.get_bool(SECTION, "manual").unwrap_or(defaults.manual),
            manual_length: source
                .get_double(SECTION, "manual_length")
                .unwrap_or(defaults.manual_length),
            trim_leading: source
                .get_bool(SECTION, "trim_leading")
                .unwrap_or(defaults.trim_leading),
            trim_trailing: source
                .get_bool(SECTION, "trim_trailing")
                .unwrap_or(defaults.trim_trailing),
            trim_length: source
                .get_double(SECTION, "trim_length")
                .unwrap_or(defaults.trim_length),
            trim_level: source
                .get_double(SECTION, "trim_level")
                .unwrap_or(defaults.trim_level),
        };

        settings.clamped()
    }

    /// Return a copy with numeric values forced into their valid ranges
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            length: clamp_value("length", self.length, defaults.length, &Self::LENGTH_RANGE),
            manual_length: clamp_value(
                "manual_length",
                self.manual_length,
                defaults.manual_length,
                &Self::MANUAL_LENGTH_RANGE,
            ),
            trim_length: clamp_value(
                "trim_length",
                self.trim_length,
                defaults.trim_length,
                &Self::TRIM_LENGTH_RANGE,
            ),
            trim_level: clamp_value(
                "trim_level",
                self.trim_level,
                defaults.trim_level,
                &Self::TRIM_LEVEL_RANGE,
            ),
            ..self
        }
    }

    /// Validate every field against the parameter metadata
    pub fn validate(&self) -> Result<()> {
        for meta in Self::metadata() {
            let raw = match meta.key {
                "automatic" => self.automatic.to_string(),
                "length" => self.length.to_string(),
                "manual" => self.manual.to_string(),
                "manual_length" => self.manual_length.to_string(),
                "trim_leading" => self.trim_leading.to_string(),
                "trim_trailing" => self.trim_trailing.to_string(),
                "trim_length" => self.trim_length.to_string(),
                "trim_level" => self.trim_level.to_string(),
                other => return Err(Error::InvalidInput(format!("unknown key: {}", other))),
            };
            (meta.validator)(&raw).map_err(Error::InvalidInput)?;
        }
        Ok(())
    }
}

fn clamp_value(key: &str, value: f64, default: f64, range: &RangeInclusive<f64>) -> f64 {
    if !value.is_finite() {
        warn!("crossfade.{}: non-finite value {}, using default {}", key, value, default);
        return default;
    }

    if range.contains(&value) {
        return value;
    }

    let clamped = value.clamp(*range.start(), *range.end());
    warn!(
        "crossfade.{}: value {} out of range [{}, {}], clamped to {}",
        key,
        value,
        range.start(),
        range.end(),
        clamped
    );
    clamped
}

/// In-memory key/value settings store
///
/// Shared between a writer (preferences, CLI) and the audio thread through
/// `Arc<MemorySettings>`. Reads take a shared lock and never block each other.
/// Values are kept per section so lookups borrow the caller's keys and do
/// not allocate.
#[derive(Debug, Default)]
pub struct MemorySettings {
    sections: RwLock<HashMap<String, HashMap<String, toml::Value>>>,
}

impl MemorySettings {
    /// Create an empty store (every lookup falls back to defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from a typed snapshot
    pub fn from_settings(settings: &CrossfadeSettings) -> Self {
        let store = Self::new();
        store.apply(settings);
        store
    }

    /// Overwrite every crossfade key from a typed snapshot
    pub fn apply(&self, settings: &CrossfadeSettings) {
        self.set_bool(SECTION, "automatic", settings.automatic);
        self.set_double(SECTION, "length", settings.length);
        self.set_bool(SECTION, "manual", settings.manual);
        self.set_double(SECTION, "manual_length", settings.manual_length);
        self.set_bool(SECTION, "trim_leading", settings.trim_leading);
        self.set_bool(SECTION, "trim_trailing", settings.trim_trailing);
        self.set_double(SECTION, "trim_length", settings.trim_length);
        self.set_double(SECTION, "trim_level", settings.trim_level);
    }

    /// Store a boolean value
    pub fn set_bool(&self, section: &str, key: &str, value: bool) {
        self.insert(section, key, toml::Value::Boolean(value));
    }

    /// Store a floating point value
    pub fn set_double(&self, section: &str, key: &str, value: f64) {
        self.insert(section, key, toml::Value::Float(value));
    }

    /// Parse and store a crossfade parameter given as text
    ///
    /// The value is checked with the key's metadata validator before it is
    /// stored; unknown keys and invalid values are rejected.
    pub fn set_crossfade_param(&self, key: &str, raw: &str) -> Result<()> {
        let meta = CrossfadeSettings::metadata()
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| Error::InvalidInput(format!("unknown crossfade parameter: {}", key)))?;

        (meta.validator)(raw).map_err(Error::InvalidInput)?;

        let value = match meta.data_type {
            "bool" => toml::Value::Boolean(raw.trim().parse().map_err(|_| {
                Error::InvalidInput(format!("{}: invalid boolean", key))
            })?),
            _ => toml::Value::Float(raw.trim().parse().map_err(|_| {
                Error::InvalidInput(format!("{}: invalid number format", key))
            })?),
        };

        self.insert(SECTION, key, value);
        Ok(())
    }

    /// Remove a key so lookups fall back to the default
    pub fn remove(&self, section: &str, key: &str) {
        let mut sections = self.sections.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(values) = sections.get_mut(section) {
            values.remove(key);
        }
    }

    fn insert(&self, section: &str, key: &str, value: toml::Value) {
        self.sections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Run `read` on a stored value under the shared lock
    fn read_value<T>(
        &self,
        section: &str,
        key: &str,
        read: impl FnOnce(&toml::Value) -> Option<T>,
    ) -> Option<T> {
        let sections = self.sections.read().unwrap_or_else(PoisonError::into_inner);
        sections.get(section)?.get(key).and_then(read)
    }
}

impl SettingsSource for MemorySettings {
    fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.read_value(section, key, toml::Value::as_bool)
    }

    fn get_double(&self, section: &str, key: &str) -> Option<f64> {
        self.read_value(section, key, value_as_double)
    }
}

impl SettingsSource for CrossfadeSettings {
    fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match (section, key) {
            (SECTION, "automatic") => Some(self.automatic),
            (SECTION, "manual") => Some(self.manual),
            (SECTION, "trim_leading") => Some(self.trim_leading),
            (SECTION, "trim_trailing") => Some(self.trim_trailing),
            _ => None,
        }
    }

    fn get_double(&self, section: &str, key: &str) -> Option<f64> {
        match (section, key) {
            (SECTION, "length") => Some(self.length),
            (SECTION, "manual_length") => Some(self.manual_length),
            (SECTION, "trim_length") => Some(self.trim_length),
            (SECTION, "trim_level") => Some(self.trim_level),
            _ => None,
        }
    }
}
