//! # Crossfade Common Library
//!
//! Shared code for the crossfade engine and its tools:
//! - Error types
//! - Crossfade settings, parameter metadata and key/value settings sources
//! - Configuration file resolution and TOML loading
//! - Linear fade ramps and additive mixing

pub mod config;
pub mod error;
pub mod fade_curves;
pub mod params;

pub use config::TomlSettings;
pub use error::{Error, Result};
pub use params::{CrossfadeSettings, MemorySettings, SettingsSource};
