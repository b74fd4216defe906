//! Error types for xfade-engine
//!
//! The crossfade state machine itself has no failure modes: every host call
//! succeeds for valid input. What remains is buffer growth failing and
//! invalid stream formats reaching the public constructors.

use std::collections::TryReserveError;
use thiserror::Error;

/// Main error type for the crossfade engine
#[derive(Error, Debug)]
pub enum Error {
    /// Growing the internal or output buffer failed
    #[error("Out of memory growing audio buffer: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// Stream format with zero channels or zero sample rate
    #[error("Invalid stream format: {channels} channels at {rate} Hz")]
    InvalidFormat { channels: u32, rate: u32 },

    /// Settings loading or validation errors
    #[error("Settings error: {0}")]
    Settings(#[from] xfade_common::Error),
}

/// Convenience Result type using the engine Error
pub type Result<T> = std::result::Result<T, Error>;
