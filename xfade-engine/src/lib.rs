//! # Crossfade Engine Library (xfade-engine)
//!
//! Streaming crossfade effect for a playback host.
//!
//! **Purpose:** Accept a continuous stream of interleaved `f32` PCM, detect
//! track boundaries from the host's call sequence (automatic advance, manual
//! seek, end of playlist), and blend the tail of one track into the head of
//! the next over a bounded overlap window.
//!
//! **Architecture:** `audio` holds the format and buffer types plus the
//! nearest-neighbour reformatter; `playback` holds the overlap policy, the
//! state enum and the `CrossfadeEngine` state machine behind the
//! `EffectPlugin` host seam.

pub mod audio;
pub mod error;
pub mod playback;

pub use audio::{AudioBuffer, StreamFormat};
pub use error::{Error, Result};
pub use playback::{CrossfadeEngine, CrossfadeState, EffectPlugin};
