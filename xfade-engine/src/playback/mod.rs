//! Crossfade state machine and host interface

pub mod engine;
pub mod overlap;
pub mod plugin;
pub mod state;

pub use engine::CrossfadeEngine;
pub use overlap::{overlap_samples, overlap_seconds};
pub use plugin::EffectPlugin;
pub use state::CrossfadeState;
