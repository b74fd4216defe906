//! Host-facing effect interface
//!
//! A playback host drives every effect in its chain through the same five
//! calls. Blocks are interleaved `f32` PCM in the format announced by the
//! last `start`. Returned blocks borrow the effect and must be consumed
//! before the next call.

use super::CrossfadeEngine;
use crate::audio::StreamFormat;
use crate::error::Result;
use xfade_common::SettingsSource;

/// Effect plugin operations, in host call order
pub trait EffectPlugin {
    /// A track (or format) begins; returns the format the effect will emit
    fn start(&mut self, format: StreamFormat) -> Result<StreamFormat>;

    /// One decoded block of the playing track
    fn process<'a>(&'a mut self, data: &'a [f32]) -> Result<&'a [f32]>;

    /// Seek or manual change; `true` when downstream audio may be dropped
    fn flush(&mut self, force: bool) -> bool;

    /// Final block of a track
    fn finish<'a>(&'a mut self, data: &'a [f32], end_of_playlist: bool) -> Result<&'a [f32]>;

    /// Add the effect's own latency to `delay_ms`
    fn adjust_delay(&self, delay_ms: i64) -> i64;
}

impl<S: SettingsSource> EffectPlugin for CrossfadeEngine<S> {
    fn start(&mut self, format: StreamFormat) -> Result<StreamFormat> {
        CrossfadeEngine::start(self, format.channels, format.rate)?;
        // Output format always equals input format
        Ok(format)
    }

    fn process<'a>(&'a mut self, data: &'a [f32]) -> Result<&'a [f32]> {
        CrossfadeEngine::process(self, data)
    }

    fn flush(&mut self, force: bool) -> bool {
        CrossfadeEngine::flush(self, force)
    }

    fn finish<'a>(&'a mut self, data: &'a [f32], end_of_playlist: bool) -> Result<&'a [f32]> {
        CrossfadeEngine::finish(self, data, end_of_playlist)
    }

    fn adjust_delay(&self, delay_ms: i64) -> i64 {
        CrossfadeEngine::adjust_delay(self, delay_ms)
    }
}
