//! Overlap window sizing
//!
//! How much audio the engine must hold back depends on which kind of
//! boundary it may have to crossfade next:
//! - after an automatic track end (`Finished`) only the automatic length
//!   applies
//! - after a seek (`Flushed`) only the manual length applies
//! - in every other state the larger of the enabled lengths applies, since
//!   either kind of boundary may come next

use super::CrossfadeState;
use crate::audio::StreamFormat;
use xfade_common::CrossfadeSettings;

/// Overlap duration in seconds for `state`
pub fn overlap_seconds(state: CrossfadeState, settings: &CrossfadeSettings) -> f64 {
    let mut seconds: f64 = 0.0;

    if state != CrossfadeState::Flushed && settings.automatic {
        seconds = settings.length;
    }

    if state != CrossfadeState::Finished && settings.manual {
        seconds = seconds.max(settings.manual_length);
    }

    seconds
}

/// Interleaved samples to retain for `state`: `channels * round(rate * seconds)`
pub fn overlap_samples(
    state: CrossfadeState,
    settings: &CrossfadeSettings,
    format: StreamFormat,
) -> usize {
    format.samples_for_seconds(overlap_seconds(state, settings))
}
