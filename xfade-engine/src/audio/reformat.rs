//! Nearest-neighbour stream reformatting
//!
//! When the host reports a new channel count or sample rate while audio is
//! still held for a crossfade, the held audio is converted so the buffer
//! stays consistent with the incoming stream. This is a last-resort remap,
//! not a resampler: frames and channels are picked by nearest (truncated)
//! index, with no filtering. Quality loss over a few seconds of fade-out
//! tail is accepted.

use super::{AudioBuffer, StreamFormat};
use crate::error::Result;
use tracing::debug;

/// Rescale a frame count between sample rates, rounding to nearest
fn rescale_rounded(frames: usize, from_rate: u32, to_rate: u32) -> usize {
    let num = frames as u64 * to_rate as u64;
    let den = from_rate as u64;
    ((2 * num + den) / (2 * den)) as usize
}

/// Rescale a frame index between sample rates, truncating
pub fn rescale_frame_index(frame: usize, from_rate: u32, to_rate: u32) -> usize {
    (frame as u64 * to_rate as u64 / from_rate as u64) as usize
}

/// Convert `buffer` from `old` format to `new` format in place.
///
/// - New frame count: `round(old_frames * new.rate / old.rate)`
/// - Source channel for output channel `c`: `c * old.channels / new.channels`
/// - Source frame for output frame `f`: `f * old.rate / new.rate`
///
/// No-op when the formats are equal. Fails only if the new buffer cannot be
/// allocated.
pub fn reformat(buffer: &mut AudioBuffer, old: StreamFormat, new: StreamFormat) -> Result<()> {
    if old == new {
        return Ok(());
    }

    let old_channels = old.channel_count();
    let new_channels = new.channel_count();
    let old_frames = buffer.len() / old_channels;
    let new_frames = rescale_rounded(old_frames, old.rate, new.rate);

    let mut converted: Vec<f32> = Vec::new();
    converted.try_reserve_exact(new_frames * new_channels)?;

    let source = buffer.as_slice();
    let last_frame = old_frames.saturating_sub(1);

    for f in 0..new_frames {
        let src_frame = rescale_frame_index(f, new.rate, old.rate).min(last_frame);
        let base = src_frame * old_channels;
        for c in 0..new_channels {
            let src_channel = c * old_channels / new_channels;
            converted.push(source[base + src_channel]);
        }
    }

    debug!(
        "Reformatted crossfade buffer {} -> {}: {} -> {} frames",
        old, new, old_frames, new_frames
    );

    buffer.replace(converted);
    Ok(())
}
