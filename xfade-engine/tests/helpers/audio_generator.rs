//! Deterministic test signal generation
//!
//! All generators return interleaved blocks with the same value on every
//! channel of a frame, so per-frame expectations hold for any channel count.

use std::f32::consts::PI;

/// Block of `frames` frames holding `value` on every channel
pub fn constant_block(frames: usize, channels: usize, value: f32) -> Vec<f32> {
    vec![value; frames * channels]
}

/// Block whose frame `i` holds `start + i as f32`, useful for tracking
/// which frames survive a trim or release
pub fn counting_block(frames: usize, channels: usize, start: f32) -> Vec<f32> {
    let mut block = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        let value = start + i as f32;
        block.extend(std::iter::repeat(value).take(channels));
    }
    block
}

/// Sine tone starting at frame `offset`
pub fn sine_block(
    frames: usize,
    channels: usize,
    rate: u32,
    frequency: f32,
    offset: usize,
) -> Vec<f32> {
    let step = 2.0 * PI * frequency / rate as f32;
    let mut block = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        let value = 0.5 * (step * (offset + i) as f32).sin();
        block.extend(std::iter::repeat(value).take(channels));
    }
    block
}
