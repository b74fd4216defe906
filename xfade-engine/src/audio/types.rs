//! Core audio data types
//!
//! **Format:**
//! - Samples are f32, interleaved by channel: [c0, c1, ..., c0, c1, ...]
//! - One frame = one sample per channel
//! - Channel count and sample rate may change at any track boundary

use crate::error::{Error, Result};
use std::fmt;

/// Channel count and sample rate of the stream currently being processed.
///
/// Invariant: `channels >= 1` and `rate > 0`. Construct through
/// `StreamFormat::new` to have it checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamFormat {
    /// Interleaved channel count
    pub channels: u32,

    /// Sample rate in Hz
    pub rate: u32,
}

impl StreamFormat {
    /// Create a validated stream format
    pub fn new(channels: u32, rate: u32) -> Result<Self> {
        if channels == 0 || rate == 0 {
            return Err(Error::InvalidFormat { channels, rate });
        }
        Ok(Self { channels, rate })
    }

    /// Channel count as an index type
    pub fn channel_count(&self) -> usize {
        self.channels as usize
    }

    /// Number of whole frames in `samples` interleaved samples
    pub fn frames_in(&self, samples: usize) -> usize {
        samples / self.channel_count()
    }

    /// Interleaved sample count covering `seconds` of audio
    ///
    /// The frame count is rounded to the nearest whole frame, so the result
    /// is always frame aligned: `channels * round(rate * seconds)`.
    pub fn samples_for_seconds(&self, seconds: f64) -> usize {
        let frames = (self.rate as f64 * seconds).round();
        if frames <= 0.0 {
            return 0;
        }
        self.channel_count() * frames as usize
    }

    /// Playback time in milliseconds of `samples` interleaved samples
    pub fn samples_to_ms(&self, samples: usize) -> i64 {
        (self.frames_in(samples) as i64 * 1000) / self.rate as i64
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ch @ {}Hz", self.channels, self.rate)
    }
}
