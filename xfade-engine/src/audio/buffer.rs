//! Growable sample buffer for the crossfade engine
//!
//! A contiguous `Vec<f32>` with index bookkeeping instead of a ring: the
//! engine appends at the back, releases from the front, and mixes into the
//! middle during fade-in. Releases are batched (half a second at a time), so
//! the front shift stays cheap.
//!
//! Growth goes through `try_reserve`, turning allocation failure into
//! `Error::OutOfMemory` rather than an abort.

use crate::error::Result;

/// Interleaved sample storage
///
/// Lengths are in samples, not frames. The buffer does not know its channel
/// count; callers keep it frame aligned (see `is_frame_aligned`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing samples
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Number of samples held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the length is a whole number of `channels`-sample frames
    pub fn is_frame_aligned(&self, channels: usize) -> bool {
        channels > 0 && self.samples.len() % channels == 0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Remove all samples, keeping the allocation
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Append samples at the back
    pub fn append(&mut self, data: &[f32]) -> Result<()> {
        self.samples.try_reserve(data.len())?;
        self.samples.extend_from_slice(data);
        Ok(())
    }

    /// Grow or shrink to `len` samples; new samples are silence
    pub fn resize_zeroed(&mut self, len: usize) -> Result<()> {
        if len > self.samples.len() {
            self.samples.try_reserve(len - self.samples.len())?;
        }
        self.samples.resize(len, 0.0);
        Ok(())
    }

    /// Keep only the oldest `len` samples
    pub fn truncate(&mut self, len: usize) {
        self.samples.truncate(len);
    }

    /// Drop the oldest `count` samples (all of them if fewer are held)
    pub fn discard_front(&mut self, count: usize) {
        let count = count.min(self.samples.len());
        self.samples.drain(..count);
    }

    /// Move the oldest `count` samples to the back of `dst`
    pub fn take_front_into(&mut self, count: usize, dst: &mut AudioBuffer) -> Result<()> {
        let count = count.min(self.samples.len());
        dst.append(&self.samples[..count])?;
        self.discard_front(count);
        Ok(())
    }

    /// Replace the whole contents
    pub fn replace(&mut self, samples: Vec<f32>) {
        self.samples = samples;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_new() {
        let buffer = AudioBuffer::new();
        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
        assert!(buffer.is_frame_aligned(2));
    }

    #[test]
    fn test_append_and_take_front() {
        let mut buffer = AudioBuffer::new();
        buffer.append(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

        let mut out = AudioBuffer::new();
        buffer.take_front_into(4, &mut out).unwrap();

        assert_eq!(out.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buffer.as_slice(), &[5.0, 6.0]);
    }

    #[test]
    fn test_take_front_appends_to_destination() {
        let mut buffer = AudioBuffer::from_samples(vec![3.0, 4.0]);
        let mut out = AudioBuffer::from_samples(vec![1.0, 2.0]);

        buffer.take_front_into(10, &mut out).unwrap();

        assert_eq!(out.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_discard_front_clamps() {
        let mut buffer = AudioBuffer::from_samples(vec![1.0, 2.0, 3.0]);
        buffer.discard_front(1);
        assert_eq!(buffer.as_slice(), &[2.0, 3.0]);

        buffer.discard_front(100);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_resize_zeroed() {
        let mut buffer = AudioBuffer::from_samples(vec![0.5, 0.5]);
        buffer.resize_zeroed(4).unwrap();
        assert_eq!(buffer.as_slice(), &[0.5, 0.5, 0.0, 0.0]);

        buffer.resize_zeroed(1).unwrap();
        assert_eq!(buffer.as_slice(), &[0.5]);
    }

    #[test]
    fn test_frame_alignment() {
        let buffer = AudioBuffer::from_samples(vec![0.0; 6]);
        assert!(buffer.is_frame_aligned(2));
        assert!(buffer.is_frame_aligned(3));
        assert!(!buffer.is_frame_aligned(4));
        assert!(!buffer.is_frame_aligned(0));
    }

    #[test]
    fn test_truncate_drops_newest() {
        let mut buffer = AudioBuffer::from_samples(vec![1.0, 2.0, 3.0, 4.0]);
        buffer.truncate(2);
        assert_eq!(buffer.as_slice(), &[1.0, 2.0]);

        buffer.truncate(10);
        assert_eq!(buffer.as_slice(), &[1.0, 2.0]);
    }
}
