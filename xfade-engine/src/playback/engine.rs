//! Crossfade engine
//!
//! Holds the tail of the current track back from the output so that, when
//! the host signals a track boundary, the tail can be faded out underneath
//! the head of the next track.
//!
//! Host call sequence per track: `start → process* → flush* → finish`.
//!
//! - `process` appends audio to the internal buffer and releases whatever
//!   exceeds the overlap window once at least half a second has piled up
//! - `finish` (automatic track end) keeps the tail and moves to `Finished`
//! - `flush(false)` (seek / manual change) trims the tail to the manual
//!   overlap and moves to `Flushed`
//! - the next `process` fades the held tail out and mixes the new track in
//!   on top of it with a rising ramp
//! - with silence trimming enabled, quiet frames at the start of a track are
//!   dropped before they reach the buffer, and quiet frames at its end are
//!   dropped from the held tail on `finish`
//!
//! The engine is single threaded and non-reentrant: every operation takes
//! `&mut self`, and the slice returned from `process`/`finish` borrows the
//! engine, so it is only valid until the next call.

use super::overlap::overlap_samples;
use super::CrossfadeState;
use crate::audio::reformat::{reformat, rescale_frame_index};
use crate::audio::silence::{leading_silence, trailing_silence};
use crate::audio::{AudioBuffer, StreamFormat};
use crate::error::Result;
use std::mem::discriminant;
use tracing::{debug, info, trace};
use xfade_common::fade_curves::{fade_out, mix_add, ramp};
use xfade_common::{CrossfadeSettings, SettingsSource};

/// Default minimum release while running (seconds)
pub const DEFAULT_RELEASE_BATCH_SECONDS: f64 = 0.5;

/// Largest accepted minimum release (seconds), the longest overlap
pub const MAX_RELEASE_BATCH_SECONDS: f64 = 15.0;

/// Streaming crossfade effect
///
/// `S` is the settings store consulted on every operation, so preference
/// changes apply from the next host call.
pub struct CrossfadeEngine<S: SettingsSource = CrossfadeSettings> {
    settings: S,
    state: CrossfadeState,
    format: Option<StreamFormat>,

    /// Audio held back for the next crossfade
    buffer: AudioBuffer,

    /// Audio released by the current call
    output: AudioBuffer,

    /// Ramped copy of incoming audio during fade-in
    scratch: AudioBuffer,

    release_batch_seconds: f64,

    /// Leading silence still allowed to be dropped from the current track
    leading_trim_remaining: usize,
}

impl Default for CrossfadeEngine<CrossfadeSettings> {
    fn default() -> Self {
        Self::new(CrossfadeSettings::default())
    }
}

impl<S: SettingsSource> CrossfadeEngine<S> {
    /// Create an engine in state `Off` reading settings from `settings`
    pub fn new(settings: S) -> Self {
        Self {
            settings,
            state: CrossfadeState::Off,
            format: None,
            buffer: AudioBuffer::new(),
            output: AudioBuffer::new(),
            scratch: AudioBuffer::new(),
            release_batch_seconds: DEFAULT_RELEASE_BATCH_SECONDS,
            leading_trim_remaining: 0,
        }
    }

    /// Override the minimum running-state release size
    ///
    /// Smaller batches lower latency at the cost of more frequent buffer
    /// shifts. Zero releases on every call; values above
    /// `MAX_RELEASE_BATCH_SECONDS` are capped; negative or non-finite values
    /// are ignored.
    pub fn with_release_batch(mut self, seconds: f64) -> Self {
        if seconds.is_finite() && seconds >= 0.0 {
            self.release_batch_seconds = seconds.min(MAX_RELEASE_BATCH_SECONDS);
        }
        self
    }

    pub fn state(&self) -> CrossfadeState {
        self.state
    }

    /// Format reported by the last `start`
    pub fn format(&self) -> Option<StreamFormat> {
        self.format
    }

    /// Interleaved samples currently held back
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Frames currently held back
    pub fn buffered_frames(&self) -> usize {
        self.format
            .map(|f| f.frames_in(self.buffer.len()))
            .unwrap_or(0)
    }

    /// Audio currently held back
    pub fn buffered(&self) -> &[f32] {
        self.buffer.as_slice()
    }

    /// Current settings snapshot
    pub fn settings(&self) -> CrossfadeSettings {
        CrossfadeSettings::load(&self.settings)
    }

    /// Samples that must be held in `state` before output may begin
    ///
    /// Zero before the first `start`.
    pub fn overlap_samples(&self, state: CrossfadeState) -> usize {
        match self.format {
            Some(format) => overlap_samples(state, &self.settings(), format),
            None => 0,
        }
    }

    /// Begin a track, or reconcile a format change
    ///
    /// From `Off`, enters `Flushed` with a silent manual-overlap buffer when
    /// manual crossfading is enabled (so the very first track has something
    /// to fade against), `Running` otherwise. When already active, any held
    /// audio is converted to the new format and the state is kept.
    pub fn start(&mut self, channels: u32, rate: u32) -> Result<()> {
        let new_format = StreamFormat::new(channels, rate)?;
        let settings = self.settings();

        self.leading_trim_remaining = if settings.trim_leading {
            new_format.samples_for_seconds(settings.trim_length)
        } else {
            0
        };

        if self.state.is_active() {
            if let Some(old_format) = self.format {
                if old_format != new_format {
                    self.reformat_held(old_format, new_format)?;
                }
            }
            self.format = Some(new_format);
            debug!("Crossfade start: {} in state {}", new_format, self.state);
            return Ok(());
        }

        self.format = Some(new_format);

        if settings.manual {
            let needed = overlap_samples(CrossfadeState::Flushed, &settings, new_format);
            self.buffer.clear();
            self.buffer.resize_zeroed(needed)?;
            self.transition(CrossfadeState::Flushed);
        } else {
            self.buffer.clear();
            self.transition(CrossfadeState::Running);
        }

        info!(
            "Crossfade started: {}, automatic={} ({}s), manual={} ({}s)",
            new_format, settings.automatic, settings.length, settings.manual, settings.manual_length
        );
        Ok(())
    }

    /// Process one block of a playing track
    ///
    /// Returns the input untouched in `Off`. Otherwise returns zero or more
    /// frames of delayed (and, around a boundary, crossfaded) audio.
    pub fn process<'a>(&'a mut self, data: &'a [f32]) -> Result<&'a [f32]> {
        let Some(format) = self.active_format() else {
            return Ok(data);
        };
        debug_assert_eq!(data.len() % format.channel_count(), 0, "unaligned input block");

        self.output.clear();
        let settings = self.settings();
        let mut data = self.skip_leading_silence(data, &settings, format);

        if self.state.holds_tail() {
            fade_out(self.buffer.as_mut_slice());
            self.transition(CrossfadeState::FadeIn { fade_in_point: 0 });
        }

        if let CrossfadeState::FadeIn { fade_in_point } = self.state {
            data = self.run_fade_in(data, fade_in_point, format)?;
        }

        if self.state == CrossfadeState::Running {
            self.buffer.append(data)?;
            let keep = overlap_samples(CrossfadeState::Running, &settings, format);
            self.release(keep, false, format)?;
        }

        Ok(self.output.as_slice())
    }

    /// Handle a seek or manual track change
    ///
    /// Returns `true` when the host may discard everything downstream
    /// immediately, `false` when the held tail must be kept for a manual
    /// crossfade.
    pub fn flush(&mut self, force: bool) -> bool {
        let Some(format) = self.active_format() else {
            return true;
        };

        let settings = self.settings();

        if !force && settings.manual {
            self.transition(CrossfadeState::Flushed);
            let needed = overlap_samples(CrossfadeState::Flushed, &settings, format);
            if self.buffer.len() > needed {
                self.buffer.discard_front(self.buffer.len() - needed);
            }
            return false;
        }

        self.transition(CrossfadeState::Running);
        self.buffer.clear();
        true
    }

    /// Handle the last block of a track
    ///
    /// With automatic crossfading the tail is kept (`Finished`) for the next
    /// track; without it everything is released and the engine turns `Off`.
    /// At the end of the playlist any held tail is faded out and released.
    pub fn finish<'a>(&'a mut self, data: &'a [f32], end_of_playlist: bool) -> Result<&'a [f32]> {
        let Some(format) = self.active_format() else {
            return Ok(data);
        };
        debug_assert_eq!(data.len() % format.channel_count(), 0, "unaligned input block");

        self.output.clear();
        let settings = self.settings();
        let mut data = self.skip_leading_silence(data, &settings, format);

        if let CrossfadeState::FadeIn { fade_in_point } = self.state {
            data = self.run_fade_in(data, fade_in_point, format)?;
        }

        match self.state {
            CrossfadeState::Running | CrossfadeState::Finished | CrossfadeState::Flushed => {
                self.buffer.append(data)?;
                if self.state == CrossfadeState::Running && settings.trim_trailing {
                    self.trim_trailing_silence(&settings, format);
                }
                let exact = self.state != CrossfadeState::Running;
                let keep = overlap_samples(self.state, &settings, format);
                self.release(keep, exact, format)?;
            }
            CrossfadeState::Off | CrossfadeState::FadeIn { .. } => {}
        }

        if matches!(
            self.state,
            CrossfadeState::FadeIn { .. } | CrossfadeState::Running
        ) {
            if settings.automatic {
                self.transition(CrossfadeState::Finished);
                let keep = overlap_samples(CrossfadeState::Finished, &settings, format);
                self.release(keep, true, format)?;
            } else {
                self.transition(CrossfadeState::Off);
                self.release(0, true, format)?;
            }
        }

        if end_of_playlist && self.state.holds_tail() {
            fade_out(self.buffer.as_mut_slice());
            self.transition(CrossfadeState::Off);
            self.release(0, true, format)?;
        }

        Ok(self.output.as_slice())
    }

    /// Report downstream latency including audio held by the engine
    pub fn adjust_delay(&self, delay_ms: i64) -> i64 {
        match self.format {
            Some(format) => delay_ms + format.samples_to_ms(self.buffer.len()),
            None => delay_ms,
        }
    }

    /// Drop all state, as at the end of a playback session
    pub fn reset(&mut self) {
        self.transition(CrossfadeState::Off);
        self.format = None;
        self.leading_trim_remaining = 0;
        self.buffer = AudioBuffer::new();
        self.output = AudioBuffer::new();
        self.scratch = AudioBuffer::new();
    }

    fn active_format(&self) -> Option<StreamFormat> {
        match self.state {
            CrossfadeState::Off => None,
            _ => self.format,
        }
    }

    /// Drop silent frames from the front of a new track's audio
    ///
    /// Trimming ends at the first audible frame or once `trim_length` of
    /// silence has been dropped, whichever comes first.
    fn skip_leading_silence<'d>(
        &mut self,
        data: &'d [f32],
        settings: &CrossfadeSettings,
        format: StreamFormat,
    ) -> &'d [f32] {
        if self.leading_trim_remaining == 0 {
            return data;
        }

        let silent = leading_silence(
            data,
            format.channel_count(),
            settings.trim_level as f32,
            self.leading_trim_remaining,
        );

        if silent < data.len() {
            self.leading_trim_remaining = 0;
        } else {
            self.leading_trim_remaining -= silent;
        }

        if silent > 0 {
            trace!("Dropped {} samples of leading silence", silent);
        }
        &data[silent..]
    }

    /// Drop silent frames from the end of the held audio
    fn trim_trailing_silence(&mut self, settings: &CrossfadeSettings, format: StreamFormat) {
        let silent = trailing_silence(
            self.buffer.as_slice(),
            format.channel_count(),
            settings.trim_level as f32,
            format.samples_for_seconds(settings.trim_length),
        );

        if silent > 0 {
            debug!(
                "Trimmed {} ms of trailing silence",
                format.samples_to_ms(silent)
            );
            self.buffer.truncate(self.buffer.len() - silent);
        }
    }

    fn transition(&mut self, next: CrossfadeState) {
        if discriminant(&self.state) != discriminant(&next) {
            debug!(
                "Crossfade state {} -> {} ({} samples held)",
                self.state,
                next,
                self.buffer.len()
            );
        }
        self.state = next;
    }

    /// Convert held audio and fade-in progress to a new format
    fn reformat_held(&mut self, old: StreamFormat, new: StreamFormat) -> Result<()> {
        reformat(&mut self.buffer, old, new)?;

        if let CrossfadeState::FadeIn { fade_in_point } = self.state {
            let buffer_frames = new.frames_in(self.buffer.len());
            let point = rescale_frame_index(fade_in_point, old.rate, new.rate).min(buffer_frames);
            self.state = CrossfadeState::FadeIn { fade_in_point: point };
        }

        info!("Crossfade buffer converted from {} to {}", old, new);
        Ok(())
    }

    /// Mix incoming audio into the faded-out tail with a rising ramp
    ///
    /// Returns the part of `data` past the end of the tail.
    fn run_fade_in<'d>(
        &mut self,
        data: &'d [f32],
        fade_in_point: usize,
        format: StreamFormat,
    ) -> Result<&'d [f32]> {
        let channels = format.channel_count();
        let buffer_len = self.buffer.len();
        let mut point = fade_in_point * channels;
        let mut data = data;

        if point < buffer_len {
            let copy = data.len().min(buffer_len - point);
            let gain_start = point as f32 / buffer_len as f32;
            let gain_end = (point + copy) as f32 / buffer_len as f32;

            self.scratch.clear();
            self.scratch.append(&data[..copy])?;
            ramp(self.scratch.as_mut_slice(), gain_start, gain_end);
            mix_add(
                &mut self.buffer.as_mut_slice()[point..point + copy],
                self.scratch.as_slice(),
            );

            point += copy;
            data = &data[copy..];
        }

        if point >= buffer_len {
            self.transition(CrossfadeState::Running);
        } else {
            self.state = CrossfadeState::FadeIn {
                fade_in_point: point / channels,
            };
        }

        Ok(data)
    }

    /// Move held audio beyond `keep` samples to the output
    ///
    /// Unless `exact`, nothing moves until at least one release batch is
    /// waiting, so small blocks accumulate instead of shifting the buffer on
    /// every call.
    fn release(&mut self, keep: usize, exact: bool, format: StreamFormat) -> Result<()> {
        let mut copy = self.buffer.len().saturating_sub(keep);

        if !exact && copy < self.release_batch_samples(format) {
            copy = 0;
        }

        if copy > 0 {
            trace!("Releasing {} samples, keeping {}", copy, self.buffer.len() - copy);
            self.buffer.take_front_into(copy, &mut self.output)?;
        }

        debug_assert!(self.buffer.is_frame_aligned(format.channel_count()));
        debug_assert!(self.output.is_frame_aligned(format.channel_count()));
        Ok(())
    }

    fn release_batch_samples(&self, format: StreamFormat) -> usize {
        let frames = (format.rate as f64 * self.release_batch_seconds) as usize;
        frames.saturating_mul(format.channel_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(automatic: bool, manual: bool) -> CrossfadeSettings {
        CrossfadeSettings {
            automatic,
            length: 1.0,
            manual,
            manual_length: 0.1,
            ..CrossfadeSettings::default()
        }
    }

    #[test]
    fn test_new_engine_is_off() {
        let engine: CrossfadeEngine = CrossfadeEngine::default();
        assert_eq!(engine.state(), CrossfadeState::Off);
        assert_eq!(engine.format(), None);
        assert_eq!(engine.buffered_samples(), 0);
        assert_eq!(engine.overlap_samples(CrossfadeState::Running), 0);
    }

    #[test]
    fn test_start_rejects_invalid_format() {
        let mut engine: CrossfadeEngine = CrossfadeEngine::default();
        assert!(engine.start(0, 44100).is_err());
        assert_eq!(engine.state(), CrossfadeState::Off);
    }

    #[test]
    fn test_start_manual_prefills_silence() {
        let mut engine = CrossfadeEngine::new(settings(true, true));
        engine.start(2, 1000).unwrap();

        assert_eq!(engine.state(), CrossfadeState::Flushed);
        assert_eq!(engine.buffered_samples(), 2 * 100);
        assert!(engine.buffered().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_start_without_manual_runs() {
        let mut engine = CrossfadeEngine::new(settings(true, false));
        engine.start(2, 1000).unwrap();

        assert_eq!(engine.state(), CrossfadeState::Running);
        assert_eq!(engine.buffered_samples(), 0);
    }

    #[test]
    fn test_start_while_active_keeps_state() {
        let mut engine = CrossfadeEngine::new(settings(true, false));
        engine.start(2, 1000).unwrap();
        engine.process(&[0.5; 200]).unwrap();
        engine.start(2, 1000).unwrap();

        assert_eq!(engine.state(), CrossfadeState::Running);
        assert_eq!(engine.buffered_samples(), 200);
    }

    #[test]
    fn test_release_batches() {
        // 1000 Hz mono, automatic 1s overlap, batch 0.5s = 500 samples
        let mut engine = CrossfadeEngine::new(settings(true, false));
        engine.start(1, 1000).unwrap();

        // 1400 held: 400 above overlap, less than one batch
        assert!(engine.process(&[0.1; 1400]).unwrap().is_empty());

        // 1600 held: 600 above overlap, all of it released
        let out = engine.process(&[0.1; 200]).unwrap();
        assert_eq!(out.len(), 600);
        assert_eq!(engine.buffered_samples(), 1000);
    }

    #[test]
    fn test_zero_release_batch_releases_every_call() {
        let mut engine = CrossfadeEngine::new(settings(true, false)).with_release_batch(0.0);
        engine.start(1, 1000).unwrap();

        assert!(engine.process(&[0.1; 1000]).unwrap().is_empty());
        assert_eq!(engine.process(&[0.1; 10]).unwrap().len(), 10);
        assert_eq!(engine.buffered_samples(), 1000);
    }

    #[test]
    fn test_huge_release_batch_is_capped() {
        let mut engine = CrossfadeEngine::new(settings(true, false)).with_release_batch(1e30);
        engine.start(2, 44100).unwrap();
        assert!(engine.process(&[0.1; 4410]).unwrap().is_empty());

        // Capped at 15s: 1s overlap plus 15s of excess before anything moves
        let mut engine = CrossfadeEngine::new(settings(true, false)).with_release_batch(1e30);
        engine.start(1, 1000).unwrap();
        assert!(engine.process(&vec![0.1; 15_999]).unwrap().is_empty());
        assert_eq!(engine.process(&[0.1]).unwrap().len(), 15_000);
        assert_eq!(engine.buffered_samples(), 1000);
    }

    #[test]
    fn test_invalid_release_batch_ignored() {
        let mut engine = CrossfadeEngine::new(settings(true, false)).with_release_batch(f64::NAN);
        engine.start(1, 1000).unwrap();

        assert!(engine.process(&[0.1; 1400]).unwrap().is_empty());
    }

    #[test]
    fn test_fade_in_point_tracks_frames() {
        let mut engine = CrossfadeEngine::new(settings(true, true));
        engine.start(2, 1000).unwrap(); // 100 silent frames held

        engine.process(&[1.0; 60]).unwrap(); // 30 frames mixed in
        assert_eq!(
            engine.state(),
            CrossfadeState::FadeIn { fade_in_point: 30 }
        );

        engine.process(&[1.0; 140]).unwrap();
        assert_eq!(engine.state(), CrossfadeState::Running);
    }

    #[test]
    fn test_format_change_during_fade_in_rescales_point() {
        let mut engine = CrossfadeEngine::new(settings(true, true));
        engine.start(1, 1000).unwrap(); // 100 frames
        engine.process(&[1.0; 40]).unwrap();
        assert_eq!(engine.state(), CrossfadeState::FadeIn { fade_in_point: 40 });

        engine.start(2, 500).unwrap();

        assert_eq!(engine.buffered_samples(), 2 * 50);
        assert_eq!(engine.state(), CrossfadeState::FadeIn { fade_in_point: 20 });
    }

    #[test]
    fn test_reset_returns_to_off() {
        let mut engine = CrossfadeEngine::new(settings(true, true));
        engine.start(2, 1000).unwrap();
        engine.reset();

        assert_eq!(engine.state(), CrossfadeState::Off);
        assert_eq!(engine.format(), None);
        assert_eq!(engine.buffered_samples(), 0);
        assert_eq!(engine.adjust_delay(50), 50);
    }
}
