//! Test helper modules for crossfade engine integration tests
//!
//! - audio_generator: deterministic signal blocks
//! - block feeding: push a long signal through the engine in host-sized
//!   blocks and collect what comes out

#![allow(dead_code)]

pub mod audio_generator;

pub use audio_generator::{constant_block, counting_block, sine_block};

use xfade_common::{CrossfadeSettings, SettingsSource};
use xfade_engine::CrossfadeEngine;

/// Settings with short durations so tests stay small at low sample rates
pub fn test_settings(automatic: bool, manual: bool) -> CrossfadeSettings {
    CrossfadeSettings {
        automatic,
        length: 1.0,
        manual,
        manual_length: 0.1,
        ..CrossfadeSettings::default()
    }
}

/// Feed `data` through `process` in blocks of `block_samples` samples
pub fn process_all<S: SettingsSource>(
    engine: &mut CrossfadeEngine<S>,
    data: &[f32],
    block_samples: usize,
) -> Vec<f32> {
    let mut output = Vec::new();
    for block in data.chunks(block_samples) {
        let released = engine.process(block).expect("process failed");
        output.extend_from_slice(released);
    }
    output
}

/// Assert two sample sequences match within `tolerance`
pub fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "sample {} differs: got {}, expected {}",
            i,
            a,
            e
        );
    }
}
