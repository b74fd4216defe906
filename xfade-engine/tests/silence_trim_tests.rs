//! Integration tests for trimming silence at track edges
//!
//! Leading silence is dropped before a track's audio enters the engine,
//! trailing silence is cut from the held audio when a track finishes.

mod helpers;

use helpers::{constant_block, process_all, test_settings};
use xfade_common::CrossfadeSettings;
use xfade_engine::{CrossfadeEngine, CrossfadeState};

const RATE: u32 = 1000;

fn trimming(leading: bool, trailing: bool, trim_length: f64) -> CrossfadeSettings {
    CrossfadeSettings {
        trim_leading: leading,
        trim_trailing: trailing,
        trim_length,
        ..test_settings(true, false)
    }
}

#[test]
fn test_leading_silence_is_dropped_until_audio() {
    let mut engine = CrossfadeEngine::new(trimming(true, false, 1.0));
    engine.start(1, RATE).unwrap();

    engine.process(&constant_block(300, 1, 0.0)).unwrap();
    assert_eq!(engine.buffered_samples(), 0);

    let block = [constant_block(100, 1, 0.001), constant_block(100, 1, 0.5)].concat();
    engine.process(&block).unwrap();
    assert_eq!(engine.buffered_samples(), 100);

    // Silence after the first audible frame belongs to the track
    engine.process(&constant_block(50, 1, 0.0)).unwrap();
    assert_eq!(engine.buffered_samples(), 150);
    assert!(engine.buffered()[..100].iter().all(|&s| s == 0.5));
}

#[test]
fn test_leading_trim_stops_at_length() {
    let mut engine = CrossfadeEngine::new(trimming(true, false, 0.1));
    engine.start(1, RATE).unwrap();

    engine.process(&constant_block(300, 1, 0.0)).unwrap();
    assert_eq!(engine.buffered_samples(), 200);

    engine.process(&constant_block(100, 1, 0.0)).unwrap();
    assert_eq!(engine.buffered_samples(), 300);
}

#[test]
fn test_leading_trim_rearms_for_each_track() {
    let mut engine = CrossfadeEngine::new(trimming(true, false, 1.0));
    engine.start(1, RATE).unwrap();
    process_all(&mut engine, &constant_block(2000, 1, 1.0), 100);
    engine.finish(&[], false).unwrap();
    assert_eq!(engine.state(), CrossfadeState::Finished);

    // The gap at the start of the next track never reaches the mix
    engine.start(1, RATE).unwrap();
    engine.process(&constant_block(200, 1, 0.0)).unwrap();
    assert_eq!(engine.state(), CrossfadeState::FadeIn { fade_in_point: 0 });

    engine.process(&constant_block(1000, 1, 1.0)).unwrap();
    assert_eq!(engine.state(), CrossfadeState::Running);
    for &s in engine.buffered() {
        assert!((s - 1.0).abs() < 1e-5, "mixed sample {} not flat", s);
    }
}

#[test]
fn test_leading_trim_disabled_keeps_silence() {
    let mut engine = CrossfadeEngine::new(test_settings(true, false));
    engine.start(1, RATE).unwrap();

    engine.process(&constant_block(300, 1, 0.0)).unwrap();
    assert_eq!(engine.buffered_samples(), 300);
}

#[test]
fn test_trailing_silence_is_cut_from_tail() {
    let mut engine = CrossfadeEngine::new(trimming(false, true, 1.0));
    engine.start(1, RATE).unwrap();
    let out = process_all(&mut engine, &constant_block(2000, 1, 0.5), 100);
    assert_eq!(out.len(), 1000);

    let last = [constant_block(100, 1, 0.5), constant_block(300, 1, 0.0)].concat();
    let out = engine.finish(&last, false).unwrap().to_vec();

    assert_eq!(engine.state(), CrossfadeState::Finished);
    assert_eq!(out.len(), 100);
    assert_eq!(engine.buffered_samples(), 1000);
    assert!(engine.buffered().iter().all(|&s| s == 0.5));
}

#[test]
fn test_trailing_trim_stops_at_length() {
    let mut engine = CrossfadeEngine::new(trimming(false, true, 0.1));
    engine.start(1, RATE).unwrap();
    process_all(&mut engine, &constant_block(2000, 1, 0.5), 100);

    let last = [constant_block(100, 1, 0.5), constant_block(300, 1, 0.0)].concat();
    let out = engine.finish(&last, false).unwrap().to_vec();

    assert_eq!(out.len(), 300);
    let held = engine.buffered();
    assert_eq!(held.len(), 1000);
    assert!(held[..800].iter().all(|&s| s == 0.5));
    assert!(held[800..].iter().all(|&s| s == 0.0));
}

#[test]
fn test_trailing_trim_disabled_keeps_silence() {
    let mut engine = CrossfadeEngine::new(test_settings(true, false));
    engine.start(1, RATE).unwrap();
    process_all(&mut engine, &constant_block(2000, 1, 0.5), 100);

    let last = [constant_block(100, 1, 0.5), constant_block(300, 1, 0.0)].concat();
    let out = engine.finish(&last, false).unwrap().to_vec();

    assert_eq!(out.len(), 400);
    assert!(engine.buffered()[700..].iter().all(|&s| s == 0.0));
}
