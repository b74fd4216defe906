//! Silence detection at track edges
//!
//! A frame is silent when every channel's absolute value is below the
//! level. Scans stop at the first audible frame or after `max_samples`,
//! and always return whole frames.

fn is_silent(frame: &[f32], level: f32) -> bool {
    frame.iter().all(|s| s.abs() < level)
}

/// Samples of silence at the start of `data`, at most `max_samples`
pub fn leading_silence(data: &[f32], channels: usize, level: f32, max_samples: usize) -> usize {
    if channels == 0 {
        return 0;
    }

    let limit = (max_samples.min(data.len()) / channels) * channels;
    let frames = data[..limit]
        .chunks_exact(channels)
        .take_while(|frame| is_silent(frame, level))
        .count();
    frames * channels
}

/// Samples of silence at the end of `data`, at most `max_samples`
pub fn trailing_silence(data: &[f32], channels: usize, level: f32, max_samples: usize) -> usize {
    if channels == 0 {
        return 0;
    }

    let limit = (max_samples.min(data.len()) / channels) * channels;
    let frames = data[data.len() - limit..]
        .rchunks_exact(channels)
        .take_while(|frame| is_silent(frame, level))
        .count();
    frames * channels
}
