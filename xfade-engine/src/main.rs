//! Crossfade simulator (xfade-sim) - Main entry point
//!
//! Drives the crossfade engine the way a playback host would: a playlist of
//! synthetic tone tracks is fed block by block through `start`, `process`,
//! optional `flush` (simulated seek), and `finish`, and the frame accounting
//! and reported latency are printed per track.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xfade_common::config::load_settings;
use xfade_common::{CrossfadeSettings, MemorySettings};
use xfade_engine::{CrossfadeEngine, EffectPlugin, StreamFormat};

/// Command-line arguments for xfade-sim
#[derive(Parser, Debug)]
#[command(name = "xfade-sim")]
#[command(about = "Run synthetic tracks through the crossfade engine")]
#[command(version)]
struct Args {
    /// Settings file (TOML with a [crossfade] table)
    #[arg(short, long, env = "XFADE_CONFIG")]
    config: Option<PathBuf>,

    /// Override a crossfade setting, e.g. --set length=3
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Number of tracks in the playlist
    #[arg(short, long, default_value = "3")]
    tracks: usize,

    /// Length of each track in seconds
    #[arg(long, default_value = "8.0")]
    track_seconds: f64,

    /// Channel count
    #[arg(long, default_value = "2")]
    channels: u32,

    /// Sample rate in Hz
    #[arg(long, default_value = "44100")]
    rate: u32,

    /// Play every second track at this rate to exercise format changes
    #[arg(long)]
    alternate_rate: Option<u32>,

    /// Host block size in milliseconds
    #[arg(long, default_value = "50")]
    block_ms: u32,

    /// Seek (manual flush) this many seconds into each track
    #[arg(long)]
    seek_at: Option<f64>,

    /// Minimum release in seconds while running
    #[arg(long, default_value = "0.5")]
    release_batch: f64,
}

/// Frame accounting for one track
#[derive(Debug, Default)]
struct TrackReport {
    format: Option<StreamFormat>,
    samples_in: usize,
    samples_out: usize,
    peak: f32,
    delay_ms: i64,
    flushed: bool,
}

impl TrackReport {
    fn record(&mut self, output: &[f32]) {
        self.samples_out += output.len();
        self.peak = output.iter().fold(self.peak, |peak, s| peak.max(s.abs()));
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xfade_engine=info,xfade_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.tracks == 0 {
        bail!("playlist must contain at least one track");
    }
    if args.block_ms == 0 {
        bail!("block size must be positive");
    }

    let store = Arc::new(build_settings(&args)?);
    let settings = CrossfadeSettings::load(&store);
    info!(
        "Crossfade settings: automatic={} length={}s manual={} manual_length={}s",
        settings.automatic, settings.length, settings.manual, settings.manual_length
    );

    let engine = CrossfadeEngine::new(Arc::clone(&store)).with_release_batch(args.release_batch);
    let mut plugin: Box<dyn EffectPlugin> = Box::new(engine);

    let mut reports = Vec::with_capacity(args.tracks);
    for track in 0..args.tracks {
        let report = play_track(plugin.as_mut(), &args, track)
            .with_context(|| format!("Track {} failed", track + 1))?;
        reports.push(report);
    }

    print_summary(&reports);
    Ok(())
}

/// Resolve the settings file and apply command-line overrides
fn build_settings(args: &Args) -> Result<MemorySettings> {
    let file = load_settings(args.config.as_deref(), "XFADE_CONFIG")
        .context("Failed to load settings file")?;

    let base = match &file {
        Some(source) => source
            .crossfade_settings()
            .context("Invalid [crossfade] table in settings file")?,
        None => {
            debug!("No settings file found, using defaults");
            CrossfadeSettings::default()
        }
    };

    let store = MemorySettings::from_settings(&base);
    for entry in &args.overrides {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("Override {:?} is not KEY=VALUE", entry))?;
        store
            .set_crossfade_param(key.trim(), value)
            .with_context(|| format!("Invalid override {:?}", entry))?;
    }

    Ok(store)
}

fn play_track(plugin: &mut dyn EffectPlugin, args: &Args, track: usize) -> Result<TrackReport> {
    let rate = match args.alternate_rate {
        Some(alt) if track % 2 == 1 => alt,
        _ => args.rate,
    };
    let format = plugin.start(StreamFormat::new(args.channels, rate)?)?;

    let frequency = 220.0 * (track + 1) as f32;
    let total_frames = (args.track_seconds * rate as f64).round() as usize;
    let block_frames = ((rate as u64 * args.block_ms as u64) / 1000).max(1) as usize;
    let seek_frame = args
        .seek_at
        .map(|s| (s * rate as f64).round() as usize)
        .filter(|&f| f < total_frames);
    let last_track = track + 1 == args.tracks;

    info!("Track {}: {} Hz tone, {}s, {}", track + 1, frequency, args.track_seconds, format);

    let mut report = TrackReport {
        format: Some(format),
        ..TrackReport::default()
    };
    let mut block = Vec::with_capacity(block_frames * format.channel_count());
    let mut position = 0;

    while position < total_frames {
        let frames = block_frames.min(total_frames - position);
        fill_tone(&mut block, format, frequency, position, frames);
        report.samples_in += block.len();
        position += frames;

        if position >= total_frames {
            let output = plugin.finish(&block, last_track)?;
            report.record(output);
        } else {
            let output = plugin.process(&block)?;
            report.record(output);
        }

        if let Some(seek) = seek_frame {
            if !report.flushed && position >= seek && position < total_frames {
                let discard = plugin.flush(false);
                debug!("Seek at frame {}: host may discard = {}", position, discard);
                report.flushed = true;
            }
        }
    }

    report.delay_ms = plugin.adjust_delay(0);
    Ok(report)
}

/// Generate `frames` frames of a sine tone starting at frame `offset`
fn fill_tone(block: &mut Vec<f32>, format: StreamFormat, frequency: f32, offset: usize, frames: usize) {
    block.clear();
    let step = 2.0 * std::f32::consts::PI * frequency / format.rate as f32;
    for i in 0..frames {
        let value = 0.5 * (step * (offset + i) as f32).sin();
        block.extend(std::iter::repeat(value).take(format.channel_count()));
    }
}

fn print_summary(reports: &[TrackReport]) {
    println!("track  format            in(frames)  out(frames)  peak    held(ms)  seek");
    for (i, report) in reports.iter().enumerate() {
        let Some(format) = report.format else {
            continue;
        };
        println!(
            "{:>5}  {:<16}  {:>10}  {:>11}  {:>6.3}  {:>8}  {}",
            i + 1,
            format.to_string(),
            format.frames_in(report.samples_in),
            format.frames_in(report.samples_out),
            report.peak,
            report.delay_ms,
            if report.flushed { "yes" } else { "no" }
        );
    }
}
