//! Crossfade state machine states

use std::fmt;

/// Position of the engine in the track-boundary cycle
///
/// ```text
///  Off ──start──▶ Running ──finish──▶ Finished ──process──▶ FadeIn ──▶ Running
///   │                ▲  └──flush(manual)──▶ Flushed ──process──┘
///   └──start(manual)─┴──────────────────────▶ Flushed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossfadeState {
    /// Effect inactive; audio passes through untouched
    #[default]
    Off,

    /// New track being ramped in on top of the faded-out tail
    FadeIn {
        /// Frames of the internal buffer already mixed with incoming audio
        fade_in_point: usize,
    },

    /// Steady playback, holding back the overlap window
    Running,

    /// Track ended on its own; tail held for the automatic crossfade
    Finished,

    /// Seek or manual change; tail held for the manual crossfade
    Flushed,
}

impl CrossfadeState {
    /// Whether the engine is buffering audio
    pub fn is_active(&self) -> bool {
        !matches!(self, CrossfadeState::Off)
    }

    /// Whether a tail is waiting to be faded out by the next track
    pub fn holds_tail(&self) -> bool {
        matches!(self, CrossfadeState::Finished | CrossfadeState::Flushed)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CrossfadeState::Off => "off",
            CrossfadeState::FadeIn { .. } => "fade-in",
            CrossfadeState::Running => "running",
            CrossfadeState::Finished => "finished",
            CrossfadeState::Flushed => "flushed",
        }
    }
}

impl fmt::Display for CrossfadeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossfadeState::FadeIn { fade_in_point } => {
                write!(f, "{} ({} frames)", self.name(), fade_in_point)
            }
            _ => f.write_str(self.name()),
        }
    }
}
