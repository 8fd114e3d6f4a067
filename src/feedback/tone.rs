//! Feedback tone shapes.

use std::time::Duration;

/// Outcome signalled to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Success,
    Failure,
}

/// Two-step oscillator envelope.
///
/// The tone starts at `start_hz`, jumps to `end_hz` at `step_at`, and
/// decays exponentially from `gain` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneProfile {
    pub start_hz: f32,
    pub end_hz: f32,
    pub step_at: Duration,
    pub duration: Duration,
    pub gain: f32,
}

impl Tone {
    /// Envelope for this tone. Success rises, failure falls.
    pub fn profile(self) -> ToneProfile {
        match self {
            Self::Success => ToneProfile {
                start_hz: 800.0,
                end_hz: 1000.0,
                step_at: Duration::from_millis(100),
                duration: Duration::from_millis(300),
                gain: 0.3,
            },
            Self::Failure => ToneProfile {
                start_hz: 300.0,
                end_hz: 200.0,
                step_at: Duration::from_millis(100),
                duration: Duration::from_millis(200),
                gain: 0.3,
            },
        }
    }

    /// Number of terminal bells used to render the tone.
    pub fn bell_count(self) -> usize {
        self.profile().bell_count()
    }
}

impl ToneProfile {
    /// One bell for a rising tone, two for a falling one.
    pub fn bell_count(&self) -> usize {
        if self.end_hz > self.start_hz {
            1
        } else {
            2
        }
    }
}
