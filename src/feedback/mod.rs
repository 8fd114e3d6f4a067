//! Audio feedback after a verification.
//!
//! Playback is best-effort: an environment without audio output must not
//! turn a successful verification into an error.

mod tone;

pub use tone::{Tone, ToneProfile};

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Capability to play a short outcome tone.
pub trait AudioFeedback {
    /// Plays `tone`. Failures are logged, never returned.
    fn play_tone(&self, tone: Tone);
}

/// Feedback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioFeedback for Silent {
    fn play_tone(&self, _tone: Tone) {}
}

/// Rings the terminal bell on stderr: once for success, twice for failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl AudioFeedback for TerminalBell {
    fn play_tone(&self, tone: Tone) {
        let profile = tone.profile();
        let bells = "\x07".repeat(profile.bell_count());
        let mut stderr = std::io::stderr();
        match stderr.write_all(bells.as_bytes()).and_then(|()| stderr.flush()) {
            Ok(()) => tracing::trace!(
                ?tone,
                start_hz = profile.start_hz,
                end_hz = profile.end_hz,
                "Rang terminal bell"
            ),
            Err(e) => tracing::debug!(error = %e, ?tone, "Audio feedback unavailable"),
        }
    }
}

/// Records played tones in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct ToneLog {
    played: Arc<Mutex<Vec<Tone>>>,
}

impl ToneLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tones played so far, oldest first.
    pub fn played(&self) -> Vec<Tone> {
        self.played
            .lock()
            .map(|played| played.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Tone> {
        self.played().last().copied()
    }
}

impl AudioFeedback for ToneLog {
    fn play_tone(&self, tone: Tone) {
        match self.played.lock() {
            Ok(mut played) => played.push(tone),
            Err(_) => tracing::debug!(?tone, "Tone log poisoned"),
        }
    }
}

impl<T: AudioFeedback + ?Sized> AudioFeedback for Box<T> {
    fn play_tone(&self, tone: Tone) {
        (**self).play_tone(tone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_log_shared_between_clones() {
        let log = ToneLog::new();
        let handle = log.clone();

        handle.play_tone(Tone::Success);
        handle.play_tone(Tone::Failure);

        assert_eq!(log.played(), vec![Tone::Success, Tone::Failure]);
        assert_eq!(log.last(), Some(Tone::Failure));
    }

    #[test]
    fn test_boxed_feedback_forwards() {
        let log = ToneLog::new();
        let boxed: Box<dyn AudioFeedback> = Box::new(log.clone());
        boxed.play_tone(Tone::Success);
        assert_eq!(log.last(), Some(Tone::Success));
    }
}
