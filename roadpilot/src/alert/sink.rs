//! Audible alert output.

use std::io::Write;
use std::time::Duration;

use parking_lot::Mutex;

/// An alert sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Speed has gone over the limit.
    OverLimit,
    /// A hazard has appeared.
    Hazard,
}

impl Tone {
    pub fn duration(&self) -> Duration {
        match self {
            Tone::OverLimit => Duration::from_millis(200),
            Tone::Hazard => Duration::from_millis(150),
        }
    }
}

/// Plays tones. Implementations must return without waiting for the tone
/// to finish.
pub trait AlertSink: Send + Sync {
    fn play_tone(&self, tone: Tone);
}

/// Discards every tone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl AlertSink for SilentSink {
    fn play_tone(&self, _tone: Tone) {}
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBellSink;

impl AlertSink for TerminalBellSink {
    fn play_tone(&self, _tone: Tone) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

/// Keeps every tone it was asked to play.
#[derive(Debug, Default)]
pub struct RecordingSink {
    tones: Mutex<Vec<Tone>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tones(&self) -> Vec<Tone> {
        self.tones.lock().clone()
    }
}

impl AlertSink for RecordingSink {
    fn play_tone(&self, tone: Tone) {
        self.tones.lock().push(tone);
    }
}
