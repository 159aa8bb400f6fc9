//! # Tuning Tracker Module
//!
//! Turns the per-frame pitch estimates of a tuning session into a stable
//! display reading.
//!
//! Each accepted pitch goes into a short FIFO history and the reading is
//! computed from the history median, so a single glitchy frame cannot move
//! the needle. Any dropout (no pitch, or a pitch outside the instrument
//! range) clears the history and sets the status to idle.

use std::collections::VecDeque;

use crate::config::TunerConfig;
use crate::pitch::{PitchEstimate, Rejection};
use crate::tuning::{self, Note, TuningStatus};

/// Bounded FIFO of the most recently accepted frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchHistory {
    capacity: usize,
    pitches: VecDeque<f64>,
}

impl PitchHistory {
    /// Creates an empty history. A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            pitches: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a pitch, evicting the oldest one when full.
    pub fn push(&mut self, pitch: f64) {
        if self.pitches.len() == self.capacity {
            self.pitches.pop_front();
        }
        self.pitches.push_back(pitch);
    }

    pub fn clear(&mut self) {
        self.pitches.clear();
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.pitches.iter()
    }

    /// Median of the history; for even lengths, the upper of the two
    /// middle values (index `len / 2` of the ascending order).
    pub fn median(&self) -> Option<f64> {
        if self.pitches.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.pitches.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        Some(sorted[sorted.len() / 2])
    }
}

/// What the display shows for the current frame.
///
/// On a dropout only `status` changes to [`TuningStatus::Idle`]; the note,
/// frequency and cents of the last accepted frame are kept so the display
/// can dim them instead of blanking. `note` is `None` until the first
/// detection of a session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TuningReading {
    pub note: Option<Note>,
    /// Median-smoothed frequency in Hz.
    pub frequency: f64,
    /// Signed offset from `note` in whole cents.
    pub cents: i32,
    pub status: TuningStatus,
}

impl TuningReading {
    /// True when the reading reflects the current frame.
    pub fn is_active(&self) -> bool {
        !self.status.is_idle()
    }

    /// Needle position in percent of the meter width: 50 is centre,
    /// offsets are clamped to +/-50 cents.
    pub fn needle_position(&self) -> f32 {
        50.0 + self.cents.clamp(-50, 50) as f32
    }
}

/// Stateful median smoother and note mapper for one tuning session.
#[derive(Debug, Clone)]
pub struct TuningTracker {
    history: PitchHistory,
    current: TuningReading,
    min_frequency: f64,
    max_frequency: f64,
    tuned_tolerance_cents: i32,
}

impl Default for TuningTracker {
    fn default() -> Self {
        Self::with_config(&TunerConfig::default())
    }
}

impl TuningTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &TunerConfig) -> Self {
        Self {
            history: PitchHistory::new(config.history_len),
            current: TuningReading::default(),
            min_frequency: config.min_frequency,
            max_frequency: config.max_frequency,
            tuned_tolerance_cents: config.tuned_tolerance_cents,
        }
    }

    /// Feeds one frame's estimate and returns the updated reading.
    pub fn ingest(&mut self, estimate: PitchEstimate) -> TuningReading {
        match estimate {
            PitchEstimate::Detected(freq) if self.in_range(freq) => self.accept(freq),
            PitchEstimate::Detected(frequency) => {
                log::trace!("[TRACKER] {}", Rejection::OutOfRange { frequency });
                self.drop_out()
            }
            PitchEstimate::NoPitch => self.drop_out(),
        }
    }

    /// Clears the history and returns to an empty idle reading.
    pub fn reset(&mut self) {
        self.history.clear();
        self.current = TuningReading::default();
    }

    /// The most recent reading, idle or not.
    pub fn current(&self) -> TuningReading {
        self.current
    }

    /// The most recent reading only while it is live.
    pub fn active_reading(&self) -> Option<TuningReading> {
        self.current.is_active().then_some(self.current)
    }

    pub fn history(&self) -> &PitchHistory {
        &self.history
    }

    fn in_range(&self, freq: f64) -> bool {
        freq >= self.min_frequency && freq <= self.max_frequency
    }

    fn accept(&mut self, freq: f64) -> TuningReading {
        self.history.push(freq);

        let Some(median_pitch) = self.history.median() else {
            return self.drop_out();
        };

        let note_number = tuning::note_from_pitch(median_pitch);
        let cents = tuning::cents_off_from_pitch(median_pitch, note_number);
        let status = TuningStatus::from_cents(cents, self.tuned_tolerance_cents);

        if status != self.current.status {
            log::debug!(
                "[TRACKER] {} -> {} ({} {:+} cents)",
                self.current.status,
                status,
                Note::from_number(note_number),
                cents
            );
        }

        self.current = TuningReading {
            note: Some(Note::from_number(note_number)),
            frequency: median_pitch,
            cents,
            status,
        };
        self.current
    }

    fn drop_out(&mut self) -> TuningReading {
        self.history.clear();
        if !self.current.status.is_idle() {
            log::debug!("[TRACKER] {} -> idle", self.current.status);
        }
        self.current.status = TuningStatus::Idle;
        self.current
    }
}
