//! # Musical Tuning Module
//!
//! Equal-temperament note math around A4 = 440 Hz (MIDI note 69).
//!
//! ## Features
//! - Frequency to nearest MIDI note number
//! - MIDI note number to frequency
//! - Cent offset from the nearest note, truncated toward negative infinity
//! - Note naming with octave (C4 = middle C, MIDI 60)
//! - Tuned / flat / sharp classification

use std::fmt;

/// Concert pitch of A4 in Hz.
pub const A4_FREQUENCY: f64 = 440.0;

/// MIDI note number of A4.
pub const A4_NOTE_NUMBER: i32 = 69;

/// Pitch class names, indexed by `note_number mod 12`.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A named note: pitch class plus octave, e.g. "A4".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// MIDI note number (A4 = 69).
    pub number: i32,
    pub name: &'static str,
    pub octave: i32,
}

impl Note {
    pub fn from_number(number: i32) -> Self {
        Self {
            number,
            name: NOTE_NAMES[number.rem_euclid(12) as usize],
            octave: number.div_euclid(12) - 1,
        }
    }

    /// Equal-temperament frequency of this note.
    pub fn frequency(&self) -> f64 {
        frequency_from_note_number(self.number)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

/// Nearest MIDI note number for a frequency.
///
/// `round(12 * log2(freq / 440)) + 69`, with halves rounded up.
pub fn note_from_pitch(freq: f64) -> i32 {
    let semitones = 12.0 * (freq / A4_FREQUENCY).log2();
    (semitones + 0.5).floor() as i32 + A4_NOTE_NUMBER
}

/// Equal-temperament frequency of a MIDI note number.
pub fn frequency_from_note_number(note: i32) -> f64 {
    A4_FREQUENCY * 2.0_f64.powf((note - A4_NOTE_NUMBER) as f64 / 12.0)
}

/// Deviation of `freq` from `note` in whole cents.
///
/// Uses `floor`, not `round`: a raw offset of -1.9 reports -2 and +1.9
/// reports +1. Readings depend on this asymmetry.
pub fn cents_off_from_pitch(freq: f64, note: i32) -> i32 {
    calculate_cents_deviation(freq, frequency_from_note_number(note)).floor() as i32
}

/// Raw deviation from a target frequency in cents.
///
/// Positive values are sharp, negative values are flat.
pub fn calculate_cents_deviation(freq: f64, target_freq: f64) -> f64 {
    1200.0 * (freq / target_freq).log2()
}

/// Tuning classification shown next to the needle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TuningStatus {
    /// No current reading.
    #[default]
    Idle,
    Tuned,
    Flat,
    Sharp,
}

impl TuningStatus {
    /// Classifies a cent offset. `tolerance` is inclusive.
    pub fn from_cents(cents: i32, tolerance: i32) -> Self {
        if cents.abs() <= tolerance {
            TuningStatus::Tuned
        } else if cents < 0 {
            TuningStatus::Flat
        } else {
            TuningStatus::Sharp
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == TuningStatus::Idle
    }
}

impl fmt::Display for TuningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TuningStatus::Idle => "idle",
            TuningStatus::Tuned => "tuned",
            TuningStatus::Flat => "flat",
            TuningStatus::Sharp => "sharp",
        };
        f.write_str(label)
    }
}
