//! # Tuner Configuration Module
//!
//! Collects every tunable constant of the detection pipeline in one
//! serializable struct, so a settings file can override the defaults.
//!
//! ## Defaults
//! - Frame: 8192 samples at 44.1 kHz, a new frame every 735 samples (60 per second)
//! - Gates: RMS 0.005, autocorrelation confidence 0.85
//! - Smoothing: median over the last 5 accepted pitches
//! - Range: 60 Hz to 1000 Hz (guitar range with margin)

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Result, TunerError};

pub const DEFAULT_FRAME_SIZE: usize = 8192;
pub const DEFAULT_HOP_SIZE: usize = 735;
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_MIN_VOLUME: f32 = 0.005;
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.85;
pub const DEFAULT_HISTORY_LEN: usize = 5;
pub const DEFAULT_MIN_FREQUENCY: f64 = 60.0;
pub const DEFAULT_MAX_FREQUENCY: f64 = 1000.0;
pub const DEFAULT_TUNED_TOLERANCE_CENTS: i32 = 2;

/// Settings shared by capture, estimation and tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Samples per analysis frame (power of two).
    pub frame_size: usize,
    /// Samples between the starts of two consecutive frames.
    ///
    /// The default of 735 gives about 60 frames per second at 44.1 kHz, so
    /// the 5-entry median spans roughly 83 ms of input.
    pub hop_size: usize,
    /// Requested capture sample rate in Hz.
    pub sample_rate: u32,
    /// Minimum RMS loudness for a frame to be analysed.
    pub min_volume: f32,
    /// Minimum ratio of the period peak to the zero-lag autocorrelation.
    pub min_confidence: f32,
    /// Number of accepted pitches kept for median smoothing.
    pub history_len: usize,
    pub min_frequency: f64,
    pub max_frequency: f64,
    /// Readings within this many cents of the target count as in tune.
    pub tuned_tolerance_cents: i32,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            min_volume: DEFAULT_MIN_VOLUME,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            history_len: DEFAULT_HISTORY_LEN,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            tuned_tolerance_cents: DEFAULT_TUNED_TOLERANCE_CENTS,
        }
    }
}

impl TunerConfig {
    /// Checks that every field is usable by the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.frame_size < 64 || !self.frame_size.is_power_of_two() {
            return Err(TunerError::InvalidConfig(format!(
                "frame_size must be a power of two >= 64, got {}",
                self.frame_size
            )));
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(TunerError::InvalidConfig(format!(
                "hop_size must be in 1..={}, got {}",
                self.frame_size, self.hop_size
            )));
        }
        if self.sample_rate == 0 {
            return Err(TunerError::InvalidConfig("sample_rate must be positive".into()));
        }
        if !(self.min_volume >= 0.0) {
            return Err(TunerError::InvalidConfig(format!(
                "min_volume must be non-negative, got {}",
                self.min_volume
            )));
        }
        if !(self.min_confidence > 0.0 && self.min_confidence <= 1.0) {
            return Err(TunerError::InvalidConfig(format!(
                "min_confidence must be in (0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.history_len == 0 {
            return Err(TunerError::InvalidConfig("history_len must be at least 1".into()));
        }
        if !(self.min_frequency > 0.0 && self.min_frequency < self.max_frequency) {
            return Err(TunerError::InvalidConfig(format!(
                "Invalid frequency range: {} - {} Hz",
                self.min_frequency, self.max_frequency
            )));
        }
        if self.tuned_tolerance_cents < 0 {
            return Err(TunerError::InvalidConfig(format!(
                "tuned_tolerance_cents must be non-negative, got {}",
                self.tuned_tolerance_cents
            )));
        }
        Ok(())
    }

    /// Loads and validates settings from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        let config: TunerConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the settings as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TunerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_size, 8192);
        assert_eq!(config.history_len, 5);
    }

    #[test]
    fn default_hop_runs_at_display_rate() {
        let config = TunerConfig::default();
        let frames_per_second = config.sample_rate as f64 / config.hop_size as f64;
        assert!((frames_per_second - 60.0).abs() < 0.1, "{} frames/s", frames_per_second);
    }

    #[test]
    fn rejects_non_power_of_two_frames() {
        let config = TunerConfig {
            frame_size: 5000,
            ..TunerConfig::default()
        };
        assert!(matches!(config.validate(), Err(TunerError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_inverted_frequency_range() {
        let config = TunerConfig {
            min_frequency: 1000.0,
            max_frequency: 60.0,
            ..TunerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let config = TunerConfig {
            min_confidence: 1.5,
            ..TunerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: TunerConfig = serde_json::from_str(r#"{ "history_len": 7 }"#).unwrap();
        assert_eq!(config.history_len, 7);
        assert_eq!(config.min_confidence, DEFAULT_MIN_CONFIDENCE);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let path = std::env::temp_dir().join(format!("tuner_settings_{}.json", std::process::id()));
        let config = TunerConfig {
            min_volume: 0.01,
            tuned_tolerance_cents: 3,
            ..TunerConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = TunerConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_reports_missing_file() {
        let result = TunerConfig::load("/nonexistent/tuner_settings.json");
        assert!(matches!(result, Err(TunerError::Io(_))));
    }
}
