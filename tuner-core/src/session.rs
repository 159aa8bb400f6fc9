//! # Tuning Session Module
//!
//! A [`TunerSession`] ties one [`PitchEstimator`] to one [`TuningTracker`]
//! for the lifetime of a start/stop cycle. Frames must be fed one at a
//! time; the session holds no locks and is not shared between threads.

use crate::audio::AudioFrame;
use crate::config::TunerConfig;
use crate::pitch::PitchEstimator;
use crate::tracker::{TuningReading, TuningTracker};

#[derive(Debug, Clone)]
pub struct TunerSession {
    estimator: PitchEstimator,
    tracker: TuningTracker,
    active: bool,
}

impl Default for TunerSession {
    fn default() -> Self {
        Self::with_config(&TunerConfig::default())
    }
}

impl TunerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &TunerConfig) -> Self {
        Self {
            estimator: PitchEstimator::with_config(config),
            tracker: TuningTracker::with_config(config),
            active: false,
        }
    }

    /// Begins listening with a fresh history and an idle reading.
    pub fn start(&mut self) {
        self.tracker.reset();
        self.active = true;
        log::info!("[SESSION] Tuning session started");
    }

    /// Stops listening and discards the smoothing state.
    pub fn stop(&mut self) {
        if self.active {
            log::info!("[SESSION] Tuning session stopped");
        }
        self.active = false;
        self.tracker.reset();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Estimates and tracks one frame. Inactive sessions ignore frames.
    pub fn process_frame(&mut self, frame: &AudioFrame) -> TuningReading {
        if !self.active {
            return self.tracker.current();
        }
        let estimate = self.estimator.estimate(frame);
        self.tracker.ingest(estimate)
    }

    pub fn reading(&self) -> TuningReading {
        self.tracker.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::TuningStatus;

    fn sine_frame(freq: f32) -> AudioFrame {
        let samples = (0..8192)
            .map(|i| 0.4 * (2.0 * std::f32::consts::PI * freq * i as f32 / 44100.0).sin())
            .collect();
        AudioFrame::new(samples, 44100)
    }

    #[test]
    fn inactive_session_ignores_frames() {
        let mut session = TunerSession::new();
        let reading = session.process_frame(&sine_frame(440.0));
        assert_eq!(reading, TuningReading::default());
        assert!(!session.is_active());
    }

    #[test]
    fn started_session_tracks_frames() {
        let mut session = TunerSession::new();
        session.start();
        let reading = session.process_frame(&sine_frame(440.0));
        assert_eq!(reading.note.map(|n| n.to_string()).as_deref(), Some("A4"));
        assert_ne!(reading.status, TuningStatus::Idle);
    }

    #[test]
    fn stop_discards_state() {
        let mut session = TunerSession::new();
        session.start();
        session.process_frame(&sine_frame(196.0));
        session.stop();
        assert_eq!(session.reading(), TuningReading::default());

        // A restarted session begins from an empty window.
        session.start();
        let silence = AudioFrame::new(vec![0.0; 8192], 44100);
        assert_eq!(session.process_frame(&silence).status, TuningStatus::Idle);
        assert!(session.reading().note.is_none());
    }
}
