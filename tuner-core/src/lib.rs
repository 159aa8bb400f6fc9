// tuner-core/src/lib.rs

//! The core logic for the instrument tuner.
//! This crate is responsible for audio capture, pitch detection,
//! median smoothing and note/cent mapping. It is completely headless
//! and contains no GUI code.

pub mod audio;
pub mod config;
pub mod error;
pub mod fft;
pub mod pitch;
pub mod session;
pub mod tracker;
pub mod tuning;

pub use audio::AudioFrame;
pub use config::TunerConfig;
pub use error::TunerError;
pub use pitch::{Detection, PitchEstimate, PitchEstimator, Rejection};
pub use session::TunerSession;
pub use tracker::{PitchHistory, TuningReading, TuningTracker};
pub use tuning::{Note, TuningStatus};
