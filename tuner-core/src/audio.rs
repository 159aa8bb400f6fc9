//! # Audio Capture Module
//!
//! Real-time microphone capture using CPAL (Cross-Platform Audio Library).
//! The stream callback feeds a [`FrameAssembler`], which emits overlapping
//! fixed-size [`AudioFrame`]s so the analysis always sees the newest
//! `frame_size` samples, refreshed every `hop_size` samples.
//!
//! ## Features
//! - Default input device selection
//! - Prefers mono 32-bit float at the configured sample rate
//! - Multi-channel input is downmixed to mono
//! - Frames are dropped, never queued, when the analysis falls behind

use anyhow::{Context, Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Sender, TrySendError};

use crate::config::TunerConfig;

/// One frame of mono time-domain samples and the rate they were taken at.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioFrame {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Cuts a continuous sample stream into overlapping frames.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    frame_size: usize,
    hop_size: usize,
    sample_rate: u32,
    buffer: Vec<f32>,
}

impl FrameAssembler {
    /// `hop_size` is clamped to `1..=frame_size`.
    pub fn new(frame_size: usize, hop_size: usize, sample_rate: u32) -> Self {
        let frame_size = frame_size.max(1);
        Self {
            frame_size,
            hop_size: hop_size.clamp(1, frame_size),
            sample_rate,
            buffer: Vec::with_capacity(frame_size * 2),
        }
    }

    /// Appends samples and calls `emit` for every frame that became complete.
    pub fn push(&mut self, data: &[f32], mut emit: impl FnMut(AudioFrame)) {
        // Append new data to our buffer.
        self.buffer.extend_from_slice(data);

        // While we have enough data for a full frame, process it.
        while self.buffer.len() >= self.frame_size {
            let frame = self.buffer[..self.frame_size].to_vec();
            emit(AudioFrame::new(frame, self.sample_rate));

            // Slide the window forward by one hop.
            self.buffer.drain(..self.hop_size);
        }
    }

    /// Samples held back for the next frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Starts audio capture from the default input device.
///
/// # Arguments
/// * `config` - Frame size, hop size and requested sample rate
/// * `sender` - Channel for complete frames; full channels drop frames
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running stream handle and the actual sample rate
/// * `Err(e)` - No device, no usable format, or the stream failed to start
pub fn start_audio_capture(
    config: &TunerConfig,
    sender: Sender<AudioFrame>,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    log::info!("[AUDIO] Using audio input device: {}", device.name()?);

    let configs = device
        .supported_input_configs()
        .context("Failed to query input configurations")?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, config.sample_rate)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let sample_rate = cpal::SampleRate(config.sample_rate.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    ));
    let stream_config = supported_config.with_sample_rate(sample_rate);

    let sample_rate_val = stream_config.sample_rate().0;
    let channels = stream_config.channels() as usize;
    let stream_config: cpal::StreamConfig = stream_config.into();

    log::info!(
        "[AUDIO] Selected sample rate: {} Hz, {} channel(s)",
        sample_rate_val,
        channels
    );

    let err_fn = |err| log::error!("[AUDIO] An error occurred on the audio stream: {}", err);

    let mut assembler = FrameAssembler::new(config.frame_size, config.hop_size, sample_rate_val);
    let mut mono = Vec::new();

    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let samples = if channels > 1 {
                downmix(data, channels, &mut mono);
                mono.as_slice()
            } else {
                data
            };

            assembler.push(samples, |frame| {
                if let Err(TrySendError::Full(_)) = sender.try_send(frame) {
                    log::warn!("[AUDIO] Analysis is behind, dropping frame");
                }
            });
        },
        err_fn,
        None,
    )?;

    stream.play().context("Failed to start the input stream")?;

    Ok((stream, sample_rate_val))
}

/// Averages interleaved channels into `out`.
fn downmix(data: &[f32], channels: usize, out: &mut Vec<f32>) {
    out.clear();
    out.extend(
        data.chunks_exact(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32),
    );
}

/// Finds the best supported f32 input configuration for the target rate.
///
/// Mono configurations win over multi-channel ones; within the same
/// channel count the closest sample-rate range wins.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min_rate = c.min_sample_rate().0;
            let max_rate = c.max_sample_rate().0;
            let rate_diff = if (min_rate..=max_rate).contains(&target_rate) {
                0
            } else {
                (min_rate as i64 - target_rate as i64)
                    .abs()
                    .min((max_rate as i64 - target_rate as i64).abs())
            };
            (c.channels() != 1, rate_diff)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembler_waits_for_a_full_frame() {
        let mut assembler = FrameAssembler::new(8, 4, 44100);
        let mut frames = Vec::new();
        assembler.push(&[0.0; 7], |f| frames.push(f));
        assert!(frames.is_empty());
        assert_eq!(assembler.pending(), 7);
    }

    #[test]
    fn assembler_emits_overlapping_frames() {
        let mut assembler = FrameAssembler::new(4, 2, 48000);
        let data: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let mut frames = Vec::new();
        assembler.push(&data, |f| frames.push(f));

        let starts: Vec<f32> = frames.iter().map(|f| f.samples[0]).collect();
        assert_eq!(starts, vec![0.0, 2.0, 4.0]);
        assert!(frames.iter().all(|f| f.len() == 4 && f.sample_rate == 48000));
        assert_eq!(assembler.pending(), 2);
    }

    #[test]
    fn assembler_handles_chunked_input() {
        let mut assembler = FrameAssembler::new(4, 4, 44100);
        let mut frames = Vec::new();
        for chunk in [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]] {
            assembler.push(&chunk, |f| frames.push(f));
        }
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].samples, vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn downmix_averages_channels() {
        let mut out = Vec::new();
        downmix(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, &mut out);
        assert_eq!(out, vec![0.5, 0.5, 0.0]);
    }
}
