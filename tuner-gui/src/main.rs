//! # Chromatic Tuner - GUI
//!
//! Desktop front end for the tuner core. It owns the tuning session
//! lifecycle (start/stop) and renders the current reading.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application with dark theme
//! - **Audio Thread**: Captures frames and runs the tuning session on them, one at a time
//! - **Communication**: Crossbeam channels for frames, readings and shutdown
//! - **Updates**: 60 FPS polling via subscription while listening

mod ui;

use anyhow::Context;
use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, Sender};
use iced::{Element, Subscription, Theme};
use std::thread::{self, JoinHandle};
use tuner_core::{audio, AudioFrame, TunerConfig, TunerSession, TuningReading};
use ui::main_display::create_main_view;

/// Settings file read from the working directory at startup.
const SETTINGS_PATH: &str = "tuner_settings.json";

/// Frames waiting for analysis before capture starts dropping them.
const FRAME_QUEUE_DEPTH: usize = 4;

/// Main entry point for the tuner application.
pub fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("[MAIN] Starting tuner application...");
    let result = iced::application("Chromatic Tuner", TunerApp::update, TunerApp::view)
        .subscription(TunerApp::subscription)
        .theme(TunerApp::theme)
        .run();
    log::info!("[MAIN] Application finished with result: {:?}", result);
    result
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    /// Start or stop the tuning session
    ToggleListening,
    /// Timer tick for real-time updates
    Tick,
}

/// Everything the view needs to draw one frame.
#[derive(Debug, Clone, Default)]
pub struct AppDisplayData {
    pub listening: bool,
    pub reading: TuningReading,
    /// Last capture failure, shown under the button.
    pub error: Option<String>,
}

/// Messages from the audio thread to the GUI.
#[derive(Debug, Clone)]
enum WorkerEvent {
    Reading(TuningReading),
    Failed(String),
}

#[derive(Debug)]
struct TunerApp {
    config: TunerConfig,
    audio_worker: Option<AudioWorker>,
    display_data: AppDisplayData,
}

/// Handle to the audio thread of an active session.
#[derive(Debug)]
struct AudioWorker {
    shutdown_tx: Sender<()>,
    event_rx: Receiver<WorkerEvent>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AudioWorker {
    /// Spawns the audio thread and starts a fresh tuning session on it.
    fn spawn(config: TunerConfig) -> Self {
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);

        let thread_handle = thread::spawn(move || {
            log::info!("[AUDIO-THREAD] Starting audio thread...");
            if let Err(e) = run_session(&config, &event_tx, &shutdown_rx) {
                log::error!("[AUDIO-THREAD] {:#}", e);
                let _ = event_tx.send(WorkerEvent::Failed(format!("{:#}", e)));
            }
            log::info!("[AUDIO-THREAD] Audio thread finished");
        });

        Self {
            shutdown_tx,
            event_rx,
            thread_handle: Some(thread_handle),
        }
    }

    /// Signals the audio thread and waits for it to release the device.
    fn shutdown(&mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("[MAIN] Audio thread panicked");
            }
        }
    }
}

impl Drop for AudioWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Capture loop of the audio thread.
///
/// Frames are processed strictly in arrival order; the session is dropped
/// with the thread, so a restart always begins from an empty history.
fn run_session(
    config: &TunerConfig,
    event_tx: &Sender<WorkerEvent>,
    shutdown_rx: &Receiver<()>,
) -> anyhow::Result<()> {
    let (frame_tx, frame_rx) = crossbeam_channel::bounded::<AudioFrame>(FRAME_QUEUE_DEPTH);
    let (stream, sample_rate) =
        audio::start_audio_capture(config, frame_tx).context("Could not start audio capture")?;
    log::info!("[AUDIO-THREAD] Capturing at {} Hz", sample_rate);

    let mut session = TunerSession::with_config(config);
    session.start();

    loop {
        crossbeam_channel::select! {
            recv(frame_rx) -> msg => match msg {
                Ok(frame) => {
                    let reading = session.process_frame(&frame);
                    if event_tx.send(WorkerEvent::Reading(reading)).is_err() {
                        log::warn!("[AUDIO-THREAD] GUI went away, stopping");
                        break;
                    }
                }
                Err(_) => {
                    log::warn!("[AUDIO-THREAD] Audio channel closed");
                    break;
                }
            },
            recv(shutdown_rx) -> _ => {
                log::info!("[AUDIO-THREAD] Received shutdown signal");
                break;
            },
        }
    }

    session.stop();
    if let Err(e) = stream.pause() {
        log::warn!("[AUDIO-THREAD] Error pausing stream: {}", e);
    }
    drop(stream);
    Ok(())
}

impl Default for TunerApp {
    fn default() -> Self {
        let config = match TunerConfig::load(SETTINGS_PATH) {
            Ok(config) => {
                log::info!("[MAIN] Loaded settings from {}", SETTINGS_PATH);
                config
            }
            Err(e) => {
                log::warn!("[MAIN] Using default settings ({}: {})", SETTINGS_PATH, e);
                TunerConfig::default()
            }
        };

        Self {
            config,
            audio_worker: None,
            display_data: AppDisplayData::default(),
        }
    }
}

impl TunerApp {
    fn update(&mut self, message: Message) {
        match message {
            Message::ToggleListening => {
                if self.display_data.listening {
                    self.stop_listening();
                } else {
                    self.start_listening();
                }
            }
            Message::Tick => self.poll_worker(),
        }
    }

    fn start_listening(&mut self) {
        log::info!("[MAIN] Starting tuner");
        self.display_data = AppDisplayData {
            listening: true,
            ..AppDisplayData::default()
        };
        self.audio_worker = Some(AudioWorker::spawn(self.config.clone()));
    }

    fn stop_listening(&mut self) {
        log::info!("[MAIN] Stopping tuner");
        if let Some(mut worker) = self.audio_worker.take() {
            worker.shutdown();
        }
        self.display_data.listening = false;
        self.display_data.reading = TuningReading::default();
    }

    /// Drains everything the audio thread produced since the last tick.
    fn poll_worker(&mut self) {
        let events: Vec<WorkerEvent> = match &self.audio_worker {
            Some(worker) => worker.event_rx.try_iter().collect(),
            None => return,
        };

        for event in events {
            match event {
                WorkerEvent::Reading(reading) => self.display_data.reading = reading,
                WorkerEvent::Failed(error) => {
                    self.stop_listening();
                    self.display_data.error = Some(error);
                    return;
                }
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    /// Fires every 16ms (60 FPS) while a session is running.
    fn subscription(&self) -> Subscription<Message> {
        if self.display_data.listening {
            iced::time::every(std::time::Duration::from_millis(16)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}
