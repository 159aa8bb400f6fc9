//! # Main Display Module
//!
//! Layout of the tuner window: start/stop button, note and frequency
//! labels, the cent meter with its scale, and the status line.

use iced::widget::{button, column, container, horizontal_space, row, text, Row, Space};
use iced::{Alignment, Color, Element, Length};
use tuner_core::{TuningReading, TuningStatus};

use super::cent_meter::{self, CentMeter, METER_RANGE};

/// Creates the complete main application view
pub fn create_main_view(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let title = text("Chromatic Tuner").size(36);

    let mut content = column![
        title,
        Space::with_height(20),
        make_toggle_button(data.listening),
    ]
    .align_x(Alignment::Center)
    .spacing(10);

    if let Some(error) = &data.error {
        content = content.push(text(error.clone()).size(16).color(cent_meter::SHARP_COLOR));
    }

    if data.listening {
        content = content.push(Space::with_height(20)).push(create_reading_panel(&data.reading));
    }

    container(content.max_width(720.0).padding(20))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

fn make_toggle_button(listening: bool) -> Element<'static, crate::Message> {
    let (label, color) = if listening {
        ("Stop Tuner", cent_meter::SHARP_COLOR)
    } else {
        ("Start Tuner", Color::from_rgb(0.85, 0.34, 0.0))
    };

    button(text(label).size(20))
        .padding([12, 40])
        .style(move |_theme, _status| {
            use iced::widget::button;
            button::Style {
                background: Some(iced::Background::Color(color)),
                text_color: Color::WHITE,
                ..button::Style::default()
            }
        })
        .on_press(crate::Message::ToggleListening)
        .into()
}

/// Note, frequency, meter and status for the current reading.
fn create_reading_panel(reading: &TuningReading) -> Element<'static, crate::Message> {
    let note_color = if reading.is_active() {
        Color::from_rgb(0.85, 0.34, 0.0)
    } else {
        cent_meter::IDLE_COLOR
    };

    column![
        text(note_label(reading)).size(96).color(note_color),
        text(format!("{:.1} Hz", reading.frequency)).size(24),
        Space::with_height(20),
        CentMeter::new(*reading).view(),
        make_scale(),
        Space::with_height(20),
        text(status_label(reading)).size(28).color(cent_meter::status_color(reading.status)),
        text(format!("{} cents", format_cents(reading.cents))).size(20),
    ]
    .align_x(Alignment::Center)
    .spacing(5)
    .into()
}

/// Tick labels under the meter: -50 ... +50 in steps of 10.
fn make_scale() -> Element<'static, crate::Message> {
    let ticks: Vec<i32> = (-METER_RANGE..=METER_RANGE).step_by(10).collect();
    let last = ticks.len() - 1;
    let scale: Row<'static, crate::Message> = row![].width(Length::Fill);

    ticks
        .into_iter()
        .enumerate()
        .fold(scale, |scale, (i, cents)| {
            let scale = scale.push(text(format_cents(cents)).size(12));
            if i < last {
                scale.push(horizontal_space())
            } else {
                scale
            }
        })
        .into()
}

/// "A4", or "-" before anything has been detected.
pub fn note_label(reading: &TuningReading) -> String {
    reading
        .note
        .map(|note| note.to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn status_label(reading: &TuningReading) -> String {
    match reading.status {
        TuningStatus::Tuned => "✓ IN TUNE".to_string(),
        TuningStatus::Flat => format!("{} - TUNE UP ↑", reading.cents),
        TuningStatus::Sharp => format!("+{} - TUNE DOWN ↓", reading.cents),
        TuningStatus::Idle => "-".to_string(),
    }
}

/// Signed cents with an explicit plus for positive values only.
pub fn format_cents(cents: i32) -> String {
    if cents > 0 {
        format!("+{}", cents)
    } else {
        cents.to_string()
    }
}
