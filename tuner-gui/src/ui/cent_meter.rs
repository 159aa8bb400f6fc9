//! # Cent Meter Widget
//!
//! Horizontal tuning meter: flat zone on the left, in-tune zone in the
//! middle, sharp zone on the right, and a needle placed by the cent offset.
//!
//! ## Features
//! - Needle clamped to +/-50 cents
//! - Zone colours match the status label
//! - Needle is dimmed while the tuner has no live reading

use iced::widget::canvas::{self, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme};
use tuner_core::{TuningReading, TuningStatus};

/// Maximum cent deviation range for the meter display.
pub const METER_RANGE: i32 = 50;

pub const FLAT_COLOR: Color = Color::from_rgb(0.23, 0.51, 0.96);
pub const TUNED_COLOR: Color = Color::from_rgb(0.13, 0.77, 0.37);
pub const SHARP_COLOR: Color = Color::from_rgb(0.94, 0.27, 0.27);
pub const IDLE_COLOR: Color = Color::from_rgb(0.42, 0.45, 0.50);
const NEEDLE_COLOR: Color = Color::from_rgb(0.85, 0.34, 0.0);

/// Colour associated with a tuning status.
pub fn status_color(status: TuningStatus) -> Color {
    match status {
        TuningStatus::Tuned => TUNED_COLOR,
        TuningStatus::Flat => FLAT_COLOR,
        TuningStatus::Sharp => SHARP_COLOR,
        TuningStatus::Idle => IDLE_COLOR,
    }
}

pub struct CentMeter {
    reading: TuningReading,
}

impl CentMeter {
    pub fn new(reading: TuningReading) -> Self {
        Self { reading }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(80.0)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for CentMeter {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        // Zones: flat | tuned | sharp. The tuned band is a few cents wide
        // but drawn at 10% of the width so it stays visible.
        let zone_width = bounds.width * 0.45;
        frame.fill_rectangle(
            Point::ORIGIN,
            Size::new(zone_width, bounds.height),
            FLAT_COLOR.scale_alpha(0.6),
        );
        frame.fill_rectangle(
            Point::new(zone_width, 0.0),
            Size::new(bounds.width - 2.0 * zone_width, bounds.height),
            TUNED_COLOR.scale_alpha(0.6),
        );
        frame.fill_rectangle(
            Point::new(bounds.width - zone_width, 0.0),
            Size::new(zone_width, bounds.height),
            SHARP_COLOR.scale_alpha(0.6),
        );

        // Draw center line
        let center_x = bounds.width / 2.0;
        let center_line = Path::line(
            Point::new(center_x, 0.0),
            Point::new(center_x, bounds.height),
        );
        frame.stroke(
            &center_line,
            Stroke::default().with_width(2.0).with_color(Color::WHITE),
        );

        // Draw needle, even while idle, so the last reading stays visible.
        if self.reading.note.is_some() {
            let needle_pos = self.reading.needle_position() / 100.0 * bounds.width;
            let color = if self.reading.is_active() {
                NEEDLE_COLOR
            } else {
                NEEDLE_COLOR.scale_alpha(0.35)
            };
            let needle =
                Path::rectangle(Point::new(needle_pos - 3.0, 0.0), Size::new(6.0, bounds.height));
            frame.fill(&needle, color);
        }

        vec![frame.into_geometry()]
    }
}
