//! # Seven-Segment Digit Widget
//!
//! Draws one digit of the tuner display from a [`SegmentPattern`]. Lit
//! segments are drawn bright, unlit ones as a faint ghost so the digit's
//! shape stays readable when blank.

use iced::widget::canvas::{self, Geometry, Path};
use iced::widget::container;
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Size, Theme, mouse};
use tuner_core::SegmentPattern;

const LIT: Color = Color::from_rgb(1.0, 0.18, 0.12);
const UNLIT: Color = Color::from_rgb(0.16, 0.08, 0.08);
const BACKGROUND: Color = Color::from_rgb(0.05, 0.05, 0.05);

/// Bit index of each segment in a [`SegmentPattern`].
const SEG_A: u8 = 7;
const SEG_B: u8 = 6;
const SEG_C: u8 = 5;
const SEG_D: u8 = 4;
const SEG_E: u8 = 3;
const SEG_F: u8 = 2;
const SEG_G: u8 = 1;
const SEG_DP: u8 = 0;

pub struct SegmentDigit {
    pattern: SegmentPattern,
}

impl SegmentDigit {
    pub fn new(pattern: SegmentPattern) -> Self {
        Self { pattern }
    }

    pub fn view(self, width: f32) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(Length::Fixed(width))
                .height(Length::Fixed(width * 1.75)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for SegmentDigit {
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
        frame.fill(&Path::rectangle(Point::ORIGIN, bounds.size()), BACKGROUND);

        // Leave room on the right for the decimal point.
        let w = bounds.width * 0.8;
        let h = bounds.height;
        let t = w * 0.12;
        let half = h / 2.0;
        let upright = half - 1.5 * t;

        let segments = [
            (SEG_A, Point::new(t, 0.0), Size::new(w - 2.0 * t, t)),
            (SEG_B, Point::new(w - t, t), Size::new(t, upright)),
            (SEG_C, Point::new(w - t, half + t / 2.0), Size::new(t, upright)),
            (SEG_D, Point::new(t, h - t), Size::new(w - 2.0 * t, t)),
            (SEG_E, Point::new(0.0, half + t / 2.0), Size::new(t, upright)),
            (SEG_F, Point::new(0.0, t), Size::new(t, upright)),
            (SEG_G, Point::new(t, half - t / 2.0), Size::new(w - 2.0 * t, t)),
        ];

        for (bit, origin, size) in segments {
            frame.fill(&Path::rectangle(origin, size), self.color(bit));
        }

        let dp = Path::circle(Point::new(w + t, h - t / 2.0), t / 2.0);
        frame.fill(&dp, self.color(SEG_DP));

        vec![frame.into_geometry()]
    }
}

impl SegmentDigit {
    fn color(&self, bit: u8) -> Color {
        if self.pattern.is_lit(bit) { LIT } else { UNLIT }
    }
}
