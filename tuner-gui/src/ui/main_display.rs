//! # Main Display Module
//!
//! Lays out the two digits side by side: the note letter on the left and
//! the proximity glyph on the right.

use iced::widget::{Space, container, row, text};
use iced::{Alignment, Element, Length};

use super::segment_digit::SegmentDigit;

/// Width of one digit in logical pixels. Height follows at 7:4.
const DIGIT_WIDTH: f32 = 120.0;

/// Creates the complete main application view.
pub fn create_main_view(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    if !data.audio_worker_active {
        return container(text("No audio input").size(32))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    }

    let digits = row![
        SegmentDigit::new(data.note_digit).view(DIGIT_WIDTH),
        Space::with_width(24),
        SegmentDigit::new(data.proximity_digit).view(DIGIT_WIDTH),
    ]
    .align_y(Alignment::Center);

    container(digits)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .padding(20)
        .into()
}
