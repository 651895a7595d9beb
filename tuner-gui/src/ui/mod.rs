//! # UI Module
//!
//! UI components of the string tuner: the two-digit layout and the
//! seven-segment digit it is built from.

pub mod main_display;
pub mod segment_digit;
