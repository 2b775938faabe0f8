//! To keep the output of the `ember` binary consistent, colors live here as
//! constants.
//!
//! - EMBER_ORANGE: Main Color
//! - ASH_GREY: Secondary text such as timestamps

use colored::Color;

pub(crate) const EMBER_ORANGE: Color = Color::TrueColor {
    r: 255,
    g: 130,
    b: 67,
};

pub(crate) const ASH_GREY: Color = Color::TrueColor {
    r: 140,
    g: 140,
    b: 140,
};
