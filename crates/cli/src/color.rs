// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

mod codes {
    /// Section headers
    pub const HEADER: u8 = 74;
    /// Flags and literals
    pub const LITERAL: u8 = 250;
    /// Value placeholders
    pub const PLACEHOLDER: u8 = 245;
    /// Error labels
    pub const ERROR: u8 = 167;
}

/// `NO_COLOR=1` disables, `COLOR=1` forces, otherwise color follows
/// whether the stream is a terminal.
pub fn should_colorize(is_terminal: bool) -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    is_terminal
}

fn fg(code: u8) -> Style {
    Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))))
}

/// Help styles for clap.
pub fn styles() -> Styles {
    if !should_colorize(std::io::stdout().is_terminal()) {
        return Styles::plain();
    }
    Styles::styled()
        .header(fg(codes::HEADER))
        .usage(fg(codes::HEADER))
        .literal(fg(codes::LITERAL))
        .placeholder(fg(codes::PLACEHOLDER))
        .error(fg(codes::ERROR))
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
