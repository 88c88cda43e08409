// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal colours for help output and job summaries.

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

/// 256-colour palette codes.
pub mod codes {
    pub const HEADER: u8 = 74;
    pub const LITERAL: u8 = 250;
    pub const CONTEXT: u8 = 245;
    pub const GOOD: u8 = 114;
    pub const BAD: u8 = 167;
}

/// `NO_COLOR=1` wins over `COLOR=1`; otherwise colour only on a terminal.
pub fn should_colorize() -> bool {
    let flag = |name: &str| std::env::var(name).is_ok_and(|v| v == "1");
    if flag("NO_COLOR") {
        false
    } else {
        flag("COLOR") || std::io::stdout().is_terminal()
    }
}

fn fg(code: u8) -> Style {
    Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))))
}

pub fn styles() -> Styles {
    match should_colorize() {
        true => Styles::styled()
            .header(fg(codes::HEADER))
            .usage(fg(codes::HEADER))
            .literal(fg(codes::LITERAL))
            .placeholder(fg(codes::CONTEXT)),
        false => Styles::plain(),
    }
}

fn paint(code: u8, text: &str) -> String {
    match should_colorize() {
        true => format!("{}{text}{}", fg(code).render(), fg(code).render_reset()),
        false => text.to_string(),
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

/// Green for finished work, red for failures and missed thresholds.
pub fn status(text: &str) -> String {
    let code = match text {
        "completed" | "success" | "threshold_met" => codes::GOOD,
        "failed" | "below_threshold" => codes::BAD,
        "skipped" | "pending" => codes::CONTEXT,
        _ => codes::LITERAL,
    };
    paint(code, text)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
