//! Color palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};
use sitewatch_core::{BadgeKind, StatusKind};

// ── Core Palette ──────────────────────────────────────────────────────

pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const WARN_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const ACCENT_PURPLE: Color = Color::Rgb(189, 147, 249); // #bd93f9
pub const ACCENT_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for the header bar.
pub fn title_style() -> Style {
    Style::default().fg(ACCENT_CYAN).add_modifier(Modifier::BOLD)
}

/// Footer key-hint text.
pub fn hint_style() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Secondary detail text (URLs, timestamps).
pub fn dim_style() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Background for the selected card's header row.
pub fn selected_style() -> Style {
    Style::default()
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Status color for a classified display status.
pub fn status_color(kind: StatusKind) -> Color {
    match kind {
        StatusKind::Available => SUCCESS_GREEN,
        StatusKind::Degraded => WARN_YELLOW,
        StatusKind::Unavailable => ERROR_RED,
        StatusKind::Checking => ACCENT_CYAN,
        StatusKind::Disabled => ACCENT_PURPLE,
        StatusKind::Unchecked => DIM_WHITE,
    }
}

/// Style for a sub-status badge.
pub fn badge_style(kind: BadgeKind) -> Style {
    let fg = match kind {
        BadgeKind::Slow => WARN_YELLOW,
        BadgeKind::Error => ERROR_RED,
    };
    Style::default().fg(fg).add_modifier(Modifier::REVERSED)
}

/// Service-family badge color. The two first-class families get their
/// own colors; everything else is neutral.
pub fn service_color(service: &str) -> Color {
    match service {
        "claude" => ACCENT_PURPLE,
        "codex" => ACCENT_CYAN,
        _ => BORDER_GRAY,
    }
}
