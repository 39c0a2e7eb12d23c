//! Rendering — a stateless projection of the monitor state into a card list.
//!
//! Layout:
//! ┌ sitewatch — 4 sites                    last check 10:32:01 ┐
//! │ ▼ primary  claude                                          │
//! │    ● 120ms                                                 │
//! │    https://claude.example                                  │
//! │    24 checks · 95.8% available                             │
//! │    ● 06-01 09:00  92ms                                     │
//! │ ▶ backup  codex                                            │
//! │    ○ server error (5xx)  [server error]                    │
//! └ r check · ↑/↓ select · enter expand · q quit ──────────────┘
//!
//! Also produces the per-card screen-row regions used for mouse
//! hit-testing: only clicks on a card's main rows toggle expansion —
//! clicks on history rows must not re-toggle.

use std::ops::Range;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use sitewatch_core::{HistoryRecord, SiteKey, StatusPresentation, availability_rate};

use crate::action::{Notification, NotificationLevel};
use crate::theme;

// ── View model ───────────────────────────────────────────────────────

/// Everything the renderer needs for one site card.
pub struct CardView {
    pub key: SiteKey,
    pub base_url: String,
    pub status: StatusPresentation,
    pub expanded: bool,
    /// `None` while the history fetch is outstanding — the card shows
    /// the loading presentation in that window.
    pub history: Option<Arc<Vec<HistoryRecord>>>,
}

/// Snapshot of all state the renderer projects. Built fresh for every
/// frame; rendering holds no state of its own.
pub struct View {
    pub cards: Vec<CardView>,
    pub checking: bool,
    pub last_check: Option<DateTime<Utc>>,
    pub selected: usize,
    pub notification: Option<Notification>,
}

/// Screen-row extent of one rendered card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRegion {
    pub key: SiteKey,
    /// Rows of the main (toggle-sensitive) card area.
    pub main_rows: Range<u16>,
    /// Rows of the whole card including the history section.
    pub all_rows: Range<u16>,
}

/// Resolve a mouse row to the card it landed on. The boolean is `true`
/// when the click is within the card's main rows (and should toggle).
pub fn hit_test(regions: &[CardRegion], row: u16) -> Option<(&SiteKey, bool)> {
    regions
        .iter()
        .find(|r| r.all_rows.contains(&row))
        .map(|r| (&r.key, r.main_rows.contains(&row)))
}

// ── Rendering ────────────────────────────────────────────────────────

/// Draw the full frame. Returns the card regions for mouse hit-testing.
pub fn render(frame: &mut Frame, view: &View) -> Vec<CardRegion> {
    let [header_area, list_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(header(view), header_area);
    frame.render_widget(footer(view), footer_area);
    render_cards(frame, list_area, view)
}

fn header(view: &View) -> Paragraph<'_> {
    let mut spans = vec![
        Span::styled("sitewatch", theme::title_style()),
        Span::styled(format!("  {} sites", view.cards.len()), theme::dim_style()),
    ];
    if view.checking {
        spans.push(Span::styled(
            "  checking...",
            Style::default().fg(theme::ACCENT_CYAN),
        ));
    } else if let Some(at) = view.last_check {
        let local = at.with_timezone(&Local);
        spans.push(Span::styled(
            format!("  last check {}", local.format("%H:%M:%S")),
            theme::dim_style(),
        ));
    }
    Paragraph::new(Line::from(spans))
}

fn footer(view: &View) -> Paragraph<'_> {
    match &view.notification {
        Some(notice) => {
            let color = match notice.level {
                NotificationLevel::Info => theme::ACCENT_CYAN,
                NotificationLevel::Warning => theme::WARN_YELLOW,
                NotificationLevel::Error => theme::ERROR_RED,
            };
            Paragraph::new(Line::styled(
                notice.message.clone(),
                Style::default().fg(color),
            ))
        }
        None => Paragraph::new(Line::styled(
            "r check · ↑/↓ select · enter expand · q quit",
            theme::hint_style(),
        )),
    }
}

fn render_cards(frame: &mut Frame, area: Rect, view: &View) -> Vec<CardRegion> {
    if view.cards.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled("no sites configured", theme::dim_style())),
            area,
        );
        return Vec::new();
    }

    let mut lines: Vec<Line<'_>> = Vec::new();
    // Relative (line-index) extents per card, converted to screen rows
    // after the scroll offset is known.
    let mut extents: Vec<(usize, usize, usize)> = Vec::new(); // (main_start, main_end, all_end)

    for (idx, card) in view.cards.iter().enumerate() {
        let start = lines.len();
        push_card_main(&mut lines, card, idx == view.selected);
        let main_end = lines.len();
        if card.expanded {
            push_card_history(&mut lines, card);
        }
        let all_end = lines.len();
        lines.push(Line::default()); // separator, not part of the card
        extents.push((start, main_end, all_end));
    }

    let scroll = scroll_offset(&extents, view.selected, area.height);
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);

    card_regions(view, &extents, area, scroll)
}

fn push_card_main(lines: &mut Vec<Line<'_>>, card: &CardView, selected: bool) {
    let arrow = if card.expanded { "▼" } else { "▶" };
    let header_style = if selected {
        theme::selected_style()
    } else {
        Style::default()
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{arrow} {}", card.key.name), header_style),
        Span::raw("  "),
        Span::styled(
            card.key.service.clone(),
            Style::default().fg(theme::service_color(&card.key.service)),
        ),
    ]));

    let color = theme::status_color(card.status.kind);
    let mut status_spans = vec![
        Span::raw("   "),
        Span::styled(
            format!("{} {}", card.status.icon, card.status.text),
            Style::default().fg(color),
        ),
    ];
    if let Some(badge) = card.status.badge {
        status_spans.push(Span::raw("  "));
        status_spans.push(Span::styled(
            format!(" {} ", badge.label),
            theme::badge_style(badge.kind),
        ));
    }
    lines.push(Line::from(status_spans));

    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled(card.base_url.clone(), theme::dim_style()),
    ]));
}

fn push_card_history(lines: &mut Vec<Line<'_>>, card: &CardView) {
    let Some(records) = &card.history else {
        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled("loading history...", theme::dim_style()),
        ]));
        return;
    };

    let Some(rate) = availability_rate(records) else {
        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled("no history yet", theme::dim_style()),
        ]));
        return;
    };

    let rate_color = if rate >= 80.0 {
        theme::SUCCESS_GREEN
    } else {
        theme::ERROR_RED
    };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled(format!("{} checks · ", records.len()), theme::dim_style()),
        Span::styled(format!("{rate:.1}% available"), Style::default().fg(rate_color)),
    ]));

    for record in records.as_slice() {
        lines.push(history_line(record));
    }
}

fn history_line(record: &HistoryRecord) -> Line<'static> {
    let (icon, color) = if record.available {
        ("●", theme::SUCCESS_GREEN)
    } else {
        ("○", theme::ERROR_RED)
    };
    let detail = record_detail(record);
    let time = record
        .checked_at
        .with_timezone(&Local)
        .format("%m-%d %H:%M");
    Line::from(vec![
        Span::raw("   "),
        Span::styled(icon, Style::default().fg(color)),
        Span::styled(format!(" {time}  "), theme::dim_style()),
        Span::raw(detail),
    ])
}

/// Detail text of one history row: the rounded response time for a
/// successful check, the error for a failed one.
fn record_detail(record: &HistoryRecord) -> String {
    if record.available {
        match record.response_time_ms {
            Some(ms) => format!("{}ms", ms.round()),
            None => "available".into(),
        }
    } else {
        record.error.clone().unwrap_or_else(|| "unavailable".into())
    }
}

// ── Geometry helpers ─────────────────────────────────────────────────

/// Scroll offset that keeps the selected card fully visible.
#[allow(clippy::cast_possible_truncation)]
fn scroll_offset(extents: &[(usize, usize, usize)], selected: usize, height: u16) -> u16 {
    let Some(&(start, _, end)) = extents.get(selected) else {
        return 0;
    };
    let height = height as usize;
    if end > height {
        // Scroll the selected card's tail into view, but never past its head.
        (end - height).min(start) as u16
    } else {
        0
    }
}

/// Convert relative line extents to visible screen-row regions, dropping
/// cards scrolled entirely off-screen and clipping partial ones.
#[allow(clippy::cast_possible_truncation)]
fn card_regions(
    view: &View,
    extents: &[(usize, usize, usize)],
    area: Rect,
    scroll: u16,
) -> Vec<CardRegion> {
    let to_row = |line: usize| -> u16 {
        let clipped = line
            .saturating_sub(scroll as usize)
            .min(area.height as usize);
        area.y + clipped as u16
    };

    view.cards
        .iter()
        .zip(extents)
        .filter_map(|(card, &(start, main_end, all_end))| {
            let top = to_row(start);
            let main_bottom = to_row(main_end);
            let all_bottom = to_row(all_end);
            (top < all_bottom).then(|| CardRegion {
                key: card.key.clone(),
                main_rows: top..main_bottom,
                all_rows: top..all_bottom,
            })
        })
        .collect()
}
