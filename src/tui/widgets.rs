// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])
}

pub fn get_help_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "PhimHub TUI - Help",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        section("Screens:"),
        Line::from("  1         - Catalog"),
        Line::from("  2         - Favorites"),
        Line::from("  3         - Watch history"),
        Line::from("  4         - Custom lists"),
        Line::from(""),
        section("Navigation:"),
        Line::from("  ↑/k       - Move up"),
        Line::from("  ↓/j       - Move down"),
        Line::from("  PgUp/PgDn - Page up/down"),
        Line::from("  Home/End  - Jump to first/last loaded"),
        Line::from("  Enter     - Play selection"),
        Line::from("  q         - Quit application"),
        Line::from(""),
        section("Search and filter:"),
        Line::from("  /         - Server search (debounced as you type)"),
        Line::from("  F         - Fuzzy-filter loaded titles (no network)"),
        Line::from("  Esc       - Cancel search/filter input"),
        Line::from("  m         - Load more results now"),
        Line::from("  r         - Retry after a page error / refresh"),
        Line::from(""),
        section("Actions:"),
        Line::from("  f         - Toggle favorite for selection"),
        Line::from("  s         - Stop active playback"),
        Line::from("  ?/F1      - Toggle this help"),
        Line::from(""),
        Line::from("Scrolling near the end of the list fetches the next"),
        Line::from("page automatically while more results remain."),
        Line::from(""),
        Line::from("Press Esc, ? or F1 to close this help"),
    ]
}

pub fn create_help_widget() -> Paragraph<'static> {
    Paragraph::new(get_help_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Help "),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false })
}
