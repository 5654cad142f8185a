// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::app::{App, InputMode, Screen, Status};
use super::widgets::{centered_rect, create_help_widget};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_footer(frame, app, chunks[2]);

    if app.show_help {
        let area = centered_rect(70, 80, size);
        frame.render_widget(Clear, area);
        frame.render_widget(create_help_widget(), area);
    }

    if let Status::Loading(message) = &app.status {
        draw_message_overlay(frame, size, message, Color::Yellow, " Loading ");
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut title = format!("PhimHub — {}", app.screen.title());
    if let Some(user) = app.session.user() {
        title.push_str(&format!("  [{}]", user.email));
    }
    if let Some(playing) = &app.now_playing {
        title.push_str(&format!("  ♪ {}", playing));
    }

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        );

    frame.render_widget(header, area);
}

fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    // Reserve an input line while typing a search or filter.
    let (input_area, list_area) = if app.input_mode != InputMode::Normal {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        (Some(chunks[0]), chunks[1])
    } else {
        (None, area)
    };

    if let Some(input_area) = input_area {
        draw_input_line(frame, app, input_area);
    }

    draw_list(frame, app, list_area);
}

fn draw_input_line(frame: &mut Frame, app: &App, area: Rect) {
    let (label, value) = match app.input_mode {
        InputMode::Search => (" Search (server) ", app.search.query().to_string()),
        InputMode::Filter => (" Filter (loaded) ", app.filter_input.clone()),
        InputMode::Normal => unreachable!(),
    };

    let input = Paragraph::new(format!("{}▏", value)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(label),
    );
    frame.render_widget(input, area);
}

fn row_lines(app: &App) -> Vec<String> {
    match app.screen {
        Screen::Catalog => app
            .catalog_rows()
            .iter()
            .filter_map(|&i| app.search.items().get(i))
            .map(|movie| {
                let year = movie.year.as_deref().unwrap_or("----");
                let star = if app.favorite_ids.contains(&movie.id) {
                    "★ "
                } else {
                    "  "
                };
                let kind = movie.kind.as_deref().unwrap_or("movie");
                format!("{}{} ({})  [{}]", star, movie.name, year, kind)
            })
            .collect(),
        Screen::Favorites => app
            .favorites
            .iter()
            .map(|movie| {
                let year = movie.year.as_deref().unwrap_or("----");
                format!("★ {} ({})", movie.name, year)
            })
            .collect(),
        Screen::History => app
            .history_entries
            .iter()
            .map(|entry| {
                let episode = entry
                    .episode
                    .map(|e| format!(" E{:02}", e))
                    .unwrap_or_default();
                let pos = entry.position_secs;
                format!(
                    "{}{}  at {}:{:02}:{:02}",
                    entry.movie_name,
                    episode,
                    pos / 3600,
                    (pos / 60) % 60,
                    pos % 60
                )
            })
            .collect(),
        Screen::Lists => app
            .lists
            .iter()
            .map(|list| {
                let count = list
                    .item_count
                    .or_else(|| list.items.as_ref().map(|i| i.len() as u64))
                    .unwrap_or(0);
                format!("{} ({} item(s))", list.name, count)
            })
            .collect(),
    }
}

fn draw_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" {} ", app.screen.title()));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let rows = row_lines(app);

    if rows.is_empty() {
        let message = if app.search.is_loading() && app.screen == Screen::Catalog {
            "Loading..."
        } else {
            "No items to display"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner_area);
        return;
    }

    // Keep the selection inside the viewport.
    let visible_height = inner_area.height as usize;
    if visible_height == 0 {
        return;
    }
    if app.selected < app.scroll_offset {
        app.scroll_offset = app.selected;
    } else if app.selected >= app.scroll_offset + visible_height {
        app.scroll_offset = app.selected + 1 - visible_height;
    }

    let start = app.scroll_offset.min(rows.len().saturating_sub(1));
    let end = (start + visible_height).min(rows.len());

    let mut lines: Vec<Line> = Vec::with_capacity(end - start);
    for (i, row) in rows[start..end].iter().enumerate() {
        let index = start + i;
        let line = if index == app.selected {
            Line::from(vec![Span::raw(" ▶ "), Span::raw(row.clone())]).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Line::from(vec![Span::raw("   "), Span::raw(row.clone())])
        };
        lines.push(line);
    }

    // Trailing marker: either a loading row or the end-of-list indicator.
    if app.screen == Screen::Catalog && end == rows.len() && lines.len() < visible_height {
        if app.search.is_loading_more() {
            lines.push(
                Line::from("   Loading more...")
                    .style(Style::default().fg(Color::DarkGray)),
            );
        } else if !app.search.has_more() && !rows.is_empty() {
            lines.push(
                Line::from("   — end of results —")
                    .style(Style::default().fg(Color::DarkGray)),
            );
        }
    }

    frame.render_widget(Paragraph::new(lines), inner_area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let text = match &app.status {
        Status::Error(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )),
        _ => {
            let mut parts: Vec<String> = Vec::new();
            if app.screen == Screen::Catalog {
                let total = app.search.total();
                parts.push(format!(
                    "{}/{} loaded · page {}/{}",
                    app.search.items().len(),
                    total,
                    app.search.current_page(),
                    app.search.total_pages().max(1)
                ));
                if app.search.is_loading() {
                    parts.push("searching...".to_string());
                }
            } else {
                parts.push(format!("{} item(s)", app.visible_len()));
            }
            parts.push("? help · / search · q quit".to_string());
            Line::from(parts.join("  |  "))
        }
    };

    let footer = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        );

    frame.render_widget(footer, area);
}

fn draw_message_overlay(frame: &mut Frame, size: Rect, message: &str, color: Color, title: &str) {
    let area = centered_rect(50, 20, size);
    frame.render_widget(Clear, area);
    let overlay = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title.to_string()),
        );
    frame.render_widget(overlay, area);
}
