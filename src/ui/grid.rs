//! The instrument card grid.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use super::theme::Theme;
use crate::{
    catalog::InstrumentRecord,
    locale::{Locale, UiText, tr},
};

const CARD_HEIGHT: u16 = 7;
const EXCERPT_CHARS: usize = 100;

/// Cards per row for a terminal `width` columns wide.
pub fn columns_for(width: u16) -> usize {
    match width {
        0..60 => 1,
        60..100 => 2,
        100..140 => 3,
        _ => 4,
    }
}

/// First `EXCERPT_CHARS` characters followed by an ellipsis.
pub fn excerpt(text: &str) -> String {
    let head: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{head}...")
}

fn draw_card(
    frame: &mut Frame,
    area: Rect,
    record: &InstrumentRecord,
    selected: bool,
    locale: Locale,
    theme: &Theme,
) {
    let border = if selected { theme.accent } else { theme.dimmed };
    let title_style = if selected {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if selected { BorderType::Thick } else { BorderType::Rounded })
        .border_style(Style::default().fg(border))
        .title(Span::styled(format!(" {} ", record.name), title_style))
        .title_bottom(
            Line::from(Span::styled(
                format!(" ♪ {} {} ", record.songs.len(), tr(locale, UiText::SoundSamples)),
                Style::default().fg(theme.dimmed),
            ))
            .alignment(Alignment::Center),
        );
    let body = Paragraph::new(excerpt(record.description(locale)))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.text))
        .block(block);
    frame.render_widget(body, area);
}

/// Draws `records` as a grid, scrolled so the cursor stays visible.
pub fn draw_grid(
    frame: &mut Frame,
    area: Rect,
    records: &[&InstrumentRecord],
    cursor: usize,
    locale: Locale,
    theme: &Theme,
) {
    let cols = columns_for(area.width);
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let cursor_row = cursor / cols;
    let first_row = cursor_row.saturating_sub(visible_rows - 1);

    let rows = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); visible_rows]).split(area);
    for (r, row_area) in rows.iter().enumerate() {
        let cells = Layout::horizontal(vec![Constraint::Ratio(1, cols as u32); cols]).split(*row_area);
        for (c, cell) in cells.iter().enumerate() {
            let index = (first_row + r) * cols + c;
            if let Some(record) = records.get(index) {
                draw_card(frame, *cell, record, index == cursor, locale, theme);
            }
        }
    }
}

/// Panel shown when there is nothing to put in the grid.
pub fn draw_empty(frame: &mut Frame, area: Rect, searching: bool, locale: Locale, theme: &Theme) {
    let lines = if searching {
        vec![
            Line::from(Span::styled(
                tr(locale, UiText::NoResultsTitle),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
            Line::from(Span::styled(
                tr(locale, UiText::NoResultsBody),
                Style::default().fg(theme.dimmed),
            )),
        ]
    } else {
        vec![Line::from(Span::styled(
            tr(locale, UiText::EmptyCatalog),
            Style::default().fg(theme.dimmed),
        ))]
    };
    let width = 50.min(area.width);
    let height = (lines.len() as u16 + 4).min(area.height);
    let panel = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(theme.dimmed)),
            ),
        panel,
    );
}
