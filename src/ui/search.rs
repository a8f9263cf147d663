use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::theme::Theme;
use crate::{
    locale::{Locale, UiText, tr},
    navigation::SearchState,
};

pub const SEARCH_HEIGHT: u16 = 3;

pub fn draw_search_bar(frame: &mut Frame, area: Rect, search: &SearchState, locale: Locale, theme: &Theme) {
    let content = if search.query.is_empty() {
        Line::from(vec![
            Span::raw(" 🔍 "),
            Span::styled(tr(locale, UiText::SearchPlaceholder), Style::default().fg(theme.dimmed)),
        ])
    } else {
        Line::from(vec![
            Span::raw(" 🔍 "),
            Span::styled(search.query.as_str(), Style::default().fg(theme.text)),
            Span::styled("▏", Style::default().fg(theme.accent)),
        ])
    };
    let bar = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.accent))
            .title(format!(" {} ", tr(locale, UiText::SearchTitle))),
    );
    frame.render_widget(bar, area);
}

/// `"q" için 3 sonuç bulundu` / `3 results found for "q"`.
pub fn results_summary(query: &str, count: usize, locale: Locale) -> String {
    match locale {
        Locale::Tr => format!("\"{query}\" için {count} {}", tr(locale, UiText::ResultsFor)),
        Locale::En if count == 1 => format!("1 result found for \"{query}\""),
        Locale::En => format!("{count} {} for \"{query}\"", tr(locale, UiText::ResultsFor)),
    }
}

pub fn draw_results_summary(frame: &mut Frame, area: Rect, query: &str, count: usize, locale: Locale, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {}", results_summary(query, count, locale)),
            Style::default().fg(theme.text).add_modifier(Modifier::ITALIC),
        )),
        area,
    );
}
