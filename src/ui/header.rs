use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::theme::Theme;
use crate::locale::{Locale, UiText, tr};

pub const HEADER_HEIGHT: u16 = 3;

pub fn draw_header(
    frame: &mut Frame,
    area: Rect,
    locale: Locale,
    search_visible: bool,
    audio_enabled: bool,
    theme: &Theme,
) {
    let flag = |on: bool, text: &'static str, off_bg: Color| {
        let style = if on {
            Style::default().fg(Color::Black).bg(theme.accent)
        } else {
            Style::default().fg(Color::Black).bg(off_bg)
        };
        Span::styled(format!(" {text} "), style)
    };
    let status = Line::from(vec![
        flag(search_visible, "🔍", theme.dimmed),
        Span::raw(" "),
        flag(audio_enabled, if audio_enabled { "🔊" } else { "🔇" }, theme.negative),
        Span::raw(" "),
        Span::styled(
            format!(" {} ", locale.display_name()),
            Style::default().fg(Color::Black).bg(theme.secondary),
        ),
        Span::raw(" "),
    ])
    .alignment(Alignment::Right);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .title(Span::styled(
            format!(" ♫ {} ", tr(locale, UiText::AppTitle)),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .title(status);
    frame.render_widget(block, area);
}

pub fn draw_footer(frame: &mut Frame, area: Rect, locale: Locale, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(tr(locale, UiText::Footer))
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.dimmed)),
        area,
    );
}
