use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::Theme;
use crate::locale::{Locale, UiText, tr};

const BOUNCE: [&str; 4] = ["●  ·  ·", "·  ●  ·", "·  ·  ●", "·  ●  ·"];

/// Splash shown while the catalog is being fetched.
pub fn draw_loading(frame: &mut Frame, locale: Locale, theme: &Theme, tick: usize) {
    let area = frame.area();
    let lines = vec![
        Line::from(Span::styled("♫", Style::default().fg(theme.accent))),
        Line::raw(""),
        Line::from(Span::styled(
            tr(locale, UiText::AppTitle),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(tr(locale, UiText::Loading), Style::default().fg(theme.dimmed))),
        Line::raw(""),
        Line::from(Span::styled(
            BOUNCE[(tick / 4) % BOUNCE.len()],
            Style::default().fg(theme.secondary),
        )),
    ];
    let height = lines.len() as u16;
    let rect = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(height) / 2,
        area.width,
        height.min(area.height),
    );
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
}
