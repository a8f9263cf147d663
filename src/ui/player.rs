//! Bottom player bar: status, song, progress.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::{gauge::RoundedGauge, theme::Theme};
use crate::{
    catalog::{SongRecord, SongRole},
    locale::{Locale, UiText, tr},
    playback::Phase,
};

pub const PLAYER_HEIGHT: u16 = 4;

/// Snapshot of the playback slot for drawing.
pub struct PlayerView<'a> {
    pub song: &'a SongRecord,
    pub phase: Phase,
    pub position: f64,
    pub duration: Option<f64>,
    pub ratio: f64,
    pub error: Option<&'a str>,
}

/// `m:ss`, flooring both parts.
pub fn format_duration(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn badge(phase: Phase, locale: Locale, theme: &Theme) -> Span<'static> {
    let (key, bg) = match phase {
        Phase::Loading => (UiText::PhaseLoading, theme.dimmed),
        Phase::Playing => (UiText::PhasePlaying, theme.accent),
        Phase::Errored => (UiText::PhaseError, theme.negative),
        Phase::Paused | Phase::Idle | Phase::Ended => (UiText::PhasePaused, theme.secondary),
    };
    Span::styled(
        format!(" {} ", tr(locale, key)),
        Style::default().fg(Color::Black).bg(bg).add_modifier(Modifier::BOLD),
    )
}

pub fn draw_player(
    frame: &mut Frame,
    area: Rect,
    view: &PlayerView<'_>,
    locale: Locale,
    theme: &Theme,
    tick: usize,
) {
    let icon = match view.song.role {
        SongRole::Music => "♫",
        SongRole::Narration => "🗣",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if view.phase == Phase::Errored {
            theme.negative
        } else {
            theme.accent
        }))
        .title(format!(" {icon} {} ", tr(locale, UiText::NowPlaying)))
        .title_bottom(Line::from(" x ✕ ").alignment(Alignment::Right));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [title_area, progress_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);

    if view.phase == Phase::Errored {
        let lines = Line::from(vec![
            badge(view.phase, locale, theme),
            Span::raw("  "),
            Span::styled(
                tr(locale, UiText::AudioLoadFailed),
                Style::default().fg(theme.negative).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", view.song.name), Style::default().fg(theme.text)),
        ]);
        frame.render_widget(Paragraph::new(lines), title_area);
        if let Some(reason) = view.error {
            frame.render_widget(
                Paragraph::new(Span::styled(reason.to_string(), Style::default().fg(theme.dimmed))),
                progress_area,
            );
        }
        return;
    }

    let mut title = vec![
        badge(view.phase, locale, theme),
        Span::raw("  "),
        Span::styled(
            view.song.name.clone(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(performer) = &view.song.performer {
        title.push(Span::styled(
            format!("  ·  {performer}"),
            Style::default().fg(theme.dimmed),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(title)), title_area);

    let [elapsed_area, bar_area, total_area] = Layout::horizontal([
        Constraint::Length(6),
        Constraint::Min(4),
        Constraint::Length(6),
    ])
    .areas(progress_area);

    let mut gauge = RoundedGauge::new(view.ratio, theme.accent).dimmed_color(theme.dimmed);
    if view.phase == Phase::Loading {
        gauge = gauge.loading(tick);
    }
    frame.render_widget(gauge, bar_area);
    frame.render_widget(
        Paragraph::new(format_duration(view.position))
            .alignment(Alignment::Right)
            .style(Style::default().fg(theme.dimmed)),
        elapsed_area,
    );
    frame.render_widget(
        Paragraph::new(format!(" {}", format_duration(view.duration.unwrap_or(0.0))))
            .style(Style::default().fg(theme.dimmed)),
        total_area,
    );
}
