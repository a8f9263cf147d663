//! Detail screen for one instrument.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::{
    picture::{PICTURE_COLS, PICTURE_ROWS, Picture, draw_picture},
    theme::Theme,
};
use crate::{
    catalog::{InstrumentRecord, SongRole},
    locale::{Locale, UiText, tr},
};

pub struct DetailView<'a> {
    pub record: &'a InstrumentRecord,
    pub song_cursor: usize,
    pub active_song: Option<&'a str>,
    pub audio_enabled: bool,
    pub picture: Picture<'a>,
}

fn song_items<'a>(view: &DetailView<'a>, locale: Locale, theme: &Theme) -> Vec<ListItem<'a>> {
    view.record
        .songs
        .iter()
        .map(|song| {
            let active = view.active_song == Some(song.id.as_str());
            let icon = match song.role {
                SongRole::Music => "♫",
                SongRole::Narration => "🗣",
            };
            let name_style = if view.audio_enabled {
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.dimmed)
            };
            let mut first = vec![
                Span::styled(format!("{icon} "), Style::default().fg(theme.secondary)),
                Span::styled(song.name.as_str(), name_style),
            ];
            if active {
                first.push(Span::styled(
                    format!("  ● {}", tr(locale, UiText::NowPlaying)),
                    Style::default().fg(theme.accent),
                ));
            }
            let mut lines = vec![Line::from(first)];
            if let Some(performer) = &song.performer {
                lines.push(Line::from(Span::styled(
                    format!("   {}: {performer}", tr(locale, UiText::PlayedBy)),
                    Style::default().fg(theme.dimmed),
                )));
            }
            ListItem::new(lines)
        })
        .collect()
}

pub fn draw_detail(frame: &mut Frame, area: Rect, view: DetailView<'_>, locale: Locale, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .title(Span::styled(
            format!(" {} ", view.record.name),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(format!(" Esc {} ", tr(locale, UiText::Back)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [top, description_area] =
        Layout::vertical([Constraint::Length(PICTURE_ROWS + 2), Constraint::Min(3)]).areas(inner);
    let [picture_area, songs_area] =
        Layout::horizontal([Constraint::Length(PICTURE_COLS + 2), Constraint::Min(20)]).areas(top);

    let items = song_items(&view, locale, theme);
    draw_picture(frame, picture_area.inner(Margin::new(1, 1)), view.picture, theme.dimmed);

    let songs_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.dimmed))
        .title(format!(" ♪ {} ", tr(locale, UiText::SoundSamples)));
    let songs_inner = songs_block.inner(songs_area);
    frame.render_widget(songs_block, songs_area);

    let list_area = if view.audio_enabled {
        songs_inner
    } else {
        let [warning, rest] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(songs_inner);
        frame.render_widget(
            Paragraph::new(Span::styled(
                tr(locale, UiText::SoundOff),
                Style::default().fg(theme.secondary),
            )),
            warning,
        );
        rest
    };

    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(
        (!view.record.songs.is_empty()).then_some(view.song_cursor),
    );
    frame.render_stateful_widget(list, list_area, &mut state);

    let description = Paragraph::new(view.record.description(locale))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.text))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(theme.dimmed))
                .title(format!(" {} ", tr(locale, UiText::Description))),
        );
    frame.render_widget(description, description_area);
}
