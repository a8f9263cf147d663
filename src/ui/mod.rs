pub mod controls;
pub mod detail;
pub mod gauge;
pub mod grid;
pub mod header;
pub mod loading;
pub mod picture;
pub mod player;
pub mod search;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{app::App, navigation::View};

use {
    controls::{HintContext, controls_height, draw_controls},
    detail::{DetailView, draw_detail},
    grid::{draw_empty, draw_grid},
    header::{HEADER_HEIGHT, draw_footer, draw_header},
    loading::draw_loading,
    player::{PLAYER_HEIGHT, draw_player},
    search::{SEARCH_HEIGHT, draw_results_summary, draw_search_bar},
    theme::{draw_theme_selector, theme},
};

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = theme(app.settings().theme);
    let locale = app.locale();
    let nav = app.navigation();

    if app.store().is_none() {
        draw_loading(frame, locale, theme, app.tick());
        return;
    }

    let player = app.player_view();
    let detail = app.open_record();
    let query = nav.search().query.as_str();
    let show_search = nav.search().visible && detail.is_none();
    let show_summary = detail.is_none() && !query.trim().is_empty();

    let hints = match (detail, show_search) {
        (Some(_), _) => HintContext::Detail { player_open: player.is_some() },
        (None, true) => HintContext::Searching,
        (None, false) => HintContext::Grid,
    };
    let area = frame.area();
    let controls_h = controls_height(area.width, hints, nav.audio_enabled(), theme);

    let mut constraints = vec![Constraint::Length(HEADER_HEIGHT)];
    if show_search {
        constraints.push(Constraint::Length(SEARCH_HEIGHT));
    }
    if show_summary {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(5));
    if player.is_some() {
        constraints.push(Constraint::Length(PLAYER_HEIGHT));
    }
    constraints.push(Constraint::Length(controls_h));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::vertical(constraints).split(area);
    let mut next = chunks.iter().copied();
    let mut take = || next.next().unwrap_or_default();

    draw_header(frame, take(), locale, nav.search().visible, nav.audio_enabled(), theme);

    let results = app.results();
    if show_search {
        draw_search_bar(frame, take(), nav.search(), locale, theme);
    }
    if show_summary {
        draw_results_summary(frame, take(), query, results.len(), locale, theme);
    }

    let main = take();
    match (nav.view(), detail) {
        (View::Detail(_), Some(record)) => {
            let view = DetailView {
                record,
                song_cursor: nav.song_cursor(),
                active_song: app.active_song_id(),
                audio_enabled: nav.audio_enabled(),
                picture: app.pictures().get(&record.image_ref),
            };
            draw_detail(frame, main, view, locale, theme);
        }
        _ if results.is_empty() => draw_empty(frame, main, show_summary, locale, theme),
        _ => draw_grid(frame, main, &results, nav.grid_cursor(), locale, theme),
    }

    if let Some(view) = &player {
        draw_player(frame, take(), view, locale, theme, app.tick());
    }
    draw_controls(frame, take(), hints, nav.audio_enabled(), theme);
    draw_footer(frame, take(), locale, theme);

    if let Some(selected) = app.theme_selector() {
        draw_theme_selector(frame, selected);
    }
}
