//! Event loop: keys become intents, media events become phase changes.

use std::{
    io,
    path::PathBuf,
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
    time::Duration,
};

use {
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    ratatui::{DefaultTerminal, layout::Rect},
    tracing::{debug, error, info, warn},
};

use crate::{
    assets::AssetResolver,
    catalog::{CatalogStore, InstrumentRecord, SongRecord},
    config::Settings,
    filter::filter,
    locale::Locale,
    navigation::{Navigation, View},
    playback::{MediaBackend, NullBackend, Phase, PhaseChange, PlaybackController, RodioBackend},
    ui::{self, grid::columns_for, picture::PictureCache, player::PlayerView, theme::THEMES},
};

const SEEK_STEP_SECONDS: f64 = 5.0;

enum CatalogState {
    Loading(Receiver<CatalogStore>),
    Ready(CatalogStore),
}

fn spawn_catalog_load(settings: &Settings) -> CatalogState {
    let locator = match settings.catalog_locator() {
        Ok(locator) => locator,
        Err(e) => {
            error!("Error loading instruments: {e}");
            return CatalogState::Ready(CatalogStore::default());
        }
    };
    let markers = settings.narration_markers.clone();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(CatalogStore::load(&locator, &markers));
    });
    CatalogState::Loading(rx)
}

pub struct App {
    settings: Settings,
    settings_path: PathBuf,
    resolver: AssetResolver,
    catalog: CatalogState,
    nav: Navigation,
    player: PlaybackController<Box<dyn MediaBackend>>,
    pictures: PictureCache,
    theme_selector: Option<usize>,
    viewport: Rect,
    tick: usize,
    quit: bool,
}

impl App {
    /// Opens the default audio device, or carries on silently without one.
    pub fn new(settings: Settings, settings_path: PathBuf) -> Self {
        let backend: Box<dyn MediaBackend> = match RodioBackend::open() {
            Ok(backend) => Box::new(backend),
            Err(e) => {
                warn!("{e}; continuing without sound");
                Box::new(NullBackend::new())
            }
        };
        Self::with_backend(settings, settings_path, backend)
    }

    pub fn with_backend(
        settings: Settings,
        settings_path: PathBuf,
        backend: Box<dyn MediaBackend>,
    ) -> Self {
        let resolver = settings.resolver();
        info!("Assets from {}", resolver.base());
        Self {
            catalog: spawn_catalog_load(&settings),
            nav: Navigation::new(settings.audio_enabled),
            player: PlaybackController::new(backend, resolver.clone(), settings.autoplay),
            resolver,
            settings,
            settings_path,
            pictures: PictureCache::default(),
            theme_selector: None,
            viewport: Rect::new(0, 0, 80, 24),
            tick: 0,
            quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        while !self.quit {
            let completed = terminal.draw(|f| ui::draw(f, self))?;
            self.viewport = completed.area;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            self.on_tick();
        }
        self.player.close();
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn locale(&self) -> Locale {
        self.settings.locale
    }

    pub fn navigation(&self) -> &Navigation {
        &self.nav
    }

    pub fn pictures(&self) -> &PictureCache {
        &self.pictures
    }

    pub fn theme_selector(&self) -> Option<usize> {
        self.theme_selector
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    /// The catalog, once it has finished loading.
    pub fn store(&self) -> Option<&CatalogStore> {
        match &self.catalog {
            CatalogState::Ready(store) => Some(store),
            CatalogState::Loading(_) => None,
        }
    }

    /// Catalog entries matching the current search.
    pub fn results(&self) -> Vec<&InstrumentRecord> {
        self.store().map_or_else(Vec::new, |store| {
            filter(store.instruments(), &self.nav.search().query, self.locale())
        })
    }

    pub fn open_record(&self) -> Option<&InstrumentRecord> {
        match self.nav.view() {
            View::Detail(id) => self.store()?.get(id),
            View::Grid => None,
        }
    }

    pub fn active_song_id(&self) -> Option<&str> {
        self.player.active_item().map(|s| s.id.as_str())
    }

    pub fn player_view(&self) -> Option<PlayerView<'_>> {
        let session = self.player.session()?;
        Some(PlayerView {
            song: session.item(),
            phase: session.phase(),
            position: session.position_seconds(),
            duration: session.duration_seconds(),
            ratio: self.player.progress_ratio(),
            error: session.error(),
        })
    }

    fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        let loaded = match &self.catalog {
            CatalogState::Loading(rx) => match rx.try_recv() {
                Ok(store) => Some(store),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    error!("Catalog loader exited without a result");
                    Some(CatalogStore::default())
                }
            },
            CatalogState::Ready(_) => None,
        };
        if let Some(store) = loaded {
            self.catalog = CatalogState::Ready(store);
        }

        let len = self.results().len();
        self.nav.clamp_grid(len);

        for change in self.player.pump() {
            self.on_phase_change(&change);
        }
        self.pictures.poll();
    }

    fn on_phase_change(&self, change: &PhaseChange) {
        match change.to {
            Phase::Ended => info!("{} finished", change.song_id),
            Phase::Errored => warn!("{} could not be played", change.song_id),
            _ => debug!("{} {:?} -> {:?}", change.song_id, change.from, change.to),
        }
    }

    /// Writes back the settings the user can change from inside the app,
    /// leaving command line overrides out of the file. An unreadable file
    /// is left alone rather than replaced with defaults.
    fn persist(&self) {
        let mut stored = match Settings::load_from(&self.settings_path) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    "Not saving settings, {} is unreadable: {e}",
                    self.settings_path.display()
                );
                return;
            }
        };
        stored.locale = self.settings.locale;
        stored.theme = self.settings.theme;
        stored.audio_enabled = self.settings.audio_enabled;
        if let Err(e) = stored.save_to(&self.settings_path) {
            warn!("Failed to save settings: {e}");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }
        if self.theme_selector.is_some() {
            self.handle_theme_key(key.code);
            return;
        }
        if self.store().is_none() {
            if key.code == KeyCode::Char('q') {
                self.quit = true;
            }
            return;
        }
        let searching = self.nav.search().visible && self.nav.view() == View::Grid;
        if searching && self.handle_search_key(key) {
            return;
        }

        match (self.nav.view(), key.code) {
            (_, KeyCode::Char('q')) => self.quit = true,
            (_, KeyCode::Char('h')) => self.go_home(),
            (_, KeyCode::Char('m')) => self.toggle_audio(),
            (_, KeyCode::Char('g')) => self.switch_language(),
            (_, KeyCode::Char('t')) => self.theme_selector = Some(self.settings.theme.min(THEMES.len() - 1)),

            (View::Grid, KeyCode::Char('/')) => self.nav.toggle_search(),
            (View::Grid, KeyCode::Left) => self.move_grid(-1),
            (View::Grid, KeyCode::Right) => self.move_grid(1),
            (View::Grid, KeyCode::Up) => self.move_grid(-(columns_for(self.viewport.width) as isize)),
            (View::Grid, KeyCode::Down) => self.move_grid(columns_for(self.viewport.width) as isize),
            (View::Grid, KeyCode::Enter) => self.open_selected(),

            (View::Detail(_), KeyCode::Up) => self.move_song(-1),
            (View::Detail(_), KeyCode::Down) => self.move_song(1),
            (View::Detail(_), KeyCode::Enter) => self.play_selected_song(),
            (View::Detail(_), KeyCode::Char('n')) => self.play_narration(),
            (View::Detail(_), KeyCode::Char(' ')) => self.apply(|p| p.toggle_play_pause()),
            (View::Detail(_), KeyCode::Left) => self.apply(|p| p.seek_by(-SEEK_STEP_SECONDS)),
            (View::Detail(_), KeyCode::Right) => self.apply(|p| p.seek_by(SEEK_STEP_SECONDS)),
            (View::Detail(_), KeyCode::Char('r')) => self.apply(|p| p.restart()),
            (View::Detail(_), KeyCode::Char('x')) => self.apply(|p| p.close()),
            (View::Detail(_), KeyCode::Esc | KeyCode::Backspace) => self.go_home(),
            _ => {}
        }
    }

    /// Returns false for keys the grid should still see (arrows, Enter).
    fn handle_search_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => self.nav.clear_query(),
            KeyCode::Char(c) if !ctrl => self.nav.push_query(c),
            KeyCode::Backspace => self.nav.pop_query(),
            KeyCode::Esc => self.nav.toggle_search(),
            _ => return false,
        }
        true
    }

    fn handle_theme_key(&mut self, code: KeyCode) {
        let Some(selected) = self.theme_selector else {
            return;
        };
        match code {
            KeyCode::Up => self.theme_selector = Some(selected.saturating_sub(1)),
            KeyCode::Down => self.theme_selector = Some((selected + 1).min(THEMES.len() - 1)),
            KeyCode::Enter => {
                self.settings.theme = selected;
                self.theme_selector = None;
                self.persist();
            }
            KeyCode::Esc | KeyCode::Char('t') | KeyCode::Char('q') => self.theme_selector = None,
            _ => {}
        }
    }

    fn apply(&mut self, intent: impl FnOnce(&mut PlaybackController<Box<dyn MediaBackend>>) -> Option<PhaseChange>) {
        if let Some(change) = intent(&mut self.player) {
            self.on_phase_change(&change);
        }
    }

    fn move_grid(&mut self, delta: isize) {
        let len = self.results().len();
        self.nav.move_grid(delta, len);
    }

    fn move_song(&mut self, delta: isize) {
        let len = self.open_record().map_or(0, |r| r.songs.len());
        self.nav.move_song(delta, len);
    }

    fn open_selected(&mut self) {
        let Some((id, image_ref)) = self
            .results()
            .get(self.nav.grid_cursor())
            .map(|r| (r.id, r.image_ref.clone()))
        else {
            return;
        };
        info!("Opening instrument {id}");
        self.apply(|p| p.close());
        self.nav.open(id);
        self.pictures.request(&image_ref, &self.resolver);
    }

    fn go_home(&mut self) {
        self.apply(|p| p.close());
        self.nav.back_to_catalog();
    }

    fn select(&mut self, song: Option<SongRecord>) {
        if !self.nav.audio_enabled() {
            debug!("Sound is off, ignoring selection");
            return;
        }
        if let Some(song) = song {
            self.apply(|p| p.select(&song));
        }
    }

    fn play_selected_song(&mut self) {
        let song = self
            .open_record()
            .and_then(|r| r.songs.get(self.nav.song_cursor()))
            .cloned();
        self.select(song);
    }

    fn play_narration(&mut self) {
        let song = self.open_record().and_then(|r| r.narration()).cloned();
        self.select(song);
    }

    fn toggle_audio(&mut self) {
        let enabled = self.nav.toggle_audio();
        info!("Sound {}", if enabled { "on" } else { "off" });
        if !enabled {
            self.apply(|p| p.close());
        }
        self.settings.audio_enabled = enabled;
        self.persist();
    }

    fn switch_language(&mut self) {
        self.settings.locale = self.settings.locale.next();
        info!("Language switched to {}", self.settings.locale);
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path, thread, time::Duration};

    use {
        crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
        tempfile::{TempDir, tempdir},
    };

    use super::App;
    use crate::{
        config::Settings,
        locale::Locale,
        navigation::View,
        playback::{NullBackend, Phase},
    };

    const CATALOG: &str = r#"[
      { "code": 1, "name": "Davul", "text": "Vurmalı bir çalgı.", "text_en": "A percussion instrument.",
        "picture": "images/davul.png",
        "songs": [
          { "id": "s1", "name": "Zeybek", "player": "Ali Usta", "path": "sounds/zeybek.mp3" },
          { "id": "s2", "name": "Davul Açıklama", "path": "sounds/davul_aciklama.mp3" }
        ] },
      { "code": 2, "name": "Ney", "text": "Üflemeli bir çalgı.", "picture": "images/ney.png", "songs": [] },
      { "code": 3, "name": "Drum Kit", "text": "Bateri.", "picture": "images/bateri.png", "songs": [] }
    ]"#;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn settle(app: &mut App) {
        for _ in 0..200 {
            app.on_tick();
            if app.store().is_some() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("catalog never loaded");
    }

    fn app_with_catalog(dir: &Path, catalog: Option<&str>) -> App {
        let assets = dir.join("assets");
        fs::create_dir_all(assets.join("data")).unwrap();
        if let Some(json) = catalog {
            fs::write(assets.join("data").join("data.json"), json).unwrap();
        }
        let settings = Settings {
            asset_base: assets.to_str().unwrap().to_string(),
            ..Settings::default()
        };
        let mut app = App::with_backend(
            settings,
            dir.join("settings.json"),
            Box::new(NullBackend::new()),
        );
        settle(&mut app);
        app
    }

    fn setup() -> (TempDir, App) {
        let dir = tempdir().unwrap();
        let app = app_with_catalog(dir.path(), Some(CATALOG));
        (dir, app)
    }

    fn names(app: &App) -> Vec<String> {
        app.results().iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn search_narrows_and_escape_restores() {
        let (_dir, mut app) = setup();
        assert_eq!(names(&app).len(), 3);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "dru");
        assert_eq!(names(&app), vec!["Drum Kit"]);

        press(&mut app, KeyCode::Esc);
        assert!(!app.navigation().search().visible);
        assert_eq!(names(&app).len(), 3);
    }

    #[test]
    fn typing_q_while_searching_does_not_quit() {
        let (_dir, mut app) = setup();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "q");
        assert!(!app.quit);
        assert_eq!(app.navigation().search().query, "q");
    }

    #[test]
    fn search_matches_descriptions_in_active_language() {
        let (_dir, mut app) = setup();
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.locale(), Locale::En);
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "percussion");
        assert_eq!(names(&app), vec!["Davul"]);
    }

    #[test]
    fn failed_load_surfaces_error_until_closed() {
        let (_dir, mut app) = setup();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.navigation().view(), View::Detail(1));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.player.phase(), Phase::Loading);
        app.on_tick();
        assert_eq!(app.player.phase(), Phase::Errored);
        assert!(app.player_view().is_some_and(|v| v.error.is_some()));

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.player.phase(), Phase::Idle);
        assert!(app.player_view().is_none());
    }

    #[test]
    fn narration_key_selects_the_narration() {
        let (_dir, mut app) = setup();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.active_song_id(), Some("s2"));
    }

    #[test]
    fn going_home_resets_search_and_closes_player() {
        let (_dir, mut app) = setup();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "dav");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.navigation().view(), View::Detail(1));

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.active_song_id(), Some("s2"));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.navigation().view(), View::Grid);
        assert!(app.navigation().search().query.is_empty());
        assert_eq!(app.player.phase(), Phase::Idle);
    }

    #[test]
    fn sound_off_ignores_selection_and_is_saved() {
        let (dir, mut app) = setup();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.player.phase(), Phase::Idle);

        let saved = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert!(!saved.audio_enabled);
    }

    #[test]
    fn persisting_keeps_command_line_asset_base_out_of_file() {
        let (dir, mut app) = setup();
        press(&mut app, KeyCode::Char('g'));
        let saved = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(saved.locale, Locale::En);
        assert_eq!(saved.asset_base, Settings::default().asset_base);
    }

    #[test]
    fn unreadable_settings_file_is_not_overwritten() {
        let (dir, mut app) = setup();
        let path = dir.path().join("settings.json");
        let broken = r#"{ "asset_base": "/srv/muzik", "locale": "#;
        fs::write(&path, broken).unwrap();

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.locale(), Locale::En);
        assert_eq!(fs::read_to_string(&path).unwrap(), broken);
    }

    #[test]
    fn theme_selector_applies_choice() {
        let (_dir, mut app) = setup();
        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.settings().theme, 1);
        assert_eq!(app.theme_selector(), None);
    }

    #[test]
    fn missing_catalog_loads_as_empty() {
        let dir = tempdir().unwrap();
        let app = app_with_catalog(dir.path(), None);
        assert!(app.store().is_some_and(|s| s.is_empty()));
        assert!(app.results().is_empty());
    }
}
