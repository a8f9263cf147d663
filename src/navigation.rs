//! Which screen is open, the grid cursor, and the search panel.

use crate::catalog::InstrumentId;

/// Search panel state. Cleared whenever the user returns to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    pub query: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Grid,
    Detail(InstrumentId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    view: View,
    search: SearchState,
    grid_cursor: usize,
    song_cursor: usize,
    audio_enabled: bool,
}

impl Navigation {
    pub fn new(audio_enabled: bool) -> Self {
        Self {
            view: View::Grid,
            search: SearchState::default(),
            grid_cursor: 0,
            song_cursor: 0,
            audio_enabled,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn grid_cursor(&self) -> usize {
        self.grid_cursor
    }

    pub fn song_cursor(&self) -> usize {
        self.song_cursor
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    pub fn open(&mut self, id: InstrumentId) {
        self.view = View::Detail(id);
        self.song_cursor = 0;
    }

    /// Returns to the grid, dropping any search.
    pub fn back_to_catalog(&mut self) {
        self.view = View::Grid;
        self.search = SearchState::default();
        self.grid_cursor = 0;
    }

    /// Shows or hides the search panel; hiding it clears the query.
    pub fn toggle_search(&mut self) {
        if self.search.visible {
            self.search = SearchState::default();
        } else {
            self.search.visible = true;
        }
        self.grid_cursor = 0;
    }

    pub fn push_query(&mut self, ch: char) {
        if self.search.visible {
            self.search.query.push(ch);
            self.grid_cursor = 0;
        }
    }

    pub fn pop_query(&mut self) {
        if self.search.query.pop().is_some() {
            self.grid_cursor = 0;
        }
    }

    pub fn clear_query(&mut self) {
        self.search.query.clear();
        self.grid_cursor = 0;
    }

    pub fn toggle_audio(&mut self) -> bool {
        self.audio_enabled = !self.audio_enabled;
        self.audio_enabled
    }

    /// Moves the grid cursor by `delta` cells within `len` results.
    pub fn move_grid(&mut self, delta: isize, len: usize) {
        self.grid_cursor = step(self.grid_cursor, delta, len);
    }

    pub fn move_song(&mut self, delta: isize, len: usize) {
        self.song_cursor = step(self.song_cursor, delta, len);
    }

    /// Pulls the grid cursor back inside a result list that shrank.
    pub fn clamp_grid(&mut self, len: usize) {
        self.grid_cursor = self.grid_cursor.min(len.saturating_sub(1));
    }
}

fn step(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cursor.saturating_add_signed(delta).min(len - 1)
}
