// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::debug;

use crate::api::{CustomList, Movie, PhimHubClient, WatchProgressBody};
use crate::config::UiConfig;
use crate::history::WatchProgress;
use crate::player::Player;
use crate::search::{MovieSearchSource, SearchSession};
use crate::state::{AppState, ServerSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Catalog,
    Favorites,
    History,
    Lists,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Catalog => "Catalog",
            Screen::Favorites => "Favorites",
            Screen::History => "Watch History",
            Screen::Lists => "Custom Lists",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the server search; every keystroke feeds the session.
    Search,
    /// Typing into the local fuzzy filter; never touches the network.
    Filter,
}

#[derive(Debug, Clone)]
pub enum Status {
    Idle,
    Loading(String),
    Error(String),
}

pub enum Action {
    Quit,
}

pub struct App {
    pub state: AppState,
    pub session: ServerSession,
    pub player: Player,
    pub ui: UiConfig,

    pub screen: Screen,
    pub input_mode: InputMode,
    pub status: Status,
    pub show_help: bool,

    pub search: SearchSession<Movie>,
    pub filter_input: String,
    filter_matches: Option<Vec<usize>>,
    matcher: SkimMatcherV2,

    pub selected: usize,
    pub scroll_offset: usize,

    pub favorites: Vec<Movie>,
    pub favorite_ids: HashSet<u64>,
    pub history_entries: Vec<WatchProgress>,
    pub lists: Vec<CustomList>,

    pub now_playing: Option<String>,
}

impl App {
    pub fn new(state: AppState, session: ServerSession, player: Player, ui: UiConfig) -> Self {
        let source = Arc::new(MovieSearchSource::new(Arc::clone(&session.api)));
        let mut search = SearchSession::new(
            source,
            ui.page_size as u64,
            Duration::from_millis(ui.search_debounce_ms),
        );
        search.open();

        Self {
            state,
            session,
            player,
            ui,
            screen: Screen::Catalog,
            input_mode: InputMode::Normal,
            status: Status::Loading("Loading catalog...".to_string()),
            show_help: false,
            search,
            filter_input: String::new(),
            filter_matches: None,
            matcher: SkimMatcherV2::default(),
            selected: 0,
            scroll_offset: 0,
            favorites: Vec::new(),
            favorite_ids: HashSet::new(),
            history_entries: Vec::new(),
            lists: Vec::new(),
            now_playing: None,
        }
    }

    /// Indices into `search.items()` after the local fuzzy filter.
    pub fn catalog_rows(&self) -> Vec<usize> {
        match &self.filter_matches {
            Some(matches) => matches.clone(),
            None => (0..self.search.items().len()).collect(),
        }
    }

    pub fn visible_len(&self) -> usize {
        match self.screen {
            Screen::Catalog => self.catalog_rows().len(),
            Screen::Favorites => self.favorites.len(),
            Screen::History => self.history_entries.len(),
            Screen::Lists => self.lists.len(),
        }
    }

    fn selected_movie(&self) -> Option<&Movie> {
        match self.screen {
            Screen::Catalog => {
                let rows = self.catalog_rows();
                rows.get(self.selected)
                    .and_then(|&i| self.search.items().get(i))
            }
            Screen::Favorites => self.favorites.get(self.selected),
            _ => None,
        }
    }

    fn recompute_filter(&mut self) {
        if self.filter_input.is_empty() {
            self.filter_matches = None;
            return;
        }

        let mut scored: Vec<(i64, usize)> = self
            .search
            .items()
            .iter()
            .enumerate()
            .filter_map(|(i, movie)| {
                self.matcher
                    .fuzzy_match(&movie.name, &self.filter_input)
                    .map(|score| (score, i))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        self.filter_matches = Some(scored.into_iter().map(|(_, i)| i).collect());
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// Apply completed search fetches and refresh playback state.
    /// Returns true when a redraw is due.
    pub async fn async_tick(&mut self) -> bool {
        let mut changed = false;
        while let Some(update) = self.search.try_update() {
            self.search.apply(update);
            changed = true;
        }

        if changed {
            if let Some(error) = self.search.error() {
                self.status = Status::Error(format!("{} (press 'r' to retry)", error));
            } else if matches!(self.status, Status::Loading(_) | Status::Error(_)) {
                self.status = Status::Idle;
            }
            if self.filter_matches.is_some() {
                self.recompute_filter();
            }
            self.clamp_selection();
        }

        if self.now_playing.is_some() && !self.player.is_playing().await {
            self.now_playing = None;
            changed = true;
        }

        changed
    }

    /// The intersection-sentinel analogue: once the selection is within
    /// the last few loaded rows, fetch the next page.
    fn maybe_load_more(&mut self) {
        if self.screen != Screen::Catalog || self.filter_matches.is_some() {
            return;
        }
        let len = self.search.items().len();
        if len == 0 {
            return;
        }
        if self.selected + self.ui.scroll_sentinel_rows >= len && self.search.load_more() {
            debug!("sentinel crossed, loading page {}", self.search.current_page() + 1);
        }
    }

    fn move_up(&mut self, by: usize) {
        self.selected = self.selected.saturating_sub(by);
    }

    fn move_down(&mut self, by: usize) {
        let len = self.visible_len();
        if len > 0 {
            self.selected = (self.selected + by).min(len - 1);
        }
        self.maybe_load_more();
    }

    fn jump_end(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.selected = len - 1;
        }
        self.maybe_load_more();
    }

    async fn enter_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.selected = 0;
        self.scroll_offset = 0;

        let result = match screen {
            Screen::Catalog => Ok(()),
            Screen::Favorites => self.reload_favorites().await,
            Screen::History => self.reload_history().await,
            Screen::Lists => self.reload_lists().await,
        };

        self.status = match result {
            Ok(()) => Status::Idle,
            Err(e) => Status::Error(e.to_string()),
        };
    }

    async fn reload_favorites(&mut self) -> anyhow::Result<()> {
        self.favorites = self.session.api.get_favorites().await?;
        self.favorite_ids = self.favorites.iter().map(|m| m.id).collect();
        Ok(())
    }

    async fn reload_history(&mut self) -> anyhow::Result<()> {
        // Server history is preferred; the local file covers offline use.
        match self.session.api.get_watch_history().await {
            Ok(entries) => {
                self.history_entries = entries
                    .into_iter()
                    .map(|e| WatchProgress {
                        movie_id: e.movie_id,
                        movie_name: e
                            .movie_name
                            .unwrap_or_else(|| format!("movie {}", e.movie_id)),
                        episode: e.episode,
                        position_secs: e.position_secs,
                        duration_secs: e.duration_secs,
                        updated_at: e
                            .updated_at
                            .and_then(|t| t.parse().ok())
                            .unwrap_or_else(Utc::now),
                    })
                    .collect();
            }
            Err(e) => {
                debug!("Server history unavailable: {}", e);
                self.history_entries = self.state.history.get_entries(self.session.server_hash())?;
            }
        }
        Ok(())
    }

    async fn reload_lists(&mut self) -> anyhow::Result<()> {
        self.lists = self.session.api.get_custom_lists().await?;
        Ok(())
    }

    async fn toggle_favorite(&mut self) {
        let Some(movie) = self.selected_movie().cloned() else {
            return;
        };

        let result = if self.favorite_ids.contains(&movie.id) {
            self.session.api.remove_favorite(movie.id).await
        } else {
            self.session.api.add_favorite(movie.id).await
        };

        match result {
            Ok(()) => {
                if !self.favorite_ids.remove(&movie.id) {
                    self.favorite_ids.insert(movie.id);
                }
                if self.screen == Screen::Favorites {
                    if let Err(e) = self.reload_favorites().await {
                        self.status = Status::Error(e.to_string());
                        return;
                    }
                    self.clamp_selection();
                }
                self.status = Status::Idle;
            }
            Err(e) => {
                self.status = Status::Error(format!("Favorite update failed: {}", e));
            }
        }
    }

    async fn play_selected(&mut self) {
        let (movie_id, episode) = match self.screen {
            Screen::History => match self.history_entries.get(self.selected) {
                Some(entry) => (entry.movie_id, entry.episode),
                None => return,
            },
            _ => match self.selected_movie() {
                Some(movie) => (movie.id, None),
                None => return,
            },
        };

        self.status = Status::Loading("Resolving stream...".to_string());

        let detail = match self.session.api.get_movie(movie_id).await {
            Ok(detail) => detail,
            Err(e) => {
                self.status = Status::Error(format!("Could not load movie: {}", e));
                return;
            }
        };

        let Some(url) = PhimHubClient::stream_url(&detail, episode) else {
            self.status = Status::Error(format!("No playable source for '{}'", detail.movie.name));
            return;
        };

        if let Err(e) = self.player.play_tui(&url).await {
            self.status = Status::Error(format!("Playback failed: {}", e));
            return;
        }

        self.now_playing = Some(detail.movie.name.clone());
        self.status = Status::Idle;

        let progress = WatchProgress {
            movie_id,
            movie_name: detail.movie.name.clone(),
            episode,
            position_secs: 0,
            duration_secs: None,
            updated_at: Utc::now(),
        };
        if let Err(e) = self.state.history.record(self.session.server_hash(), progress) {
            debug!("Failed to record local history: {}", e);
        }

        let body = WatchProgressBody {
            position_secs: 0,
            duration_secs: None,
            episode,
        };
        if let Err(e) = self.session.api.push_watch_progress(movie_id, &body).await {
            debug!("Could not push watch progress: {}", e);
        }
    }

    fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.filter_input.clear();
        self.filter_matches = None;
    }

    fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        if !self.search.query().is_empty() {
            self.search.set_query("");
        }
    }

    fn start_filter(&mut self) {
        self.input_mode = InputMode::Filter;
        self.filter_input.clear();
        self.recompute_filter();
    }

    fn cancel_filter(&mut self) {
        self.input_mode = InputMode::Normal;
        self.filter_input.clear();
        self.filter_matches = None;
        self.clamp_selection();
    }

    pub async fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.move_up(1),
            MouseEventKind::ScrollDown => self.move_down(1),
            _ => {}
        }
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        if self.show_help {
            match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) => self.show_help = false,
                _ => {}
            }
            return None;
        }

        // Text-input modes swallow printable keys.
        match self.input_mode {
            InputMode::Search => {
                match key.code {
                    KeyCode::Esc => self.cancel_search(),
                    KeyCode::Enter => self.input_mode = InputMode::Normal,
                    KeyCode::Backspace => {
                        let mut query = self.search.query().to_string();
                        query.pop();
                        self.search.set_query(query);
                    }
                    KeyCode::Char(c) => {
                        let mut query = self.search.query().to_string();
                        query.push(c);
                        self.search.set_query(query);
                    }
                    _ => {}
                }
                return None;
            }
            InputMode::Filter => {
                match key.code {
                    KeyCode::Esc => self.cancel_filter(),
                    KeyCode::Enter => self.input_mode = InputMode::Normal,
                    KeyCode::Backspace => {
                        self.filter_input.pop();
                        self.recompute_filter();
                    }
                    KeyCode::Char(c) => {
                        self.filter_input.push(c);
                        self.recompute_filter();
                    }
                    _ => {}
                }
                return None;
            }
            InputMode::Normal => {}
        }

        match key.code {
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,

            KeyCode::Char('1') => self.enter_screen(Screen::Catalog).await,
            KeyCode::Char('2') => self.enter_screen(Screen::Favorites).await,
            KeyCode::Char('3') => self.enter_screen(Screen::History).await,
            KeyCode::Char('4') => self.enter_screen(Screen::Lists).await,

            KeyCode::Up | KeyCode::Char('k') => self.move_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(1),
            KeyCode::PageUp => self.move_up(10),
            KeyCode::PageDown => self.move_down(10),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.jump_end(),

            KeyCode::Char('/') if self.screen == Screen::Catalog => self.start_search(),
            KeyCode::Char('F') if self.screen == Screen::Catalog => self.start_filter(),
            KeyCode::Char('m') if self.screen == Screen::Catalog => {
                if self.search.load_more() {
                    self.status = Status::Idle;
                }
            }
            KeyCode::Char('r') => match self.screen {
                Screen::Catalog => {
                    // Page errors retry from the failed offset; first-page
                    // errors re-issue the whole query.
                    if !self.search.load_more() {
                        self.search.refresh();
                    }
                    self.status = Status::Idle;
                }
                other => self.enter_screen(other).await,
            },

            KeyCode::Enter => self.play_selected().await,
            KeyCode::Char('f') => self.toggle_favorite().await,
            KeyCode::Char('s') => {
                if let Err(e) = self.player.stop().await {
                    debug!("Failed to stop playback: {}", e);
                }
                self.now_playing = None;
            }
            KeyCode::Esc => {
                if self.filter_matches.is_some() {
                    self.cancel_filter();
                }
            }
            _ => {}
        }

        None
    }
}
