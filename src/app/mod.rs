// Visual Dictionary - A streaming visual dictionary for the terminal
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

pub mod slash;

pub use slash::{Command, parse_command};

use crate::Cli;
use crate::content;
use crate::error::AppError;
use crate::favorites::{Favorite, FavoritesStore, HttpFavorites, MemoryFavorites, toggle_favorite};
use crate::provider::{Provider, ProviderRouter};
use crate::session::{Applied, EntryStatus, FailureKind, Session};
use crate::settings::Settings;
use crate::ui::{self, TabView};
use anyhow::Context as _;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt as _, BufReader};

pub struct App {
    pub session: Session,
    pub tabs: TabView,
    pub settings: Settings,
    /// `None` when no config directory exists; changes then live only in memory.
    pub settings_path: Option<PathBuf>,
    pub favorites: Box<dyn FavoritesStore>,
    /// Last `/favs` listing, indexed by `/open`.
    favorite_listing: Vec<Favorite>,
    /// Tab titles last announced while the active entry streams.
    announced_tabs: Vec<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        session: Session,
        settings: Settings,
        settings_path: Option<PathBuf>,
        favorites: Box<dyn FavoritesStore>,
    ) -> Self {
        Self {
            session,
            tabs: TabView::default(),
            settings,
            settings_path,
            favorites,
            favorite_listing: Vec::new(),
            announced_tabs: Vec::new(),
            should_quit: false,
        }
    }

    /// Current screen for the active entry.
    pub fn render(&mut self) -> String {
        ui::render_session(&self.session, &mut self.tabs)
    }

    /// Run one command and return the text to show for it.
    pub async fn execute(&mut self, command: Command) -> String {
        let before = self.session.current().map(|e| e.id);
        let out = match command {
            Command::Search(query) if query.is_empty() => return String::new(),
            Command::Search(query) => {
                let moved = self.session.submit(&query);
                self.navigated(moved)
            }
            Command::Back => {
                let moved = self.session.back();
                self.navigated(moved)
            }
            Command::Forward => {
                let moved = self.session.forward();
                self.navigated(moved)
            }
            Command::Jump(index) => {
                if self.session.jump_to(index) {
                    self.render()
                } else {
                    format!("no history entry {}", index + 1)
                }
            }
            Command::Tab(title) => self.select_tab(&title),
            Command::Click(word) => {
                let moved = self.session.click_word(content::clean_word(&word));
                self.navigated(moved)
            }
            Command::Words => self.list_words(),
            Command::Related(index) => self.follow_related(index),
            Command::Random => {
                let moved = self.session.pick_random();
                self.navigated(moved)
            }
            Command::Image(path) => {
                if tokio::fs::metadata(&path).await.is_err() {
                    format!("cannot read image {}", path.display())
                } else {
                    let moved = self.session.upload_image(path);
                    self.navigated(moved)
                }
            }
            Command::ToggleFavorite => self.toggle_favorite().await,
            Command::ListFavorites => self.list_favorites().await,
            Command::OpenFavorite(index) => self.open_favorite(index),
            Command::Model(provider) => {
                self.settings.model = provider;
                self.settings_changed(format!("model set to {provider}"))
            }
            Command::Key { provider, key } => {
                self.settings.set_key(provider, &key);
                self.settings_changed(format!("{} key saved", provider.vendor()))
            }
            Command::Reset { confirmed: false } => {
                "WARNING: this wipes the whole history. Type `/reset confirm` to proceed."
                    .to_owned()
            }
            Command::Reset { confirmed: true } => {
                self.session.reset();
                self.favorite_listing.clear();
                self.render()
            }
            Command::Show => self.render(),
            Command::Help => slash::HELP.to_owned(),
            Command::Quit => {
                self.should_quit = true;
                String::new()
            }
            Command::Invalid(message) => message,
        };
        if self.session.current().map(|e| e.id) != before {
            self.tabs = TabView::default();
            self.announced_tabs.clear();
        }
        out
    }

    fn navigated(&mut self, moved: bool) -> String {
        if moved { self.render() } else { String::new() }
    }

    fn select_tab(&mut self, title: &str) -> String {
        let doc = self.session.document().unwrap_or_default();
        if self.tabs.select(&doc, title) {
            self.render()
        } else {
            let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
            format!("no tab `{title}`; tabs: {}", titles.join(", "))
        }
    }

    fn list_words(&self) -> String {
        let doc = self.session.document().unwrap_or_default();
        let mut words = ui::clickable_words(&doc, &self.tabs);
        let mut seen = std::collections::HashSet::new();
        words.retain(|w| seen.insert(w.to_lowercase()));
        if words.is_empty() { "no words yet".to_owned() } else { words.join(" ") }
    }

    fn follow_related(&mut self, index: usize) -> String {
        let doc = self.session.document().unwrap_or_default();
        match doc.related.get(index) {
            Some(topic) => {
                let moved = self.session.submit(topic);
                self.navigated(moved)
            }
            None => format!("no related topic {}", index + 1),
        }
    }

    async fn toggle_favorite(&mut self) -> String {
        let Some(entry) = self.session.current() else {
            return "nothing to save yet".to_owned();
        };
        if entry.is_streaming() || matches!(entry.status, EntryStatus::Failed(_)) {
            return "wait for the entry to finish before saving it".to_owned();
        }
        match toggle_favorite(self.favorites.as_ref(), entry).await {
            Ok(true) => format!("saved {}", entry.label),
            Ok(false) => format!("removed {}", entry.label),
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "favorite toggle failed");
                format!("favorites unavailable: {err:#}")
            }
        }
    }

    async fn list_favorites(&mut self) -> String {
        match self.favorites.list().await {
            Ok(listing) if listing.is_empty() => {
                self.favorite_listing.clear();
                "no favorites yet".to_owned()
            }
            Ok(listing) => {
                let mut out = String::from("FAVORITES\n");
                for (i, favorite) in listing.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {}", i + 1, favorite.label);
                }
                self.favorite_listing = listing;
                out
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "favorites list failed");
                format!("favorites unavailable: {err:#}")
            }
        }
    }

    fn open_favorite(&mut self, index: usize) -> String {
        let Some(favorite) = self.favorite_listing.get(index).cloned() else {
            return format!("no favorite {}; run /favs first", index + 1);
        };
        let moved = self.session.open_saved(&favorite.label, favorite.content, favorite.kind);
        self.navigated(moved)
    }

    /// Persist the settings and hand them to a fresh router. Entries that
    /// are already streaming keep their old source.
    fn settings_changed(&mut self, message: String) -> String {
        self.session.set_source(Rc::new(ProviderRouter::new(self.settings.clone())));
        let Some(path) = self.settings_path.as_deref() else {
            return format!("{message} (not persisted: no config directory)");
        };
        match self.settings.save(path) {
            Ok(()) => message,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "failed to save settings");
                format!("{message} (not persisted: {err:#})")
            }
        }
    }

    /// React to one stream event. Returns a progress line when a new tab
    /// appears in the active entry, and the full screen once it settles.
    pub fn on_stream_event(&mut self, applied: Applied) -> Option<String> {
        match applied {
            Applied::Settled { index } if self.session.cursor() == Some(index) => {
                self.announced_tabs.clear();
                Some(self.render())
            }
            Applied::Updated { index } if self.session.cursor() == Some(index) => {
                self.announce_new_tabs()
            }
            Applied::Settled { .. } | Applied::Updated { .. } | Applied::Dropped => None,
        }
    }

    fn announce_new_tabs(&mut self) -> Option<String> {
        let doc = self.session.document()?;
        let titles: Vec<String> = doc.sections.iter().map(|s| s.title.to_uppercase()).collect();
        if titles.is_empty() || titles == self.announced_tabs {
            return None;
        }
        self.announced_tabs = titles;
        Some(format!("... {}", self.announced_tabs.join("  ")))
    }
}

/// Build the app from the command line: settings, env overrides, router and
/// favorites store. Does no network I/O.
pub fn create_app(cli: &Cli) -> anyhow::Result<App> {
    let settings_path = cli.settings.clone().or_else(Settings::default_path);
    let mut settings = match settings_path.as_deref() {
        Some(path) => Settings::load(path).map_err(|err| {
            tracing::error!(path = %path.display(), error = %format!("{err:#}"), "settings unreadable");
            eprintln!("{err:#}");
            anyhow::Error::new(AppError::SettingsUnreadable)
        })?,
        None => Settings::default(),
    };
    settings.apply_env();
    if let Some(model) = cli.model {
        settings.model = model;
    }
    tracing::info!(?settings, "settings loaded");

    let favorites: Box<dyn FavoritesStore> = match cli.favorites_url.as_deref() {
        Some(url) => Box::new(HttpFavorites::new(url)?),
        None => Box::new(MemoryFavorites::default()),
    };
    let session = Session::new(Rc::new(ProviderRouter::new(settings.clone())));
    Ok(App::new(session, settings, settings_path, favorites))
}

/// Look up one term, wait for it to finish, print it.
pub async fn run_once(app: &mut App, query: &str) -> anyhow::Result<()> {
    if !app.session.submit(query) {
        anyhow::bail!("nothing to look up");
    }
    app.session.settle().await;
    println!("{}", app.render());

    match app.session.current().map(|e| &e.status) {
        Some(EntryStatus::Failed(failure)) => {
            let error = match failure.kind {
                FailureKind::MissingCredential => AppError::MissingCredential,
                FailureKind::Stream => AppError::LookupFailed,
            };
            Err(anyhow::Error::new(error)).context(failure.message.clone())
        }
        _ => Ok(()),
    }
}

/// Interactive loop: one line of stdin per command, stream events applied as
/// they arrive. Ends on `/quit` or end of input.
pub async fn run_repl(app: &mut App, initial: Option<&str>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let model: Provider = app.settings.model;
    println!("visual dictionary ({model}); /help for commands");

    let first = match initial {
        Some(query) => app.execute(Command::Search(query.to_owned())).await,
        None => app.render(),
    };
    print_screen(&first);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let out = app.execute(parse_command(&line)).await;
                print_screen(&out);
            }
            Some(event) = app.session.next_event() => {
                let applied = app.session.apply(event);
                if let Some(screen) = app.on_stream_event(applied) {
                    print_screen(&screen);
                }
            }
        }
        if app.should_quit {
            break;
        }
    }
    tracing::info!(entries = app.session.len(), "repl finished");
    Ok(())
}

fn print_screen(text: &str) {
    if !text.is_empty() {
        println!("{}", text.trim_end());
    }
}
