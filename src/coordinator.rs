//! View-state coordinator
//!
//! Keeps the search, feed and player panels consistent with the session
//! history. Two kinds of input arrive: history moves (`Event::Navigated`)
//! and user intents. History moves re-derive the whole view from the
//! location and never write history; only explicit user actions (a search
//! submit, a result pick) push entries. Remote work is not performed here:
//! handling an event returns `Effect`s and their completions come back as
//! events.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::api::{FetchError, SearchError};
use crate::history::HistoryBridge;
use crate::models::{Feed, Location, SearchResult};
use crate::panels::{FeedPanel, Intent, LoadingState, Panel, PlayerPanel, SearchPanel};

/// Query parameter carrying the search term
pub const SEARCH_PARAM: &str = "search";
/// Query parameter carrying the feed URL
pub const FEED_PARAM: &str = "feed";

pub const SEARCH_LABEL: &str = "Search";
pub const PODCAST_LABEL: &str = "Podcast";

// =============================================================================
// Mode / View State
// =============================================================================

/// Which main panel is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Searching,
    ViewingFeed,
}

/// A single field of `ViewState` changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    SearchVisible(bool),
    FeedVisible(bool),
    PlayerVisible(bool),
    SearchTerm(String),
    FeedUrl(String),
    PlayingUrl(Option<String>),
}

/// The browser's navigation state.
///
/// Fields are only written by the coordinator. Search and feed are never
/// both visible once an event has been handled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    search_visible: bool,
    feed_visible: bool,
    player_visible: bool,
    search_term: String,
    feed_url: String,
    playing_url: Option<String>,
}

impl ViewState {
    pub fn search_visible(&self) -> bool {
        self.search_visible
    }

    pub fn feed_visible(&self) -> bool {
        self.feed_visible
    }

    pub fn player_visible(&self) -> bool {
        self.player_visible
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    pub fn playing_url(&self) -> Option<&str> {
        self.playing_url.as_deref()
    }

    /// `None` before the first location has been applied
    pub fn mode(&self) -> Option<Mode> {
        match (self.search_visible, self.feed_visible) {
            (true, false) => Some(Mode::Searching),
            (false, true) => Some(Mode::ViewingFeed),
            _ => None,
        }
    }
}

// =============================================================================
// Events / Effects
// =============================================================================

/// Identifies one remote call; later tickets supersede earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the coordinator reacts to
#[derive(Debug)]
pub enum Event {
    /// The history moved (back/forward); carries the new location
    Navigated(Location),
    /// A user action
    Intent(Intent),
    /// A search effect completed
    SearchFinished {
        ticket: Ticket,
        term: String,
        push_history: bool,
        outcome: Result<Vec<SearchResult>, SearchError>,
    },
    /// A feed load effect completed; `Ok(None)` means nothing was loaded
    FeedFinished {
        ticket: Ticket,
        url: String,
        outcome: Result<Option<Feed>, FetchError>,
    },
}

/// Remote work requested by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run a podcast search; on success, push history iff `push_history`
    Search {
        ticket: Ticket,
        term: String,
        push_history: bool,
    },
    /// Fetch and parse a feed
    LoadFeed { ticket: Ticket, url: String },
    /// Hand a media URL to the player
    Play { url: String },
}

/// Events the coordinator refuses to act on
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Unknown navigation intent: {0}")]
    UnknownIntent(String),
}

// =============================================================================
// Coordinator
// =============================================================================

type Observer = Box<dyn FnMut(&ViewChange)>;

/// Owns the view state and panels; the only writer of either
pub struct Coordinator<H: HistoryBridge> {
    history: H,
    view: ViewState,
    search: SearchPanel,
    feed: FeedPanel,
    player: PlayerPanel,
    observers: Vec<Observer>,
    next_ticket: u64,
    /// Latest outstanding search; completions for any other ticket are stale
    search_ticket: Option<Ticket>,
    feed_ticket: Option<Ticket>,
}

impl<H: HistoryBridge> fmt::Debug for Coordinator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("view", &self.view)
            .field("search_ticket", &self.search_ticket)
            .field("feed_ticket", &self.feed_ticket)
            .finish_non_exhaustive()
    }
}

impl<H: HistoryBridge> Coordinator<H> {
    /// Create a coordinator with every panel hidden; call `start` next
    pub fn new(history: H) -> Self {
        Self {
            history,
            view: ViewState::default(),
            search: SearchPanel::default(),
            feed: FeedPanel::default(),
            player: PlayerPanel::default(),
            observers: Vec::new(),
            next_ticket: 0,
            search_ticket: None,
            feed_ticket: None,
        }
    }

    /// Apply the history's current location (initial page load)
    pub fn start(&mut self) -> Vec<Effect> {
        let location = self.history.current_location();
        tracing::debug!(%location, "starting");
        self.derive(&location)
    }

    /// Register a callback for every view-state field change
    pub fn on_change(&mut self, observer: impl FnMut(&ViewChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn mode(&self) -> Option<Mode> {
        self.view.mode()
    }

    pub fn search_panel(&self) -> &SearchPanel {
        &self.search
    }

    pub fn feed_panel(&self) -> &FeedPanel {
        &self.feed
    }

    pub fn player_panel(&self) -> &PlayerPanel {
        &self.player
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// Handle one event and return the remote work it requires
    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>, NavigationError> {
        match event {
            Event::Navigated(location) => Ok(self.derive(&location)),
            Event::Intent(intent) => self.handle_intent(intent),
            Event::SearchFinished {
                ticket,
                term,
                push_history,
                outcome,
            } => {
                self.finish_search(ticket, &term, push_history, outcome);
                Ok(Vec::new())
            }
            Event::FeedFinished {
                ticket,
                url,
                outcome,
            } => {
                self.finish_feed(ticket, &url, outcome);
                Ok(Vec::new())
            }
        }
    }

    fn handle_intent(&mut self, intent: Intent) -> Result<Vec<Effect>, NavigationError> {
        tracing::debug!(%intent, "intent");
        match intent {
            Intent::SearchSubmitted { term } => {
                if self.mode() == Some(Mode::ViewingFeed) {
                    tracing::debug!(term = %term, "search submitted while viewing a feed, ignored");
                    return Ok(Vec::new());
                }
                Ok(self.submit_search(&term, true))
            }
            Intent::ResultSelected { href } => Ok(self.select_result(&href)),
            Intent::EpisodeSelected { href } => Ok(self.select_episode(&href)),
            Intent::BackRequested => {
                // The resulting history notification does the transition
                self.history.back();
                Ok(Vec::new())
            }
            Intent::Unknown { name } => {
                tracing::warn!(intent = %name, "unexpected intent");
                Err(NavigationError::UnknownIntent(name))
            }
        }
    }

    /// Rebuild the view from a location. Never writes history.
    ///
    /// Both the search and the feed are refreshed; the presence of a `feed`
    /// parameter only decides which of the two is shown.
    fn derive(&mut self, location: &Location) -> Vec<Effect> {
        let term = location.param(SEARCH_PARAM).unwrap_or_default().to_string();
        let url = location.param(FEED_PARAM).unwrap_or_default().to_string();

        let mut effects = self.submit_search(&term, false);
        effects.extend(self.load_feed(&url));

        let mode = if location.has_param(FEED_PARAM) {
            Mode::ViewingFeed
        } else {
            Mode::Searching
        };
        self.show(mode);

        effects
    }

    /// Set the term and run a search.
    ///
    /// `push_history` is true only for explicit user submissions. A blank
    /// term clears the results instead of searching and never pushes.
    pub fn submit_search(&mut self, term: &str, push_history: bool) -> Vec<Effect> {
        self.set_search_term(term);

        if term.trim().is_empty() {
            self.search_ticket = None;
            self.search.set_content(Vec::new());
            self.search.set_working(false);
            return Vec::new();
        }

        let ticket = self.issue_ticket();
        self.search_ticket = Some(ticket);
        self.search
            .set_loading(LoadingState::Loading(Some(format!("Searching for {}...", term))));

        vec![Effect::Search {
            ticket,
            term: term.to_string(),
            push_history,
        }]
    }

    /// Set the feed URL and load it; an empty URL loads nothing
    pub fn load_feed(&mut self, url: &str) -> Vec<Effect> {
        self.set_feed_url(url);
        if url.is_empty() {
            self.feed_ticket = None;
            self.feed.set_working(false);
            return Vec::new();
        }

        let ticket = self.issue_ticket();
        self.feed_ticket = Some(ticket);
        self.feed
            .set_loading(LoadingState::Loading(Some("Loading feed...".to_string())));

        vec![Effect::LoadFeed {
            ticket,
            url: url.to_string(),
        }]
    }

    fn select_result(&mut self, href: &str) -> Vec<Effect> {
        self.show(Mode::ViewingFeed);
        self.set_feed_url(href);

        let location = self
            .history
            .current_location()
            .with_path("/")
            .with_param(FEED_PARAM, href);
        self.record(location, PODCAST_LABEL);

        self.load_feed(href)
    }

    fn select_episode(&mut self, href: &str) -> Vec<Effect> {
        if !self.view.player_visible {
            self.view.player_visible = true;
            self.player.set_visible(true);
            self.notify(ViewChange::PlayerVisible(true));
        }
        if self.view.playing_url.as_deref() != Some(href) {
            self.view.playing_url = Some(href.to_string());
            self.notify(ViewChange::PlayingUrl(Some(href.to_string())));
        }
        vec![Effect::Play {
            url: href.to_string(),
        }]
    }

    /// Record the player's resolved source for the current episode
    pub fn set_player_source(&mut self, source: String) {
        self.player.set_content(source);
    }

    fn finish_search(
        &mut self,
        ticket: Ticket,
        term: &str,
        push_history: bool,
        outcome: Result<Vec<SearchResult>, SearchError>,
    ) {
        if self.search_ticket != Some(ticket) {
            tracing::debug!(%ticket, term, "dropping stale search response");
            return;
        }
        self.search_ticket = None;

        match outcome {
            Ok(results) => {
                tracing::debug!(term, count = results.len(), "search finished");
                self.search.set_content(results);
                self.search.set_working(false);
                if push_history {
                    let location = self
                        .history
                        .current_location()
                        .with_param(SEARCH_PARAM, term);
                    self.record(location, SEARCH_LABEL);
                }
            }
            Err(e) => {
                tracing::warn!(term, error = %e, "search failed");
                self.search.set_loading(LoadingState::Error(e.to_string()));
            }
        }
    }

    fn finish_feed(&mut self, ticket: Ticket, url: &str, outcome: Result<Option<Feed>, FetchError>) {
        if self.feed_ticket != Some(ticket) {
            tracing::debug!(%ticket, url, "dropping stale feed response");
            return;
        }
        self.feed_ticket = None;

        match outcome {
            Ok(Some(feed)) => {
                tracing::debug!(url, episodes = feed.episodes.len(), "feed loaded");
                self.feed.set_content(feed);
                self.feed.set_working(false);
            }
            Ok(None) => self.feed.set_working(false),
            Err(e) => {
                // Prior feed stays; only the indicator changes
                tracing::warn!(url, error = %e, "feed load failed");
                self.feed.set_loading(LoadingState::Error(e.to_string()));
            }
        }
    }

    /// Push `location` unless it is already the current entry
    fn record(&mut self, location: Location, label: &str) {
        if self.history.current_location() == location {
            tracing::debug!(%location, label, "skipping redundant history push");
            return;
        }
        self.history.push(location, label);
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Switch the main panel; both flags change in one step
    fn show(&mut self, mode: Mode) {
        let search_visible = mode == Mode::Searching;
        let feed_visible = mode == Mode::ViewingFeed;

        let search_changed = self.view.search_visible != search_visible;
        let feed_changed = self.view.feed_visible != feed_visible;
        self.view.search_visible = search_visible;
        self.view.feed_visible = feed_visible;
        self.search.set_visible(search_visible);
        self.feed.set_visible(feed_visible);

        if search_changed {
            self.notify(ViewChange::SearchVisible(search_visible));
        }
        if feed_changed {
            self.notify(ViewChange::FeedVisible(feed_visible));
        }
    }

    fn set_search_term(&mut self, term: &str) {
        if self.view.search_term != term {
            self.view.search_term = term.to_string();
            self.notify(ViewChange::SearchTerm(term.to_string()));
        }
    }

    fn set_feed_url(&mut self, url: &str) {
        if self.view.feed_url != url {
            self.view.feed_url = url.to_string();
            self.notify(ViewChange::FeedUrl(url.to_string()));
        }
    }

    fn notify(&mut self, change: ViewChange) {
        for observer in &mut self.observers {
            observer(&change);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
