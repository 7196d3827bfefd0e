//! Browser session: runs coordinator effects against real backends
//!
//! Everything happens on one task. Intents, history moves and effect
//! completions are fed to the coordinator in arrival order, so the
//! coordinator never needs locking.

use std::sync::Arc;

use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::api::{self, FeedBackend, SearchBackend};
use crate::coordinator::{Coordinator, Effect, Event, Mode, NavigationError, ViewState};
use crate::history::HistoryBridge;
use crate::models::{Feed, Location, SearchResult};
use crate::panels::{intent_channel, Intent, IntentSender, LoadingState, Panel};

/// Point-in-time copy of what the browser shows
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub mode: Option<Mode>,
    pub search_term: String,
    pub feed_url: String,
    pub results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_error: Option<String>,
    pub player_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playing_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_source: Option<String>,
}

/// A running browser: coordinator plus the work it has asked for
pub struct Session<H, S, F>
where
    H: HistoryBridge,
{
    coordinator: Coordinator<H>,
    search: Arc<S>,
    feeds: Arc<F>,
    intents: UnboundedReceiver<Intent>,
    intents_open: bool,
    navigations: UnboundedReceiver<Location>,
    pending: FuturesUnordered<LocalBoxFuture<'static, Event>>,
    last_error: Option<NavigationError>,
}

impl<H, S, F> Session<H, S, F>
where
    H: HistoryBridge,
    S: SearchBackend + 'static,
    F: FeedBackend + 'static,
{
    /// Start a session at the history's current location.
    ///
    /// Returns the session and the sender panels use to emit intents. The
    /// session stops once every sender is dropped and no work is left.
    pub fn new(history: H, search: Arc<S>, feeds: Arc<F>) -> (Self, IntentSender) {
        let (sender, intents) = intent_channel();
        let mut coordinator = Coordinator::new(history);
        let navigations = coordinator.history_mut().subscribe();

        let mut session = Self {
            coordinator,
            search,
            feeds,
            intents,
            intents_open: true,
            navigations,
            pending: FuturesUnordered::new(),
            last_error: None,
        };
        let effects = session.coordinator.start();
        session.execute(effects);

        (session, sender)
    }

    pub fn coordinator(&self) -> &Coordinator<H> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut Coordinator<H> {
        &mut self.coordinator
    }

    pub fn view(&self) -> &ViewState {
        self.coordinator.view()
    }

    pub fn history(&self) -> &H {
        self.coordinator.history()
    }

    /// Move the history forward; the view follows on the next `settle`
    pub fn forward(&mut self) {
        self.coordinator.history_mut().forward();
    }

    pub fn snapshot(&self) -> Snapshot {
        let view = self.coordinator.view();
        let search = self.coordinator.search_panel();
        let feed = self.coordinator.feed_panel();
        let error = |loading: &LoadingState| {
            loading
                .is_error()
                .then(|| loading.message().unwrap_or_default().to_string())
        };

        Snapshot {
            mode: view.mode(),
            search_term: view.search_term().to_string(),
            feed_url: view.feed_url().to_string(),
            results: search.results().to_vec(),
            search_error: error(search.loading()),
            feed: feed.feed().cloned(),
            feed_error: error(feed.loading()),
            player_visible: view.player_visible(),
            playing_url: view.playing_url().map(str::to_string),
            player_source: self.coordinator.player_panel().source().map(str::to_string),
        }
    }

    /// Remote calls still in flight
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Most recent event the coordinator refused
    pub fn last_error(&self) -> Option<&NavigationError> {
        self.last_error.as_ref()
    }

    /// Handle everything already queued and wait for all in-flight work.
    ///
    /// History moves are handled before intents so a back request is fully
    /// applied before the next user action.
    pub async fn settle(&mut self) {
        loop {
            if let Ok(location) = self.navigations.try_recv() {
                self.dispatch(Event::Navigated(location));
                continue;
            }
            if let Ok(intent) = self.intents.try_recv() {
                self.dispatch(Event::Intent(intent));
                continue;
            }
            match self.pending.next().await {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
    }

    /// Run until every intent sender is gone and no work remains
    pub async fn run(&mut self) {
        loop {
            if !self.intents_open && self.pending.is_empty() {
                // Back/forward notifications may still be queued
                match self.navigations.try_recv() {
                    Ok(location) => {
                        self.dispatch(Event::Navigated(location));
                        continue;
                    }
                    Err(_) => break,
                }
            }

            tokio::select! {
                biased;

                Some(location) = self.navigations.recv() => {
                    self.dispatch(Event::Navigated(location));
                }
                Some(event) = self.pending.next(), if !self.pending.is_empty() => {
                    self.dispatch(event);
                }
                intent = self.intents.recv(), if self.intents_open => match intent {
                    Some(intent) => self.dispatch(Event::Intent(intent)),
                    None => {
                        tracing::debug!("intent channel closed");
                        self.intents_open = false;
                    }
                },
                else => break,
            }
        }
    }

    fn dispatch(&mut self, event: Event) {
        match self.coordinator.handle(event) {
            Ok(effects) => self.execute(effects),
            Err(e) => {
                tracing::warn!(error = %e, "event rejected");
                self.last_error = Some(e);
            }
        }
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Search {
                    ticket,
                    term,
                    push_history,
                } => {
                    let backend = Arc::clone(&self.search);
                    self.pending.push(
                        async move {
                            let outcome = backend.search(&term).await;
                            Event::SearchFinished {
                                ticket,
                                term,
                                push_history,
                                outcome,
                            }
                        }
                        .boxed_local(),
                    );
                }
                Effect::LoadFeed { ticket, url } => {
                    let backend = Arc::clone(&self.feeds);
                    self.pending.push(
                        async move {
                            let outcome = api::load_feed(backend.as_ref(), &url).await;
                            Event::FeedFinished {
                                ticket,
                                url,
                                outcome,
                            }
                        }
                        .boxed_local(),
                    );
                }
                Effect::Play { url } => {
                    let source = self.feeds.playable_url(&url);
                    tracing::info!(url = %url, source = %source, "playing");
                    self.coordinator.set_player_source(source);
                }
            }
        }
    }
}
