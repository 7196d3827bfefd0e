//! Panels and the intents they emit
//!
//! The browser shows three panels: search, feed and player. Each one is a
//! plain content model behind the small `Panel` surface; rendering is left
//! to whoever draws them. User actions travel the other way as `Intent`s
//! through an `IntentSender`, never by touching coordinator state.

use std::fmt;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::models::{Feed, SearchResult};

// =============================================================================
// Loading State
// =============================================================================

/// Loading state for async operations
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadingState {
    /// Idle - no loading in progress
    #[default]
    Idle,
    /// Loading with optional message
    Loading(Option<String>),
    /// Error with message
    Error(String),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadingState::Error(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadingState::Loading(Some(msg)) => Some(msg),
            LoadingState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

// =============================================================================
// Panel Surface
// =============================================================================

/// Control surface shared by every panel
pub trait Panel {
    type Content;

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Replace the panel's content wholesale
    fn set_content(&mut self, content: Self::Content);

    /// Current loading state (the "working" indicator)
    fn loading(&self) -> &LoadingState;

    fn set_loading(&mut self, loading: LoadingState);

    /// Toggle the working indicator without a message
    fn set_working(&mut self, working: bool) {
        self.set_loading(if working {
            LoadingState::Loading(None)
        } else {
            LoadingState::Idle
        });
    }

    fn is_working(&self) -> bool {
        self.loading().is_loading()
    }
}

/// Search form and its result list
#[derive(Debug, Clone, Default)]
pub struct SearchPanel {
    visible: bool,
    results: Vec<SearchResult>,
    loading: LoadingState,
}

impl SearchPanel {
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    /// Result at `index`, as listed
    pub fn result(&self, index: usize) -> Option<&SearchResult> {
        self.results.get(index)
    }
}

impl Panel for SearchPanel {
    type Content = Vec<SearchResult>;

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_content(&mut self, content: Self::Content) {
        self.results = content;
    }

    fn loading(&self) -> &LoadingState {
        &self.loading
    }

    fn set_loading(&mut self, loading: LoadingState) {
        self.loading = loading;
    }
}

/// Show header plus episode list
#[derive(Debug, Clone, Default)]
pub struct FeedPanel {
    visible: bool,
    feed: Option<Feed>,
    loading: LoadingState,
}

impl FeedPanel {
    pub fn feed(&self) -> Option<&Feed> {
        self.feed.as_ref()
    }

    /// Media URL of the episode at `index`, if it has one
    pub fn episode_href(&self, index: usize) -> Option<&str> {
        self.feed
            .as_ref()
            .and_then(|f| f.episodes.get(index))
            .and_then(|e| e.media_url.as_deref())
    }
}

impl Panel for FeedPanel {
    type Content = Feed;

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_content(&mut self, content: Self::Content) {
        self.feed = Some(content);
    }

    fn loading(&self) -> &LoadingState {
        &self.loading
    }

    fn set_loading(&mut self, loading: LoadingState) {
        self.loading = loading;
    }
}

/// Audio player; content is the resolved playable source
#[derive(Debug, Clone, Default)]
pub struct PlayerPanel {
    visible: bool,
    source: Option<String>,
    loading: LoadingState,
}

impl PlayerPanel {
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl Panel for PlayerPanel {
    type Content = String;

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_content(&mut self, content: Self::Content) {
        self.source = Some(content);
    }

    fn loading(&self) -> &LoadingState {
        &self.loading
    }

    fn set_loading(&mut self, loading: LoadingState) {
        self.loading = loading;
    }
}

// =============================================================================
// Intents
// =============================================================================

/// A user action addressed to the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Search form submitted
    SearchSubmitted { term: String },
    /// A search result was picked; `href` is its feed URL
    ResultSelected { href: String },
    /// An episode was picked; `href` is its media URL
    EpisodeSelected { href: String },
    /// Feed panel back button
    BackRequested,
    /// Anything else; reported by the coordinator, never acted on
    Unknown { name: String },
}

impl Intent {
    /// Map a named UI event (`search:result:clicked`, ...) to an intent
    pub fn from_event(name: &str, detail: Option<&str>) -> Self {
        let detail = detail.unwrap_or_default().to_string();
        match name {
            "search:submitted" => Intent::SearchSubmitted { term: detail },
            "search:result:clicked" => Intent::ResultSelected { href: detail },
            "feed:item:clicked" => Intent::EpisodeSelected { href: detail },
            "feed:back:clicked" => Intent::BackRequested,
            other => Intent::Unknown {
                name: other.to_string(),
            },
        }
    }

    /// Event name this intent travels under
    pub fn name(&self) -> &str {
        match self {
            Intent::SearchSubmitted { .. } => "search:submitted",
            Intent::ResultSelected { .. } => "search:result:clicked",
            Intent::EpisodeSelected { .. } => "feed:item:clicked",
            Intent::BackRequested => "feed:back:clicked",
            Intent::Unknown { name } => name,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::SearchSubmitted { term } => write!(f, "{} {:?}", self.name(), term),
            Intent::ResultSelected { href } | Intent::EpisodeSelected { href } => {
                write!(f, "{} {}", self.name(), href)
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Create a connected intent sender/receiver pair
pub fn intent_channel() -> (IntentSender, UnboundedReceiver<Intent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IntentSender { tx }, rx)
}

/// Typed handle panels use to emit intents
#[derive(Debug, Clone)]
pub struct IntentSender {
    tx: UnboundedSender<Intent>,
}

impl IntentSender {
    /// Send an intent; false once the coordinator side is gone
    pub fn send(&self, intent: Intent) -> bool {
        self.tx.send(intent).is_ok()
    }

    pub fn submit_search(&self, term: impl Into<String>) -> bool {
        self.send(Intent::SearchSubmitted { term: term.into() })
    }

    pub fn select_result(&self, href: impl Into<String>) -> bool {
        self.send(Intent::ResultSelected { href: href.into() })
    }

    pub fn select_episode(&self, href: impl Into<String>) -> bool {
        self.send(Intent::EpisodeSelected { href: href.into() })
    }

    pub fn back(&self) -> bool {
        self.send(Intent::BackRequested)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_state() {
        let idle = LoadingState::Idle;
        assert!(!idle.is_loading());
        assert!(!idle.is_error());

        let loading = LoadingState::Loading(Some("Searching...".into()));
        assert!(loading.is_loading());
        assert_eq!(loading.message(), Some("Searching..."));

        let error = LoadingState::Error("Failed".into());
        assert!(error.is_error());
        assert_eq!(error.message(), Some("Failed"));
    }

    #[test]
    fn test_intent_from_event_names() {
        assert_eq!(
            Intent::from_event("search:result:clicked", Some("http://x/rss")),
            Intent::ResultSelected {
                href: "http://x/rss".into()
            }
        );
        assert_eq!(Intent::from_event("feed:back:clicked", None), Intent::BackRequested);
        assert_eq!(
            Intent::from_event("poddle:item:clicked", Some("x")),
            Intent::Unknown {
                name: "poddle:item:clicked".into()
            }
        );
    }

    #[test]
    fn test_intent_name_round_trips() {
        let intent = Intent::EpisodeSelected { href: "h".into() };
        assert_eq!(Intent::from_event(intent.name(), Some("h")), intent);
    }

    #[test]
    fn test_sender_delivers_in_order() {
        let (sender, mut rx) = intent_channel();
        assert!(sender.submit_search("rust"));
        assert!(sender.back());
        assert_eq!(
            rx.try_recv().unwrap(),
            Intent::SearchSubmitted {
                term: "rust".into()
            }
        );
        assert_eq!(rx.try_recv().unwrap(), Intent::BackRequested);
    }

    #[test]
    fn test_sender_reports_closed_channel() {
        let (sender, rx) = intent_channel();
        drop(rx);
        assert!(!sender.select_episode("x"));
    }

    #[test]
    fn test_feed_panel_episode_href() {
        use crate::models::Episode;

        let mut panel = FeedPanel::default();
        assert!(panel.episode_href(0).is_none());
        panel.set_content(Feed {
            episodes: vec![
                Episode {
                    media_url: Some("http://x/1.mp3".into()),
                    ..Default::default()
                },
                Episode::default(),
            ],
            ..Default::default()
        });
        assert_eq!(panel.episode_href(0), Some("http://x/1.mp3"));
        assert!(panel.episode_href(1).is_none());
    }
}
