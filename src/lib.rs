//! poddle - podcast browser core
//!
//! Search the podcast directory, read feeds, play episodes, and keep all of
//! it consistent with a browser-style back/forward history.
//!
//! # Modules
//!
//! - `models` - Locations, routes, search results, feeds and episodes
//! - `router` - Path to controller/action resolution
//! - `feed` - RSS feed parsing and rendering
//! - `history` - Session history seam and an in-memory implementation
//! - `panels` - Search, feed and player panels plus the intents they emit
//! - `coordinator` - View-state machine driven by history moves and intents
//! - `session` - Runs coordinator effects against the remote backends
//! - `api` - Podcast search and feed fetch clients
//! - `config`, `cli`, `commands` - Command line front end

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod feed;
pub mod history;
pub mod models;
pub mod panels;
pub mod router;
pub mod session;

// Re-export commonly used types
pub use models::{
    Action, Controller, Episode, Feed, FeedWarning, Location, Params, Route, SearchResult,
};

pub use api::{FeedBackend, FeedClient, FetchError, ItunesClient, SearchBackend, SearchError};
pub use coordinator::{Coordinator, Effect, Event, Mode, NavigationError, ViewState};
pub use feed::{FeedError, FeedParser};
pub use history::{HistoryBridge, MemoryHistory};
pub use panels::{Intent, IntentSender};
pub use session::{Session, Snapshot};
