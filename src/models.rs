//! Data structures and types for poddle
//!
//! Contains the shared models used across the crate organized by domain:
//! - **Navigation**: locations and path routes
//! - **Search**: podcast directory results
//! - **Feeds**: parsed show metadata and episodes

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::form_urlencoded;
use url::Url;

/// Query parameters, keyed and compared without regard to order
pub type Params = BTreeMap<String, String>;

// =============================================================================
// Navigation Models
// =============================================================================

/// Base used to resolve relative locations like `/podcasts` or `?feed=x`
const LOCATION_BASE: &str = "http://localhost/";

/// A navigable location: a path plus its decoded query parameters.
///
/// Two locations are equal when their paths match and they carry the same
/// query pairs, regardless of the order those pairs were written in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub query: Params,
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl Location {
    /// The bare `/` location with no query
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            query: Params::new(),
        }
    }

    /// Parse an absolute URL, a path with query, or a bare `?query`.
    ///
    /// Repeated query keys keep the last value.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(LOCATION_BASE)?.join(input)?
            }
            Err(e) => return Err(e),
        };
        Ok(Self::from_url(&url))
    }

    /// Decompose an already parsed URL
    pub fn from_url(url: &Url) -> Self {
        let query = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self {
            path: url.path().to_string(),
            query,
        }
    }

    /// Look up a query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.query.contains_key(key)
    }

    /// Copy of this location with `key` set to `value`
    pub fn with_param(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.query.insert(key.into(), value.into());
        next
    }

    /// Copy of this location with a different path, query untouched
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: self.query.clone(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}

/// Path-routing controller (resource name)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    Home,
    Search,
    Artists,
    Albums,
    Podcasts,
    Tracks,
    Episodes,
    /// Sentinel for anything outside the accepted path grammar
    #[serde(rename = "404")]
    NotFound,
}

impl Controller {
    /// Map a matched path segment to its controller; empty means `home`
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "" => Some(Controller::Home),
            "search" => Some(Controller::Search),
            "artists" => Some(Controller::Artists),
            "albums" => Some(Controller::Albums),
            "podcasts" => Some(Controller::Podcasts),
            "tracks" => Some(Controller::Tracks),
            "episodes" => Some(Controller::Episodes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Controller::Home => "home",
            Controller::Search => "search",
            Controller::Artists => "artists",
            Controller::Albums => "albums",
            Controller::Podcasts => "podcasts",
            Controller::Tracks => "tracks",
            Controller::Episodes => "episodes",
            Controller::NotFound => "404",
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path-routing view mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// List view
    #[default]
    Index,
    /// Single item by `id`
    Show,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Index => write!(f, "index"),
            Action::Show => write!(f, "show"),
        }
    }
}

/// Result of resolving a location against the path grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub controller: Controller,
    pub action: Action,
    pub params: Params,
}

impl Route {
    /// Build a route; the action follows from whether `params` has an `id`
    pub fn new(controller: Controller, params: Params) -> Self {
        let action = if params.contains_key("id") {
            Action::Show
        } else {
            Action::Index
        };
        Self {
            controller,
            action,
            params,
        }
    }

    /// The `("404", "index", {})` route
    pub fn not_found() -> Self {
        Self {
            controller: Controller::NotFound,
            action: Action::Index,
            params: Params::new(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.controller == Controller::NotFound
    }

    pub fn id(&self) -> Option<&str> {
        self.params.get("id").map(String::as_str)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.controller, self.action)?;
        if let Some(id) = self.id() {
            write!(f, " id={}", id)?;
        }
        Ok(())
    }
}

// =============================================================================
// Search Models
// =============================================================================

/// A podcast returned by the directory search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    /// Artwork image URL
    pub artwork: String,
    /// Show name
    pub primary: String,
    /// Publisher / artist name
    pub secondary: String,
    /// Feed URL
    pub href: String,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.primary, self.secondary)
    }
}

// =============================================================================
// Feed Models
// =============================================================================

/// A podcast show: channel metadata plus its episodes in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub title: String,
    pub summary: String,
    /// Mirrors `title`; feeds historically rendered the title in this slot
    pub description: String,
    pub owner_name: String,
    pub image_url: String,
    pub episodes: Vec<Episode>,
    /// Per-episode soft failures found while parsing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FeedWarning>,
}

impl Feed {
    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Episodes that carry a media URL
    pub fn playable(&self) -> impl Iterator<Item = &Episode> {
        self.episodes.iter().filter(|e| e.is_playable())
    }

    /// Indices of episodes parsed without an enclosure
    pub fn missing_enclosures(&self) -> Vec<usize> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                FeedWarning::MissingEnclosure { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} ({} episodes)",
            self.title,
            self.owner_name,
            self.episodes.len()
        )
    }
}

/// A single episode entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub guid: Option<String>,
    /// Enclosure URL; `None` when the item had no enclosure
    pub media_url: Option<String>,
}

impl Episode {
    pub fn is_playable(&self) -> bool {
        self.media_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.published_at {
            Some(date) => write!(f, "{} - {}", date.format("%a %b %d %Y"), self.title),
            None => write!(f, "{}", self.title),
        }
    }
}

/// Degraded data found in an otherwise valid feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedWarning {
    /// The item had no `<enclosure url>`; it cannot be played
    MissingEnclosure { index: usize, title: String },
    /// `pubDate` was present but not a recognizable date
    InvalidDate { index: usize, raw: String },
}

impl fmt::Display for FeedWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedWarning::MissingEnclosure { index, title } => {
                write!(f, "episode {} ({:?}) has no enclosure", index, title)
            }
            FeedWarning::InvalidDate { index, raw } => {
                write!(f, "episode {} has an unreadable date {:?}", index, raw)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
