//! Path router
//!
//! Maps a location to a `(controller, action, params)` route. Accepts
//! `/<controller>[/<id>]` with an optional `/ceol` prefix and an optional
//! trailing slash. This is a dispatch surface of its own and is unrelated to
//! the `search`/`feed` query parameters the coordinator reads.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Controller, Location, Route};

const PATH_PATTERN: &str =
    r"^(?:/ceol)?/(|search|artists|albums|podcasts|tracks|episodes)/?(?:/(\d+))?$";

fn path_regex() -> Option<&'static Regex> {
    static PATH_RE: OnceLock<Option<Regex>> = OnceLock::new();
    PATH_RE.get_or_init(|| Regex::new(PATH_PATTERN).ok()).as_ref()
}

/// Resolve a location to a route. Never fails: anything outside the grammar
/// yields `Route::not_found()`.
pub fn resolve(location: &Location) -> Route {
    let Some(captures) = path_regex().and_then(|re| re.captures(&location.path)) else {
        return Route::not_found();
    };

    let segment = captures.get(1).map_or("", |m| m.as_str());
    let Some(controller) = Controller::from_segment(segment) else {
        return Route::not_found();
    };

    // Query first, then the path id on top so it wins over `?id=`
    let mut params = location.query.clone();
    if let Some(id) = captures.get(2) {
        params.insert("id".to_string(), id.as_str().to_string());
    }

    Route::new(controller, params)
}

/// Parse and resolve a URL string; unparseable input resolves to 404
pub fn resolve_url(input: &str) -> Route {
    match Location::parse(input) {
        Ok(location) => resolve(&location),
        Err(e) => {
            tracing::debug!(input, error = %e, "unparseable location");
            Route::not_found()
        }
    }
}
