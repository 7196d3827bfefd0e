//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the appropriate backend services.
//! Each handler takes CLI args, the loaded config and Output, returns ExitCode.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::{self, FeedClient, FetchError, ItunesClient, SearchError};
use crate::cli::{BrowseCmd, BrowseInput, ExitCode, FeedCmd, Output, RouteCmd, SearchCmd, BROWSE_HELP};
use crate::config::Config;
use crate::coordinator::Mode;
use crate::history::MemoryHistory;
use crate::models::{Episode, Feed, Location, Route, SearchResult};
use crate::panels::Intent;
use crate::router;
use crate::session::{Session, Snapshot};

// =============================================================================
// Error Mapping
// =============================================================================

fn search_exit_code(e: &SearchError) -> ExitCode {
    match e {
        SearchError::InvalidSearchTerm(_) => ExitCode::InvalidArgs,
        SearchError::InvalidResponse(_) => ExitCode::ParseError,
        SearchError::Status(_) | SearchError::Request(_) => ExitCode::NetworkError,
    }
}

fn fetch_exit_code(e: &FetchError) -> ExitCode {
    if e.is_malformed() {
        ExitCode::ParseError
    } else {
        ExitCode::NetworkError
    }
}

fn feed_client(config: &Config, proxy: Option<String>) -> FeedClient {
    let proxy = proxy.or_else(|| config.proxy_url().map(str::to_string));
    FeedClient::with_timeout(proxy, config.timeout())
}

// =============================================================================
// Route Command
// =============================================================================

#[derive(Debug, Serialize)]
struct RouteReport<'a> {
    location: String,
    #[serde(flatten)]
    route: &'a Route,
}

pub fn route_cmd(cmd: RouteCmd, output: &Output) -> ExitCode {
    let location = match Location::parse(&cmd.location) {
        Ok(location) => location,
        Err(e) => {
            return output.error(
                format!("Invalid location {:?}: {}", cmd.location, e),
                ExitCode::InvalidArgs,
            )
        }
    };

    let route = router::resolve(&location);
    let mut human = route.to_string();
    for (key, value) in &route.params {
        let _ = write!(human, "\n  {} = {}", key, value);
    }

    let report = RouteReport {
        location: location.to_string(),
        route: &route,
    };
    if let Err(e) = output.print(&report, human) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

// =============================================================================
// Search Command
// =============================================================================

pub async fn search_cmd(cmd: SearchCmd, config: &Config, output: &Output) -> ExitCode {
    let client = ItunesClient::with_timeout(config.search_url(), config.timeout());

    output.info(format!("Searching for: {}", cmd.term));

    match client.search(&cmd.term).await {
        Ok(mut results) => {
            results.truncate(cmd.limit);
            let human = render_results(&results);
            if let Err(e) = output.print(&results, human) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Search failed: {}", e), search_exit_code(&e)),
    }
}

// =============================================================================
// Feed Command
// =============================================================================

pub async fn feed_cmd(cmd: FeedCmd, config: &Config, output: &Output) -> ExitCode {
    let client = feed_client(config, cmd.proxy);

    output.info(format!("Loading feed: {}", cmd.url));

    let mut feed = match api::load_feed(&client, &cmd.url).await {
        Ok(Some(feed)) => feed,
        Ok(None) => return output.error("Feed URL is empty", ExitCode::InvalidArgs),
        Err(e) => return output.error(format!("Feed load failed: {}", e), fetch_exit_code(&e)),
    };

    for warning in &feed.warnings {
        output.info(format!("warning: {}", warning));
    }

    if cmd.rss {
        let rss = feed.to_rss();
        if let Err(e) = output.print(&rss, &rss) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
        return ExitCode::Success;
    }

    if cmd.playable {
        feed.episodes.retain(Episode::is_playable);
    }
    if let Some(n) = cmd.episodes {
        feed.episodes.truncate(n);
    }

    let human = render_feed(&feed);
    if let Err(e) = output.print(&feed, human) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

// =============================================================================
// Browse Command
// =============================================================================

type BrowserSession = Session<MemoryHistory, ItunesClient, FeedClient>;

/// Interactive browser: one line command per step, the view printed after each
pub async fn browse_cmd(cmd: BrowseCmd, config: &Config, output: &Output) -> ExitCode {
    let start = match Location::parse(&cmd.start) {
        Ok(location) => location,
        Err(e) => {
            return output.error(
                format!("Invalid start location {:?}: {}", cmd.start, e),
                ExitCode::InvalidArgs,
            )
        }
    };

    let search = Arc::new(ItunesClient::with_timeout(config.search_url(), config.timeout()));
    let feeds = Arc::new(feed_client(config, cmd.proxy));
    let (mut session, intents) = Session::new(MemoryHistory::new(start), search, feeds);

    session.settle().await;
    show_view(&session, output);
    output.info(BROWSE_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return output.error(format!("Failed to read input: {}", e), ExitCode::Error),
        };

        let input = match BrowseInput::parse(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(msg) => {
                output.error(msg, ExitCode::InvalidArgs);
                continue;
            }
        };

        match input {
            BrowseInput::Quit => break,
            BrowseInput::Help => {
                output.info(BROWSE_HELP);
                continue;
            }
            BrowseInput::State => {
                show_view(&session, output);
                continue;
            }
            BrowseInput::History => {
                let entries = session.history().entries();
                let cursor = session.history().cursor();
                let mut human = String::new();
                for (i, entry) in entries.iter().enumerate() {
                    let marker = if i == cursor { ">" } else { " " };
                    let _ = writeln!(human, "{} {:<8} {}", marker, entry.label, entry.location);
                }
                if let Err(e) = output.print(entries, human.trim_end()) {
                    output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
                continue;
            }
            BrowseInput::Search(term) => {
                intents.submit_search(term);
            }
            BrowseInput::Open(n) => {
                let Some(href) = session
                    .coordinator()
                    .search_panel()
                    .result(n - 1)
                    .map(|r| r.href.clone())
                else {
                    output.error(format!("No search result {}", n), ExitCode::InvalidArgs);
                    continue;
                };
                intents.select_result(href);
            }
            BrowseInput::Play(n) => {
                let Some(href) = session
                    .coordinator()
                    .feed_panel()
                    .episode_href(n - 1)
                    .map(str::to_string)
                else {
                    output.error(format!("Episode {} is not playable", n), ExitCode::InvalidArgs);
                    continue;
                };
                intents.select_episode(href);
            }
            BrowseInput::Back => {
                intents.back();
            }
            BrowseInput::Forward => session.forward(),
            BrowseInput::Emit { name, detail } => {
                intents.send(Intent::from_event(&name, detail.as_deref()));
            }
        }

        session.settle().await;
        if let Some(e) = session.last_error() {
            tracing::debug!(error = %e, "last rejected event");
        }
        show_view(&session, output);
    }

    drop(intents);
    session.run().await;
    ExitCode::Success
}

fn show_view(session: &BrowserSession, output: &Output) {
    let snapshot = session.snapshot();
    let human = render_snapshot(&snapshot);
    if let Err(e) = output.print(&snapshot, human) {
        output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
}

// =============================================================================
// Human Rendering
// =============================================================================

fn render_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results".to_string();
    }
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, result);
        let _ = writeln!(out, "     {}", result.href);
    }
    out.trim_end().to_string()
}

fn render_feed(feed: &Feed) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", feed);
    if !feed.summary.is_empty() {
        let _ = writeln!(out, "{}", feed.summary);
    }
    let _ = writeln!(out);
    for (i, episode) in feed.episodes.iter().enumerate() {
        let marker = if episode.is_playable() { " " } else { "!" };
        let _ = writeln!(out, "{:>3}.{} {}", i + 1, marker, episode);
    }
    out.trim_end().to_string()
}

fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    match snapshot.mode {
        Some(Mode::ViewingFeed) => {
            match &snapshot.feed {
                Some(feed) => {
                    let _ = writeln!(out, "{}", render_feed(feed));
                }
                None => {
                    let _ = writeln!(out, "Feed: {}", snapshot.feed_url);
                }
            }
            if let Some(error) = &snapshot.feed_error {
                let _ = writeln!(out, "Error: {}", error);
            }
        }
        _ => {
            let _ = writeln!(out, "Search: {:?}", snapshot.search_term);
            if !snapshot.search_term.is_empty() || !snapshot.results.is_empty() {
                let _ = writeln!(out, "{}", render_results(&snapshot.results));
            }
            if let Some(error) = &snapshot.search_error {
                let _ = writeln!(out, "Error: {}", error);
            }
        }
    }
    if let Some(source) = &snapshot.player_source {
        let _ = writeln!(out, "Playing: {}", source);
    }
    out.trim_end().to_string()
}
