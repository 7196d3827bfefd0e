//! CLI - Command Line Interface for poddle
//!
//! Every browser action is scriptable. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Resolve an application path
//! poddle route "/ceol/podcasts/42?sort=new"
//!
//! # Search the podcast directory, then inspect a feed
//! poddle search "rust" --json
//! poddle feed https://example.com/rss --playable
//!
//! # Interactive browser (also the default with no subcommand)
//! poddle browse --start "/?search=rust"
//! ```

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Feed or response could not be parsed
    ParseError = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// poddle - podcast browser
///
/// Run without arguments to start the interactive browser.
/// Use subcommands for scriptable automation.
#[derive(Parser, Debug)]
#[command(
    name = "poddle",
    version,
    about = "Search podcasts, read their feeds and play episodes",
    long_about = "A podcast browser core: directory search, feed viewing and \
                  playback navigation with back/forward history.\n\n\
                  Run without arguments to start the interactive browser.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  poddle                              Start the interactive browser\n\
                  poddle search \"rust\"                Search podcasts\n\
                  poddle feed https://x/rss --rss     Re-render a feed\n\
                  poddle route /ceol/artists/42       Resolve a path"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run (omit for the interactive browser)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a path or URL to a controller, action and params
    #[command(visible_alias = "r")]
    Route(RouteCmd),

    /// Search the podcast directory
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Fetch and parse a podcast feed
    #[command(visible_alias = "f")]
    Feed(FeedCmd),

    /// Interactive browser driven by line commands
    #[command(visible_alias = "b")]
    Browse(BrowseCmd),
}

/// Resolve an application path
#[derive(Args, Debug)]
pub struct RouteCmd {
    /// Path or absolute URL (e.g. /ceol/albums/7?x=1)
    #[arg(required = true)]
    pub location: String,
}

/// Search podcasts by term
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search term
    #[arg(required = true)]
    pub term: String,

    /// Maximum number of results
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: usize,
}

/// Load a feed
#[derive(Args, Debug)]
pub struct FeedCmd {
    /// Feed URL
    #[arg(required = true)]
    pub url: String,

    /// Fetch through this proxy (overrides config)
    #[arg(long, short = 'p')]
    pub proxy: Option<String>,

    /// Only list episodes that have an enclosure
    #[arg(long)]
    pub playable: bool,

    /// Maximum number of episodes to show
    #[arg(long, short = 'n')]
    pub episodes: Option<usize>,

    /// Print the parsed feed back out as RSS
    #[arg(long, conflicts_with = "playable")]
    pub rss: bool,
}

/// Start the interactive browser
#[derive(Args, Debug)]
pub struct BrowseCmd {
    /// Initial location (e.g. "/?search=rust" or "/?feed=https://x/rss")
    #[arg(long, short = 's', default_value = "/")]
    pub start: String,

    /// Fetch feeds and media through this proxy (overrides config)
    #[arg(long, short = 'p')]
    pub proxy: Option<String>,
}

// =============================================================================
// Browse Line Commands
// =============================================================================

/// One line typed into the interactive browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseInput {
    /// `search <term>` (or `/ <term>`)
    Search(String),
    /// `open <n>`: open the n-th search result (1-based)
    Open(usize),
    /// `play <n>`: play the n-th episode (1-based)
    Play(usize),
    Back,
    Forward,
    /// `state`: print the current view
    State,
    /// `history`: print the history entries
    History,
    Help,
    Quit,
    /// Raw named event, e.g. `emit feed:item:clicked http://x/a.mp3`
    Emit { name: String, detail: Option<String> },
}

impl BrowseInput {
    /// Parse a line; `Ok(None)` for blank input
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let input = match word.to_ascii_lowercase().as_str() {
            "search" | "/" => BrowseInput::Search(rest.to_string()),
            "open" | "o" => BrowseInput::Open(parse_index(rest)?),
            "play" | "p" => BrowseInput::Play(parse_index(rest)?),
            "back" | "b" => BrowseInput::Back,
            "forward" | "f" => BrowseInput::Forward,
            "state" | "s" => BrowseInput::State,
            "history" | "h" => BrowseInput::History,
            "help" | "?" => BrowseInput::Help,
            "quit" | "q" | "exit" => BrowseInput::Quit,
            "emit" => {
                let (name, detail) = match rest.split_once(char::is_whitespace) {
                    Some((name, detail)) => (name, Some(detail.trim().to_string())),
                    None => (rest, None),
                };
                if name.is_empty() {
                    return Err("emit needs an event name".to_string());
                }
                BrowseInput::Emit {
                    name: name.to_string(),
                    detail,
                }
            }
            other => return Err(format!("Unknown command: {} (try 'help')", other)),
        };
        Ok(Some(input))
    }
}

fn parse_index(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Expected a position starting at 1, got {:?}", s)),
    }
}

pub const BROWSE_HELP: &str = "\
commands:
  search <term>   search podcasts (/ <term>)
  open <n>        open the n-th result
  play <n>        play the n-th episode
  back | forward  move through history
  state           show the current view
  history         list history entries
  emit <event> [detail]
  quit";

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data; `human` renders the non-JSON form
    pub fn print<T: Serialize>(&self, data: T, human: impl fmt::Display) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", human);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args_is_browser_mode() {
        let cli = Cli::parse_from(["poddle"]);
        assert!(!cli.is_cli_mode());
    }

    #[test]
    fn test_search_command() {
        let cli = Cli::parse_from(["poddle", "search", "rust", "-l", "5"]);
        match cli.command {
            Some(Command::Search(cmd)) => {
                assert_eq!(cmd.term, "rust");
                assert_eq!(cmd.limit, 5);
            }
            other => panic!("Expected Search command, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["poddle", "route", "/ceol/artists/1", "--json", "-q"]);
        assert!(cli.json);
        assert!(cli.quiet);
    }

    #[test]
    fn test_feed_rss_conflicts_with_playable() {
        let result = Cli::try_parse_from(["poddle", "feed", "http://x/rss", "--rss", "--playable"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_browse_default_start() {
        let cli = Cli::parse_from(["poddle", "browse"]);
        match cli.command {
            Some(Command::Browse(cmd)) => assert_eq!(cmd.start, "/"),
            other => panic!("Expected Browse command, got {:?}", other),
        }
    }

    #[test]
    fn test_browse_input_parsing() {
        assert_eq!(BrowseInput::parse("  "), Ok(None));
        assert_eq!(
            BrowseInput::parse("search the rust show"),
            Ok(Some(BrowseInput::Search("the rust show".into())))
        );
        assert_eq!(BrowseInput::parse("open 2"), Ok(Some(BrowseInput::Open(2))));
        assert_eq!(BrowseInput::parse("P 1"), Ok(Some(BrowseInput::Play(1))));
        assert_eq!(BrowseInput::parse("back"), Ok(Some(BrowseInput::Back)));
        assert_eq!(
            BrowseInput::parse("emit feed:back:clicked"),
            Ok(Some(BrowseInput::Emit {
                name: "feed:back:clicked".into(),
                detail: None
            }))
        );
    }

    #[test]
    fn test_browse_input_rejects_bad_index() {
        assert!(BrowseInput::parse("open 0").is_err());
        assert!(BrowseInput::parse("play x").is_err());
        assert!(BrowseInput::parse("dance").is_err());
        assert!(BrowseInput::parse("emit").is_err());
    }

    #[test]
    fn test_json_output_error_shape() {
        let output = JsonOutput::<()>::error_msg("boom", ExitCode::NetworkError);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["error"], "boom");
        assert_eq!(json["exit_code"], 3);
        assert!(json.get("data").is_none());
    }
}
