//! poddle - podcast browser
//!
//! Search the podcast directory, read feeds and play episodes, with
//! back/forward navigation that behaves like a browser tab.
//!
//! # Usage
//!
//! ```bash
//! # Interactive browser
//! poddle
//!
//! # CLI mode (for automation)
//! poddle search "rust" --json
//! poddle feed https://example.com/rss
//! poddle route /ceol/podcasts/42
//! ```

use clap::Parser;

use poddle::cli::{BrowseCmd, Cli, Command, ExitCode, Output};
use poddle::commands;
use poddle::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let (config, config_error) = match Config::resolve(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default().with_env_overrides(), Some(e)),
    };

    init_logging(&config);
    if let Some(e) = config_error {
        tracing::warn!(error = %format!("{e:#}"), "ignoring invalid config file");
    }

    let exit_code = run_cli(cli, &config).await;
    std::process::exit(exit_code.into());
}

/// Logs go to stderr so stdout stays parseable.
/// RUST_LOG wins over the config file's `log_level`.
fn init_logging(config: &Config) {
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level().to_string());
    let filter = tracing_subscriber::EnvFilter::try_new(&log_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli, config: &Config) -> ExitCode {
    let output = Output::new(&cli);
    tracing::debug!(?config, "config loaded");

    match cli.command {
        Some(Command::Route(cmd)) => commands::route_cmd(cmd, &output),

        Some(Command::Search(cmd)) => commands::search_cmd(cmd, config, &output).await,

        Some(Command::Feed(cmd)) => commands::feed_cmd(cmd, config, &output).await,

        Some(Command::Browse(cmd)) => commands::browse_cmd(cmd, config, &output).await,

        None => {
            let cmd = BrowseCmd {
                start: "/".to_string(),
                proxy: None,
            };
            commands::browse_cmd(cmd, config, &output).await
        }
    }
}
