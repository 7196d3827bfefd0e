//! Integration tests for poddle
//!
//! Tests are organized by component:
//! - itunes_test: Podcast directory client tests
//! - feed_test: Feed parser and feed client tests
//! - session_test: Browser flows through a full session
//! - cli_test: Argument parsing, line commands and JSON output

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
