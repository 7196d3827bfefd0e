//! RSS podcast feed parsing
//!
//! Turns a feed document into a `Feed`: channel metadata plus episodes in
//! document order. Alternate image markup (`<image><url>` or
//! `<itunes:image href>`) is accepted; items without an enclosure are kept
//! and flagged.
//!
//! ```rust
//! use poddle::feed::FeedParser;
//!
//! let rss = r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
//!   <channel>
//!     <title>My Podcast</title>
//!     <itunes:summary>About things</itunes:summary>
//!     <itunes:owner><itunes:name>Me</itunes:name></itunes:owner>
//!     <itunes:image href="http://example.com/art.png"/>
//!     <item>
//!       <title>Episode 1</title>
//!       <enclosure url="http://example.com/ep1.mp3" type="audio/mpeg"/>
//!     </item>
//!   </channel>
//! </rss>"#;
//!
//! let feed = FeedParser::parse(rss).expect("Failed to parse feed");
//! assert_eq!(feed.image_url, "http://example.com/art.png");
//! assert_eq!(feed.episodes.len(), 1);
//! ```

mod error;
mod parser;
mod writer;
mod xml;

pub use error::{FeedError, FeedResult};
pub use parser::FeedParser;

/// Shorthand for `FeedParser::parse`
pub fn parse(content: &str) -> FeedResult<crate::models::Feed> {
    FeedParser::parse(content)
}
