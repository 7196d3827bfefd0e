//! Error types for feed parsing

use thiserror::Error;

/// Result type for feed parser operations
pub type FeedResult<T> = Result<T, FeedError>;

/// A feed document that cannot be turned into a `Feed`.
///
/// Every variant aborts the whole parse; per-episode problems are reported
/// as `FeedWarning`s on the parsed feed instead.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Well-formed XML, but not an `rss > channel` document
    #[error("Malformed feed: {0}")]
    Malformed(String),

    /// A mandatory channel field is absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The text is not well-formed XML
    #[error("XML parsing error: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for FeedError {
    fn from(err: quick_xml::Error) -> Self {
        FeedError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for FeedError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        FeedError::Xml(err.to_string())
    }
}
