//! Feed parsing logic

use chrono::{DateTime, FixedOffset};

use super::error::{FeedError, FeedResult};
use super::xml::Element;
use crate::models::{Episode, Feed, FeedWarning};

/// Feed parser
pub struct FeedParser;

impl FeedParser {
    /// Parses an RSS podcast feed.
    ///
    /// Fails when the text is not XML, when it is not an `rss > channel`
    /// document, or when the channel lacks `title`, `summary` or
    /// `owner > name`. Items without an enclosure are kept and reported in
    /// `Feed::warnings`.
    pub fn parse(content: &str) -> FeedResult<Feed> {
        let root = Element::parse_document(content)?;
        if root.name != "rss" {
            return Err(FeedError::Malformed(format!(
                "expected <rss> root, found <{}>",
                root.name
            )));
        }
        let channel = root
            .child("channel")
            .ok_or_else(|| FeedError::Malformed("<rss> has no <channel>".to_string()))?;

        let title = channel
            .child_text("title")
            .ok_or(FeedError::MissingField("title"))?
            .to_string();
        let summary = channel
            .child_text("summary")
            .ok_or(FeedError::MissingField("summary"))?
            .to_string();
        let owner_name = channel
            .child("owner")
            .and_then(|owner| owner.child_text("name"))
            .ok_or(FeedError::MissingField("owner name"))?
            .to_string();

        let image_url = Self::image_url(channel).unwrap_or_else(|| {
            tracing::warn!(feed = %title, "feed has no usable image");
            String::new()
        });

        let mut feed = Feed {
            // Description deliberately repeats the title element
            description: title.clone(),
            title,
            summary,
            owner_name,
            image_url,
            episodes: Vec::new(),
            warnings: Vec::new(),
        };

        for (index, item) in channel.children_named("item").enumerate() {
            let episode = Self::parse_item(index, item, &mut feed.warnings);
            feed.episodes.push(episode);
        }

        if !feed.warnings.is_empty() {
            tracing::warn!(
                feed = %feed.title,
                warnings = feed.warnings.len(),
                "feed parsed with degraded episodes"
            );
        }
        tracing::debug!(feed = %feed.title, episodes = feed.episodes.len(), "parsed feed");

        Ok(feed)
    }

    /// `<image><url>` text first; the `href` attribute only when no
    /// image carries a non-empty `<url>`.
    fn image_url(channel: &Element) -> Option<String> {
        channel
            .children_named("image")
            .find_map(|image| image.child_text("url").filter(|url| !url.is_empty()))
            .or_else(|| {
                channel
                    .children_named("image")
                    .find_map(|image| image.attr("href").filter(|href| !href.is_empty()))
            })
            .map(str::to_string)
    }

    fn parse_item(index: usize, item: &Element, warnings: &mut Vec<FeedWarning>) -> Episode {
        let title = item.child_text("title").unwrap_or_default().to_string();

        let published_at = match item.child_text("pubDate") {
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    tracing::debug!(index, raw, "unreadable pubDate");
                    warnings.push(FeedWarning::InvalidDate {
                        index,
                        raw: raw.to_string(),
                    });
                }
                parsed
            }
            None => None,
        };

        let guid = item.child_text("guid").map(str::to_string);

        let media_url = item
            .child("enclosure")
            .and_then(|enclosure| enclosure.attr("url"))
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        if media_url.is_none() {
            tracing::warn!(index, title = %title, "episode has no enclosure");
            warnings.push(FeedWarning::MissingEnclosure {
                index,
                title: title.clone(),
            });
        }

        Episode {
            title,
            published_at,
            guid,
            media_url,
        }
    }
}

/// RSS dates are RFC 2822; some feeds use RFC 3339 instead
fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Test Feed</title>
    <itunes:summary>A test feed</itunes:summary>
    <itunes:owner><itunes:name>Owner</itunes:name></itunes:owner>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_minimal_rss() {
        let feed = FeedParser::parse(MINIMAL).expect("Should parse RSS");
        assert_eq!(feed.title, "Test Feed");
        assert_eq!(feed.summary, "A test feed");
        assert_eq!(feed.owner_name, "Owner");
        assert_eq!(feed.image_url, "");
        assert!(feed.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("Mon, 01 Jan 2024 12:00:00 GMT").is_some());
        assert!(parse_date("Mon, 01 Jan 2024 12:00:00 +0100").is_some());
        assert!(parse_date("2024-01-01T12:00:00Z").is_some());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn test_non_rss_root_is_malformed() {
        let atom = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>x</title></feed>"#;
        assert!(matches!(FeedParser::parse(atom), Err(FeedError::Malformed(_))));
    }

    #[test]
    fn test_missing_channel_is_malformed() {
        let rss = r#"<rss version="2.0"></rss>"#;
        assert!(matches!(FeedParser::parse(rss), Err(FeedError::Malformed(_))));
    }

    #[test]
    fn test_parse_invalid_xml() {
        assert!(FeedParser::parse("not xml at all").is_err());
    }
}
