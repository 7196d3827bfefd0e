//! RSS 2.0 serialization of a parsed feed

use std::fmt::Write;

use quick_xml::escape::escape;

use crate::models::Feed;

const ITUNES_NS: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";

impl Feed {
    /// Render this feed as an RSS 2.0 document with iTunes tags.
    ///
    /// Fields `FeedParser::parse` reads come back unchanged; episodes without
    /// a media URL are written without an enclosure.
    pub fn to_rss(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_rss(&mut out);
        out
    }

    fn write_rss(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(out, r#"<rss version="2.0" xmlns:itunes="{}">"#, ITUNES_NS)?;
        writeln!(out, "  <channel>")?;
        writeln!(out, "    <title>{}</title>", escape(&self.title))?;
        writeln!(out, "    <description>{}</description>", escape(&self.description))?;
        writeln!(out, "    <itunes:summary>{}</itunes:summary>", escape(&self.summary))?;
        writeln!(
            out,
            "    <itunes:owner><itunes:name>{}</itunes:name></itunes:owner>",
            escape(&self.owner_name)
        )?;
        if !self.image_url.is_empty() {
            writeln!(out, "    <image><url>{}</url></image>", escape(&self.image_url))?;
        }
        for episode in &self.episodes {
            writeln!(out, "    <item>")?;
            writeln!(out, "      <title>{}</title>", escape(&episode.title))?;
            if let Some(date) = episode.published_at {
                writeln!(out, "      <pubDate>{}</pubDate>", date.to_rfc2822())?;
            }
            if let Some(guid) = &episode.guid {
                writeln!(out, "      <guid>{}</guid>", escape(guid))?;
            }
            if let Some(url) = &episode.media_url {
                writeln!(out, r#"      <enclosure url="{}"/>"#, escape(url))?;
            }
            writeln!(out, "    </item>")?;
        }
        writeln!(out, "  </channel>")?;
        write!(out, "</rss>")
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Episode, Feed};

    #[test]
    fn test_escapes_markup() {
        let feed = Feed {
            title: "Tom & Jerry <live>".into(),
            episodes: vec![Episode {
                title: "a\"b".into(),
                media_url: Some("http://x/?a=1&b=2".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let rss = feed.to_rss();
        assert!(rss.contains("<title>Tom &amp; Jerry &lt;live&gt;</title>"));
        assert!(rss.contains(r#"url="http://x/?a=1&amp;b=2""#));
    }

    #[test]
    fn test_omits_absent_optionals() {
        let feed = Feed {
            title: "t".into(),
            episodes: vec![Episode {
                title: "no media".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let rss = feed.to_rss();
        assert!(!rss.contains("<enclosure"));
        assert!(!rss.contains("<image>"));
        assert!(!rss.contains("<guid>"));
    }
}
