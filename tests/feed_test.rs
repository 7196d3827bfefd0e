//! Feed parsing and feed client tests
//!
//! Tests channel metadata, episode order, image fallbacks, degraded items,
//! RSS re-rendering, and fetching through the proxy.

use mockito::{Matcher, Server};
use poddle::api::{self, FeedClient, FetchError};
use poddle::feed::{FeedError, FeedParser};
use poddle::models::FeedWarning;

fn sample_feed() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>The Rust Hour</title>
    <description>Channel description that is not used</description>
    <itunes:summary>Weekly talk about systems programming</itunes:summary>
    <itunes:owner>
      <itunes:name>Ferris</itunes:name>
      <itunes:email>ferris@example.com</itunes:email>
    </itunes:owner>
    <image>
      <url>https://img.example.com/cover.jpg</url>
      <title>The Rust Hour</title>
    </image>
    <itunes:image href="https://img.example.com/itunes.jpg"/>
    <item>
      <title>Episode 3: Lifetimes</title>
      <pubDate>Wed, 03 Jan 2024 09:00:00 +0000</pubDate>
      <guid>ep-3</guid>
      <enclosure url="https://cdn.example.com/ep3.mp3" length="123" type="audio/mpeg"/>
    </item>
    <item>
      <title>Episode 2: Traits</title>
      <pubDate>2024-01-02T09:00:00Z</pubDate>
      <enclosure url="https://cdn.example.com/ep2.mp3" type="audio/mpeg"/>
    </item>
    <item>
      <title>Episode 1: Bonus notes</title>
      <pubDate>sometime last week</pubDate>
    </item>
  </channel>
</rss>"#
}

// =============================================================================
// Parser Tests
// =============================================================================

#[test]
fn test_parse_channel_metadata() {
    let feed = FeedParser::parse(sample_feed()).unwrap();

    assert_eq!(feed.title, "The Rust Hour");
    assert_eq!(feed.summary, "Weekly talk about systems programming");
    assert_eq!(feed.owner_name, "Ferris");
    assert_eq!(feed.image_url, "https://img.example.com/cover.jpg");
}

#[test]
fn test_description_repeats_title() {
    let feed = FeedParser::parse(sample_feed()).unwrap();
    assert_eq!(feed.description, feed.title);
}

#[test]
fn test_episodes_keep_document_order() {
    let feed = FeedParser::parse(sample_feed()).unwrap();

    let titles: Vec<_> = feed.episodes.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Episode 3: Lifetimes", "Episode 2: Traits", "Episode 1: Bonus notes"]
    );
    assert_eq!(feed.episodes[0].guid.as_deref(), Some("ep-3"));
    assert_eq!(
        feed.episodes[1].media_url.as_deref(),
        Some("https://cdn.example.com/ep2.mp3")
    );
}

#[test]
fn test_dates_rfc2822_and_rfc3339() {
    let feed = FeedParser::parse(sample_feed()).unwrap();

    let first = feed.episodes[0].published_at.unwrap();
    let second = feed.episodes[1].published_at.unwrap();
    assert_eq!(first.to_rfc3339(), "2024-01-03T09:00:00+00:00");
    assert!(second < first);
    assert!(feed.episodes[2].published_at.is_none());
}

#[test]
fn test_missing_enclosure_is_flagged_not_dropped() {
    let feed = FeedParser::parse(sample_feed()).unwrap();

    assert_eq!(feed.episode_count(), 3);
    assert!(!feed.episodes[2].is_playable());
    assert_eq!(feed.playable().count(), 2);
    assert_eq!(feed.missing_enclosures(), vec![2]);
    assert!(feed.warnings.contains(&FeedWarning::InvalidDate {
        index: 2,
        raw: "sometime last week".into()
    }));
}

#[test]
fn test_image_href_used_when_no_url() {
    let rss = r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>
        <title>T</title>
        <itunes:summary>S</itunes:summary>
        <itunes:owner><itunes:name>N</itunes:name></itunes:owner>
        <image><url></url></image>
        <itunes:image href="https://img.example.com/itunes.jpg"/>
    </channel></rss>"#;

    let feed = FeedParser::parse(rss).unwrap();
    assert_eq!(feed.image_url, "https://img.example.com/itunes.jpg");
}

#[test]
fn test_both_image_forms_give_same_url() {
    let channel = |image: &str| {
        format!(
            r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>
        <title>T</title>
        <itunes:summary>S</itunes:summary>
        <itunes:owner><itunes:name>N</itunes:name></itunes:owner>
        {image}
    </channel></rss>"#
        )
    };
    let nested = channel("<image><url>https://img.example.com/x.jpg</url></image>");
    let href = channel(r#"<image href="https://img.example.com/x.jpg"/>"#);

    let nested = FeedParser::parse(&nested).unwrap();
    let href = FeedParser::parse(&href).unwrap();
    assert_eq!(nested.image_url, "https://img.example.com/x.jpg");
    assert_eq!(href.image_url, nested.image_url);
}

#[test]
fn test_mixed_text_and_cdata_title() {
    let rss = r#"<rss><channel>
        <title>Cartoons</title>
        <summary>S</summary>
        <owner><name>N</name></owner>
        <item><title>Tom <![CDATA[&]]> Jerry</title></item>
    </channel></rss>"#;

    let feed = FeedParser::parse(rss).unwrap();
    assert_eq!(feed.episodes[0].title, "Tom & Jerry");
}

#[test]
fn test_empty_enclosure_url_counts_as_missing() {
    let rss = r#"<rss><channel>
        <title>T</title>
        <summary>S</summary>
        <owner><name>N</name></owner>
        <item><title>Blank</title><enclosure url="" type="audio/mpeg"/></item>
    </channel></rss>"#;

    let feed = FeedParser::parse(rss).unwrap();
    assert_eq!(feed.episodes[0].media_url, None);
    assert!(feed.warnings.contains(&FeedWarning::MissingEnclosure {
        index: 0,
        title: "Blank".into()
    }));
}

#[test]
fn test_missing_owner_name() {
    let rss = r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>
        <title>T</title>
        <itunes:summary>S</itunes:summary>
        <itunes:owner><itunes:email>x@example.com</itunes:email></itunes:owner>
    </channel></rss>"#;

    assert!(matches!(
        FeedParser::parse(rss),
        Err(FeedError::MissingField("owner name"))
    ));
}

#[test]
fn test_missing_summary() {
    let rss = r#"<rss><channel>
        <title>T</title>
        <itunes:owner><itunes:name>N</itunes:name></itunes:owner>
    </channel></rss>"#;

    assert!(matches!(
        FeedParser::parse(rss),
        Err(FeedError::MissingField("summary"))
    ));
}

#[test]
fn test_unclosed_document_is_error() {
    let truncated = &sample_feed()[..400];
    assert!(FeedParser::parse(truncated).is_err());
}

#[test]
fn test_rendered_rss_parses_back() {
    let feed = FeedParser::parse(sample_feed()).unwrap();
    let reparsed = FeedParser::parse(&feed.to_rss()).unwrap();

    assert_eq!(reparsed.title, feed.title);
    assert_eq!(reparsed.summary, feed.summary);
    assert_eq!(reparsed.owner_name, feed.owner_name);
    assert_eq!(reparsed.image_url, feed.image_url);
    assert_eq!(reparsed.episodes[..2], feed.episodes[..2]);
    assert_eq!(reparsed.episodes[2].title, feed.episodes[2].title);
    assert_eq!(reparsed.missing_enclosures(), vec![2]);
}

// =============================================================================
// Feed Client Tests
// =============================================================================

#[tokio::test]
async fn test_fetch_via_proxy() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/get")
        .match_query(Matcher::UrlEncoded(
            "uri".into(),
            "https://feeds.example.com/rust-hour.xml".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/rss+xml")
        .with_body(sample_feed())
        .create_async()
        .await;

    let client = FeedClient::via_proxy(server.url());
    let feed = api::load_feed(&client, "https://feeds.example.com/rust-hour.xml")
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(feed.title, "The Rust Hour");
    assert_eq!(feed.episodes.len(), 3);
}

#[tokio::test]
async fn test_fetch_direct() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/rss")
        .with_status(200)
        .with_body(sample_feed())
        .create_async()
        .await;

    let client = FeedClient::direct();
    let xml = client.fetch(&format!("{}/rss", server.url())).await.unwrap();

    mock.assert_async().await;
    assert!(xml.unwrap().contains("<title>The Rust Hour</title>"));
}

#[tokio::test]
async fn test_fetch_empty_url_makes_no_request() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = FeedClient::via_proxy(server.url());
    assert!(api::load_feed(&client, "").await.unwrap().is_none());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_http_error() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/get")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let client = FeedClient::via_proxy(server.url());
    let err = api::load_feed(&client, "https://x/rss").await.unwrap_err();

    assert!(matches!(err, FetchError::Status(502)));
    assert!(!err.is_malformed());
}

#[tokio::test]
async fn test_fetch_malformed_feed() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/get")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html><body>Not a feed</body></html>")
        .create_async()
        .await;

    let client = FeedClient::via_proxy(server.url());
    let err = api::load_feed(&client, "https://x/rss").await.unwrap_err();

    assert!(err.is_malformed());
}

#[test]
fn test_playable_url_via_proxy() {
    let client = FeedClient::via_proxy("http://localhost:8080");
    assert_eq!(
        client.playable_url("https://cdn.example.com/ep3.mp3"),
        "http://localhost:8080/convert?uri=https%3A%2F%2Fcdn.example.com%2Fep3.mp3"
    );
}
