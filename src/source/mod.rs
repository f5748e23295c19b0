//! Trending-article seeds for generation
//!
//! A topic source is optional plumbing: when configured, each selected topic
//! gets a seed article (headline, link, snippet, scraped body preview) that
//! grounds the generated post in something currently trending. A missing or
//! failing seed never fails the topic — generation just proceeds without it.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::Result;

/// Maximum characters of scraped page text forwarded to the generator
const BODY_PREVIEW_LIMIT: usize = 800;

/// A trending article used to seed generation for one topic
#[derive(Debug, Clone, Default)]
pub struct ArticleSeed {
    /// Article headline
    pub title: String,

    /// Article URL
    pub link: String,

    /// Feed-provided summary (may be empty)
    pub summary: String,

    /// Scraped paragraph text from the article page, truncated
    pub body_preview: String,
}

/// Source of trending-article seeds, keyed by topic
#[async_trait]
pub trait TopicSource: Send + Sync {
    /// Fetch a seed for the topic; `None` when the source has nothing for it
    async fn fetch_seed(&self, topic: &str) -> Result<Option<ArticleSeed>>;
}

// ============================================================================
// RSS Source
// ============================================================================

/// Topic source backed by per-topic RSS feeds
pub struct RssSource {
    client: Client,
    feeds: BTreeMap<String, String>,
}

impl RssSource {
    /// Create a source from a topic → feed URL map
    pub fn new(feeds: BTreeMap<String, String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; rotapress)")
            .build()?;

        Ok(Self { client, feeds })
    }

    /// Whether any feed is configured at all
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Take the first item of the feed as the trending article
    fn first_item(channel: &rss::Channel) -> Option<ArticleSeed> {
        let item = channel.items().first()?;
        let link = item.link()?.to_string();

        Some(ArticleSeed {
            title: item.title().unwrap_or_default().to_string(),
            link,
            summary: item.description().unwrap_or_default().to_string(),
            body_preview: String::new(),
        })
    }

    /// Scrape paragraph text from the article page, truncated to the
    /// preview limit. Any failure yields an empty preview.
    async fn fetch_body_preview(&self, url: &str) -> String {
        let html = match self.client.get(url).send().await {
            Ok(response) => match response.text().await {
                Ok(text) => text,
                Err(_) => return String::new(),
            },
            Err(e) => {
                tracing::debug!(url = url, error = %e, "Seed page fetch failed");
                return String::new();
            }
        };

        extract_paragraph_text(&html, BODY_PREVIEW_LIMIT)
    }
}

/// Join non-empty `<p>` texts from an HTML document, bounded by `limit` chars
pub fn extract_paragraph_text(html: &str, limit: usize) -> String {
    let document = Html::parse_document(html);
    // The selector literal is valid, parse cannot fail
    let selector = Selector::parse("p").expect("valid selector");

    let mut text = String::new();
    for paragraph in document.select(&selector) {
        let chunk = paragraph.text().collect::<String>();
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }

        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(chunk);

        if text.len() >= limit {
            break;
        }
    }

    if text.len() > limit {
        // Truncate on a char boundary
        let mut end = limit;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }

    text
}

#[async_trait]
impl TopicSource for RssSource {
    async fn fetch_seed(&self, topic: &str) -> Result<Option<ArticleSeed>> {
        let Some(feed_url) = self.feeds.get(topic) else {
            return Ok(None);
        };

        let content = self.client.get(feed_url).send().await?.bytes().await?;

        let channel = match rss::Channel::read_from(&content[..]) {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!(topic = topic, feed = feed_url, error = %e, "Feed unparseable");
                return Ok(None);
            }
        };

        let Some(mut seed) = Self::first_item(&channel) else {
            tracing::debug!(topic = topic, feed = feed_url, "Feed has no usable items");
            return Ok(None);
        };

        seed.body_preview = self.fetch_body_preview(&seed.link).await;

        tracing::debug!(
            topic = topic,
            headline = seed.title,
            preview_len = seed.body_preview.len(),
            "Seed article fetched"
        );

        Ok(Some(seed))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_paragraph_text() {
        let html = "<html><body><p>First part.</p><div><p> Second part. </p></div>\
                    <p></p></body></html>";
        let text = extract_paragraph_text(html, 800);
        assert_eq!(text, "First part. Second part.");
    }

    #[test]
    fn test_extract_paragraph_text_truncates() {
        let html = format!("<p>{}</p>", "x".repeat(2000));
        let text = extract_paragraph_text(&html, 800);
        assert_eq!(text.len(), 800);
    }

    #[test]
    fn test_extract_paragraph_text_respects_char_boundaries() {
        let html = format!("<p>{}</p>", "é".repeat(600));
        let text = extract_paragraph_text(&html, 799);
        assert!(text.len() <= 799);
        assert!(text.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_first_item_requires_link() {
        let feed = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel><title>t</title><link>l</link>
            <description>d</description>
            <item><title>No link here</title></item>
            </channel></rss>"#;
        let channel = rss::Channel::read_from(feed.as_bytes()).unwrap();
        assert!(RssSource::first_item(&channel).is_none());
    }

    #[test]
    fn test_first_item_maps_fields() {
        let feed = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel><title>t</title><link>l</link>
            <description>d</description>
            <item><title>Headline</title><link>https://example.com/a</link>
            <description>Snippet</description></item>
            <item><title>Second</title><link>https://example.com/b</link></item>
            </channel></rss>"#;
        let channel = rss::Channel::read_from(feed.as_bytes()).unwrap();
        let seed = RssSource::first_item(&channel).unwrap();

        assert_eq!(seed.title, "Headline");
        assert_eq!(seed.link, "https://example.com/a");
        assert_eq!(seed.summary, "Snippet");
    }

    #[tokio::test]
    async fn test_unconfigured_topic_yields_no_seed() {
        let source = RssSource::new(BTreeMap::new(), Duration::from_secs(5)).unwrap();
        let seed = source.fetch_seed("Finance").await.unwrap();
        assert!(seed.is_none());
    }
}
