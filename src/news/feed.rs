//! RSS / Atom search feed strategy

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::strategy::{normalize_record, FetchStrategy};
use crate::domain::Record;
use crate::error::{DeskError, Result};
use crate::markup::{clean_text, find_url, Element, Markup};
use crate::transport::HttpSource;

pub struct FeedStrategy {
    source: Arc<dyn HttpSource>,
    url: String,
}

impl FeedStrategy {
    pub fn new(source: Arc<dyn HttpSource>, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
        }
    }
}

#[async_trait]
impl FetchStrategy for FeedStrategy {
    fn name(&self) -> &str {
        "feed"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Record>> {
        let params = [
            ("q".to_string(), query.to_string()),
            ("hl".to_string(), "ko".to_string()),
            ("gl".to_string(), "KR".to_string()),
            ("ceid".to_string(), "KR:ko".to_string()),
        ];
        let body = self.source.get_text(&self.url, &params).await?;
        parse_feed(&body)
    }
}

/// Extract records from an RSS or Atom document.
///
/// Fails only when the body is not a feed at all; malformed items are skipped.
pub fn parse_feed(body: &str) -> Result<Vec<Record>> {
    let doc = Markup::new(body);
    let lower_head: String = body
        .chars()
        .take(512)
        .collect::<String>()
        .to_ascii_lowercase();
    let looks_like_feed = lower_head.contains("<rss")
        || lower_head.contains("<feed")
        || lower_head.contains("<?xml")
        || lower_head.contains("<channel");
    if !looks_like_feed {
        return Err(DeskError::Parse("response is not an RSS/Atom feed".to_string()));
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    let items = doc.elements("item");
    let entries = if items.is_empty() {
        doc.elements("entry")
    } else {
        Vec::new()
    };

    for item in items.iter().chain(entries.iter()) {
        match parse_item(item) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!(found = records.len(), skipped, "parsed feed");
    Ok(records)
}

fn parse_item(item: &Element<'_>) -> Option<Record> {
    let title = item.child("title")?.inner;
    let link = item_link(item)?;
    let published = ["pubDate", "published", "updated", "dc:date"]
        .iter()
        .find_map(|tag| item.child(tag))
        .map(|el| el.inner);

    normalize_record(title, &link, published)
}

/// The item's link, repaired from raw text when the `<link>` element is
/// unusable (self-closing, empty, or stripped by a lenient parser upstream).
fn item_link(item: &Element<'_>) -> Option<String> {
    if let Some(link) = item.child("link") {
        let text = clean_text(link.inner);
        if !text.is_empty() {
            return Some(text);
        }
        if let Some(href) = link.attr("href") {
            return Some(href);
        }
    }

    // Atom style <link href="..."/> never has a closing tag.
    let lower = item.inner.to_ascii_lowercase();
    if let Some(idx) = lower.find("<link") {
        let tail = &item.inner[idx..];
        if let Some(url) = find_url(tail) {
            return Some(url.to_string());
        }
    }

    item.child("guid")
        .map(|g| clean_text(g.inner))
        .filter(|g| g.starts_with("http"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>search</title>
<item><title>First &amp; foremost</title><link>https://news.example/1</link><pubDate>Sat, 06 Jan 2024 12:00:00 GMT</pubDate></item>
<item><title>No link at all</title><pubDate>Sat, 06 Jan 2024 12:00:00 GMT</pubDate></item>
<item><title><![CDATA[Second]]></title><link/>https://news.example/2
<guid>abc</guid></item>
<item><link>https://news.example/3</link></item>
<item><title>Guid only</title><guid isPermaLink="true">https://news.example/4</guid></item>
</channel></rss>"#;

    #[test]
    fn test_parse_feed_skips_malformed_items() {
        let records = parse_feed(RSS).unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First & foremost", "Second", "Guid only"]);
        assert_eq!(
            records[0].published.as_deref(),
            Some("Sat, 06 Jan 2024 12:00:00 GMT")
        );
    }

    #[test]
    fn test_link_repaired_from_raw_text() {
        let records = parse_feed(RSS).unwrap();
        assert_eq!(records[1].link, "https://news.example/2");
        assert_eq!(records[1].published, None);
        assert_eq!(records[2].link, "https://news.example/4");
    }

    #[test]
    fn test_atom_entries() {
        let atom = r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom">
<entry><title>Atom one</title><link href="https://atom.example/1"/><updated>2024-01-06</updated></entry>
</feed>"#;
        let records = parse_feed(atom).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].link, "https://atom.example/1");
        assert_eq!(records[0].published.as_deref(), Some("2024-01-06"));
    }

    #[test]
    fn test_non_feed_is_parse_error() {
        let err = parse_feed("<html><body>captcha</body></html>").unwrap_err();
        assert!(err.is_recoverable());
    }
}
