//! HTML search-results page strategy.
//!
//! Depends on the upstream page layout: result blocks are `<li class="bx">`
//! holding an `<a class="news_tit">` headline and a `<span class="info">` age
//! label. When that layout changes, headings wrapping a link are used instead,
//! and when those are gone too the strategy comes back empty so the chain can
//! move on to the feed.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::strategy::{normalize_record, FetchStrategy};
use crate::domain::Record;
use crate::error::Result;
use crate::markup::{Element, Markup};
use crate::transport::HttpSource;

const RESULT_CLASS: &str = "bx";
const HEADLINE_CLASS: &str = "news_tit";
const INFO_CLASS: &str = "info";

pub struct PageStrategy {
    source: Arc<dyn HttpSource>,
    url: String,
}

impl PageStrategy {
    pub fn new(source: Arc<dyn HttpSource>, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
        }
    }
}

#[async_trait]
impl FetchStrategy for PageStrategy {
    fn name(&self) -> &str {
        "scrape"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Record>> {
        let params = [
            ("where".to_string(), "news".to_string()),
            ("query".to_string(), query.to_string()),
        ];
        let body = self.source.get_text(&self.url, &params).await?;
        Ok(parse_page(&body, &self.url))
    }
}

/// Extract headline records from a results page. Relative links are resolved
/// against `base_url`.
pub fn parse_page(body: &str, base_url: &str) -> Vec<Record> {
    let doc = Markup::new(body);
    let base = Url::parse(base_url).ok();

    let mut records = from_result_blocks(&doc, base.as_ref());
    if records.is_empty() {
        records = from_headings(&doc, base.as_ref());
        debug!(found = records.len(), "page layout fallback: headings");
    } else {
        debug!(found = records.len(), "parsed result blocks");
    }
    records
}

fn from_result_blocks(doc: &Markup<'_>, base: Option<&Url>) -> Vec<Record> {
    doc.elements("li")
        .iter()
        .filter(|li| li.has_class(RESULT_CLASS))
        .filter_map(|li| {
            let anchor = li
                .children("a")
                .into_iter()
                .find(|a| a.has_class(HEADLINE_CLASS))?;
            let published = li
                .children("span")
                .into_iter()
                .find(|s| s.has_class(INFO_CLASS))
                .map(|s| s.inner);
            anchor_record(&anchor, published, base)
        })
        .collect()
}

fn from_headings(doc: &Markup<'_>, base: Option<&Url>) -> Vec<Record> {
    ["h2", "h3", "h4"]
        .iter()
        .flat_map(|tag| doc.elements(tag))
        .filter_map(|heading| {
            let anchor = heading.child("a")?;
            anchor_record(&anchor, None, base)
        })
        .collect()
}

/// Title comes from the `title` attribute, repaired from the anchor text when absent.
fn anchor_record(anchor: &Element<'_>, published: Option<&str>, base: Option<&Url>) -> Option<Record> {
    let href = anchor.attr("href")?;
    let link = resolve(&href, base)?;
    let title = anchor
        .attr("title")
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| anchor.inner.to_string());
    normalize_record(&title, &link, published)
}

fn resolve(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.and_then(|b| b.join(href).ok()).map(|u| u.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://search.example/search";

    #[test]
    fn test_result_blocks() {
        let html = r#"<ul class="list_news">
<li class="bx" id="sp_nws1"><div class="news_area">
  <a href="https://press.example/a" class="news_tit" title="Title &quot;A&quot;">Title A</a>
  <span class="info">3시간 전</span></div></li>
<li class="bx"><a class="news_tit" href="/relative/b">Title B</a></li>
<li class="bx"><a class="news_tit">No href</a></li>
<li class="other"><a class="news_tit" href="https://press.example/x">Not a result</a></li>
</ul>"#;
        let records = parse_page(html, BASE);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Title \"A\"");
        assert_eq!(records[0].published.as_deref(), Some("3시간 전"));
        assert_eq!(records[1].title, "Title B");
        assert_eq!(records[1].link, "https://search.example/relative/b");
        assert_eq!(records[1].published, None);
    }

    #[test]
    fn test_falls_back_to_headings() {
        let html = r#"<div><h3 class="t"><a href="https://press.example/h"><em>Heading</em> story</a></h3>
<h3>plain heading</h3><h2><a href="javascript:void(0)">skip</a></h2></div>"#;
        let records = parse_page(html, BASE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Heading story");
        assert_eq!(records[0].link, "https://press.example/h");
    }

    #[test]
    fn test_unquoted_relative_href() {
        let html = r#"<li class=bx><a class=news_tit href=/article/7>Story</a></li>"#;
        let records = parse_page(html, BASE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Story");
        assert_eq!(records[0].link, "https://search.example/article/7");
    }

    #[test]
    fn test_unrecognised_layout_is_empty() {
        assert!(parse_page("<html><body><p>blocked</p></body></html>", BASE).is_empty());
    }
}
