#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use drawdesk::error::{DeskError, Result};
use drawdesk::transport::HttpSource;

pub const LOTTO_URL: &str = "https://lotto.test/common.do";
pub const SCRAPE_URL: &str = "https://search.test/search";
pub const FEED_URL: &str = "https://feed.test/rss";

/// Canned upstream: anything without a configured body answers 503.
#[derive(Default)]
pub struct FakeSource {
    pub draws: HashMap<u32, String>,
    pub scrape: Option<String>,
    pub feed: Option<String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeSource {
    pub fn with_draws(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            draws: ids.into_iter().map(|id| (id, draw_payload(id))).collect(),
            ..Self::default()
        }
    }

    /// Search endpoints answer with the given bodies; `None` answers 503.
    pub fn with_pages(scrape: Option<&str>, feed: Option<&str>) -> Self {
        Self {
            scrape: scrape.map(str::to_string),
            feed: feed.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl HttpSource for FakeSource {
    async fn get_text(&self, url: &str, query: &[(String, String)]) -> Result<String> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let body = match url {
            LOTTO_URL => query
                .iter()
                .find(|(k, _)| k == "drwNo")
                .and_then(|(_, v)| v.parse::<u32>().ok())
                .and_then(|id| self.draws.get(&id).cloned()),
            SCRAPE_URL => self.scrape.clone(),
            FEED_URL => self.feed.clone(),
            _ => None,
        };
        body.ok_or_else(|| DeskError::Status {
            status: 503,
            url: url.to_string(),
        })
    }
}

pub fn draw_payload(id: u32) -> String {
    format!(
        r#"{{"returnValue":"success","drwNo":{id},"drwNoDate":"2024-01-06",
"drwtNo1":3,"drwtNo2":11,"drwtNo3":19,"drwtNo4":27,"drwtNo5":35,"drwtNo6":43,"bnusNo":7}}"#
    )
}
