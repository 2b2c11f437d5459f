use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::LottoConfig;
use crate::domain::{DrawHistory, DrawRecord, NUMBERS_PER_DRAW};
use crate::error::{DeskError, Result};
use crate::transport::HttpSource;

// ── Upstream JSON ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DrawPayload {
    #[serde(rename = "returnValue")]
    return_value: Option<String>,
    #[serde(rename = "drwNo")]
    draw_no: Option<u32>,
    #[serde(rename = "drwNoDate")]
    date: Option<String>,
    #[serde(rename = "drwtNo1")]
    n1: Option<u32>,
    #[serde(rename = "drwtNo2")]
    n2: Option<u32>,
    #[serde(rename = "drwtNo3")]
    n3: Option<u32>,
    #[serde(rename = "drwtNo4")]
    n4: Option<u32>,
    #[serde(rename = "drwtNo5")]
    n5: Option<u32>,
    #[serde(rename = "drwtNo6")]
    n6: Option<u32>,
    #[serde(rename = "bnusNo")]
    bonus: Option<u32>,
}

fn number(id: u32, field: &str, value: Option<u32>) -> Result<u8> {
    let value = value.ok_or_else(|| DeskError::Parse(format!("draw {id}: missing {field}")))?;
    u8::try_from(value)
        .map_err(|_| DeskError::Parse(format!("draw {id}: {field}={value} out of range")))
}

/// Parse one draw-result payload for draw `id`.
///
/// A payload whose `returnValue` is anything but `"success"` is a parse
/// failure, as is one that reports a different draw number.
pub fn parse_draw(body: &str, id: u32) -> Result<DrawRecord> {
    let payload: DrawPayload = serde_json::from_str(body.trim_start_matches('\u{feff}'))?;

    match payload.return_value.as_deref() {
        Some("success") => {}
        other => {
            return Err(DeskError::Parse(format!(
                "draw {id}: upstream returnValue={}",
                other.unwrap_or("<absent>")
            )))
        }
    }
    if let Some(reported) = payload.draw_no {
        if reported != id {
            return Err(DeskError::Parse(format!(
                "draw {id}: upstream answered for draw {reported}"
            )));
        }
    }

    let raw = [
        ("drwtNo1", payload.n1),
        ("drwtNo2", payload.n2),
        ("drwtNo3", payload.n3),
        ("drwtNo4", payload.n4),
        ("drwtNo5", payload.n5),
        ("drwtNo6", payload.n6),
    ];
    let mut numbers = [0u8; NUMBERS_PER_DRAW];
    for (slot, (field, value)) in numbers.iter_mut().zip(raw) {
        *slot = number(id, field, value)?;
    }
    let bonus = number(id, "bnusNo", payload.bonus)?;

    DrawRecord::new(id, numbers, bonus, payload.date.unwrap_or_default())
}

// ── Fetcher ─────────────────────────────────────────────────────

/// Fetches a contiguous range of draws, one request per draw.
pub struct BatchItemFetcher {
    source: Arc<dyn HttpSource>,
    api_url: String,
    concurrency: usize,
    max_range: u32,
}

impl BatchItemFetcher {
    pub fn new(source: Arc<dyn HttpSource>, api_url: impl Into<String>) -> Self {
        Self {
            source,
            api_url: api_url.into(),
            concurrency: 1,
            max_range: 200,
        }
    }

    pub fn from_config(config: &LottoConfig, source: Arc<dyn HttpSource>) -> Self {
        Self::new(source, config.api_url.clone())
            .with_concurrency(config.concurrency)
            .with_max_range(config.max_range)
    }

    /// Requests kept in flight at once; 1 means strictly sequential.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_range(mut self, max_range: u32) -> Self {
        self.max_range = max_range;
        self
    }

    async fn fetch_one(&self, id: u32) -> Result<DrawRecord> {
        let params = [
            ("method".to_string(), "getLottoNumber".to_string()),
            ("drwNo".to_string(), id.to_string()),
        ];
        let body = self.source.get_text(&self.api_url, &params).await?;
        parse_draw(&body, id)
    }

    /// Fetch draws `high` down to `low`, most recent first.
    ///
    /// A draw whose request fails or whose payload does not parse is skipped
    /// without retry. If nothing at all comes back the history is
    /// [`DrawHistory::Degraded`] around a single placeholder record.
    pub async fn fetch_range(&self, low: u32, high: u32) -> Result<DrawHistory> {
        if low == 0 {
            return Err(DeskError::InvalidArgument(
                "draw numbers start at 1".to_string(),
            ));
        }
        if low > high {
            return Err(DeskError::InvalidArgument(format!(
                "empty range: low {low} > high {high}"
            )));
        }
        let span = high - low + 1;
        if span > self.max_range {
            return Err(DeskError::InvalidArgument(format!(
                "range of {span} draws exceeds limit of {}",
                self.max_range
            )));
        }

        let results: Vec<(u32, Result<DrawRecord>)> = stream::iter((low..=high).rev())
            .map(|id| async move { (id, self.fetch_one(id).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut records = Vec::with_capacity(results.len());
        for (id, result) in results {
            match result {
                Ok(record) => {
                    debug!(draw = id, "draw fetched");
                    records.push(record);
                }
                Err(e) if e.is_recoverable() => {
                    warn!(draw = id, kind = e.kind(), error = %e, "skipping draw");
                }
                Err(e) => return Err(e),
            }
        }

        // Completion order is arbitrary once requests overlap.
        records.sort_by(|a, b| b.period_id().cmp(&a.period_id()));

        info!(low, high, fetched = records.len(), requested = span, "draw batch complete");
        Ok(DrawHistory::from_fetched(records, low, high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockHttpSource;

    fn payload(id: u32) -> String {
        format!(
            r#"{{"totSellamnt":3681782000,"returnValue":"success","drwNoDate":"2002-12-07",
"drwtNo1":10,"drwtNo2":23,"drwtNo3":29,"drwtNo4":33,"drwtNo5":37,"drwtNo6":40,
"bnusNo":16,"drwNo":{id}}}"#
        )
    }

    fn requested_id(query: &[(String, String)]) -> u32 {
        query
            .iter()
            .find(|(k, _)| k == "drwNo")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap()
    }

    #[test]
    fn test_parse_draw() {
        let draw = parse_draw(&payload(1), 1).unwrap();
        assert_eq!(draw.numbers(), &[10, 23, 29, 33, 37, 40]);
        assert_eq!(draw.bonus(), 16);
        assert_eq!(draw.date(), "2002-12-07");
    }

    #[test]
    fn test_parse_draw_failures_are_recoverable() {
        let cases = [
            r#"{"returnValue":"fail"}"#.to_string(),
            r#"{"drwtNo1":1}"#.to_string(),
            "<html>maintenance</html>".to_string(),
            payload(2),
            payload(1).replace("\"drwtNo6\":40", "\"drwtNo6\":10"),
            payload(1).replace("\"drwtNo6\":40", "\"drwtNo6\":300"),
        ];
        for body in &cases {
            let err = parse_draw(body, 1).unwrap_err();
            assert!(err.is_recoverable(), "{body} gave {err:?}");
        }
    }

    #[tokio::test]
    async fn test_fetch_range_skips_failures_in_descending_order() {
        let mut source = MockHttpSource::new();
        source.expect_get_text().times(6).returning(|_, query| {
            let id = requested_id(query);
            match id {
                96 => Err(DeskError::Status {
                    status: 502,
                    url: "https://lotto.example".into(),
                }),
                98 => Ok("\u{0}\u{1}garbage".to_string()),
                _ => Ok(payload(id)),
            }
        });

        let fetcher = BatchItemFetcher::new(Arc::new(source), "https://lotto.example/common.do")
            .with_concurrency(3);
        let history = fetcher.fetch_range(95, 100).await.unwrap();

        let ids: Vec<u32> = history.records().iter().map(|r| r.period_id()).collect();
        assert_eq!(ids, vec![100, 99, 97, 95]);
        assert!(!history.is_degraded());
    }

    #[tokio::test]
    async fn test_all_failures_yield_one_placeholder() {
        let mut source = MockHttpSource::new();
        source
            .expect_get_text()
            .times(3)
            .returning(|_, _| Ok(r#"{"returnValue":"fail"}"#.to_string()));

        let fetcher = BatchItemFetcher::new(Arc::new(source), "https://lotto.example/common.do");
        let history = fetcher.fetch_range(1, 3).await.unwrap();

        assert!(history.is_degraded());
        assert_eq!(history.records().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_ranges_do_no_io() {
        let mut source = MockHttpSource::new();
        source.expect_get_text().never();
        let fetcher = BatchItemFetcher::new(Arc::new(source), "https://lotto.example/common.do")
            .with_max_range(10);

        for (low, high) in [(0, 5), (10, 9), (1, 11)] {
            let err = fetcher.fetch_range(low, high).await.unwrap_err();
            assert!(matches!(err, DeskError::InvalidArgument(_)), "{low}..{high}");
        }
    }
}
