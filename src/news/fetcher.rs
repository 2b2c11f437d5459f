use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::feed::FeedStrategy;
use super::page::PageStrategy;
use super::strategy::FetchStrategy;
use crate::config::NewsConfig;
use crate::domain::{AttemptFailure, FeedOutcome, Record, StrategyAttempt};
use crate::error::{DeskError, Result};
use crate::transport::HttpSource;

/// Runs strategies in order and returns the first non-empty result.
pub struct MultiStrategyFetcher {
    strategies: Vec<Arc<dyn FetchStrategy>>,
    max_records: usize,
}

impl MultiStrategyFetcher {
    pub fn new(strategies: Vec<Arc<dyn FetchStrategy>>, max_records: usize) -> Self {
        Self {
            strategies,
            max_records,
        }
    }

    /// Build the chain named in `news.strategies`, in that order.
    pub fn from_config(config: &NewsConfig, source: Arc<dyn HttpSource>) -> Result<Self> {
        let strategies = config
            .strategies
            .iter()
            .map(|name| -> Result<Arc<dyn FetchStrategy>> {
                match name.as_str() {
                    "scrape" => Ok(Arc::new(PageStrategy::new(
                        source.clone(),
                        config.scrape_url.clone(),
                    ))),
                    "feed" => Ok(Arc::new(FeedStrategy::new(
                        source.clone(),
                        config.feed_url.clone(),
                    ))),
                    other => Err(DeskError::InvalidConfig(format!(
                        "unknown news strategy '{other}'"
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(strategies, config.max_records))
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Try each strategy for `query` until one produces records.
    ///
    /// Transport and parse failures are logged and treated as "nothing from
    /// this strategy". Other errors propagate. Exhausting the chain is not an
    /// error: it yields [`FeedOutcome::Empty`] with one attempt per strategy.
    pub async fn fetch(&self, query: &str) -> Result<FeedOutcome> {
        if query.trim().is_empty() {
            return Err(DeskError::InvalidArgument(
                "query must not be empty".to_string(),
            ));
        }

        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let name = strategy.name();
            match strategy.fetch(query).await {
                Ok(records) => {
                    let records = self.finalize(records);
                    if !records.is_empty() {
                        info!(query, strategy = name, count = records.len(), "headlines fetched");
                        return Ok(FeedOutcome::Found {
                            strategy: name.to_string(),
                            records,
                        });
                    }
                    debug!(query, strategy = name, "strategy returned nothing");
                    attempts.push(StrategyAttempt {
                        strategy: name.to_string(),
                        failure: AttemptFailure::Empty,
                    });
                }
                Err(e) if e.is_recoverable() => {
                    warn!(query, strategy = name, kind = e.kind(), error = %e, "strategy failed");
                    attempts.push(StrategyAttempt {
                        strategy: name.to_string(),
                        failure: AttemptFailure::Failed(e.to_string()),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        warn!(query, tried = attempts.len(), "all strategies exhausted");
        Ok(FeedOutcome::Empty { attempts })
    }

    /// Drop repeated links (first wins) and cap the list.
    fn finalize(&self, records: Vec<Record>) -> Vec<Record> {
        let mut seen = HashSet::new();
        records
            .into_iter()
            .filter(|r| seen.insert(r.link.clone()))
            .take(self.max_records)
            .collect()
    }
}
