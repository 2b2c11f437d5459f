//! Desk service: the single entry point presentation code talks to.
//!
//! Wires configuration, the shared HTTP source, both fetchers, the period
//! resolver and the sampler, and puts both fetch paths behind expiring caches.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cache::ExpiringCache;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::domain::{DrawHistory, FeedOutcome};
use crate::error::{DeskError, Result};
use crate::lotto::{
    BatchItemFetcher, FrequencyTable, FrequencyWeightedSampler, PeriodResolver, Recommendation,
    WeightPolicy,
};
use crate::news::MultiStrategyFetcher;
use crate::transport::{HttpSource, ReqwestSource};

pub struct Desk {
    config: AppConfig,
    clock: Arc<dyn Clock>,
    resolver: PeriodResolver,
    draws: BatchItemFetcher,
    news: MultiStrategyFetcher,
    sampler: FrequencyWeightedSampler,
    draw_cache: ExpiringCache<String, DrawHistory>,
    news_cache: ExpiringCache<String, FeedOutcome>,
}

impl Desk {
    /// Production wiring: reqwest transport and wall-clock time.
    pub fn new(config: AppConfig) -> Result<Self> {
        let source = Arc::new(ReqwestSource::new(&config.http)?);
        Self::with_parts(config, source, Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: AppConfig,
        source: Arc<dyn HttpSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let resolver = PeriodResolver::from_config(&config.lotto)?;
        let draws = BatchItemFetcher::from_config(&config.lotto, source.clone());
        let news = MultiStrategyFetcher::from_config(&config.news, source)?;

        info!(
            strategies = ?news.strategy_names(),
            window = config.lotto.history_window,
            ttl_secs = config.cache.ttl_secs,
            "desk ready"
        );

        Ok(Self {
            resolver,
            draws,
            news,
            sampler: FrequencyWeightedSampler::default(),
            draw_cache: ExpiringCache::with_clock(clock.clone()),
            news_cache: ExpiringCache::with_clock(clock.clone()),
            clock,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn ttl(&self) -> Duration {
        self.config.cache.ttl()
    }

    /// Latest settled draw number right now.
    pub fn current_period(&self) -> u32 {
        self.resolver.current_period(self.clock.now())
    }

    pub fn resolver(&self) -> &PeriodResolver {
        &self.resolver
    }

    /// The configured history window ending at the current period.
    pub async fn latest_draws(&self) -> Result<DrawHistory> {
        self.draws_window(self.config.lotto.history_window).await
    }

    /// The last `window` draws up to the current period, most recent first.
    pub async fn draws_window(&self, window: u32) -> Result<DrawHistory> {
        if window == 0 {
            return Err(DeskError::InvalidArgument(
                "window must cover at least one draw".to_string(),
            ));
        }

        let high = self.current_period();
        if high == 0 {
            return Ok(DrawHistory::degraded("no draw has settled yet"));
        }
        let low = high.saturating_sub(window - 1).max(1);

        let key = format!("draws:{low}-{high}");
        self.draw_cache
            .try_get_or_compute(key, self.ttl(), || self.draws.fetch_range(low, high))
            .await
    }

    /// Headlines for `query`, cached under the query text as given.
    pub async fn headlines(&self, query: &str) -> Result<FeedOutcome> {
        if query.trim().is_empty() {
            return Err(DeskError::InvalidArgument(
                "query must not be empty".to_string(),
            ));
        }

        self.news_cache
            .try_get_or_compute(query.to_string(), self.ttl(), || self.news.fetch(query))
            .await
    }

    /// Frequency of each number over the live part of the latest window.
    pub async fn frequency(&self) -> Result<FrequencyTable> {
        let history = self.latest_draws().await?;
        Ok(FrequencyTable::from_history(history.live_records()))
    }

    /// Recommendations drawn against the latest window. A degraded history
    /// contributes no counts, so weights fall back to the policy's baseline.
    pub async fn recommend(&self, policy: WeightPolicy, games: usize) -> Result<Vec<Recommendation>> {
        let history = self.history_for_games(games).await?;
        self.sampler.recommend(history.live_records(), policy, games)
    }

    /// As [`recommend`](Self::recommend), with a caller-supplied generator.
    pub async fn recommend_with_rng<R: Rng + ?Sized>(
        &self,
        policy: WeightPolicy,
        games: usize,
        rng: &mut R,
    ) -> Result<Vec<Recommendation>> {
        let history = self.history_for_games(games).await?;
        self.sampler
            .recommend_with_rng(history.live_records(), policy, games, rng)
    }

    async fn history_for_games(&self, games: usize) -> Result<DrawHistory> {
        if games == 0 {
            return Err(DeskError::InvalidArgument(
                "at least one game must be requested".to_string(),
            ));
        }
        self.latest_draws().await
    }

    /// Drop expired entries from both caches. Each cache also sweeps itself
    /// whenever it misses, so this is only needed to release memory early.
    pub fn purge_expired(&self) -> usize {
        self.draw_cache.purge_expired(self.ttl()) + self.news_cache.purge_expired(self.ttl())
    }
}
