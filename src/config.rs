use chrono::{NaiveDate, NaiveTime};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{DeskError, Result};

/// Browser-like identifier; upstream services reject default client strings.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Names accepted in `news.strategies`
pub const KNOWN_STRATEGIES: &[&str] = &["scrape", "feed"];

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub lotto: LottoConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-call timeout in seconds (5..=15)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached fetch stays live
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LottoConfig {
    /// Draw-result endpoint; the draw number goes in the `drwNo` query parameter
    #[serde(default = "default_lotto_api_url")]
    pub api_url: String,
    /// Date of draw #1; its weekday is the draw day
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,
    /// Local time on draw day after which the new draw counts as settled
    #[serde(default = "default_draw_cutoff")]
    pub draw_cutoff: NaiveTime,
    /// Offset of the draw's local time zone from UTC
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    /// Number of most recent draws used as history
    #[serde(default = "default_history_window")]
    pub history_window: u32,
    /// Maximum in-flight draw requests
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Widest identifier range a single batch may request
    #[serde(default = "default_max_range")]
    pub max_range: u32,
}

fn default_lotto_api_url() -> String {
    "https://www.dhlottery.co.kr/common.do".to_string()
}

fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2002, 12, 7).unwrap_or_default()
}

fn default_draw_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default()
}

fn default_utc_offset_hours() -> i32 {
    9
}

fn default_history_window() -> u32 {
    10
}

fn default_concurrency() -> usize {
    4
}

fn default_max_range() -> u32 {
    200
}

impl Default for LottoConfig {
    fn default() -> Self {
        Self {
            api_url: default_lotto_api_url(),
            epoch: default_epoch(),
            draw_cutoff: default_draw_cutoff(),
            utc_offset_hours: default_utc_offset_hours(),
            history_window: default_history_window(),
            concurrency: default_concurrency(),
            max_range: default_max_range(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    /// RSS search endpoint taking the query in `q`
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// HTML search endpoint taking the query in `query`
    #[serde(default = "default_scrape_url")]
    pub scrape_url: String,
    /// Strategy names in the order they are tried
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,
    /// Records kept per result
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

fn default_feed_url() -> String {
    "https://news.google.com/rss/search".to_string()
}

fn default_scrape_url() -> String {
    "https://search.naver.com/search.naver".to_string()
}

fn default_strategies() -> Vec<String> {
    vec!["scrape".to_string(), "feed".to_string()]
}

fn default_max_records() -> usize {
    10
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            scrape_url: default_scrape_url(),
            strategies: default_strategies(),
            max_records: default_max_records(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config = Self::build(config_dir.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    fn build(config_dir: &Path) -> std::result::Result<Self, ConfigError> {
        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("cache.ttl_secs", default_ttl_secs())?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("DRAWDESK_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (DRAWDESK_HTTP__TIMEOUT_SECS, etc.)
            .add_source(
                Environment::with_prefix("DRAWDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("news.strategies")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(5..=15).contains(&self.http.timeout_secs) {
            return Err(DeskError::InvalidConfig(format!(
                "http.timeout_secs must be within 5..=15, got {}",
                self.http.timeout_secs
            )));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(DeskError::InvalidConfig(
                "http.user_agent must not be empty".to_string(),
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(DeskError::InvalidConfig(
                "cache.ttl_secs must be positive".to_string(),
            ));
        }
        if self.lotto.history_window == 0 || self.lotto.history_window > self.lotto.max_range {
            return Err(DeskError::InvalidConfig(format!(
                "lotto.history_window must be within 1..={}, got {}",
                self.lotto.max_range, self.lotto.history_window
            )));
        }
        if self.lotto.concurrency == 0 {
            return Err(DeskError::InvalidConfig(
                "lotto.concurrency must be at least 1".to_string(),
            ));
        }
        if !(-12..=14).contains(&self.lotto.utc_offset_hours) {
            return Err(DeskError::InvalidConfig(format!(
                "lotto.utc_offset_hours out of range: {}",
                self.lotto.utc_offset_hours
            )));
        }
        for (key, raw) in [
            ("lotto.api_url", &self.lotto.api_url),
            ("news.feed_url", &self.news.feed_url),
            ("news.scrape_url", &self.news.scrape_url),
        ] {
            url::Url::parse(raw)
                .map_err(|e| DeskError::InvalidConfig(format!("{key} is not a URL: {e}")))?;
        }
        if self.news.strategies.is_empty() {
            return Err(DeskError::InvalidConfig(
                "news.strategies must name at least one strategy".to_string(),
            ));
        }
        if let Some(unknown) = self
            .news
            .strategies
            .iter()
            .find(|s| !KNOWN_STRATEGIES.contains(&s.as_str()))
        {
            return Err(DeskError::InvalidConfig(format!(
                "unknown news strategy '{unknown}', expected one of {KNOWN_STRATEGIES:?}"
            )));
        }
        if self.news.max_records == 0 {
            return Err(DeskError::InvalidConfig(
                "news.max_records must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
