pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod lotto;
pub mod markup;
pub mod news;
pub mod services;
pub mod transport;

pub use cache::ExpiringCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use domain::{DrawHistory, DrawRecord, FeedOutcome, Record};
pub use error::{DeskError, Result};
pub use lotto::{FrequencyTable, PeriodResolver, Recommendation, WeightPolicy};
pub use services::Desk;
pub use transport::{HttpSource, ReqwestSource};
