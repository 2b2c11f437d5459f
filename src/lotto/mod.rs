//! Draw results and number recommendations
//!
//! [`PeriodResolver`] names the latest settled draw, [`BatchItemFetcher`]
//! pulls a window of draws ending there, and [`FrequencyWeightedSampler`]
//! turns that window into recommended combinations.

mod batch;
mod period;
mod sampler;

pub use batch::{parse_draw, BatchItemFetcher};
pub use period::PeriodResolver;
pub use sampler::{
    FrequencyTable, FrequencyWeightedSampler, Recommendation, WeightPolicy, DEFAULT_MAX_ATTEMPTS,
};
