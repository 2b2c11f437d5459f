//! Headline acquisition
//!
//! A query runs through an ordered chain of [`FetchStrategy`]s; the first one
//! that yields records wins. Transport and parse failures of one strategy only
//! move the chain along.

mod feed;
mod fetcher;
mod page;
mod strategy;

pub use feed::{parse_feed, FeedStrategy};
pub use fetcher::MultiStrategyFetcher;
pub use page::{parse_page, PageStrategy};
pub use strategy::{normalize_record, FetchStrategy};
