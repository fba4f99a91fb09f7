//! Data access: providers, resilient fetching, and caching

pub mod cache;
pub mod fetch;
pub mod interval_policy;
pub mod provider;
pub mod retry;
pub mod service;
pub mod yahoo;

pub use cache::{CacheEntry, CacheStats, TtlCache};
pub use fetch::{FetchClient, LookupMiss, SeriesOutcome, SymbolLookup};
pub use interval_policy::candidate_intervals;
pub use provider::{DataError, MarketDataProvider, RawBar, SearchCandidate, SymbolSearch};
pub use retry::{CancelToken, RetryPolicy};
pub use service::QuoteService;
pub use yahoo::YahooProvider;
