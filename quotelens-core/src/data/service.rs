//! `QuoteService` — the three calls consumed by the dashboard adapter.
//!
//! Owns the fetch client and the two independent caches. Negative outcomes
//! (no match, exhausted retries, empty cascade) are cached like positive ones;
//! only a cancelled resolution is left uncached, since it says nothing about
//! the query.

use super::cache::{CacheStats, TtlCache};
use super::fetch::{FetchClient, LookupMiss, SeriesOutcome, SymbolLookup};
use super::provider::DataError;
use super::retry::CancelToken;
use super::yahoo::YahooProvider;
use crate::config::CoreConfig;
use crate::domain::{CompanyQuery, Period, Series, Symbol};
use crate::indicators::IndicatorSet;
use std::sync::Arc;
use tracing::debug;

/// Cached façade over `FetchClient`.
pub struct QuoteService {
    client: FetchClient,
    tickers: TtlCache<String, SymbolLookup>,
    series: TtlCache<(Symbol, Period), SeriesOutcome>,
}

impl QuoteService {
    pub fn new(client: FetchClient, config: &CoreConfig) -> Self {
        Self {
            client,
            tickers: TtlCache::new(
                "ticker",
                config.cache.ticker.ttl(),
                config.cache.ticker.capacity,
            ),
            series: TtlCache::new(
                "series",
                config.cache.series.ttl(),
                config.cache.series.capacity,
            ),
        }
    }

    /// Service backed by Yahoo Finance for both search and bars.
    pub fn yahoo(config: &CoreConfig) -> Result<Self, DataError> {
        config.validate()?;
        let provider = Arc::new(YahooProvider::new(&config.provider)?);
        let client = FetchClient::new(provider.clone(), provider, config.retry.clone());
        Ok(Self::new(client, config))
    }

    /// Resolve a company name or ticker, consulting the ticker cache first.
    pub fn resolve_symbol_cached(&self, query: &CompanyQuery) -> SymbolLookup {
        self.resolve_symbol_cancellable(query, &CancelToken::new())
    }

    /// As `resolve_symbol_cached`, aborting the retry loop when `cancel` fires.
    pub fn resolve_symbol_cancellable(
        &self,
        query: &CompanyQuery,
        cancel: &CancelToken,
    ) -> SymbolLookup {
        let key = query.normalized();
        let fetched = self.tickers.get_or_try_fetch(key, || {
            match self.client.resolve_symbol(query, cancel) {
                cancelled @ SymbolLookup::NotFound {
                    miss: LookupMiss::Cancelled,
                } => Err(cancelled),
                lookup => Ok(lookup),
            }
        });
        match fetched {
            Ok(lookup) => (*lookup).clone(),
            Err(cancelled) => {
                debug!(query = query.raw(), "cancelled lookup not cached");
                cancelled
            }
        }
    }

    /// Fetch the series for `(symbol, period)`, consulting the series cache first.
    pub fn fetch_series_cached(&self, symbol: &Symbol, period: &Period) -> Arc<SeriesOutcome> {
        self.series
            .get_or_fetch((symbol.clone(), period.clone()), || {
                self.client.fetch_series(symbol, period)
            })
    }

    /// Indicator view over a retrieved series.
    pub fn compute_indicators(&self, series: &Series) -> IndicatorSet {
        IndicatorSet::compute(series)
    }

    pub fn ticker_cache_stats(&self) -> CacheStats {
        self.tickers.stats()
    }

    pub fn series_cache_stats(&self) -> CacheStats {
        self.series.stats()
    }

    /// Drop every cached entry in both caches.
    pub fn clear_caches(&self) {
        self.tickers.clear();
        self.series.clear();
    }
}
