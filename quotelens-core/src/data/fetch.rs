//! Resilient fetch client: retrying symbol resolution and the interval cascade.
//!
//! All transient provider failures are absorbed here. Only definitive outcomes
//! (`SymbolLookup`, `SeriesOutcome`) leave this module.

use super::interval_policy::candidate_intervals;
use super::provider::{MarketDataProvider, SearchCandidate, SymbolSearch};
use super::retry::{CancelToken, RetryPolicy};
use crate::domain::{Bar, CompanyQuery, Interval, Period, Series, Symbol};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a lookup produced no symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LookupMiss {
    /// The search answered with zero usable candidates.
    NoMatch,
    /// Every attempt failed in transport or with a non-success status.
    TransportExhausted { attempts: u32 },
    /// The host cancelled the retry loop.
    Cancelled,
}

/// Result of resolving a company query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolLookup {
    Found { symbol: Symbol },
    NotFound { miss: LookupMiss },
}

impl SymbolLookup {
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            SymbolLookup::Found { symbol } => Some(symbol),
            SymbolLookup::NotFound { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.symbol().is_some()
    }

    fn not_found(miss: LookupMiss) -> Self {
        SymbolLookup::NotFound { miss }
    }
}

/// Result of the interval cascade for one (symbol, period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeriesOutcome {
    /// A non-empty cleaned series; `series.interval()` is the interval that answered.
    Fetched { series: Series },
    /// Every candidate came back empty; `last_interval` is the final one tried.
    Empty { last_interval: Interval },
}

impl SeriesOutcome {
    pub fn series(&self) -> Option<&Series> {
        match self {
            SeriesOutcome::Fetched { series } => Some(series),
            SeriesOutcome::Empty { .. } => None,
        }
    }

    /// Interval that produced the series, or the last one attempted.
    pub fn interval(&self) -> Interval {
        match self {
            SeriesOutcome::Fetched { series } => series.interval(),
            SeriesOutcome::Empty { last_interval } => *last_interval,
        }
    }
}

/// Wraps the search and market-data providers behind retry and fallback logic.
pub struct FetchClient {
    search: Arc<dyn SymbolSearch>,
    market_data: Arc<dyn MarketDataProvider>,
    retry: RetryPolicy,
}

impl FetchClient {
    pub fn new(
        search: Arc<dyn SymbolSearch>,
        market_data: Arc<dyn MarketDataProvider>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            search,
            market_data,
            retry,
        }
    }

    /// Resolve free text to a symbol with bounded, cancellable retries.
    ///
    /// A successful response with no usable candidate is definitive and is not
    /// retried.
    pub fn resolve_symbol(&self, query: &CompanyQuery, cancel: &CancelToken) -> SymbolLookup {
        if query.normalized().is_empty() {
            return SymbolLookup::not_found(LookupMiss::NoMatch);
        }

        let max_attempts = self.retry.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let delay = self.retry.delay_before(attempt);
            if cancel.is_cancelled() || (!delay.is_zero() && !cancel.sleep(delay)) {
                info!(query = query.raw(), attempt, "symbol search cancelled");
                return SymbolLookup::not_found(LookupMiss::Cancelled);
            }

            match self.search.search(query) {
                Ok(candidates) => {
                    return match choose_candidate(query, &candidates) {
                        Some(symbol) => {
                            debug!(query = query.raw(), %symbol, attempt, "symbol resolved");
                            SymbolLookup::Found { symbol }
                        }
                        None => {
                            debug!(query = query.raw(), "symbol search returned no match");
                            SymbolLookup::not_found(LookupMiss::NoMatch)
                        }
                    };
                }
                Err(e) => {
                    warn!(
                        provider = self.search.name(),
                        query = query.raw(),
                        attempt,
                        max_attempts,
                        error = %e,
                        "symbol search attempt failed"
                    );
                }
            }
        }

        SymbolLookup::not_found(LookupMiss::TransportExhausted {
            attempts: max_attempts,
        })
    }

    /// Walk the interval cascade for `period`, returning the first non-empty cleaned series.
    pub fn fetch_series(&self, symbol: &Symbol, period: &Period) -> SeriesOutcome {
        let candidates = candidate_intervals(period);
        let mut last_interval = candidates.first().copied().unwrap_or(Interval::OneDay);

        for &interval in candidates {
            last_interval = interval;
            let raw = match self.market_data.fetch_bars(symbol, period, interval) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(
                        provider = self.market_data.name(),
                        %symbol, %period, %interval, error = %e,
                        "bar fetch failed, trying next interval"
                    );
                    continue;
                }
            };

            let total = raw.len();
            let bars: Vec<Bar> = raw.iter().filter_map(|r| r.clean()).collect();
            if bars.len() < total {
                debug!(%symbol, %interval, dropped = total - bars.len(), "dropped malformed bars");
            }
            if bars.is_empty() {
                warn!(%symbol, %period, %interval, "no usable bars, trying next interval");
                continue;
            }

            info!(%symbol, %period, %interval, bars = bars.len(), "series fetched");
            return SeriesOutcome::Fetched {
                series: Series::new(symbol.clone(), period.clone(), interval, bars),
            };
        }

        SeriesOutcome::Empty { last_interval }
    }
}

/// An exact symbol match for the query wins; otherwise the first parseable candidate.
fn choose_candidate(query: &CompanyQuery, candidates: &[SearchCandidate]) -> Option<Symbol> {
    let parsed: Vec<Symbol> = candidates
        .iter()
        .filter_map(|c| Symbol::parse(&c.symbol))
        .collect();
    if let Some(wanted) = query.as_symbol() {
        if let Some(exact) = parsed.iter().find(|s| **s == wanted) {
            return Some(exact.clone());
        }
    }
    parsed.into_iter().next()
}
