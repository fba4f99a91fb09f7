//! Provider traits and structured error types.
//!
//! `SymbolSearch` and `MarketDataProvider` abstract over the external services
//! (Yahoo Finance today) so the fetch client can be driven by scripted
//! providers in tests. A provider call is a single attempt; retries and
//! interval fallback live in `FetchClient`.

use crate::domain::{Bar, CompanyQuery, Interval, Period, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw OHLCV row from a data provider, before cleaning.
///
/// Providers leave holes (`null`) for halted or partial periods; any hole makes
/// the row malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl RawBar {
    /// Convert to a `Bar`, or `None` when any OHLCV field is missing or non-finite.
    pub fn clean(&self) -> Option<Bar> {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Some(Bar {
            timestamp: self.timestamp,
            open: finite(self.open)?,
            high: finite(self.high)?,
            low: finite(self.low)?,
            close: finite(self.close)?,
            volume: self.volume?,
        })
    }
}

/// One match returned by a symbol search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub symbol: String,
}

impl SearchCandidate {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

/// Structured error types for provider and configuration problems.
///
/// Provider errors are transient from the core's point of view: the fetch
/// client absorbs them (retry or next interval) and never hands them to the
/// cache layer.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {endpoint}")]
    HttpStatus { status: u16, endpoint: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Free-text symbol search (single attempt).
pub trait SymbolSearch: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Candidate matches in the provider's ranking order.
    ///
    /// An empty vector is a definitive "no match"; `Err` is a transient failure.
    fn search(&self, query: &CompanyQuery) -> Result<Vec<SearchCandidate>, DataError>;
}

/// Historical OHLCV bars (single attempt).
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Bars for `symbol` covering `period`, sampled at `interval`.
    fn fetch_bars(
        &self,
        symbol: &Symbol,
        period: &Period,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError>;
}
