//! QuoteLens Core — resilient market-data access and dashboard indicators.
//!
//! This crate contains the data-access core behind the dashboard:
//! - Domain types (symbols, periods, intervals, bars, series)
//! - Interval fallback policy per requested period
//! - Fetch client with capped exponential backoff and an interval cascade
//! - TTL caches for ticker resolution and price series
//! - Indicator engine (moving averages, volatility, Bollinger Bands, RSI)
//!
//! The three calls consumed by a presentation layer live on
//! [`data::QuoteService`]: `resolve_symbol_cached`, `fetch_series_cached` and
//! `compute_indicators`.

pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;

pub use config::CoreConfig;
pub use data::{QuoteService, SeriesOutcome, SymbolLookup};
