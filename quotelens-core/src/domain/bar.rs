//! Bar — one sampling period's OHLCV record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over one sampling interval.
///
/// Bars are only constructed from fully populated provider rows, so every
/// price is finite. See `RawBar::clean` for the conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}
