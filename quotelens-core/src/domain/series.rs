//! Series — an ordered run of bars for one symbol, period and interval.

use super::bar::Bar;
use super::period::{Interval, Period};
use super::symbol::Symbol;
use serde::{Deserialize, Serialize};

/// Ordered bars sharing one sampling interval.
///
/// Timestamps are strictly increasing. The constructor enforces this by
/// sorting and collapsing duplicate timestamps (the later row wins, matching
/// how providers amend the still-open bar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    symbol: Symbol,
    period: Period,
    interval: Interval,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: Symbol, period: Period, interval: Interval, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        // Stable sort keeps provider order among equal timestamps; keep the last of each run.
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.timestamp == bar.timestamp => *prev = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol,
            period,
            interval,
            bars: deduped,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    /// Interval the provider actually answered with.
    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
