//! `IndicatorSet` — the fixed dashboard indicators, aligned one-to-one with bars.
//!
//! A transient view: computed from a `Series` on demand and never cached.

use super::{Bollinger, Indicator, RollingStd, Rsi, Sma};
use crate::domain::{Bar, Series};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Below this many bars the dashboard declines to show metrics.
pub const MIN_BARS_FOR_METRICS: usize = 20;

const MA_SHORT: usize = 20;
const MA_LONG: usize = 50;
const VOLATILITY_WINDOW: usize = 20;
const RSI_WINDOW: usize = 14;
const BAND_WIDTH: f64 = 2.0;

/// Indicator values for one bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub volatility20: Option<f64>,
    pub rsi14: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

/// Latest-value metrics shown next to the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub latest_close: Option<f64>,
    pub volatility20: Option<f64>,
    pub rsi14: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSet {
    rows: Vec<IndicatorRow>,
}

impl IndicatorSet {
    pub fn compute(series: &Series) -> Self {
        Self::from_bars(series.bars())
    }

    pub fn from_bars(bars: &[Bar]) -> Self {
        let ma20 = Sma::new(MA_SHORT).compute(bars);
        let ma50 = Sma::new(MA_LONG).compute(bars);
        let vol = RollingStd::new(VOLATILITY_WINDOW).compute(bars);
        let rsi = Rsi::new(RSI_WINDOW).compute(bars);
        let upper = Bollinger::upper(MA_SHORT, BAND_WIDTH).compute(bars);
        let lower = Bollinger::lower(MA_SHORT, BAND_WIDTH).compute(bars);

        let rows = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorRow {
                timestamp: bar.timestamp,
                close: bar.close,
                ma20: ma20[i],
                ma50: ma50[i],
                volatility20: vol[i],
                rsi14: rsi[i],
                // The middle band is MA20 by definition.
                bb_mid: ma20[i],
                bb_upper: upper[i],
                bb_lower: lower[i],
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether there are enough rows for the dashboard metrics.
    pub fn has_enough_for_metrics(&self) -> bool {
        self.rows.len() >= MIN_BARS_FOR_METRICS
    }

    /// The last `n` rows (fewer if the set is shorter).
    pub fn tail(&self, n: usize) -> &[IndicatorRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Close, volatility and RSI of the newest row.
    ///
    /// An undefined indicator on the newest row stays `None`.
    pub fn latest(&self) -> Snapshot {
        let last = self.rows.last();
        Snapshot {
            latest_close: last.map(|r| r.close),
            volatility20: last.and_then(|r| r.volatility20),
            rsi14: last.and_then(|r| r.rsi14),
        }
    }

    /// One named column, for charting.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let pick: fn(&IndicatorRow) -> Option<f64> = match name {
            "ma_20" => |r| r.ma20,
            "ma_50" => |r| r.ma50,
            "volatility_20" => |r| r.volatility20,
            "rsi_14" => |r| r.rsi14,
            "bb_mid" => |r| r.bb_mid,
            "bb_upper" => |r| r.bb_upper,
            "bb_lower" => |r| r.bb_lower,
            _ => return None,
        };
        Some(self.rows.iter().map(pick).collect())
    }
}
