//! Bollinger Bands — moving average +/- a multiple of rolling volatility.
//!
//! Three bands (separate Indicator instances):
//! - Middle: shrinking-window SMA(close, period)
//! - Upper: middle + mult * sample stddev(close, period)
//! - Lower: middle - mult * sample stddev(close, period)
//!
//! Upper and lower are `None` wherever the deviation is (the first row).

use super::sma::rolling_mean;
use super::volatility::rolling_sample_std;
use super::Indicator;
use crate::domain::Bar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(band: BollingerBand, period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "mid",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bb_{label}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Upper, period, multiplier)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Middle, period, multiplier)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Lower, period, multiplier)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mid = rolling_mean(&closes, self.period);
        if self.band == BollingerBand::Middle {
            return mid;
        }
        let std = rolling_sample_std(&closes, self.period);
        let sign = if self.band == BollingerBand::Upper { 1.0 } else { -1.0 };
        mid.into_iter()
            .zip(std)
            .map(|(m, s)| Some(m? + sign * self.multiplier * s?))
            .collect()
    }
}
