//! Rolling volatility: sample standard deviation of closes.
//!
//! Same shrinking window as `Sma`. A one-element window has no sample
//! deviation, so index 0 is always `None`.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct RollingStd {
    period: usize,
    name: String,
}

impl RollingStd {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "volatility period must be >= 1");
        Self {
            period,
            name: format!("volatility_{period}"),
        }
    }
}

impl Indicator for RollingStd {
    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rolling_sample_std(&closes, self.period)
    }
}

/// Sample (n − 1) standard deviation over a shrinking-then-fixed window.
pub fn rolling_sample_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            let n = slice.len();
            if n < 2 {
                return None;
            }
            let mean = slice.iter().sum::<f64>() / n as f64;
            let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}
