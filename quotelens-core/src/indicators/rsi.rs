//! Relative Strength Index (RSI).
//!
//! Simple rolling means of gains and losses over the last min(period, i)
//! close-to-close deltas (shrinking window, same policy as the moving averages).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: index 0 has no delta → None; avg_gain == avg_loss == 0 → None;
//! avg_loss == 0 → 100; avg_gain == 0 → 0.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut result = Vec::with_capacity(n);
        if n == 0 {
            return result;
        }
        result.push(None);

        // gains[k], losses[k] belong to the delta ending at bar k + 1.
        let (gains, losses): (Vec<f64>, Vec<f64>) = bars
            .windows(2)
            .map(|pair| {
                let delta = pair[1].close - pair[0].close;
                (delta.max(0.0), (-delta).max(0.0))
            })
            .unzip();

        // Direct window sums: a flat window must sum to exactly zero.
        for end in 1..=gains.len() {
            let start = end.saturating_sub(self.period);
            let count = (end - start) as f64;
            let avg_gain = gains[start..end].iter().sum::<f64>() / count;
            let avg_loss = losses[start..end].iter().sum::<f64>() / count;
            result.push(compute_rsi(avg_gain, avg_loss));
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        None // flat: no movement in the window
    } else if avg_loss == 0.0 {
        Some(100.0)
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}
