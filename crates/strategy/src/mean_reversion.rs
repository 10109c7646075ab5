use core_sim::Tick;

use crate::signal::Signal;
use crate::stats::{change_over, mean, std_dev, trailing};

pub const MEAN_REVERSION: &str = "MeanRev";

/// Fades z-score extremes of the mid price against a rolling mean.
///
/// Buys when the mid sits more than `entry_z` deviations below the mean
/// unless the short-term trend is falling faster than `knife_guard`; sells
/// on the mirrored condition. Flat (`std_dev < min_std_dev`) and turbulent
/// (`std_dev / mean >= max_relative_std_dev`) windows produce no signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanReversion {
    pub window: usize,
    pub entry_z: f64,
    pub min_std_dev: f64,
    pub max_relative_std_dev: f64,
    pub trend_lookback: usize,
    pub knife_guard: f64,
    pub stop_pct: f64,
    pub confidence: f64,
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self {
            window: 50,
            entry_z: 1.8,
            min_std_dev: 0.01,
            max_relative_std_dev: 0.04,
            trend_lookback: 5,
            knife_guard: 0.012,
            stop_pct: 0.015,
            confidence: 0.85,
        }
    }
}

impl MeanReversion {
    pub fn analyze(&self, history: &[f64], tick: &Tick) -> Signal {
        let hold = Signal::hold(MEAN_REVERSION);

        let Some(window) = trailing(history, self.window) else {
            return hold;
        };
        let (Some(mean), Some(std_dev)) = (mean(window), std_dev(window)) else {
            return hold;
        };
        if std_dev < self.min_std_dev || mean <= 0.0 {
            return hold;
        }
        if std_dev / mean >= self.max_relative_std_dev {
            return hold;
        }
        let Some(trend) = change_over(history, self.trend_lookback) else {
            return hold;
        };

        let price = tick.mid();
        let z_score = (price - mean) / std_dev;

        if z_score < -self.entry_z && trend > -self.knife_guard {
            Signal::buy(
                MEAN_REVERSION,
                self.confidence,
                price * (1.0 - self.stop_pct),
                mean,
            )
        } else if z_score > self.entry_z && trend < self.knife_guard {
            Signal::sell(
                MEAN_REVERSION,
                self.confidence,
                price * (1.0 + self.stop_pct),
                mean,
            )
        } else {
            hold
        }
    }
}
