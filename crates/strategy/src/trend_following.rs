use core_sim::Tick;

use crate::signal::Signal;
use crate::stats::{change_over, mean, trailing};

pub const TREND_FOLLOWING: &str = "TrendFollow";

/// Short/long moving-average crossover confirmed by momentum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFollowing {
    pub short_window: usize,
    pub long_window: usize,
    pub min_momentum: f64,
    pub momentum_lookback: usize,
    pub take_profit_pct: f64,
    pub stop_pct: f64,
    pub confidence: f64,
}

impl Default for TrendFollowing {
    fn default() -> Self {
        Self {
            short_window: 10,
            long_window: 30,
            min_momentum: 0.003,
            momentum_lookback: 5,
            take_profit_pct: 0.015,
            stop_pct: 0.008,
            confidence: 0.84,
        }
    }
}

impl TrendFollowing {
    pub fn analyze(&self, history: &[f64], tick: &Tick) -> Signal {
        let hold = Signal::hold(TREND_FOLLOWING);

        if history.len() < self.long_window || history.len() <= self.short_window {
            return hold;
        }
        let previous = &history[..history.len() - 1];
        let (Some(short_avg), Some(long_avg), Some(previous_short_avg)) = (
            trailing(history, self.short_window).and_then(mean),
            trailing(history, self.long_window).and_then(mean),
            trailing(previous, self.short_window).and_then(mean),
        ) else {
            return hold;
        };
        if long_avg == 0.0 {
            return hold;
        }
        let Some(recent_momentum) = change_over(history, self.momentum_lookback) else {
            return hold;
        };

        let crossed_up = previous_short_avg <= long_avg && short_avg > long_avg;
        let crossed_down = previous_short_avg >= long_avg && short_avg < long_avg;
        let momentum = (short_avg - long_avg) / long_avg;
        let mid = tick.mid();

        if crossed_up && momentum > self.min_momentum && recent_momentum > 0.0 {
            Signal::buy(
                TREND_FOLLOWING,
                self.confidence,
                mid * (1.0 - self.stop_pct),
                mid * (1.0 + self.take_profit_pct),
            )
        } else if crossed_down && momentum < -self.min_momentum && recent_momentum < 0.0 {
            Signal::sell(
                TREND_FOLLOWING,
                self.confidence,
                mid * (1.0 + self.stop_pct),
                mid * (1.0 - self.take_profit_pct),
            )
        } else {
            hold
        }
    }
}
