use core_sim::Tick;

use crate::signal::Signal;
use crate::stats::{high_low, trailing};

pub const BREAKOUT: &str = "Breakout";

/// Channel breakout after a consolidation.
///
/// The channel is the high/low of the `channel_window` prices before the
/// latest one. A breakout needs a channel wider than `min_channel_width` of
/// its edge and a trailing `consolidation_window` range below
/// `max_consolidation` of the channel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakout {
    pub channel_window: usize,
    pub consolidation_window: usize,
    pub min_channel_width: f64,
    pub max_consolidation: f64,
    pub take_profit_pct: f64,
    pub stop_buffer_pct: f64,
    pub confidence: f64,
}

impl Default for Breakout {
    fn default() -> Self {
        Self {
            channel_window: 30,
            consolidation_window: 10,
            min_channel_width: 0.015,
            max_consolidation: 0.65,
            take_profit_pct: 0.02,
            stop_buffer_pct: 0.004,
            confidence: 0.81,
        }
    }
}

impl Breakout {
    pub fn analyze(&self, history: &[f64], tick: &Tick) -> Signal {
        let hold = Signal::hold(BREAKOUT);

        if self.channel_window < 2 || history.len() < self.channel_window {
            return hold;
        }
        let Some(channel) = trailing(history, self.channel_window)
            .map(|window| &window[..window.len() - 1])
            .and_then(high_low)
        else {
            return hold;
        };
        let Some(recent) = trailing(history, self.consolidation_window).and_then(high_low) else {
            return hold;
        };

        let (high, low) = channel;
        let range = high - low;
        if range <= 0.0 || low <= 0.0 {
            return hold;
        }
        let consolidated = (recent.0 - recent.1) / range < self.max_consolidation;
        let mid = tick.mid();

        if mid > high && range / high > self.min_channel_width && consolidated {
            Signal::buy(
                BREAKOUT,
                self.confidence,
                high * (1.0 - self.stop_buffer_pct),
                mid * (1.0 + self.take_profit_pct),
            )
        } else if mid < low && range / low > self.min_channel_width && consolidated {
            Signal::sell(
                BREAKOUT,
                self.confidence,
                low * (1.0 + self.stop_buffer_pct),
                mid * (1.0 - self.take_profit_pct),
            )
        } else {
            hold
        }
    }
}
