use core_sim::Tick;

use crate::breakout::Breakout;
use crate::mean_reversion::MeanReversion;
use crate::signal::Signal;
use crate::trend_following::TrendFollowing;

/// The closed set of signal generators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyKind {
    MeanReversion(MeanReversion),
    TrendFollowing(TrendFollowing),
    Breakout(Breakout),
}

impl StrategyKind {
    /// All strategies with default parameters, in tie-break order: the first
    /// qualifying signal for a symbol wins.
    pub fn default_set() -> Vec<Self> {
        vec![
            Self::MeanReversion(MeanReversion::default()),
            Self::TrendFollowing(TrendFollowing::default()),
            Self::Breakout(Breakout::default()),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MeanReversion(_) => crate::mean_reversion::MEAN_REVERSION,
            Self::TrendFollowing(_) => crate::trend_following::TREND_FOLLOWING,
            Self::Breakout(_) => crate::breakout::BREAKOUT,
        }
    }

    pub fn analyze(&self, history: &[f64], tick: &Tick) -> Signal {
        match self {
            Self::MeanReversion(strategy) => strategy.analyze(history, tick),
            Self::TrendFollowing(strategy) => strategy.analyze(history, tick),
            Self::Breakout(strategy) => strategy.analyze(history, tick),
        }
    }
}
