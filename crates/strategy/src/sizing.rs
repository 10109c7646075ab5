use crate::error::StrategyError;

/// Entry sizing and exposure limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingConfig {
    capital_fraction: f64,
    max_open_positions: usize,
    min_confidence: f64,
}

impl SizingConfig {
    pub fn new(
        capital_fraction: f64,
        max_open_positions: usize,
        min_confidence: f64,
    ) -> Result<Self, StrategyError> {
        if !capital_fraction.is_finite() || capital_fraction <= 0.0 || capital_fraction > 1.0 {
            return Err(StrategyError::InvalidCapitalFraction);
        }
        if max_open_positions == 0 {
            return Err(StrategyError::InvalidMaxOpenPositions);
        }
        if !min_confidence.is_finite() || !(0.0..1.0).contains(&min_confidence) {
            return Err(StrategyError::InvalidMinConfidence);
        }

        Ok(Self {
            capital_fraction,
            max_open_positions,
            min_confidence,
        })
    }

    pub fn capital_fraction(&self) -> f64 {
        self.capital_fraction
    }

    pub fn max_open_positions(&self) -> usize {
        self.max_open_positions
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Whole shares affordable with `capital_fraction` of `cash` at `ask`.
    pub fn order_quantity(&self, cash: f64, ask: f64) -> u64 {
        if !cash.is_finite() || cash <= 0.0 || !ask.is_finite() || ask <= 0.0 {
            return 0;
        }
        (cash * self.capital_fraction / ask).floor() as u64
    }

    pub fn has_capacity(&self, open_positions: usize) -> bool {
        open_positions < self.max_open_positions
    }
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            capital_fraction: 0.02,
            max_open_positions: 25,
            min_confidence: 0.80,
        }
    }
}
