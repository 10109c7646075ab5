use std::ops::Range;

/// Tuning constants for the synthetic feed and the execution ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub history_capacity: usize,
    pub half_spread_bps: f64,
    pub shock_scale: f64,
    /// A symbol redraws its drift with probability `1 / regime_shift_odds` per update.
    pub regime_shift_odds: u32,
    pub start_price: Range<f64>,
    pub volatility: Range<f64>,
    pub drift: Range<f64>,
    pub volume: Range<u64>,
    pub fee_bps: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            history_capacity: 200,
            half_spread_bps: 1.0,
            shock_scale: 0.0008,
            regime_shift_odds: 500,
            start_price: 100.0..500.0,
            volatility: 0.3..1.8,
            drift: -0.0025..0.0025,
            volume: 1_000_000..1_500_000,
            fee_bps: 10.0,
        }
    }
}

impl SimConfig {
    pub fn fee_rate(&self) -> f64 {
        self.fee_bps / 10_000.0
    }
}
