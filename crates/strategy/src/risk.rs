use crate::error::StrategyError;

/// Tag recorded on forced closes.
pub const EXIT_TAG: &str = "StopLoss/TakeProfit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StopLoss => "stop_loss",
            Self::TakeProfit => "take_profit",
        }
    }
}

/// Closes a long once its mark moves outside the band around average cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitRule {
    stop_loss_pct: f64,
    take_profit_pct: f64,
}

impl ExitRule {
    pub fn new(stop_loss_pct: f64, take_profit_pct: f64) -> Result<Self, StrategyError> {
        if !stop_loss_pct.is_finite() || stop_loss_pct <= 0.0 || stop_loss_pct >= 1.0 {
            return Err(StrategyError::InvalidStopLossPct);
        }
        if !take_profit_pct.is_finite() || take_profit_pct <= 0.0 {
            return Err(StrategyError::InvalidTakeProfitPct);
        }

        Ok(Self {
            stop_loss_pct,
            take_profit_pct,
        })
    }

    pub fn stop_loss_pct(&self) -> f64 {
        self.stop_loss_pct
    }

    pub fn take_profit_pct(&self) -> f64 {
        self.take_profit_pct
    }

    /// Both bounds are strict: a move of exactly the threshold stays open.
    pub fn evaluate(&self, avg_entry_price: f64, mark_price: f64) -> Option<ExitReason> {
        if !avg_entry_price.is_finite() || avg_entry_price <= 0.0 || !mark_price.is_finite() {
            return None;
        }

        let pnl_pct = (mark_price - avg_entry_price) / avg_entry_price;
        if pnl_pct < -self.stop_loss_pct {
            Some(ExitReason::StopLoss)
        } else if pnl_pct > self.take_profit_pct {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }
}

impl Default for ExitRule {
    fn default() -> Self {
        Self {
            stop_loss_pct: 0.018,
            take_profit_pct: 0.022,
        }
    }
}
