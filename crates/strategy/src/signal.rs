#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub action: Action,
    pub confidence: f64,
    pub strategy: &'static str,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl Signal {
    pub fn hold(strategy: &'static str) -> Self {
        Self {
            action: Action::Hold,
            confidence: 0.0,
            strategy,
            stop_loss: None,
            take_profit: None,
        }
    }

    pub fn buy(strategy: &'static str, confidence: f64, stop_loss: f64, take_profit: f64) -> Self {
        Self {
            action: Action::Buy,
            confidence,
            strategy,
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
        }
    }

    pub fn sell(strategy: &'static str, confidence: f64, stop_loss: f64, take_profit: f64) -> Self {
        Self {
            action: Action::Sell,
            confidence,
            strategy,
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
        }
    }

    pub fn is_hold(&self) -> bool {
        self.action == Action::Hold
    }

    /// Strictly above `min_confidence`.
    pub fn clears(&self, min_confidence: f64) -> bool {
        !self.is_hold() && self.confidence > min_confidence
    }
}
