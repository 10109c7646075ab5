use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub quantity: u64,
    pub ts_ms: u64,
    pub strategy: String,
}

/// Long-only holding in one symbol, carried at volume-weighted average cost.
///
/// `total_cost` includes buy commissions, so `avg_entry_price` is the
/// all-in price paid per share. A flat position has both at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: u64,
    pub avg_entry_price: f64,
    pub total_cost: f64,
    pub trades: Vec<Trade>,
}

impl Position {
    pub fn flat(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.quantity > 0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        price * self.quantity as f64
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.avg_entry_price) * self.quantity as f64
    }
}
