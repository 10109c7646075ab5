use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenPositionMark {
    pub symbol: String,
    pub quantity: u64,
    pub avg_entry_price: f64,
    pub current_price: f64,
    pub unrealized_pnl: f64,
}

/// Everything the final report needs, read under one ledger lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub initial_capital: f64,
    pub cash: f64,
    pub portfolio_value: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
    pub return_pct: f64,
    pub trade_count: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    pub win_rate_pct: Option<f64>,
    pub open_positions: Vec<OpenPositionMark>,
}

/// What the periodic status line shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub portfolio_value: f64,
    pub pnl: f64,
    pub return_pct: f64,
    pub trade_count: u64,
    pub open_positions: usize,
}
