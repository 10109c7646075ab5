use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::SimConfig;
use crate::error::LedgerError;
use crate::fills::Fill;
use crate::position::{Position, Trade};
use crate::state::LedgerState;
use crate::summary::{LedgerSummary, OpenPositionMark, StatusSnapshot};
use crate::tick::now_ms;

/// Symbol to mark price, typically the latest mid from the feed.
pub type PriceMap = HashMap<String, f64>;

/// Thread-safe cash and position book.
///
/// Every buy, sell and query takes the same mutex, so operations are
/// linearizable and a reader never sees cash updated without the matching
/// position change. Open positions without an entry in the supplied
/// [`PriceMap`] are left out of valuations.
#[derive(Debug)]
pub struct ExecutionLedger {
    state: Mutex<LedgerState>,
}

impl ExecutionLedger {
    pub fn new(initial_capital: f64, fee_rate: f64) -> Result<Self, LedgerError> {
        Ok(Self {
            state: Mutex::new(LedgerState::new(initial_capital, fee_rate)?),
        })
    }

    pub fn with_config(initial_capital: f64, config: &SimConfig) -> Result<Self, LedgerError> {
        Self::new(initial_capital, config.fee_rate())
    }

    pub fn buy(
        &self,
        symbol: &str,
        price: f64,
        quantity: u64,
        strategy: &str,
    ) -> Result<Fill, LedgerError> {
        let result = self
            .state
            .lock()
            .apply_buy(symbol, price, quantity, strategy, now_ms());

        match &result {
            Ok(fill) => debug!(
                symbol,
                quantity,
                price,
                cost = fill.cash_amount(),
                strategy,
                "buy filled"
            ),
            Err(err) => debug!(symbol, quantity, price, strategy, %err, "buy rejected"),
        }
        result
    }

    pub fn sell(
        &self,
        symbol: &str,
        price: f64,
        quantity: u64,
        strategy: &str,
    ) -> Result<Fill, LedgerError> {
        let result = self
            .state
            .lock()
            .apply_sell(symbol, price, quantity, strategy, now_ms());

        match &result {
            Ok(fill) => debug!(
                symbol,
                quantity,
                price,
                pnl = fill.realized_pnl.unwrap_or(0.0),
                strategy,
                "sell filled"
            ),
            Err(err) => debug!(symbol, quantity, price, strategy, %err, "sell rejected"),
        }
        result
    }

    pub fn cash(&self) -> f64 {
        self.state.lock().cash
    }

    pub fn initial_capital(&self) -> f64 {
        self.state.lock().initial_capital
    }

    /// A copy of the position; flat if the symbol was never traded.
    pub fn position(&self, symbol: &str) -> Position {
        self.state
            .lock()
            .positions
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Position::flat(symbol))
    }

    /// Quantity and average entry price, `None` while flat. Skips the trade
    /// log that [`ExecutionLedger::position`] copies.
    pub fn holding(&self, symbol: &str) -> Option<(u64, f64)> {
        self.state
            .lock()
            .positions
            .get(symbol)
            .filter(|position| position.is_open())
            .map(|position| (position.quantity, position.avg_entry_price))
    }

    pub fn portfolio_value(&self, prices: &PriceMap) -> f64 {
        let state = self.state.lock();
        state.cash + market_value(&state, prices)
    }

    pub fn unrealized_pnl(&self, prices: &PriceMap) -> f64 {
        unrealized(&self.state.lock(), prices)
    }

    pub fn realized_pnl(&self) -> f64 {
        self.state.lock().realized_pnl
    }

    pub fn total_pnl(&self, prices: &PriceMap) -> f64 {
        let state = self.state.lock();
        state.realized_pnl + unrealized(&state, prices)
    }

    pub fn trade_count(&self) -> u64 {
        self.state.lock().trade_count
    }

    pub fn open_position_count(&self) -> usize {
        self.state.lock().open_positions().count()
    }

    pub fn winning_trades(&self) -> u64 {
        self.state.lock().winning_trades
    }

    pub fn losing_trades(&self) -> u64 {
        self.state.lock().losing_trades
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.state.lock().trades.clone()
    }

    pub fn status(&self, prices: &PriceMap) -> StatusSnapshot {
        let state = self.state.lock();
        let portfolio_value = state.cash + market_value(&state, prices);
        let pnl = portfolio_value - state.initial_capital;

        StatusSnapshot {
            portfolio_value,
            pnl,
            return_pct: pnl / state.initial_capital * 100.0,
            trade_count: state.trade_count,
            open_positions: state.open_positions().count(),
        }
    }

    pub fn summary(&self, prices: &PriceMap) -> LedgerSummary {
        let state = self.state.lock();

        let mut open_positions: Vec<OpenPositionMark> = state
            .open_positions()
            .filter_map(|position| {
                let current_price = *prices.get(&position.symbol)?;
                Some(OpenPositionMark {
                    symbol: position.symbol.clone(),
                    quantity: position.quantity,
                    avg_entry_price: position.avg_entry_price,
                    current_price,
                    unrealized_pnl: position.unrealized_pnl(current_price),
                })
            })
            .collect();
        open_positions.sort_by(|left, right| left.symbol.cmp(&right.symbol));

        let unrealized_pnl: f64 = open_positions.iter().map(|mark| mark.unrealized_pnl).sum();
        let total_pnl = state.realized_pnl + unrealized_pnl;
        let closed = state.winning_trades + state.losing_trades;
        let win_rate_pct =
            (closed > 0).then(|| state.winning_trades as f64 / closed as f64 * 100.0);

        LedgerSummary {
            initial_capital: state.initial_capital,
            cash: state.cash,
            portfolio_value: state.cash + market_value(&state, prices),
            realized_pnl: state.realized_pnl,
            unrealized_pnl,
            total_pnl,
            return_pct: total_pnl / state.initial_capital * 100.0,
            trade_count: state.trade_count,
            winning_trades: state.winning_trades,
            losing_trades: state.losing_trades,
            win_rate_pct,
            open_positions,
        }
    }
}

fn market_value(state: &LedgerState, prices: &PriceMap) -> f64 {
    state
        .open_positions()
        .filter_map(|position| {
            prices
                .get(&position.symbol)
                .map(|price| position.market_value(*price))
        })
        .sum()
}

fn unrealized(state: &LedgerState, prices: &PriceMap) -> f64 {
    state
        .open_positions()
        .filter_map(|position| {
            prices
                .get(&position.symbol)
                .map(|price| position.unrealized_pnl(*price))
        })
        .sum()
}
