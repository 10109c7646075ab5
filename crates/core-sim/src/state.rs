use std::collections::HashMap;

use crate::error::LedgerError;
use crate::fills::Fill;
use crate::position::{Position, Side, Trade};

/// Cash, positions and counters of the ledger.
///
/// `apply_buy` and `apply_sell` are the only mutators. Both validate every
/// precondition before touching any field, so an `Err` leaves the state
/// exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LedgerState {
    pub(crate) cash: f64,
    pub(crate) initial_capital: f64,
    pub(crate) realized_pnl: f64,
    pub(crate) winning_trades: u64,
    pub(crate) losing_trades: u64,
    pub(crate) trade_count: u64,
    pub(crate) positions: HashMap<String, Position>,
    pub(crate) trades: Vec<Trade>,
    fee_rate: f64,
}

impl LedgerState {
    pub(crate) fn new(initial_capital: f64, fee_rate: f64) -> Result<Self, LedgerError> {
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(LedgerError::InvalidCapital);
        }
        if !fee_rate.is_finite() || fee_rate < 0.0 {
            return Err(LedgerError::InvalidFee);
        }

        Ok(Self {
            cash: initial_capital,
            initial_capital,
            realized_pnl: 0.0,
            winning_trades: 0,
            losing_trades: 0,
            trade_count: 0,
            positions: HashMap::new(),
            trades: Vec::new(),
            fee_rate,
        })
    }

    pub(crate) fn apply_buy(
        &mut self,
        symbol: &str,
        price: f64,
        quantity: u64,
        strategy: &str,
        ts_ms: u64,
    ) -> Result<Fill, LedgerError> {
        validate_order(price, quantity)?;

        let fill = Fill::buy(price, quantity, self.fee_rate);
        let required = fill.cash_amount();
        if self.cash < required {
            return Err(LedgerError::InsufficientCash {
                required,
                available: self.cash,
            });
        }

        let trade = trade(symbol, Side::Buy, price, quantity, strategy, ts_ms);
        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Position::flat(symbol));
        position.total_cost += required;
        position.quantity += quantity;
        position.avg_entry_price = position.total_cost / position.quantity as f64;
        position.trades.push(trade.clone());

        self.cash -= required;
        self.trade_count += 1;
        self.trades.push(trade);

        Ok(fill)
    }

    pub(crate) fn apply_sell(
        &mut self,
        symbol: &str,
        price: f64,
        quantity: u64,
        strategy: &str,
        ts_ms: u64,
    ) -> Result<Fill, LedgerError> {
        validate_order(price, quantity)?;

        let held = self.position_quantity(symbol);
        let position = match self.positions.get_mut(symbol) {
            Some(position) if position.quantity >= quantity => position,
            _ => {
                return Err(LedgerError::InsufficientQuantity {
                    requested: quantity,
                    held,
                })
            }
        };

        let fill = Fill::sell(price, quantity, self.fee_rate, position.avg_entry_price);
        let pnl = fill.realized_pnl.unwrap_or(0.0);
        let trade = trade(symbol, Side::Sell, price, quantity, strategy, ts_ms);

        position.quantity -= quantity;
        if position.quantity > 0 {
            position.total_cost = position.avg_entry_price * position.quantity as f64;
        } else {
            position.total_cost = 0.0;
            position.avg_entry_price = 0.0;
        }
        position.trades.push(trade.clone());

        self.cash += fill.cash_delta;
        self.realized_pnl += pnl;
        if pnl > 0.0 {
            self.winning_trades += 1;
        } else {
            self.losing_trades += 1;
        }
        self.trade_count += 1;
        self.trades.push(trade);

        Ok(fill)
    }

    pub(crate) fn position_quantity(&self, symbol: &str) -> u64 {
        self.positions
            .get(symbol)
            .map(|position| position.quantity)
            .unwrap_or(0)
    }

    pub(crate) fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values().filter(|position| position.is_open())
    }
}

fn validate_order(price: f64, quantity: u64) -> Result<(), LedgerError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(LedgerError::InvalidPrice);
    }
    if quantity == 0 {
        return Err(LedgerError::InvalidQuantity);
    }
    Ok(())
}

fn trade(
    symbol: &str,
    side: Side,
    price: f64,
    quantity: u64,
    strategy: &str,
    ts_ms: u64,
) -> Trade {
    Trade {
        symbol: symbol.to_string(),
        side,
        price,
        quantity,
        ts_ms,
        strategy: strategy.to_string(),
    }
}
