use serde::Serialize;

use crate::position::Side;

/// Receipt for an executed buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fill {
    pub side: Side,
    pub price: f64,
    pub quantity: u64,
    pub notional: f64,
    pub commission: f64,
    /// Signed change in cash: negative for buys, positive for sells.
    pub cash_delta: f64,
    pub realized_pnl: Option<f64>,
}

impl Fill {
    pub fn buy(price: f64, quantity: u64, fee_rate: f64) -> Self {
        let notional = price * quantity as f64;
        let commission = notional * fee_rate;

        Self {
            side: Side::Buy,
            price,
            quantity,
            notional,
            commission,
            cash_delta: -(notional + commission),
            realized_pnl: None,
        }
    }

    /// `avg_entry_price` is the cost basis per share being closed.
    pub fn sell(price: f64, quantity: u64, fee_rate: f64, avg_entry_price: f64) -> Self {
        let notional = price * quantity as f64;
        let commission = notional * fee_rate;
        let net_revenue = notional - commission;
        let cost_basis = avg_entry_price * quantity as f64;

        Self {
            side: Side::Sell,
            price,
            quantity,
            notional,
            commission,
            cash_delta: net_revenue,
            realized_pnl: Some(net_revenue - cost_basis),
        }
    }

    /// Cash that leaves the account for a buy, or arrives for a sell.
    pub fn cash_amount(&self) -> f64 {
        self.cash_delta.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::Fill;
    use crate::position::Side;

    #[test]
    fn buy_charges_commission_on_top_of_notional() {
        let fill = Fill::buy(150.0, 10, 0.001);

        assert_eq!(fill.side, Side::Buy);
        assert_eq!(fill.notional, 1_500.0);
        assert!((fill.commission - 1.5).abs() < 1e-9);
        assert!((fill.cash_delta + 1_501.5).abs() < 1e-9);
        assert_eq!(fill.realized_pnl, None);
    }

    #[test]
    fn sell_nets_commission_and_books_pnl_against_average_cost() {
        let fill = Fill::sell(155.0, 10, 0.001, 150.0);

        assert!((fill.commission - 1.55).abs() < 1e-9);
        assert!((fill.cash_delta - 1_548.45).abs() < 1e-9);
        assert!((fill.realized_pnl.unwrap() - 48.45).abs() < 1e-9);
    }
}
