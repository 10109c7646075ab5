use std::sync::Arc;

use core_sim::{ExecutionLedger, PriceFeed, Tick};
use strategy::{Action, ExitRule, Signal, SizingConfig, StrategyKind, EXIT_TAG};
use tracing::debug;

use crate::events::{RejectReason, RuntimeEvent, RuntimeEventKind};

/// Symbols with fewer prices than this are skipped.
pub const MIN_HISTORY: usize = 50;

/// One pass over the universe: risk exits first, then signal-driven entries
/// and closes.
///
/// Per symbol at most one action is taken per cycle. An open position that
/// breaches the [`ExitRule`] band is sold at the bid and nothing else runs for
/// that symbol. Otherwise strategies are asked in order and the first signal
/// that clears the confidence floor and applies to the position state wins:
/// a SELL closes an open long, a BUY opens a flat one. SELL never opens a
/// short. Ledger rejections are dropped.
#[derive(Debug)]
pub struct DecisionLoop {
    feed: Arc<PriceFeed>,
    ledger: Arc<ExecutionLedger>,
    symbols: Vec<String>,
    strategies: Vec<StrategyKind>,
    exit_rule: ExitRule,
    sizing: SizingConfig,
    cycle: u64,
}

impl DecisionLoop {
    pub fn new(feed: Arc<PriceFeed>, ledger: Arc<ExecutionLedger>, symbols: Vec<String>) -> Self {
        Self::with_strategies(feed, ledger, symbols, StrategyKind::default_set())
    }

    pub fn with_strategies(
        feed: Arc<PriceFeed>,
        ledger: Arc<ExecutionLedger>,
        symbols: Vec<String>,
        strategies: Vec<StrategyKind>,
    ) -> Self {
        Self {
            feed,
            ledger,
            symbols,
            strategies,
            exit_rule: ExitRule::default(),
            sizing: SizingConfig::default(),
            cycle: 0,
        }
    }

    pub fn with_exit_rule(mut self, exit_rule: ExitRule) -> Self {
        self.exit_rule = exit_rule;
        self
    }

    pub fn with_sizing(mut self, sizing: SizingConfig) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn strategies(&self) -> &[StrategyKind] {
        &self.strategies
    }

    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    pub fn run_cycle(&mut self) -> Vec<RuntimeEvent> {
        self.cycle += 1;

        let events: Vec<RuntimeEvent> = self
            .symbols
            .iter()
            .filter_map(|symbol| {
                self.evaluate_symbol(symbol)
                    .map(|kind| RuntimeEvent::new(self.cycle, symbol.as_str(), kind))
            })
            .collect();

        debug!(cycle = self.cycle, events = events.len(), "decision cycle complete");
        events
    }

    fn evaluate_symbol(&self, symbol: &str) -> Option<RuntimeEventKind> {
        let (tick, history) = self.feed.snapshot(symbol)?;
        if history.len() < MIN_HISTORY {
            return None;
        }

        if let Some((held, avg_entry_price)) = self.ledger.holding(symbol) {
            if let Some(reason) = self.exit_rule.evaluate(avg_entry_price, tick.mid()) {
                let fill = self.ledger.sell(symbol, tick.bid, held, EXIT_TAG).ok()?;
                return Some(RuntimeEventKind::ForcedExit {
                    reason: reason.as_str(),
                    quantity: fill.quantity,
                    price: fill.price,
                    realized_pnl: fill.realized_pnl.unwrap_or_default(),
                });
            }

            let signal = self.first_signal(&history, &tick, Action::Sell)?;
            let fill = self
                .ledger
                .sell(symbol, tick.bid, held, signal.strategy)
                .ok()?;
            return Some(RuntimeEventKind::SignalExit {
                strategy: signal.strategy,
                quantity: fill.quantity,
                price: fill.price,
                realized_pnl: fill.realized_pnl.unwrap_or_default(),
            });
        }

        let signal = self.first_signal(&history, &tick, Action::Buy)?;
        let quantity = self.sizing.order_quantity(self.ledger.cash(), tick.ask);
        if quantity == 0 {
            return Some(reject(signal, RejectReason::ZeroSize, quantity));
        }
        if !self.sizing.has_capacity(self.ledger.open_position_count()) {
            return Some(reject(signal, RejectReason::ExposureCap, quantity));
        }

        let fill = self
            .ledger
            .buy(symbol, tick.ask, quantity, signal.strategy)
            .ok()?;
        Some(RuntimeEventKind::Entry {
            strategy: signal.strategy,
            confidence: signal.confidence,
            quantity: fill.quantity,
            price: fill.price,
        })
    }

    /// Strategies after the first match are not evaluated.
    fn first_signal(&self, history: &[f64], tick: &Tick, action: Action) -> Option<Signal> {
        let min_confidence = self.sizing.min_confidence();
        self.strategies
            .iter()
            .map(|strategy| strategy.analyze(history, tick))
            .find(|signal| signal.action == action && signal.clears(min_confidence))
    }
}

fn reject(signal: Signal, reason: RejectReason, requested_qty: u64) -> RuntimeEventKind {
    RuntimeEventKind::RiskReject {
        strategy: signal.strategy,
        reason,
        requested_qty,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use core_sim::{ExecutionLedger, PriceFeed, Tick};
    use strategy::{Action, Breakout, ExitRule, MeanReversion, SizingConfig, StrategyKind};

    use super::DecisionLoop;
    use crate::events::{RejectReason, RuntimeEventKind};

    const FEE_RATE: f64 = 0.001;

    fn seeded_feed(symbol: &str, prices: &[f64]) -> Arc<PriceFeed> {
        let feed = Arc::new(PriceFeed::new(200));
        for (ts, price) in prices.iter().enumerate() {
            feed.publish_round(vec![Tick::quote(symbol, *price, 1.0, 1_000_000, ts as u64)]);
        }
        feed
    }

    /// A 98..102 channel, a tight base around 100, then `last`.
    fn breakout_series(last: f64) -> Vec<f64> {
        let mut prices = vec![100.0; 30];
        prices.extend((0..20).map(|i| if i % 2 == 0 { 98.0 } else { 102.0 }));
        prices.extend((0..9).map(|i| if i % 2 == 0 { 100.0 } else { 100.5 }));
        prices.push(last);
        prices
    }

    fn breakout_only(
        feed: Arc<PriceFeed>,
        ledger: Arc<ExecutionLedger>,
        symbol: &str,
    ) -> DecisionLoop {
        DecisionLoop::with_strategies(
            feed,
            ledger,
            vec![symbol.to_string()],
            vec![StrategyKind::Breakout(Breakout::default())],
        )
    }

    #[test]
    fn skips_symbols_with_short_history() {
        let feed = seeded_feed("NVDA", &breakout_series(102.5)[11..]);
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        let mut decisions = breakout_only(feed, Arc::clone(&ledger), "NVDA");

        let events = decisions.run_cycle();

        assert!(events.is_empty());
        assert_eq!(ledger.trade_count(), 0);
        assert_eq!(decisions.cycles(), 1);
    }

    #[test]
    fn skips_symbols_without_a_tick() {
        let feed = Arc::new(PriceFeed::new(200));
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        let mut decisions = DecisionLoop::new(feed, ledger, vec!["AAPL".to_string()]);

        assert!(decisions.run_cycle().is_empty());
    }

    #[test]
    fn enters_on_qualifying_buy_with_two_percent_of_cash() {
        let feed = seeded_feed("NVDA", &breakout_series(102.5));
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        let ask = feed.tick("NVDA").unwrap().ask;
        let mut decisions = breakout_only(feed, Arc::clone(&ledger), "NVDA");

        let events = decisions.run_cycle();

        let expected_qty = (2_000.0 / ask).floor() as u64;
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            RuntimeEventKind::Entry {
                strategy: "Breakout",
                confidence: 0.81,
                quantity: expected_qty,
                price: ask,
            }
        );
        assert_eq!(ledger.position("NVDA").quantity, expected_qty);
        assert_eq!(ledger.trades()[0].strategy, "Breakout");
    }

    #[test]
    fn open_position_is_not_added_to() {
        let feed = seeded_feed("NVDA", &breakout_series(102.5));
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        let mut decisions = breakout_only(feed, Arc::clone(&ledger), "NVDA");

        decisions.run_cycle();
        let second = decisions.run_cycle();

        assert!(second.is_empty());
        assert_eq!(ledger.trade_count(), 1);
    }

    #[test]
    fn stop_loss_closes_at_bid_and_takes_priority() {
        let feed = seeded_feed("AAPL", &[97.0; 60]);
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        ledger.buy("AAPL", 100.0, 10, "MeanRev").unwrap();
        let bid = feed.tick("AAPL").unwrap().bid;
        let mut decisions = DecisionLoop::new(feed, Arc::clone(&ledger), vec!["AAPL".into()]);

        let events = decisions.run_cycle();

        assert_eq!(events.len(), 1);
        match &events[0].kind {
            RuntimeEventKind::ForcedExit {
                reason,
                quantity,
                price,
                realized_pnl,
            } => {
                assert_eq!(*reason, "stop_loss");
                assert_eq!(*quantity, 10);
                assert_eq!(*price, bid);
                assert!(*realized_pnl < 0.0);
            }
            other => panic!("expected forced exit, got {other:?}"),
        }
        assert!(!ledger.position("AAPL").is_open());
        assert_eq!(ledger.trades()[1].strategy, "StopLoss/TakeProfit");
    }

    #[test]
    fn take_profit_closes_winning_position() {
        let feed = seeded_feed("AAPL", &[103.0; 60]);
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        ledger.buy("AAPL", 100.0, 10, "TrendFollow").unwrap();
        let mut decisions = DecisionLoop::new(feed, Arc::clone(&ledger), vec!["AAPL".into()]);

        let events = decisions.run_cycle();

        assert!(matches!(
            events[0].kind,
            RuntimeEventKind::ForcedExit {
                reason: "take_profit",
                quantity: 10,
                ..
            }
        ));
        assert_eq!(ledger.winning_trades(), 1);
    }

    #[test]
    fn position_inside_band_stays_open() {
        let feed = seeded_feed("AAPL", &[101.0; 60]);
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        ledger.buy("AAPL", 100.0, 10, "Breakout").unwrap();
        let mut decisions = DecisionLoop::new(feed, Arc::clone(&ledger), vec!["AAPL".into()]);

        assert!(decisions.run_cycle().is_empty());
        assert_eq!(ledger.position("AAPL").quantity, 10);
    }

    #[test]
    fn qualifying_sell_signal_closes_open_long() {
        let series: Vec<f64> = breakout_series(102.5)
            .into_iter()
            .map(|price| 200.0 - price)
            .collect();
        let feed = seeded_feed("NVDA", &series);
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        ledger.buy("NVDA", 97.0, 20, "MeanRev").unwrap();
        let mut decisions = breakout_only(feed, Arc::clone(&ledger), "NVDA");

        let events = decisions.run_cycle();

        assert!(matches!(
            events[0].kind,
            RuntimeEventKind::SignalExit {
                strategy: "Breakout",
                quantity: 20,
                ..
            }
        ));
        assert_eq!(ledger.open_position_count(), 0);
    }

    #[test]
    fn sell_signal_never_opens_a_short() {
        let series: Vec<f64> = breakout_series(102.5)
            .into_iter()
            .map(|price| 200.0 - price)
            .collect();
        let feed = seeded_feed("NVDA", &series);
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        let mut decisions = breakout_only(feed, Arc::clone(&ledger), "NVDA");

        assert!(decisions.run_cycle().is_empty());
        assert_eq!(ledger.trade_count(), 0);
    }

    #[test]
    fn exposure_cap_rejects_the_twenty_sixth_position() {
        let feed = seeded_feed("NVDA", &breakout_series(102.5));
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        for i in 0..25 {
            ledger.buy(&format!("HELD{i}"), 10.0, 1, "MeanRev").unwrap();
        }
        let ask = feed.tick("NVDA").unwrap().ask;
        let expected_qty = (ledger.cash() * 0.02 / ask).floor() as u64;
        let mut decisions = breakout_only(feed, Arc::clone(&ledger), "NVDA");

        let events = decisions.run_cycle();

        assert_eq!(
            events[0].kind,
            RuntimeEventKind::RiskReject {
                strategy: "Breakout",
                reason: RejectReason::ExposureCap,
                requested_qty: expected_qty,
            }
        );
        assert!(!ledger.position("NVDA").is_open());
        assert_eq!(ledger.open_position_count(), 25);
    }

    #[test]
    fn order_too_small_for_one_share_is_rejected() {
        let feed = seeded_feed("NVDA", &breakout_series(102.5));
        let ledger = Arc::new(ExecutionLedger::new(1_000.0, FEE_RATE).unwrap());
        let mut decisions = breakout_only(feed, Arc::clone(&ledger), "NVDA");

        let events = decisions.run_cycle();

        assert_eq!(
            events[0].kind,
            RuntimeEventKind::RiskReject {
                strategy: "Breakout",
                reason: RejectReason::ZeroSize,
                requested_qty: 0,
            }
        );
        assert_eq!(ledger.trade_count(), 0);
    }

    #[test]
    fn earlier_sell_on_flat_symbol_does_not_block_later_buy() {
        let series = breakout_series(102.5);
        let fader = MeanReversion {
            entry_z: 1.0,
            knife_guard: 0.05,
            ..MeanReversion::default()
        };
        let feed = seeded_feed("NVDA", &series);
        let tick = feed.tick("NVDA").unwrap();
        assert_eq!(fader.analyze(&series, &tick).action, Action::Sell);
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        let mut decisions = DecisionLoop::with_strategies(
            feed,
            Arc::clone(&ledger),
            vec!["NVDA".to_string()],
            vec![
                StrategyKind::MeanReversion(fader),
                StrategyKind::Breakout(Breakout::default()),
            ],
        );

        let events = decisions.run_cycle();

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].kind,
            RuntimeEventKind::Entry {
                strategy: "Breakout",
                ..
            }
        ));
        assert_eq!(ledger.trades()[0].strategy, "Breakout");
    }

    #[test]
    fn first_qualifying_buy_in_strategy_order_wins() {
        let eager = MeanReversion {
            entry_z: -100.0,
            ..MeanReversion::default()
        };
        let cases = [
            (
                vec![
                    StrategyKind::MeanReversion(eager),
                    StrategyKind::Breakout(Breakout::default()),
                ],
                "MeanRev",
                0.85,
            ),
            (
                vec![
                    StrategyKind::Breakout(Breakout::default()),
                    StrategyKind::MeanReversion(eager),
                ],
                "Breakout",
                0.81,
            ),
        ];

        for (strategies, expected, expected_confidence) in cases {
            let feed = seeded_feed("NVDA", &breakout_series(102.5));
            let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
            let mut decisions = DecisionLoop::with_strategies(
                feed,
                Arc::clone(&ledger),
                vec!["NVDA".to_string()],
                strategies,
            );

            let events = decisions.run_cycle();

            assert_eq!(events.len(), 1);
            match events[0].kind {
                RuntimeEventKind::Entry {
                    strategy,
                    confidence,
                    ..
                } => {
                    assert_eq!(strategy, expected);
                    assert_eq!(confidence, expected_confidence);
                }
                ref other => panic!("expected entry, got {other:?}"),
            }
            assert_eq!(ledger.trade_count(), 1);
            assert_eq!(ledger.trades()[0].strategy, expected);
        }
    }

    #[test]
    fn custom_exit_band_closes_inside_default_band() {
        let feed = seeded_feed("AAPL", &[101.0; 60]);
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        ledger.buy("AAPL", 100.0, 10, "Breakout").unwrap();
        let mut decisions = DecisionLoop::new(feed, Arc::clone(&ledger), vec!["AAPL".into()])
            .with_exit_rule(ExitRule::new(0.005, 0.005).unwrap());

        let events = decisions.run_cycle();

        assert!(matches!(
            events[0].kind,
            RuntimeEventKind::ForcedExit {
                reason: "take_profit",
                quantity: 10,
                ..
            }
        ));
        assert_eq!(ledger.holding("AAPL"), None);
    }

    #[test]
    fn custom_sizing_sets_fraction_and_position_cap() {
        let feed = seeded_feed("NVDA", &breakout_series(102.5));
        let ledger = Arc::new(ExecutionLedger::new(100_000.0, FEE_RATE).unwrap());
        ledger.buy("HELD", 10.0, 1, "MeanRev").unwrap();
        let ask = feed.tick("NVDA").unwrap().ask;
        let expected_qty = (ledger.cash() * 0.05 / ask).floor() as u64;
        let mut decisions = breakout_only(feed, Arc::clone(&ledger), "NVDA")
            .with_sizing(SizingConfig::new(0.05, 1, 0.80).unwrap());

        let events = decisions.run_cycle();

        assert_eq!(
            events[0].kind,
            RuntimeEventKind::RiskReject {
                strategy: "Breakout",
                reason: RejectReason::ExposureCap,
                requested_qty: expected_qty,
            }
        );
        assert_eq!(ledger.open_position_count(), 1);
    }
}
