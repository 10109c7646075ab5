pub mod engine;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod session;
pub mod shutdown;
pub mod supervisor;

pub use engine::{DecisionLoop, MIN_HISTORY};
pub use events::{RejectReason, RuntimeEvent, RuntimeEventKind};
pub use logging::{init_tracing, EventSink, InMemoryEventSink, TracingEventSink};
pub use metrics::{CycleLatency, LatencyPercentiles, DEFAULT_LATENCY_WINDOW};
pub use session::{Session, SessionConfig, SessionReport, StatusReporter};
pub use shutdown::{shutdown_channel, ShutdownSignal, ShutdownTrigger};
pub use supervisor::{Activity, ActivityLifecycle, SupervisedActivity, Supervisor};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use core_sim::universe::default_universe;
    use core_sim::{ExecutionLedger, MarketSimulator, PriceFeed, SimConfig};

    use crate::engine::DecisionLoop;
    use crate::events::RuntimeEventKind;

    #[test]
    fn simulated_market_keeps_ledger_consistent_over_many_cycles() {
        let config = SimConfig::default();
        let symbols = default_universe();
        let feed = Arc::new(PriceFeed::new(config.history_capacity));
        let ledger = Arc::new(ExecutionLedger::with_config(100_000.0, &config).unwrap());
        let mut simulator = MarketSimulator::new(symbols.clone(), config, 42);
        let mut decisions = DecisionLoop::new(Arc::clone(&feed), Arc::clone(&ledger), symbols);

        let mut fills = 0;
        for round in 0..600u64 {
            feed.publish_round(simulator.next_round(round * 50));
            if round % 3 == 2 {
                for event in decisions.run_cycle() {
                    assert!(ledger.open_position_count() <= 25);
                    if event.is_fill() {
                        fills += 1;
                    }
                    if let RuntimeEventKind::Entry { quantity, .. } = event.kind {
                        assert!(quantity > 0);
                    }
                }
            }
        }

        let summary = ledger.summary(&feed.mid_prices());
        assert_eq!(summary.trade_count, fills);
        assert!(summary.cash >= 0.0);
        assert!(summary.open_positions.len() <= 25);
        assert!(
            (summary.total_pnl - (summary.realized_pnl + summary.unrealized_pnl)).abs() < 1e-6
        );
        assert_eq!(decisions.cycles(), 200);
    }

    #[test]
    fn decision_cycles_are_deterministic_for_a_seed() {
        let run = || {
            let config = SimConfig::default();
            let symbols = default_universe();
            let feed = Arc::new(PriceFeed::new(config.history_capacity));
            let ledger = Arc::new(ExecutionLedger::with_config(100_000.0, &config).unwrap());
            let mut simulator = MarketSimulator::new(symbols.clone(), config, 9);
            let mut decisions = DecisionLoop::new(Arc::clone(&feed), ledger, symbols);
            let mut events = Vec::new();
            for round in 0..300u64 {
                feed.publish_round(simulator.next_round(round));
                events.extend(decisions.run_cycle());
            }
            events
        };

        assert_eq!(run(), run());
    }
}
