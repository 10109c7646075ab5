use std::collections::HashMap;

use parking_lot::RwLock;

use crate::history::PriceHistory;
use crate::tick::Tick;

#[derive(Debug, Default)]
struct FeedState {
    latest: HashMap<String, Tick>,
    history: HashMap<String, PriceHistory>,
    rounds: u64,
}

/// Latest tick and bounded price history per symbol.
///
/// A whole round of ticks is published under one write lock, so readers see
/// either the previous round or the next one for every symbol, never a mix of
/// a new tick with an old history or a half-written quote.
#[derive(Debug)]
pub struct PriceFeed {
    history_capacity: usize,
    state: RwLock<FeedState>,
}

impl PriceFeed {
    pub fn new(history_capacity: usize) -> Self {
        assert!(history_capacity > 0, "history capacity must be positive");

        Self {
            history_capacity,
            state: RwLock::new(FeedState::default()),
        }
    }

    pub fn publish_round(&self, ticks: Vec<Tick>) {
        let mut state = self.state.write();
        let capacity = self.history_capacity;

        for tick in ticks {
            state
                .history
                .entry(tick.symbol.clone())
                .or_insert_with(|| PriceHistory::with_capacity(capacity))
                .push(tick.last);
            state.latest.insert(tick.symbol.clone(), tick);
        }
        state.rounds += 1;
    }

    pub fn tick(&self, symbol: &str) -> Option<Tick> {
        self.state.read().latest.get(symbol).cloned()
    }

    pub fn history(&self, symbol: &str) -> Vec<f64> {
        self.state
            .read()
            .history
            .get(symbol)
            .map(PriceHistory::to_vec)
            .unwrap_or_default()
    }

    /// Tick and history taken under the same read lock.
    pub fn snapshot(&self, symbol: &str) -> Option<(Tick, Vec<f64>)> {
        let state = self.state.read();
        let tick = state.latest.get(symbol)?.clone();
        let history = state
            .history
            .get(symbol)
            .map(PriceHistory::to_vec)
            .unwrap_or_default();
        Some((tick, history))
    }

    pub fn mid_prices(&self) -> HashMap<String, f64> {
        self.state
            .read()
            .latest
            .iter()
            .map(|(symbol, tick)| (symbol.clone(), tick.mid()))
            .collect()
    }

    pub fn rounds_published(&self) -> u64 {
        self.state.read().rounds
    }
}
