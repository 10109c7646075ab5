use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::config::SimConfig;
use crate::tick::Tick;

/// Hidden random-walk state of one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolWalk {
    pub price: f64,
    pub volatility: f64,
    pub drift: f64,
}

/// Seeded generator of synthetic ticks for a fixed symbol universe.
///
/// Each call to [`MarketSimulator::next_round`] advances every symbol once:
/// `price *= 1 + N(0, volatility) * shock_scale + drift`, then quotes the new
/// price with the configured half spread. With probability
/// `1 / regime_shift_odds` a symbol redraws its drift afterwards.
#[derive(Debug, Clone)]
pub struct MarketSimulator {
    rng: StdRng,
    config: SimConfig,
    symbols: Vec<String>,
    walks: Vec<SymbolWalk>,
}

impl MarketSimulator {
    pub fn new(symbols: Vec<String>, config: SimConfig, seed: u64) -> Self {
        Self::with_rng(symbols, config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(symbols: Vec<String>, config: SimConfig) -> Self {
        Self::with_rng(symbols, config, StdRng::from_entropy())
    }

    fn with_rng(symbols: Vec<String>, config: SimConfig, mut rng: StdRng) -> Self {
        assert!(
            valid_range(&config.start_price) && config.start_price.start > 0.0,
            "start_price range must be finite, positive and non-empty"
        );
        assert!(
            valid_range(&config.volatility) && config.volatility.start >= 0.0,
            "volatility range must be finite, non-negative and non-empty"
        );
        assert!(valid_range(&config.drift), "drift range must be finite and non-empty");
        assert!(!config.volume.is_empty(), "volume range must be non-empty");
        assert!(config.regime_shift_odds > 0, "regime_shift_odds must be positive");

        let walks = symbols
            .iter()
            .map(|_| SymbolWalk {
                price: rng.gen_range(config.start_price.clone()),
                volatility: rng.gen_range(config.volatility.clone()),
                drift: rng.gen_range(config.drift.clone()),
            })
            .collect();

        Self {
            rng,
            config,
            symbols,
            walks,
        }
    }

    pub fn walk(&self, symbol: &str) -> Option<SymbolWalk> {
        self.symbols
            .iter()
            .position(|candidate| candidate == symbol)
            .map(|index| self.walks[index])
    }

    pub fn next_round(&mut self, ts_ms: u64) -> Vec<Tick> {
        let mut ticks = Vec::with_capacity(self.symbols.len());

        for (symbol, walk) in self.symbols.iter().zip(self.walks.iter_mut()) {
            let shock = Normal::new(0.0, walk.volatility)
                .map(|normal| normal.sample(&mut self.rng))
                .unwrap_or(0.0)
                * self.config.shock_scale;
            walk.price *= 1.0 + shock + walk.drift;

            let volume = self.rng.gen_range(self.config.volume.clone());
            ticks.push(Tick::quote(
                symbol.as_str(),
                walk.price,
                self.config.half_spread_bps,
                volume,
                ts_ms,
            ));

            if self.rng.gen_ratio(1, self.config.regime_shift_odds) {
                walk.drift = self.rng.gen_range(self.config.drift.clone());
            }
        }

        ticks
    }
}

fn valid_range(range: &std::ops::Range<f64>) -> bool {
    range.start.is_finite() && range.end.is_finite() && range.start < range.end
}
