use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    pub volume: u64,
    pub ts_ms: u64,
}

impl Tick {
    /// Quotes `price` with a symmetric half spread of `half_spread_bps` on each side.
    pub fn quote(
        symbol: impl Into<String>,
        price: f64,
        half_spread_bps: f64,
        volume: u64,
        ts_ms: u64,
    ) -> Self {
        let half_spread = half_spread_bps / 10_000.0;
        Self {
            symbol: symbol.into(),
            bid: price * (1.0 - half_spread),
            ask: price * (1.0 + half_spread),
            last: price,
            volume,
            ts_ms,
        }
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }
}

pub fn now_ms() -> u64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}
