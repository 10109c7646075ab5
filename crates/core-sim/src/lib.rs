mod config;
mod error;
mod feed;
mod fills;
mod generators;
mod history;
mod ledger;
mod position;
mod state;
mod summary;
mod tick;
pub mod universe;

pub use config::SimConfig;
pub use error::LedgerError;
pub use feed::PriceFeed;
pub use fills::Fill;
pub use generators::{MarketSimulator, SymbolWalk};
pub use history::PriceHistory;
pub use ledger::{ExecutionLedger, PriceMap};
pub use position::{Position, Side, Trade};
pub use summary::{LedgerSummary, OpenPositionMark, StatusSnapshot};
pub use tick::{now_ms, Tick};
