mod breakout;
mod error;
mod kind;
mod mean_reversion;
pub mod risk;
mod signal;
mod sizing;
pub mod stats;
mod trend_following;

pub use breakout::{Breakout, BREAKOUT};
pub use error::StrategyError;
pub use kind::StrategyKind;
pub use mean_reversion::{MeanReversion, MEAN_REVERSION};
pub use risk::{ExitReason, ExitRule, EXIT_TAG};
pub use signal::{Action, Signal};
pub use sizing::SizingConfig;
pub use trend_following::{TrendFollowing, TREND_FOLLOWING};
