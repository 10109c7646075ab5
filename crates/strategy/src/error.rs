use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("capital fraction must be finite and within (0, 1]")]
    InvalidCapitalFraction,
    #[error("max open positions must be positive")]
    InvalidMaxOpenPositions,
    #[error("minimum confidence must be finite and within [0, 1)")]
    InvalidMinConfidence,
    #[error("stop-loss percentage must be finite and within (0, 1)")]
    InvalidStopLossPct,
    #[error("take-profit percentage must be finite and positive")]
    InvalidTakeProfitPct,
}
