use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LedgerError {
    #[error("insufficient cash: need {required:.2}, have {available:.2}")]
    InsufficientCash { required: f64, available: f64 },
    #[error("insufficient quantity: asked to sell {requested}, holding {held}")]
    InsufficientQuantity { requested: u64, held: u64 },
    #[error("price must be finite and positive")]
    InvalidPrice,
    #[error("quantity must be positive")]
    InvalidQuantity,
    #[error("initial capital must be finite and positive")]
    InvalidCapital,
    #[error("fee must be finite and non-negative")]
    InvalidFee,
}
