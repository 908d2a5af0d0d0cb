use horrocard_common::{AssetUnit, KeyHash, Shortfall};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error("No signing key for key hash {0}")]
    MissingKey(KeyHash),

    #[error("Input {0} is not locked by a payment key and cannot be signed")]
    UnsupportedInput(String),

    #[error("Signature does not verify for key hash {0}")]
    BadSignature(KeyHash),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxBuilderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient funds: {unit} requested {requested}, available {available}")]
    InsufficientFunds {
        unit: AssetUnit,
        requested: u64,
        available: u64,
    },

    #[error("Change does not fit in outputs: value of {size} bytes, max {max}")]
    ChangeTooLarge { size: u64, max: u64 },

    #[error("Transaction size {size} exceeds maximum {max}")]
    MaxSizeExceeded { size: u64, max: u64 },

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("Encoding failed: {0}")]
    Codec(String),
}

impl TxBuilderError {
    pub(crate) fn codec(error: anyhow::Error) -> Self {
        Self::Codec(format!("{error:#}"))
    }

    pub(crate) fn overflow(what: &str) -> Self {
        Self::InvalidInput(format!("Arithmetic overflow in {what}"))
    }
}

impl From<Shortfall> for TxBuilderError {
    fn from(shortfall: Shortfall) -> Self {
        Self::InsufficientFunds {
            unit: shortfall.unit,
            requested: shortfall.required,
            available: shortfall.available,
        }
    }
}
