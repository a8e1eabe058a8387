use thiserror::Error;

use crate::types::ScaledAmount;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Liquidity reserves unavailable for bonded token")]
    MissingReserves,

    #[error("Insufficient liquidity: requested {requested} against reserve {reserve}")]
    InsufficientLiquidity { reserve: ScaledAmount, requested: ScaledAmount },

    #[error("Trade too small to price")]
    DegenerateTrade,

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Price impact {impact_percent}% exceeds maximum {max_percent}%")]
    ImpactTooHigh {
        impact_percent: rust_decimal::Decimal,
        max_percent: rust_decimal::Decimal,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Decimal error: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QuoteError>;

impl QuoteError {
    pub fn insufficient(reserve: ScaledAmount, requested: ScaledAmount) -> Self {
        Self::InsufficientLiquidity { reserve, requested }
    }
}
