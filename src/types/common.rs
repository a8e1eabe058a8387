use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{QuoteError, Result};

/// Quantity in the smallest indivisible unit (millisatoshis or scaled token units).
pub type ScaledAmount = u128;

/// Fractional digits of a base-asset amount (millisatoshi-equivalent scale).
pub const BTC_DECIMAL_PLACES: u32 = 11;

/// Millitokens per whole token on the bonding curve.
pub const TOKEN_UNIT_SCALE: ScaledAmount = 100_000_000_000;

pub const MSATS_PER_SAT: ScaledAmount = 1_000;

/// `10^places`, or `None` when it does not fit.
pub fn pow10(places: u32) -> Option<ScaledAmount> {
    10u128.checked_pow(places)
}

/// Most fractional digits a [`ScaledAmount`] can carry (`10^38 < u128::MAX`).
pub const MAX_SCALE_PLACES: u32 = 38;

/// Fractional digits of a token amount: `decimals + divisibility`, bounded by
/// [`MAX_SCALE_PLACES`].
pub fn token_places(decimals: u32, divisibility: u32) -> Result<u32> {
    decimals
        .checked_add(divisibility)
        .filter(|places| *places <= MAX_SCALE_PLACES)
        .ok_or(QuoteError::Overflow("token scale"))
}

// ============================================================================
// Trade direction / denomination
// ============================================================================

/// Denomination of the amount a trader typed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Btc,
    Token,
}

impl Currency {
    pub fn name(&self) -> &'static str {
        match self {
            Currency::Btc => "btc",
            Currency::Token => "token",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Currency {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "btc" => Ok(Currency::Btc),
            "token" => Ok(Currency::Token),
            _ => Err(QuoteError::Parse(format!("Unknown currency: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy { TradeSide::Buy } else { TradeSide::Sell }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, TradeSide::Buy)
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for TradeSide {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            _ => Err(QuoteError::Parse(format!("Unknown trade side: {}", s))),
        }
    }
}

// ============================================================================
// Fees
// ============================================================================

/// Fee expressed as the fraction of an amount the trader keeps (995/1000 = 0.5% fee)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRatio {
    pub numerator: u64,
    pub denominator: u64,
}

impl FeeRatio {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self { numerator, denominator }
    }

    /// Constant-product pool fee: 0.5%
    pub const POOL: FeeRatio = FeeRatio::new(995, 1000);

    /// Bonding curve trading fee: 1%
    pub const CURVE: FeeRatio = FeeRatio::new(99, 100);

    /// `amount · numerator / denominator`, floored
    pub fn deduct(&self, amount: ScaledAmount) -> Result<ScaledAmount> {
        amount
            .checked_mul(self.numerator.into())
            .and_then(|v| v.checked_div(self.denominator.into()))
            .ok_or(QuoteError::Overflow("fee deduction"))
    }

    /// `amount · denominator / numerator`, floored
    pub fn gross_up(&self, amount: ScaledAmount) -> Result<ScaledAmount> {
        amount
            .checked_mul(self.denominator.into())
            .and_then(|v| v.checked_div(self.numerator.into()))
            .ok_or(QuoteError::Overflow("fee gross-up"))
    }

    pub fn is_valid(&self) -> bool {
        self.numerator > 0 && self.denominator > 0 && self.numerator <= self.denominator
    }
}
