use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::types::{
    BTC_DECIMAL_PLACES, Currency, QuoteError, Result, ScaledAmount, TokenSnapshot, TradeSide,
    amount_serde, token_places,
};
use crate::utils::math::parse_scaled;

/// Scale applied to the allowed slippage fraction in a slippage guard
pub const SLIPPAGE_TOLERANCE_SCALE: u64 = 100_000;

/// What the trader asked for: an amount, its denomination, and a direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub currency: Currency,
    pub amount: String,
    pub side: TradeSide,
}

impl TradeRequest {
    pub fn new(currency: Currency, amount: impl Into<String>, side: TradeSide) -> Self {
        Self {
            currency,
            amount: amount.into(),
            side,
        }
    }

    pub fn buy(currency: Currency, amount: impl Into<String>) -> Self {
        Self::new(currency, amount, TradeSide::Buy)
    }

    pub fn sell(currency: Currency, amount: impl Into<String>) -> Self {
        Self::new(currency, amount, TradeSide::Sell)
    }

    pub fn is_buy(&self) -> bool {
        self.side.is_buy()
    }
}

impl fmt::Display for TradeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.side, self.amount.trim(), self.currency)
    }
}

// ============================================================================
// Impact classification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ImpactLevel::Low => "✅ Low",
            ImpactLevel::Medium => "⚡ Medium",
            ImpactLevel::High => "⚠️ High",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Order payload
// ============================================================================

/// Reference price plus scaled tolerance the settlement side enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageGuard {
    pub expected_price: Decimal,
    pub tolerance: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSettings {
    pub slippage: Option<SlippageGuard>,
}

impl TradeSettings {
    /// Guard allowing `impact + user_slippage`, scaled by [`SLIPPAGE_TOLERANCE_SCALE`]
    /// and floored. No guard without a reference price or a slippage allowance,
    /// nor when the scaled tolerance does not fit a `u64`.
    pub fn with_slippage(
        expected_price: Decimal,
        impact: Option<Decimal>,
        user_slippage: Decimal,
    ) -> Self {
        if expected_price.is_zero() || user_slippage.is_zero() {
            return Self::default();
        }

        let tolerance = impact
            .unwrap_or(Decimal::ZERO)
            .checked_add(user_slippage)
            .and_then(|allowed| allowed.checked_mul(Decimal::from(SLIPPAGE_TOLERANCE_SCALE)))
            .and_then(|scaled| scaled.floor().to_u64());
        let Some(tolerance) = tolerance else {
            debug!(?impact, %user_slippage, "Slippage tolerance out of range, no guard");
            return Self::default();
        };

        Self {
            slippage: Some(SlippageGuard {
                expected_price,
                tolerance,
            }),
        }
    }
}

/// Order amount, tagged with its denomination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAmount {
    Btc(#[serde(with = "amount_serde")] ScaledAmount),
    Token(#[serde(with = "amount_serde")] ScaledAmount),
}

impl TradeAmount {
    pub fn value(&self) -> ScaledAmount {
        match self {
            TradeAmount::Btc(v) | TradeAmount::Token(v) => *v,
        }
    }
}

/// Trade order as handed to the settlement side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub token_id: String,
    pub side: TradeSide,
    pub amount: TradeAmount,
    pub settings: TradeSettings,
}

impl TradeOrder {
    pub fn new(token: &TokenSnapshot, request: &TradeRequest, settings: TradeSettings) -> Result<Self> {
        let amount = match request.currency {
            Currency::Btc => TradeAmount::Btc(parse_scaled(&request.amount, BTC_DECIMAL_PLACES)?),
            Currency::Token => TradeAmount::Token(parse_scaled(
                &request.amount,
                token_places(token.decimals, token.divisibility)?,
            )?),
        };
        if amount.value() == 0 {
            return Err(QuoteError::InvalidAmount(request.amount.clone()));
        }

        Ok(Self {
            token_id: token.id.clone(),
            side: request.side,
            amount,
            settings,
        })
    }
}

// ============================================================================
// Quote
// ============================================================================

/// Both quote figures for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeQuote {
    pub request: TradeRequest,
    /// Signed fraction; `None` when the trade cannot be priced
    pub price_impact: Option<Decimal>,
    pub impact_level: Option<ImpactLevel>,
    /// Counter-asset amount; zero when the trade cannot be priced
    #[serde(with = "amount_serde")]
    pub minimum_received: ScaledAmount,
    /// `minimum_received` less the configured slippage tolerance
    #[serde(with = "amount_serde")]
    pub minimum_output: ScaledAmount,
    pub settings: TradeSettings,
}

impl TradeQuote {
    /// `None` when unpriced or when the percentage does not fit a `Decimal`
    pub fn impact_percent(&self) -> Option<Decimal> {
        self.price_impact
            .and_then(|impact| impact.checked_mul(Decimal::ONE_HUNDRED))
    }

    pub fn is_priced(&self) -> bool {
        self.price_impact.is_some()
    }
}

impl fmt::Display for TradeQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.price_impact, self.impact_level) {
            (Some(impact), Some(level)) => {
                write!(f, "{}: impact {} ", self.request, level)?;
                match self.impact_percent() {
                    Some(percent) => write!(f, "{:.2}%", percent)?,
                    None => write!(f, "ratio {}", impact)?,
                }
                write!(f, ", minimum received {}", self.minimum_received)
            }
            _ => write!(f, "{}: no quote available", self.request),
        }
    }
}
