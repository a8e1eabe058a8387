//! Exponential pre-listing bonding curve: `price(x) = a · e^(b·x)`
//!
//! Supply `x` is in whole tokens. Moving supply from `x1` to `x2` costs
//! `(a/b) · (e^(b·x2) − e^(b·x1))` satoshis.
//!
//! Transcendental functions force `f64` intermediates here. Every result is
//! pushed through an explicit floor/ceil and `abs` before it becomes a
//! [`ScaledAmount`], and nothing outside this module does float math on
//! settled amounts.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{MSATS_PER_SAT, QuoteError, Result, ScaledAmount, TOKEN_UNIT_SCALE, TradeSide};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveParameters {
    pub name: String,
    pub a: f64,
    pub b: f64,
    /// Reserved, not used by the pricing formulas
    pub c: f64,
}

impl CurveParameters {
    /// The platform's "standard" curve
    pub fn standard() -> Self {
        Self {
            name: "standard".into(),
            a: 0.11803,
            b: 0.0000002200866,
            c: 0.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.a > 0.0 && self.b > 0.0
    }

    /// Spot price in satoshis at `supply` whole tokens
    fn spot(&self, supply: f64) -> f64 {
        self.a * (self.b * supply).exp()
    }

    /// Satoshi cost of moving supply from `x1` to `x2`
    fn cost(&self, x1: f64, x2: f64) -> f64 {
        (self.a / self.b) * ((self.b * x2).exp() - (self.b * x1).exp())
    }

    /// Supply reached after `sats` are paid in starting at `x1`
    fn supply_after(&self, sats: f64, x1: f64) -> f64 {
        (1.0 / self.b) * ((self.b / self.a) * sats + (self.b * x1).exp()).ln()
    }
}

impl Default for CurveParameters {
    fn default() -> Self {
        Self::standard()
    }
}

fn whole_tokens(millitokens: ScaledAmount) -> f64 {
    millitokens as f64 / TOKEN_UNIT_SCALE as f64
}

fn settle(value: f64, context: &'static str) -> Result<ScaledAmount> {
    let magnitude = value.abs();
    if !magnitude.is_finite() || magnitude >= ScaledAmount::MAX as f64 {
        return Err(QuoteError::Overflow(context));
    }
    Ok(magnitude as ScaledAmount)
}

/// Tokens (millitokens) that spending (buy) or raising (sell) `btc_amount`
/// millisatoshis corresponds to at `current_supply` millitokens.
pub fn token_amount_for_btc(
    curve: &CurveParameters,
    btc_amount: ScaledAmount,
    current_supply: ScaledAmount,
    side: TradeSide,
) -> Result<ScaledAmount> {
    let sats = btc_amount as f64 / MSATS_PER_SAT as f64;
    let x1 = whole_tokens(current_supply);
    let x2 = curve.supply_after(sats, x1);

    let delta = if side.is_buy() { x2 - x1 } else { x1 - x2 };
    let tokens = settle((delta * TOKEN_UNIT_SCALE as f64).floor(), "curve token amount")?;
    trace!(sats, x1, x2, tokens, "curve token amount");
    Ok(tokens)
}

/// Millisatoshis paid (buy) or received (sell) for `token_amount` millitokens
/// at `current_supply` millitokens.
pub fn btc_amount_for_tokens(
    curve: &CurveParameters,
    token_amount: ScaledAmount,
    current_supply: ScaledAmount,
    side: TradeSide,
) -> Result<ScaledAmount> {
    let tokens = whole_tokens(token_amount);
    let x = whole_tokens(current_supply);

    let (x1, x2) = match side {
        TradeSide::Buy => (x, x + tokens),
        TradeSide::Sell => (x - tokens, x),
    };

    let sats = curve.cost(x1, x2);
    let msats = settle((sats * MSATS_PER_SAT as f64).ceil(), "curve btc amount")?;
    trace!(tokens, x1, x2, msats, "curve btc amount");
    Ok(msats)
}

/// Spot price in millisatoshis per whole token once `sold` millitokens are out
pub fn price_at_supply(curve: &CurveParameters, sold: ScaledAmount) -> Result<ScaledAmount> {
    let price = curve.spot(whole_tokens(sold));
    settle((price * MSATS_PER_SAT as f64).ceil(), "curve spot price")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLD: ScaledAmount = 963_485_413_186_288_939;

    #[test]
    fn test_price_at_supply() {
        let curve = CurveParameters::standard();
        assert_eq!(price_at_supply(&curve, 0).unwrap(), 119); // ceil(0.11803 * 1000)
        assert_eq!(price_at_supply(&curve, SOLD).unwrap(), 984);
    }

    #[test]
    fn test_token_amount_for_btc() {
        let curve = CurveParameters::standard();
        // 0.0099 BTC at ~984 msat/token buys roughly 909k tokens
        let tokens = token_amount_for_btc(&curve, 990_000_000, SOLD, TradeSide::Buy).unwrap();
        let whole = tokens / TOKEN_UNIT_SCALE;
        assert!((908_900..=909_000).contains(&whole), "got {}", whole);

        // Both directions solve the same integral; the sell side rounds outward
        let sell = token_amount_for_btc(&curve, 990_000_000, SOLD, TradeSide::Sell).unwrap();
        assert!(sell >= tokens && sell - tokens <= 1, "{} vs {}", sell, tokens);
    }

    #[test]
    fn test_btc_amount_for_tokens() {
        let curve = CurveParameters::standard();
        let amount = 100_000 * TOKEN_UNIT_SCALE;
        let buy = btc_amount_for_tokens(&curve, amount, SOLD, TradeSide::Buy).unwrap();
        let sell = btc_amount_for_tokens(&curve, amount, SOLD, TradeSide::Sell).unwrap();

        // Buying pushes price up, selling pulls it down
        assert!(buy > sell);
        assert!((99_470_000..=99_475_000).contains(&buy), "got {}", buy);
        assert!((97_300_000..=97_310_000).contains(&sell), "got {}", sell);
    }

    #[test]
    fn test_round_trip_is_consistent() {
        let curve = CurveParameters::standard();
        let cost = btc_amount_for_tokens(&curve, 50 * TOKEN_UNIT_SCALE, 0, TradeSide::Buy).unwrap();
        let tokens = token_amount_for_btc(&curve, cost, 0, TradeSide::Buy).unwrap();
        // ceil on cost, floor on tokens: within a millitoken-scale rounding band
        let diff = tokens.abs_diff(50 * TOKEN_UNIT_SCALE);
        assert!(diff < TOKEN_UNIT_SCALE / 100, "diff {}", diff);
    }

    #[test]
    fn test_non_finite_is_an_error() {
        let curve = CurveParameters { name: "steep".into(), a: 1.0, b: 1.0, c: 0.0 };
        let result = btc_amount_for_tokens(&curve, TOKEN_UNIT_SCALE, 10_000 * TOKEN_UNIT_SCALE, TradeSide::Buy);
        assert!(matches!(result, Err(QuoteError::Overflow(_))));
    }

    #[test]
    fn test_finite_but_unrepresentable_is_an_error() {
        let curve = CurveParameters { name: "steep".into(), a: 1e40, b: 1.0, c: 0.0 };
        assert!(matches!(price_at_supply(&curve, 0), Err(QuoteError::Overflow(_))));
        let result = btc_amount_for_tokens(&curve, TOKEN_UNIT_SCALE, 0, TradeSide::Buy);
        assert!(matches!(result, Err(QuoteError::Overflow(_))));

        assert!(matches!(settle(3.5e38, "test"), Err(QuoteError::Overflow(_))));
        assert!(matches!(settle(-3.5e38, "test"), Err(QuoteError::Overflow(_))));
        assert_eq!(settle(-12.0, "test").unwrap(), 12);
    }
}
