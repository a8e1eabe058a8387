use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::curve::CurveParameters;
use crate::types::{FeeRatio, QuoteError, Result, ScaledAmount, amount_serde, common, pow10};
use crate::utils::config::PricingConfig;

// ============================================================================
// Listing record
// ============================================================================

/// The slice of a token-listing record that pricing needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ticker: Option<String>,
    /// Quoted spot price, millisatoshis per whole token
    pub price: Decimal,
    /// Cumulative millitokens sold on the curve
    #[serde(with = "amount_serde")]
    pub sold: ScaledAmount,
    pub bonded: bool,
    #[serde(default = "default_trading")]
    pub trading: bool,
    pub decimals: u32,
    pub divisibility: u32,
    #[serde(default, with = "amount_serde::option")]
    pub btc_liquidity: Option<ScaledAmount>,
    #[serde(default, with = "amount_serde::option")]
    pub token_liquidity: Option<ScaledAmount>,
}

fn default_trading() -> bool {
    true
}

impl TokenSnapshot {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn symbol(&self) -> &str {
        self.ticker.as_deref().unwrap_or(&self.name)
    }

    /// Reserves are known only when both sides are reported
    pub fn reserves(&self) -> Option<PoolReserves> {
        match (self.btc_liquidity, self.token_liquidity) {
            (Some(btc), Some(token)) => Some(PoolReserves::new(btc, token)),
            _ => None,
        }
    }

    pub fn pricing_context(&self, pricing: &PricingConfig) -> PricingContext {
        PricingContext {
            bonded: self.bonded,
            sold: self.sold,
            reserves: self.reserves(),
            reference_price: self.price,
            decimals: self.decimals,
            divisibility: self.divisibility,
            curve: pricing.curve.clone(),
            pool_fee: pricing.pool_fee,
            curve_fee: pricing.curve_fee,
        }
    }
}

// ============================================================================
// Pool reserves
// ============================================================================

/// Constant-product reserves; `btc_liquidity · token_liquidity` is the invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    #[serde(with = "amount_serde")]
    pub btc_liquidity: ScaledAmount,
    #[serde(with = "amount_serde")]
    pub token_liquidity: ScaledAmount,
}

impl PoolReserves {
    pub fn new(btc_liquidity: ScaledAmount, token_liquidity: ScaledAmount) -> Self {
        Self { btc_liquidity, token_liquidity }
    }

    /// `k = btc · token`
    pub fn invariant(&self) -> Result<ScaledAmount> {
        self.btc_liquidity
            .checked_mul(self.token_liquidity)
            .ok_or(QuoteError::Overflow("pool invariant"))
    }
}

// ============================================================================
// Pricing context
// ============================================================================

/// Everything needed to quote one trade against one token. Built per call.
#[derive(Debug, Clone)]
pub struct PricingContext {
    /// Pool regime when set, bonding curve otherwise
    pub bonded: bool,
    pub sold: ScaledAmount,
    /// `None` means the pool state is unknown and pool quotes fail
    pub reserves: Option<PoolReserves>,
    pub reference_price: Decimal,
    pub decimals: u32,
    pub divisibility: u32,
    pub curve: CurveParameters,
    pub pool_fee: FeeRatio,
    pub curve_fee: FeeRatio,
}

impl PricingContext {
    /// Bonded token trading against pool reserves, default constants
    pub fn bonded(
        reserves: Option<PoolReserves>,
        reference_price: Decimal,
        decimals: u32,
        divisibility: u32,
    ) -> Self {
        Self::with_pricing(&PricingConfig::default(), true, 0, reserves, reference_price, decimals, divisibility)
    }

    /// Pre-listing token trading on the bonding curve, default constants
    pub fn on_curve(
        sold: ScaledAmount,
        reference_price: Decimal,
        decimals: u32,
        divisibility: u32,
    ) -> Self {
        Self::with_pricing(&PricingConfig::default(), false, sold, None, reference_price, decimals, divisibility)
    }

    pub fn with_pricing(
        pricing: &PricingConfig,
        bonded: bool,
        sold: ScaledAmount,
        reserves: Option<PoolReserves>,
        reference_price: Decimal,
        decimals: u32,
        divisibility: u32,
    ) -> Self {
        Self {
            bonded,
            sold,
            reserves,
            reference_price,
            decimals,
            divisibility,
            curve: pricing.curve.clone(),
            pool_fee: pricing.pool_fee,
            curve_fee: pricing.curve_fee,
        }
    }

    /// Fractional digits of a token amount
    pub fn token_places(&self) -> Result<u32> {
        common::token_places(self.decimals, self.divisibility)
    }

    /// `10^(decimals + divisibility)`: base-asset units per whole token
    pub fn scale_multiplier(&self) -> Result<ScaledAmount> {
        pow10(self.token_places()?).ok_or(QuoteError::Overflow("token scale"))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_snapshot_from_listing_json() {
        let payload = json!({
            "id": "2jjj",
            "name": "ODINDOG",
            "ticker": "ODINDOG",
            "price": 330189,
            "sold": "1680000000000000000",
            "bonded": true,
            "decimals": 3,
            "divisibility": 8,
            "btc_liquidity": 302286688964u64,
            "token_liquidity": "91549588409635445",
            "image": "ignored.webp"
        });
        let token: TokenSnapshot = serde_json::from_value(payload).unwrap();

        assert_eq!(token.symbol(), "ODINDOG");
        assert_eq!(token.price, dec!(330189));
        assert_eq!(token.sold, 1_680_000_000_000_000_000);
        assert!(token.trading);
        assert_eq!(
            token.reserves(),
            Some(PoolReserves::new(302_286_688_964, 91_549_588_409_635_445))
        );

        let ctx = token.pricing_context(&PricingConfig::default());
        assert!(ctx.bonded);
        assert_eq!(ctx.token_places().unwrap(), 11);
        assert_eq!(ctx.scale_multiplier().unwrap(), 100_000_000_000);
        assert_eq!(ctx.curve, CurveParameters::standard());
    }

    #[test]
    fn test_null_liquidity_means_no_reserves() {
        let token = TokenSnapshot::from_json(
            r#"{"id":"x","name":"X","price":1,"sold":0,"bonded":true,
                "decimals":3,"divisibility":8,"btc_liquidity":null,"token_liquidity":"5"}"#,
        )
        .unwrap();
        assert_eq!(token.reserves(), None);
        assert_eq!(token.symbol(), "X");
    }

    #[test]
    fn test_rejects_bad_amounts() {
        let negative = TokenSnapshot::from_json(
            r#"{"id":"x","name":"X","price":1,"sold":-5,"bonded":false,"decimals":3,"divisibility":8}"#,
        );
        assert!(matches!(negative, Err(QuoteError::Serialization(_))));

        let fractional = TokenSnapshot::from_json(
            r#"{"id":"x","name":"X","price":1,"sold":1.5,"bonded":false,"decimals":3,"divisibility":8}"#,
        );
        assert!(fractional.is_err());
    }

    #[test]
    fn test_amounts_serialize_as_strings() {
        let reserves = PoolReserves::new(302_286_688_964, 91_549_588_409_635_445);
        let value = serde_json::to_value(reserves).unwrap();
        assert_eq!(value["token_liquidity"], json!("91549588409635445"));
        assert_eq!(reserves.invariant().unwrap(), 302_286_688_964u128 * 91_549_588_409_635_445u128);
    }

    #[test]
    fn test_scale_multiplier_overflow() {
        let ctx = PricingContext::on_curve(0, dec!(1), 30, 10);
        assert!(matches!(ctx.scale_multiplier(), Err(QuoteError::Overflow(_))));

        let ctx = PricingContext::on_curve(0, dec!(1), u32::MAX, 1);
        assert!(matches!(ctx.token_places(), Err(QuoteError::Overflow(_))));
        assert!(matches!(ctx.scale_multiplier(), Err(QuoteError::Overflow(_))));
    }
}
