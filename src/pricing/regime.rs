use tracing::debug;

use crate::curve::{btc_amount_for_tokens, token_amount_for_btc};
use crate::pricing::pool;
use crate::types::{BTC_DECIMAL_PLACES, Currency, PricingContext, QuoteError, Result, ScaledAmount, TradeRequest};
use crate::utils::math::parse_scaled;

/// The two sides of a priced trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeLegs {
    /// Which leg the trader specified
    pub input: Currency,
    /// Base-asset leg, millisatoshis
    pub btc: ScaledAmount,
    /// Token leg, scaled token units
    pub token: ScaledAmount,
}

impl TradeLegs {
    pub fn from_btc(btc: ScaledAmount, token: ScaledAmount) -> Self {
        Self { input: Currency::Btc, btc, token }
    }

    pub fn from_token(btc: ScaledAmount, token: ScaledAmount) -> Self {
        Self { input: Currency::Token, btc, token }
    }

    /// The leg the trader did not specify
    pub fn counter_amount(&self) -> ScaledAmount {
        match self.input {
            Currency::Btc => self.token,
            Currency::Token => self.btc,
        }
    }

    /// Realised price: `btc · multiplier / token`, floored
    pub fn trade_price(&self, multiplier: ScaledAmount) -> Result<ScaledAmount> {
        if self.token == 0 {
            return Err(QuoteError::DegenerateTrade);
        }
        self.btc
            .checked_mul(multiplier)
            .map(|v| v / self.token)
            .ok_or(QuoteError::Overflow("trade price"))
    }
}

/// Parse the request amount at the precision of its denomination
pub fn request_amount(ctx: &PricingContext, request: &TradeRequest) -> Result<ScaledAmount> {
    let places = match request.currency {
        Currency::Btc => BTC_DECIMAL_PLACES,
        Currency::Token => ctx.token_places()?,
    };
    let amount = parse_scaled(&request.amount, places)?;
    if amount == 0 {
        return Err(QuoteError::InvalidAmount(request.amount.clone()));
    }
    Ok(amount)
}

/// Price `request` under whichever regime `ctx` is in: the pool once bonded,
/// the bonding curve before. Curve trades carry the curve fee on top.
pub fn quote_legs(ctx: &PricingContext, request: &TradeRequest) -> Result<TradeLegs> {
    let amount = request_amount(ctx, request)?;

    if ctx.bonded {
        let reserves = ctx.reserves.as_ref().ok_or(QuoteError::MissingReserves)?;
        return pool::quote(reserves, ctx.pool_fee, request.currency, request.side, amount);
    }

    let legs = match request.currency {
        Currency::Btc => {
            // Fee comes off the spend before it reaches the curve; the price
            // is still measured against the full amount.
            let net = ctx.curve_fee.deduct(amount)?;
            let tokens = token_amount_for_btc(&ctx.curve, net, ctx.sold, request.side)?;
            TradeLegs::from_btc(amount, tokens)
        }
        Currency::Token => {
            let gross = btc_amount_for_tokens(&ctx.curve, amount, ctx.sold, request.side)?;
            TradeLegs::from_token(ctx.curve_fee.deduct(gross)?, amount)
        }
    };
    debug!(curve = %ctx.curve.name, %request, btc = legs.btc, token = legs.token, "curve quote");
    Ok(legs)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::types::PoolReserves;

    fn bonded() -> PricingContext {
        PricingContext::bonded(
            Some(PoolReserves::new(302_286_688_964, 91_549_588_409_635_445)),
            dec!(330189),
            3,
            8,
        )
    }

    fn unbonded() -> PricingContext {
        PricingContext::on_curve(963_485_413_186_288_939, dec!(984), 3, 8)
    }

    #[test]
    fn test_trade_price() {
        let legs = TradeLegs::from_btc(99_500_000_000, 22_671_691_962_336_034);
        assert_eq!(legs.trade_price(100_000_000_000).unwrap(), 438_873);

        let empty = TradeLegs::from_btc(10, 0);
        assert!(matches!(empty.trade_price(1), Err(QuoteError::DegenerateTrade)));
    }

    #[test]
    fn test_request_amount_precision() {
        let mut ctx = bonded();
        ctx.decimals = 2;
        ctx.divisibility = 2;
        assert_eq!(request_amount(&ctx, &TradeRequest::buy(Currency::Token, "1.23456")).unwrap(), 12_345);
        assert_eq!(request_amount(&ctx, &TradeRequest::buy(Currency::Btc, "1")).unwrap(), 100_000_000_000);
        assert!(matches!(
            request_amount(&ctx, &TradeRequest::buy(Currency::Btc, "0.000000000001")),
            Err(QuoteError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_unrepresentable_token_precision() {
        let mut ctx = bonded();
        ctx.decimals = u32::MAX;
        ctx.divisibility = 1;
        assert!(matches!(
            quote_legs(&ctx, &TradeRequest::buy(Currency::Token, "1")),
            Err(QuoteError::Overflow(_))
        ));

        // Rejected before the amount is padded out to that many digits
        ctx.decimals = 2_000_000_000;
        ctx.divisibility = 0;
        assert!(matches!(
            request_amount(&ctx, &TradeRequest::sell(Currency::Token, "1")),
            Err(QuoteError::Overflow(_))
        ));
    }

    #[test]
    fn test_bonded_uses_pool() {
        let legs = quote_legs(&bonded(), &TradeRequest::buy(Currency::Btc, "1")).unwrap();
        assert_eq!(legs, TradeLegs::from_btc(99_500_000_000, 22_671_691_962_336_034));
    }

    #[test]
    fn test_bonded_without_reserves() {
        let mut ctx = bonded();
        ctx.reserves = None;
        assert!(matches!(
            quote_legs(&ctx, &TradeRequest::buy(Currency::Btc, "1")),
            Err(QuoteError::MissingReserves)
        ));
    }

    #[test]
    fn test_unbonded_uses_curve_with_fee() {
        let legs = quote_legs(&unbonded(), &TradeRequest::buy(Currency::Btc, "0.01")).unwrap();
        assert_eq!(legs.btc, 1_000_000_000);
        assert_eq!(legs.token / 100_000_000_000, 908_981);

        let legs = quote_legs(&unbonded(), &TradeRequest::sell(Currency::Token, "100000")).unwrap();
        assert_eq!(legs.token, 10_000_000_000_000_000);
        assert!((96_330_000..=96_340_000).contains(&legs.btc), "got {}", legs.btc);
    }
}
