use rust_decimal::Decimal;
use tracing::debug;

use crate::pricing::quote_legs;
use crate::types::{PricingContext, QuoteError, Result, ScaledAmount, TradeRequest, TradeSide};

/// Relative deviation of the realised trade price from the reference price.
///
/// Buys return `(trade − reference) / reference`, sells
/// `(reference − trade) / reference`, so a worse-than-reference fill is
/// positive either way. `None` when the trade cannot be priced.
pub fn price_impact(ctx: &PricingContext, request: &TradeRequest) -> Option<Decimal> {
    match try_price_impact(ctx, request) {
        Ok(impact) => Some(impact),
        Err(e) => {
            debug!(%request, "No price impact: {}", e);
            None
        }
    }
}

/// [`price_impact`] with the reason a quote is unavailable
pub fn try_price_impact(ctx: &PricingContext, request: &TradeRequest) -> Result<Decimal> {
    let legs = quote_legs(ctx, request)?;
    let trade_price = legs.trade_price(ctx.scale_multiplier()?)?;
    if trade_price == 0 {
        return Err(QuoteError::DegenerateTrade);
    }
    impact_ratio(trade_price, ctx.reference_price, request.side)
}

fn impact_ratio(trade_price: ScaledAmount, reference: Decimal, side: TradeSide) -> Result<Decimal> {
    if reference <= Decimal::ZERO {
        return Err(QuoteError::DegenerateTrade);
    }
    let trade_price = i128::try_from(trade_price)
        .ok()
        .and_then(|p| Decimal::try_from_i128_with_scale(p, 0).ok())
        .ok_or(QuoteError::Overflow("trade price"))?;

    let deviation = match side {
        TradeSide::Buy => trade_price.checked_sub(reference),
        TradeSide::Sell => reference.checked_sub(trade_price),
    }
    .ok_or(QuoteError::Overflow("price deviation"))?;
    deviation.checked_div(reference).ok_or(QuoteError::Overflow("impact ratio"))
}
