use tracing::debug;

use crate::pricing::quote_legs;
use crate::types::{PricingContext, Result, ScaledAmount, TradeRequest};

/// Counter-asset amount the trade yields, for a minimum-output guard.
///
/// Zero when the trade cannot be priced. For a sell denominated in BTC this is
/// the token amount that has to go in.
pub fn minimum_received(ctx: &PricingContext, request: &TradeRequest) -> ScaledAmount {
    match try_minimum_received(ctx, request) {
        Ok(amount) => amount,
        Err(e) => {
            debug!(%request, "Minimum received floored to zero: {}", e);
            0
        }
    }
}

pub fn try_minimum_received(ctx: &PricingContext, request: &TradeRequest) -> Result<ScaledAmount> {
    Ok(quote_legs(ctx, request)?.counter_amount())
}
