//! Constant product pool (x·y=k) with the fee taken from the trader.
//!
//! `k` is fixed from the current reserves for each quote; the fee never feeds
//! back into the invariant. The trader receives less (or pays more) than the
//! pure constant-product quantity.

use tracing::trace;

use crate::pricing::TradeLegs;
use crate::types::{Currency, FeeRatio, PoolReserves, QuoteError, Result, ScaledAmount, TradeSide};

/// Quote `amount` against the pool. Which leg `amount` denominates is given by
/// `currency`.
pub fn quote(
    reserves: &PoolReserves,
    fee: FeeRatio,
    currency: Currency,
    side: TradeSide,
    amount: ScaledAmount,
) -> Result<TradeLegs> {
    let legs = match (currency, side) {
        (Currency::Btc, TradeSide::Buy) => buy_with_btc(reserves, fee, amount),
        (Currency::Btc, TradeSide::Sell) => sell_for_btc(reserves, fee, amount),
        (Currency::Token, TradeSide::Buy) => buy_exact_tokens(reserves, fee, amount),
        (Currency::Token, TradeSide::Sell) => sell_exact_tokens(reserves, fee, amount),
    }?;
    trace!(%currency, %side, amount, btc = legs.btc, token = legs.token, "pool quote");
    Ok(legs)
}

/// Spend `btc_in` msats; fee comes off the input
pub fn buy_with_btc(reserves: &PoolReserves, fee: FeeRatio, btc_in: ScaledAmount) -> Result<TradeLegs> {
    let k = reserves.invariant()?;
    let effective_btc = fee.deduct(btc_in)?;

    let new_btc = reserves
        .btc_liquidity
        .checked_add(effective_btc)
        .ok_or(QuoteError::Overflow("pool btc reserve"))?;
    let new_tokens = k
        .checked_div(new_btc)
        .ok_or(QuoteError::insufficient(reserves.btc_liquidity, effective_btc))?;
    let tokens_out = reserves
        .token_liquidity
        .checked_sub(new_tokens)
        .ok_or(QuoteError::Overflow("pool token reserve"))?;

    Ok(TradeLegs::from_btc(effective_btc, tokens_out))
}

/// Remove `btc_out` msats from the pool, grossed up by the fee; the token leg
/// is what has to be paid in
pub fn sell_for_btc(reserves: &PoolReserves, fee: FeeRatio, btc_out: ScaledAmount) -> Result<TradeLegs> {
    let k = reserves.invariant()?;
    let effective_btc = fee.gross_up(btc_out)?;
    if btc_out > reserves.btc_liquidity || effective_btc >= reserves.btc_liquidity {
        return Err(QuoteError::insufficient(reserves.btc_liquidity, effective_btc));
    }

    let new_tokens = k / (reserves.btc_liquidity - effective_btc);
    let tokens_needed = new_tokens
        .checked_sub(reserves.token_liquidity)
        .ok_or(QuoteError::Overflow("pool token reserve"))?;

    Ok(TradeLegs::from_btc(effective_btc, tokens_needed))
}

/// Buy exactly `tokens_out`; the fee is added to the cost
pub fn buy_exact_tokens(reserves: &PoolReserves, fee: FeeRatio, tokens_out: ScaledAmount) -> Result<TradeLegs> {
    if tokens_out >= reserves.token_liquidity {
        return Err(QuoteError::insufficient(reserves.token_liquidity, tokens_out));
    }
    let k = reserves.invariant()?;

    let new_btc = k / (reserves.token_liquidity - tokens_out);
    let btc_needed = new_btc
        .checked_sub(reserves.btc_liquidity)
        .ok_or(QuoteError::Overflow("pool btc reserve"))?;
    let cost = fee.gross_up(btc_needed)?;

    Ok(TradeLegs::from_token(cost, tokens_out))
}

/// Sell exactly `tokens_in`; the fee comes off the proceeds
pub fn sell_exact_tokens(reserves: &PoolReserves, fee: FeeRatio, tokens_in: ScaledAmount) -> Result<TradeLegs> {
    let k = reserves.invariant()?;

    let new_tokens = reserves
        .token_liquidity
        .checked_add(tokens_in)
        .ok_or(QuoteError::Overflow("pool token reserve"))?;
    let new_btc = k
        .checked_div(new_tokens)
        .ok_or(QuoteError::insufficient(reserves.token_liquidity, tokens_in))?;
    let gross = reserves
        .btc_liquidity
        .checked_sub(new_btc)
        .ok_or(QuoteError::Overflow("pool btc reserve"))?;
    let proceeds = fee.deduct(gross)?;

    Ok(TradeLegs::from_token(proceeds, tokens_in))
}
