use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::types::{BTC_DECIMAL_PLACES, MAX_SCALE_PLACES, QuoteError, Result, ScaledAmount};

/// Basis points in 100%
const BPS_SCALE: ScaledAmount = 10_000;

/// Parse a human-entered decimal string into a fixed-point integer with
/// `places` fractional digits.
///
/// Fails soft: anything that is not a plain non-negative decimal (or does not
/// fit) scales to zero. Extra fractional digits are truncated, never rounded.
pub fn scale_decimal(text: &str, places: u32) -> ScaledAmount {
    match parse_scaled(text, places) {
        Ok(value) => value,
        Err(e) => {
            debug!("Amount {:?} scaled to zero: {}", text, e);
            0
        }
    }
}

/// [`scale_decimal`] at the base-asset precision
pub fn scale_btc(text: &str) -> ScaledAmount {
    scale_decimal(text, BTC_DECIMAL_PLACES)
}

/// Strict form of [`scale_decimal`] that reports why the text was rejected
pub fn parse_scaled(text: &str, places: u32) -> Result<ScaledAmount> {
    if places > MAX_SCALE_PLACES {
        return Err(QuoteError::Overflow("decimal scaling"));
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let (integer_part, fraction_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(integer_part)
        || !is_digits(fraction_part)
        || (integer_part.is_empty() && fraction_part.is_empty())
    {
        return Err(QuoteError::InvalidAmount(text.to_string()));
    }

    let places = places as usize;
    let fraction: String = fraction_part.chars().take(places).collect();

    let integer = integer_part.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };

    let digits = format!("{}{:0<width$}", integer, fraction, width = places);
    digits
        .parse::<ScaledAmount>()
        .map_err(|_| QuoteError::Overflow("decimal scaling"))
}

/// `amount · round(percent · 100) / 10000`: percent kept to two decimal places,
/// result floored.
pub fn percentage_of(amount: ScaledAmount, percent: Decimal) -> Result<ScaledAmount> {
    if percent.is_sign_negative() {
        return Err(QuoteError::Parse(format!("negative percentage: {}", percent)));
    }

    let bps = percent
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(QuoteError::Overflow("percentage"))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u128()
        .ok_or(QuoteError::Overflow("percentage"))?;

    amount
        .checked_mul(bps)
        .map(|v| v / BPS_SCALE)
        .ok_or(QuoteError::Overflow("percentage"))
}

/// Minimum acceptable output once `slippage_tolerance` percent is allowed off
/// `expected_output`
pub fn apply_slippage_tolerance(
    expected_output: ScaledAmount,
    slippage_tolerance: Decimal,
) -> Result<ScaledAmount> {
    let allowance = percentage_of(expected_output, slippage_tolerance)?;
    Ok(expected_output.saturating_sub(allowance))
}
