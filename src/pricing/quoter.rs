use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::pricing::{minimum_received, price_impact};
use crate::types::{PricingContext, QuoteError, ScaledAmount, TradeQuote, TradeRequest, TradeSettings};
use crate::utils::config::QuoteConfig;
use crate::utils::math::apply_slippage_tolerance;

pub trait Quoter: Send + Sync {
    fn price_impact(&self, ctx: &PricingContext, request: &TradeRequest) -> Option<Decimal>;

    fn minimum_received(&self, ctx: &PricingContext, request: &TradeRequest) -> ScaledAmount;

    /// Impact, its classification, minimum received and the slippage guard
    fn quote(&self, ctx: &PricingContext, request: &TradeRequest) -> TradeQuote;
}

pub struct DefaultQuoter {
    config: QuoteConfig,
}

impl DefaultQuoter {
    pub fn new(config: QuoteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }
}

impl Default for DefaultQuoter {
    fn default() -> Self {
        Self::new(QuoteConfig::default())
    }
}

impl Quoter for DefaultQuoter {
    fn price_impact(&self, ctx: &PricingContext, request: &TradeRequest) -> Option<Decimal> {
        price_impact(ctx, request)
    }

    fn minimum_received(&self, ctx: &PricingContext, request: &TradeRequest) -> ScaledAmount {
        minimum_received(ctx, request)
    }

    fn quote(&self, ctx: &PricingContext, request: &TradeRequest) -> TradeQuote {
        let impact = self.price_impact(ctx, request);
        let impact_level = impact.map(|i| self.config.classify_ratio(i));
        let received = self.minimum_received(ctx, request);

        let minimum_output = self
            .config
            .slippage_tolerance
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(QuoteError::Overflow("slippage percent"))
            .and_then(|percent| apply_slippage_tolerance(received, percent))
            .unwrap_or_else(|e| {
                warn!("Slippage tolerance not applied: {}", e);
                received
            });

        let settings =
            TradeSettings::with_slippage(ctx.reference_price, impact, self.config.slippage_tolerance);

        let quote = TradeQuote {
            request: request.clone(),
            price_impact: impact,
            impact_level,
            minimum_received: received,
            minimum_output,
            settings,
        };
        info!("{}", quote);
        quote
    }
}
