use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::curve::CurveParameters;
use crate::types::{FeeRatio, ImpactLevel, QuoteError, Result};

/// Optional config file name (any format the `config` crate recognises, e.g. `quote.toml`)
pub const CONFIG_FILE: &str = "quote";

/// Prefix for environment overrides, e.g. `QUOTE__QUOTE__SLIPPAGE_TOLERANCE=0.01`
pub const ENV_PREFIX: &str = "QUOTE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Curve and fee constants
    pub pricing: PricingConfig,

    /// Impact thresholds and slippage
    pub quote: QuoteConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Market-making constants. Loaded once and copied into every pricing context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub curve: CurveParameters,
    pub pool_fee: FeeRatio,
    pub curve_fee: FeeRatio,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            curve: CurveParameters::standard(),
            pool_fee: FeeRatio::POOL,
            curve_fee: FeeRatio::CURVE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Impact above this percentage is refused
    pub max_price_impact_percent: Decimal,

    /// Impact above this percentage is flagged as medium
    pub medium_impact_percent: Decimal,

    /// Slippage tolerated on top of the quoted impact, as a fraction (0.05 = 5%)
    pub slippage_tolerance: Decimal,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            max_price_impact_percent: dec!(10),
            medium_impact_percent: dec!(5),
            slippage_tolerance: dec!(0.05),
        }
    }
}

impl QuoteConfig {
    pub fn classify(&self, impact_percent: Decimal) -> ImpactLevel {
        if impact_percent > self.max_price_impact_percent {
            ImpactLevel::High
        } else if impact_percent > self.medium_impact_percent {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        }
    }

    /// Classify an impact ratio. A ratio whose percentage does not fit a
    /// `Decimal` lies beyond every threshold in the direction of its sign.
    pub fn classify_ratio(&self, impact: Decimal) -> ImpactLevel {
        match impact.checked_mul(Decimal::ONE_HUNDRED) {
            Some(impact_percent) => self.classify(impact_percent),
            None if impact.is_sign_positive() => ImpactLevel::High,
            None => ImpactLevel::Low,
        }
    }

    /// Reject a trade whose impact ratio exceeds the configured maximum.
    /// Returns the impact as a percentage.
    pub fn check_impact(&self, impact: Decimal) -> Result<Decimal> {
        let impact_percent = impact
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(QuoteError::Overflow("impact percent"))?;
        if impact_percent > self.max_price_impact_percent {
            return Err(QuoteError::ImpactTooHigh {
                impact_percent,
                max_percent: self.max_price_impact_percent,
            });
        }
        Ok(impact_percent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Config {
    pub fn pricing_config(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn quote_config(&self) -> &QuoteConfig {
        &self.quote
    }

    /// Defaults, overlaid by the optional config file, overlaid by `QUOTE__*`
    /// environment variables (a `.env` file is honoured).
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let config: Config = ::config::Config::builder()
            .add_source(::config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit TOML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let pricing = &self.pricing;
        if !pricing.curve.is_valid() {
            return Err(QuoteError::Config(format!(
                "Curve '{}' needs finite a > 0 and b > 0",
                pricing.curve.name
            )));
        }

        for (name, fee) in [("pool_fee", pricing.pool_fee), ("curve_fee", pricing.curve_fee)] {
            if !fee.is_valid() {
                return Err(QuoteError::Config(format!(
                    "{} must satisfy 0 < numerator <= denominator, got {}/{}",
                    name, fee.numerator, fee.denominator
                )));
            }
        }

        let quote = &self.quote;
        if quote.medium_impact_percent > quote.max_price_impact_percent {
            return Err(QuoteError::Config(
                "medium_impact_percent must not exceed max_price_impact_percent".into(),
            ));
        }
        if quote.slippage_tolerance.is_sign_negative() {
            return Err(QuoteError::Config("slippage_tolerance must not be negative".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pricing.curve, CurveParameters::standard());
        assert_eq!(config.pricing.pool_fee, FeeRatio::new(995, 1000));
        assert_eq!(config.pricing.curve_fee, FeeRatio::new(99, 100));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [pricing.curve]
            name = "steeper"
            b = 0.0000003

            [quote]
            slippage_tolerance = "0.015"
            "#,
        )
        .unwrap();

        assert_eq!(config.pricing.curve.name, "steeper");
        assert_eq!(config.pricing.curve.a, 0.11803);
        assert_eq!(config.pricing.curve.b, 0.0000003);
        assert_eq!(config.pricing.pool_fee, FeeRatio::POOL);
        assert_eq!(config.quote.slippage_tolerance, dec!(0.015));
        assert_eq!(config.quote.max_price_impact_percent, dec!(10));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_curve = Config::from_toml_str("[pricing.curve]\na = 0.0\n");
        assert!(matches!(bad_curve, Err(QuoteError::Config(_))));

        let bad_fee = Config::from_toml_str("[pricing.pool_fee]\nnumerator = 1001\ndenominator = 1000\n");
        assert!(matches!(bad_fee, Err(QuoteError::Config(_))));

        let bad_thresholds = Config::from_toml_str(
            "[quote]\nmax_price_impact_percent = \"5\"\nmedium_impact_percent = \"8\"\n",
        );
        assert!(matches!(bad_thresholds, Err(QuoteError::Config(_))));

        assert!(matches!(Config::from_toml_str("pricing = 3"), Err(QuoteError::Toml(_))));
        assert!(matches!(
            Config::load_from_file("/nonexistent/quote.toml"),
            Err(QuoteError::Io(_))
        ));
    }

    #[test]
    fn test_classify_impact() {
        let quote = QuoteConfig::default();
        assert_eq!(quote.classify(dec!(32.92)), ImpactLevel::High);
        assert_eq!(quote.classify(dec!(10)), ImpactLevel::Medium);
        assert_eq!(quote.classify(dec!(5.01)), ImpactLevel::Medium);
        assert_eq!(quote.classify(dec!(5)), ImpactLevel::Low);
        assert_eq!(quote.classify(Decimal::ZERO), ImpactLevel::Low);
    }

    #[test]
    fn test_check_impact() {
        let quote = QuoteConfig::default();
        assert_eq!(quote.check_impact(dec!(0.0213)).unwrap(), dec!(2.13));
        assert!(matches!(
            quote.check_impact(dec!(0.3292)),
            Err(QuoteError::ImpactTooHigh { .. })
        ));

        let huge = dec!(99499999999999999999999999);
        assert!(matches!(quote.check_impact(huge), Err(QuoteError::Overflow(_))));
    }

    #[test]
    fn test_classify_unscalable_ratio() {
        let quote = QuoteConfig::default();
        assert_eq!(quote.classify_ratio(dec!(0.3292)), ImpactLevel::High);
        assert_eq!(quote.classify_ratio(dec!(0.0213)), ImpactLevel::Low);
        assert_eq!(quote.classify_ratio(Decimal::MAX), ImpactLevel::High);
        assert_eq!(quote.classify_ratio(Decimal::MIN), ImpactLevel::Low);
    }
}
