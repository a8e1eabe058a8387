use anyhow::{Context, bail};
use launchpad_quote::{
    pricing::{DefaultQuoter, Quoter},
    types::{Currency, TokenSnapshot, TradeOrder, TradeRequest, TradeSide},
    utils::{config::Config, logger::init},
};
use serde_json::json;
use tracing::{info, warn};

const USAGE: &str = "usage: launchpad-quote <token.json> <btc|token> <amount> <buy|sell>";

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init(&config.logging.level);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [path, currency, amount, side] = args.as_slice() else {
        bail!(USAGE);
    };

    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let token = TokenSnapshot::from_json(&content).with_context(|| format!("parsing {}", path))?;
    if !token.trading {
        warn!("{} is not trading; quote is indicative only", token.symbol());
    }

    let request = TradeRequest::new(currency.parse::<Currency>()?, amount.as_str(), side.parse::<TradeSide>()?);
    let ctx = token.pricing_context(config.pricing_config());
    info!(
        "Quoting {} on {} ({})",
        request,
        token.symbol(),
        if ctx.bonded { "pool" } else { "bonding curve" }
    );

    let quoter = DefaultQuoter::new(config.quote_config().clone());
    let quote = quoter.quote(&ctx, &request);
    let Some(impact) = quote.price_impact else {
        bail!("No quote for {} on {}", request, token.symbol());
    };

    println!("{}", serde_json::to_string_pretty(&quote)?);

    // Refuse to emit an order past the impact ceiling
    config.quote_config().check_impact(impact)?;

    let order = TradeOrder::new(&token, &request, quote.settings)?;
    println!("{}", serde_json::to_string_pretty(&json!({ "order": order }))?);
    Ok(())
}
