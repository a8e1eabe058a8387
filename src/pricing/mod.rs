pub mod impact;
pub mod minimum;
pub mod pool;
pub mod quoter;
pub mod regime;

pub use impact::{price_impact, try_price_impact};
pub use minimum::{minimum_received, try_minimum_received};
pub use quoter::{DefaultQuoter, Quoter};
pub use regime::{TradeLegs, quote_legs};
