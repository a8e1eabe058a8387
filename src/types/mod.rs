pub mod amount_serde;
pub mod common;
pub mod error;
pub mod token;
pub mod trade;

pub use common::*;
pub use error::*;
pub use token::*;
pub use trade::*;
