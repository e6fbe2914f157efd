pub mod direction;
pub mod labels;
pub mod trade;

pub use direction::*;
pub use labels::*;
pub use trade::{Trade, TradeRecord};
