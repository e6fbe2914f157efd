pub mod breakdown;
pub mod performance;

pub use breakdown::{by_trade_type, by_type_and_direction, TradeTypeStats};
pub use performance::{rolling_expectancy, PerformanceStats, Ratio};
