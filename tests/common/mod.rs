use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;

use trade_audit::config::Config;
use trade_audit::models::Trade;

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap()
}

/// Fee-free 1x trade whose prices agree with the sign of its PnL.
pub fn trade(symbol: &str, open: DateTime<Utc>, duration_minutes: i64, pnl: f64) -> Trade {
    Trade {
        symbol: symbol.to_string(),
        open_time: open,
        close_time: open + Duration::minutes(duration_minutes),
        direction: None,
        entry_price: 100.0,
        exit_price: if pnl < 0.0 { 98.0 } else { 102.0 },
        quantity: 1.0,
        pnl,
        fees: 0.0,
        leverage: None,
    }
}

pub fn test_config() -> Config {
    Config {
        timezone: Tz::UTC,
        log_level: "error".to_string(),
        monte_carlo_trials: 200,
        ..Config::default()
    }
}

/// A week of mixed trading across two symbols: disciplined BTC swings and
/// a burst of quick ETH losses on the third day.
pub fn mixed_history() -> Vec<Trade> {
    let mut trades = Vec::new();
    for day in 0..7 {
        let base = at(2024, 3, 4, 9, 0) + Duration::days(day);
        trades.push(trade("BTC_USDT", base, 90, 40.0 - day as f64 * 3.0));
        trades.push(trade("BTC_USDT", base + Duration::hours(4), 75, if day % 3 == 0 { -15.0 } else { 22.0 }));
    }
    let burst = at(2024, 3, 6, 20, 0);
    for i in 0..8 {
        trades.push(trade("ETH_USDT", burst + Duration::minutes(3 * i), 2, -6.0 - i as f64));
    }
    trades
}
