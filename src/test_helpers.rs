use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::Config;
use crate::core::store::TradeStore;
use crate::models::{Trade, TradeRecord};

/// UTC timestamp shorthand.
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap()
}

/// A fee-free 1x trade. Prices move with the result so the side infers as long.
pub fn make_trade(symbol: &str, open: DateTime<Utc>, duration_minutes: f64, pnl: f64) -> Trade {
    let exit_price = if pnl < 0.0 { 99.0 } else { 101.0 };
    Trade {
        symbol: symbol.to_string(),
        open_time: open,
        close_time: open + Duration::milliseconds((duration_minutes * 60_000.0) as i64),
        direction: None,
        entry_price: 100.0,
        exit_price,
        quantity: 1.0,
        pnl,
        fees: 0.0,
        leverage: Some(1.0),
    }
}

/// Trades opened `spacing_minutes` apart from 2024-01-15 08:00 UTC, each held 20 minutes.
pub fn trades_from_pnls(pnls: &[f64], spacing_minutes: i64) -> Vec<Trade> {
    let base = at(2024, 1, 15, 8, 0);
    pnls.iter()
        .enumerate()
        .map(|(i, pnl)| {
            make_trade(
                "BTC_USDT",
                base + Duration::minutes(spacing_minutes * i as i64),
                20.0,
                *pnl,
            )
        })
        .collect()
}

/// Derived records in the given order without sequential features.
pub fn records_of(trades: Vec<Trade>) -> Vec<TradeRecord> {
    trades
        .into_iter()
        .enumerate()
        .map(|(i, t)| TradeRecord::derive(i, t, Tz::UTC).unwrap())
        .collect()
}

pub fn raw_records(pnls: &[f64], spacing_minutes: i64) -> Vec<TradeRecord> {
    records_of(trades_from_pnls(pnls, spacing_minutes))
}

pub fn store_of(trades: Vec<Trade>) -> TradeStore {
    TradeStore::build(trades, Tz::UTC).unwrap()
}

pub fn store_from_pnls(pnls: &[f64], spacing_minutes: i64) -> TradeStore {
    store_of(trades_from_pnls(pnls, spacing_minutes))
}

/// Default config analysed in UTC with quiet logging.
pub fn default_test_config() -> Config {
    Config {
        timezone: Tz::UTC,
        log_level: "error".to_string(),
        ..Config::default()
    }
}
