use chrono_tz::Tz;
use tracing::debug;

use crate::core::features::derive_sequential;
use crate::error::Result;
use crate::models::{Trade, TradeRecord};

/// Immutable, close-time ordered collection of derived trade records.
///
/// Sequential fields are population- and order-relative, so every subset is
/// rebuilt from the raw trades instead of reusing the parent's records.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeStore {
    records: Vec<TradeRecord>,
    timezone: Tz,
}

impl TradeStore {
    pub fn build(trades: Vec<Trade>, timezone: Tz) -> Result<Self> {
        let mut records = trades
            .into_iter()
            .enumerate()
            .map(|(i, t)| TradeRecord::derive(i, t, timezone))
            .collect::<Result<Vec<_>>>()?;

        // stable: trades closing at the same instant keep their input order
        records.sort_by_key(|r| r.trade.close_time);

        let features = derive_sequential(&records)?;
        for (r, f) in records.iter_mut().zip(features) {
            r.loss_streak_before = f.loss_streak_before;
            r.minutes_since_prev = f.minutes_since_prev;
        }

        if let (Some(first), Some(last)) = (records.first(), records.last()) {
            debug!(
                "Trade store built: {} trades from {} to {}",
                records.len(),
                first.trade.close_time.format("%Y-%m-%d"),
                last.trade.close_time.format("%Y-%m-%d")
            );
        }

        Ok(Self { records, timezone })
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn pnls(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.pnl()).collect()
    }

    /// New store over the trades matching `keep`, with sequential fields recomputed.
    pub fn filter<F>(&self, keep: F) -> Result<Self>
    where
        F: Fn(&Trade) -> bool,
    {
        let trades = self
            .records
            .iter()
            .map(|r| &r.trade)
            .filter(|t| keep(t))
            .cloned()
            .collect();
        Self::build(trades, self.timezone)
    }

    pub fn filter_symbols<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Self> {
        self.filter(|t| symbols.iter().any(|s| s.as_ref() == t.symbol))
    }
}
