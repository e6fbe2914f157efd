use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::core::sessions::session_for_hour;
use crate::error::{AuditError, Result};
use crate::models::{Direction, Session, TradeType};

/// One closed position as delivered by the upstream normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub entry_price: f64,
    #[serde(default)]
    pub exit_price: f64,
    #[serde(default)]
    pub quantity: f64,
    /// Net realized PnL, fees already deducted.
    pub pnl: f64,
    pub fees: f64,
    #[serde(default)]
    pub leverage: Option<f64>,
}

/// A trade plus everything derived from it. Built only by `TradeStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(flatten)]
    pub trade: Trade,
    pub side: Direction,
    pub fee_paid: f64,
    pub effective_leverage: f64,
    pub duration_minutes: f64,
    pub hour: u32,
    pub weekday: Weekday,
    pub session: Session,
    pub gross_pnl: f64,
    pub is_win: bool,
    pub trade_type: TradeType,
    pub loss_streak_before: u32,
    pub minutes_since_prev: Option<f64>,
}

impl TradeRecord {
    /// Validates one trade and computes its order-independent fields.
    /// Sequential fields start empty and are filled by the store.
    pub(crate) fn derive(index: usize, trade: Trade, tz: Tz) -> Result<Self> {
        if trade.symbol.trim().is_empty() {
            return Err(AuditError::MissingField {
                index,
                field: "symbol",
            });
        }
        for (field, value) in [
            ("pnl", trade.pnl),
            ("fees", trade.fees),
            ("entry_price", trade.entry_price),
            ("exit_price", trade.exit_price),
            ("quantity", trade.quantity),
        ] {
            if !value.is_finite() {
                return Err(AuditError::InvalidField {
                    index,
                    field,
                    reason: format!("non-finite value {}", value),
                });
            }
        }
        if trade.close_time < trade.open_time {
            return Err(AuditError::InvalidTimeRange {
                index,
                symbol: trade.symbol.clone(),
            });
        }

        let fee_paid = trade.fees.abs();
        let gross_pnl = trade.pnl + fee_paid;
        let effective_leverage = trade
            .leverage
            .filter(|l| l.is_finite() && *l >= 1.0)
            .unwrap_or(1.0);
        let duration_minutes =
            (trade.close_time - trade.open_time).num_milliseconds() as f64 / 60_000.0;

        let local_close = trade.close_time.with_timezone(&tz);
        let hour = local_close.hour();
        let side = trade
            .direction
            .unwrap_or_else(|| Direction::infer(trade.entry_price, trade.exit_price, gross_pnl));

        Ok(Self {
            side,
            fee_paid,
            effective_leverage,
            duration_minutes,
            hour,
            weekday: local_close.weekday(),
            session: session_for_hour(hour),
            gross_pnl,
            is_win: trade.pnl > 0.0,
            trade_type: TradeType::classify(duration_minutes, effective_leverage),
            loss_streak_before: 0,
            minutes_since_prev: None,
            trade,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.trade.symbol
    }

    pub fn pnl(&self) -> f64 {
        self.trade.pnl
    }

    pub fn is_loss(&self) -> bool {
        self.trade.pnl < 0.0
    }
}
