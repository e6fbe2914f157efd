use serde::{Deserialize, Serialize};

use crate::analytics::performance::Ratio;
use crate::core::stats::{self, pct};
use crate::models::{Direction, TradeRecord, TradeType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTypeStats {
    pub trade_type: TradeType,
    /// Set only in the per-direction breakdown.
    pub direction: Option<Direction>,
    pub count: usize,
    pub net_pnl: f64,
    pub gross_pnl: f64,
    pub fees: f64,
    pub win_rate: f64,
    pub avg_win: f64,
    /// Mean losing trade, negative.
    pub avg_loss: f64,
    pub profit_factor: Ratio,
    pub median_duration: f64,
    pub max_drawdown: f64,
}

/// One row per trade type in display order, empty types omitted.
pub fn by_trade_type(records: &[TradeRecord]) -> Vec<TradeTypeStats> {
    TradeType::ALL
        .iter()
        .filter_map(|tt| {
            let subset: Vec<&TradeRecord> =
                records.iter().filter(|r| r.trade_type == *tt).collect();
            bucket(*tt, None, &subset)
        })
        .collect()
}

pub fn by_type_and_direction(records: &[TradeRecord]) -> Vec<TradeTypeStats> {
    let mut out = Vec::new();
    for tt in TradeType::ALL {
        for dir in [Direction::Long, Direction::Short] {
            let subset: Vec<&TradeRecord> = records
                .iter()
                .filter(|r| r.trade_type == tt && r.side == dir)
                .collect();
            out.extend(bucket(tt, Some(dir), &subset));
        }
    }
    out
}

fn bucket(
    trade_type: TradeType,
    direction: Option<Direction>,
    subset: &[&TradeRecord],
) -> Option<TradeTypeStats> {
    if subset.is_empty() {
        return None;
    }
    let pnls: Vec<f64> = subset.iter().map(|r| r.pnl()).collect();
    let wins: Vec<f64> = pnls.iter().copied().filter(|p| *p > 0.0).collect();
    let losses: Vec<f64> = pnls.iter().copied().filter(|p| *p < 0.0).collect();
    let durations: Vec<f64> = subset.iter().map(|r| r.duration_minutes).collect();

    Some(TradeTypeStats {
        trade_type,
        direction,
        count: subset.len(),
        net_pnl: pnls.iter().sum(),
        gross_pnl: subset.iter().map(|r| r.gross_pnl).sum(),
        fees: subset.iter().map(|r| r.fee_paid).sum(),
        win_rate: pct(wins.len(), subset.len()),
        avg_win: stats::mean(&wins),
        avg_loss: stats::mean(&losses),
        profit_factor: Ratio::of(
            wins.iter().fold(0.0_f64, |a, b| a + b),
            losses.iter().fold(0.0_f64, |a, b| a + b).abs(),
        ),
        median_duration: stats::median(&durations),
        max_drawdown: stats::max_drawdown(&pnls),
    })
}
