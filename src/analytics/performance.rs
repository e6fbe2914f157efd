use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::stats::{self, pct};
use crate::models::TradeRecord;

/// A quotient whose denominator may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Ratio {
    Finite(f64),
    /// Positive numerator over a zero denominator.
    Infinite,
    /// Nothing on either side.
    Undefined,
}

impl Ratio {
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 {
            // an empty float sum is -0.0; keep zero ratios unsigned
            Ratio::Finite(numerator / denominator + 0.0)
        } else if numerator > 0.0 {
            Ratio::Infinite
        } else {
            Ratio::Undefined
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Finite(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(v) => write!(f, "{:.2}", v),
            Ratio::Infinite => write!(f, "inf"),
            Ratio::Undefined => write!(f, "n/a"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_trades: usize,
    pub net_pnl: f64,
    pub gross_pnl: f64,
    pub total_fees: f64,
    pub total_gains: f64,
    /// Sum of losing trades as a positive amount.
    pub total_losses: f64,
    pub profit_factor: Ratio,
    pub expectancy: f64,
    /// Mean over sample standard deviation of per-trade PnL, not annualized.
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub avg_drawdown: f64,
    pub recovery_factor: Ratio,
    pub win_rate: f64,
    pub wins: usize,
    pub losses: usize,
    pub avg_win: f64,
    /// Mean losing trade as a positive amount.
    pub avg_loss: f64,
    pub avg_risk_reward: Ratio,
}

impl PerformanceStats {
    /// `None` for an empty sequence. Records must be in close-time order.
    pub fn from_records(records: &[TradeRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let n = records.len();
        let pnls: Vec<f64> = records.iter().map(|r| r.pnl()).collect();
        let net_pnl: f64 = pnls.iter().sum();
        let total_fees: f64 = records.iter().map(|r| r.fee_paid).sum();

        let gains: Vec<f64> = pnls.iter().copied().filter(|p| *p > 0.0).collect();
        let losses: Vec<f64> = pnls.iter().copied().filter(|p| *p < 0.0).map(f64::abs).collect();
        let total_gains: f64 = gains.iter().sum();
        let total_losses: f64 = losses.iter().sum();
        let avg_win = stats::mean(&gains);
        let avg_loss = stats::mean(&losses);

        let std = stats::sample_std(&pnls);
        let sharpe = if std > 0.0 { stats::mean(&pnls) / std } else { 0.0 };

        let curve = stats::drawdown_curve(&pnls);
        let max_drawdown = curve.iter().copied().fold(0.0, f64::min);
        let underwater: Vec<f64> = curve.into_iter().filter(|d| *d < 0.0).collect();
        let recovery_factor = if max_drawdown < 0.0 {
            Ratio::Finite((net_pnl / max_drawdown).abs())
        } else if net_pnl > 0.0 {
            Ratio::Infinite
        } else {
            Ratio::Undefined
        };

        Some(Self {
            total_trades: n,
            net_pnl,
            gross_pnl: net_pnl + total_fees,
            total_fees,
            total_gains,
            total_losses,
            profit_factor: Ratio::of(total_gains, total_losses),
            expectancy: net_pnl / n as f64,
            sharpe,
            max_drawdown,
            avg_drawdown: stats::mean(&underwater),
            recovery_factor,
            win_rate: pct(gains.len(), n),
            wins: gains.len(),
            losses: losses.len(),
            avg_win,
            avg_loss,
            avg_risk_reward: Ratio::of(avg_win, avg_loss),
        })
    }
}

/// Trailing mean PnL over each full window, aligned to the window's last trade.
/// Empty when there are fewer trades than the window.
pub fn rolling_expectancy(pnls: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    pnls.windows(window).map(stats::mean).collect()
}
