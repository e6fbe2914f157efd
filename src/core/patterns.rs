use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;
use crate::core::scoring::ScoredTrade;
use crate::core::stats::{self, pct, round2};
use crate::models::Severity;

const REVENGE_SHARE_ALERT_PCT: f64 = 15.0;
const QUICK_ENTRY_SHARE_ALERT_PCT: f64 = 20.0;
const LOSS_STREAK_ALERT: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralStats {
    pub total_trades: usize,
    pub max_win_streak: u32,
    pub max_loss_streak: u32,
    pub pnl_after_1_loss: f64,
    pub pnl_after_2_losses: f64,
    pub pnl_after_3_losses: f64,
    pub quick_entry_count: usize,
    pub quick_entry_pnl: f64,
    pub quick_entry_pct: f64,
    pub revenge_count: usize,
    pub revenge_pnl: f64,
    pub revenge_pct: f64,
    pub median_duration: f64,
    pub patient_pnl: f64,
    pub quick_duration_pnl: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    RevengeTrading,
    Overtrading,
    Impatience,
    LossStreak,
    PostLossBehavior,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::RevengeTrading => write!(f, "REVENGE TRADING"),
            PatternKind::Overtrading => write!(f, "OVERTRADING"),
            PatternKind::Impatience => write!(f, "IMPATIENCE"),
            PatternKind::LossStreak => write!(f, "LOSS STREAK"),
            PatternKind::PostLossBehavior => write!(f, "POST-LOSS BEHAVIOR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralAlert {
    pub kind: PatternKind,
    pub severity: Severity,
    /// The figure that tripped the alert (a share in percent, a streak length or a PnL).
    pub metric: f64,
    /// PnL attributable to the pattern, when there is one.
    pub impact: Option<f64>,
    pub message: String,
}

pub struct PatternDetector {
    revenge_streak: u32,
    impulsive_gap_minutes: f64,
}

impl PatternDetector {
    pub fn new(cfg: &Config) -> Self {
        Self {
            revenge_streak: cfg.revenge_streak,
            impulsive_gap_minutes: cfg.impulsive_gap_minutes,
        }
    }

    pub fn analyze(&self, trades: &[ScoredTrade]) -> BehavioralStats {
        if trades.is_empty() {
            return BehavioralStats::default();
        }
        let n = trades.len();
        let (max_win_streak, max_loss_streak) = max_streaks(trades.iter().map(|t| t.pnl()));

        let pnl_after = |losses: u32| -> f64 {
            round2(
                trades
                    .iter()
                    .filter(|t| t.record.loss_streak_before == losses)
                    .map(|t| t.pnl())
                    .sum(),
            )
        };

        let quick: Vec<&ScoredTrade> = trades
            .iter()
            .filter(|t| {
                t.record
                    .minutes_since_prev
                    .is_some_and(|gap| gap < self.impulsive_gap_minutes)
            })
            .collect();
        let revenge: Vec<&ScoredTrade> = trades
            .iter()
            .filter(|t| t.record.loss_streak_before >= self.revenge_streak)
            .collect();

        let durations: Vec<f64> = trades.iter().map(|t| t.record.duration_minutes).collect();
        let median_duration = stats::median(&durations);
        let (patient_pnl, quick_duration_pnl) =
            trades.iter().fold((0.0, 0.0), |(patient, hasty), t| {
                if t.record.duration_minutes >= median_duration {
                    (patient + t.pnl(), hasty)
                } else {
                    (patient, hasty + t.pnl())
                }
            });

        BehavioralStats {
            total_trades: n,
            max_win_streak,
            max_loss_streak,
            pnl_after_1_loss: pnl_after(1),
            pnl_after_2_losses: pnl_after(2),
            pnl_after_3_losses: pnl_after(3),
            quick_entry_count: quick.len(),
            quick_entry_pnl: round2(quick.iter().map(|t| t.pnl()).sum()),
            quick_entry_pct: pct(quick.len(), n),
            revenge_count: revenge.len(),
            revenge_pnl: round2(revenge.iter().map(|t| t.pnl()).sum()),
            revenge_pct: pct(revenge.len(), n),
            median_duration,
            patient_pnl: round2(patient_pnl),
            quick_duration_pnl: round2(quick_duration_pnl),
        }
    }

    /// Threshold alerts, HIGH severity first.
    pub fn alerts(&self, stats: &BehavioralStats) -> Vec<BehavioralAlert> {
        let mut alerts = Vec::new();

        if stats.revenge_pct > REVENGE_SHARE_ALERT_PCT {
            alerts.push(BehavioralAlert {
                kind: PatternKind::RevengeTrading,
                severity: Severity::High,
                metric: stats.revenge_pct,
                impact: Some(stats.revenge_pnl),
                message: format!(
                    "{:.0}% of trades were opened after {}+ consecutive losses",
                    stats.revenge_pct, self.revenge_streak
                ),
            });
        }

        if stats.quick_entry_pct > QUICK_ENTRY_SHARE_ALERT_PCT {
            alerts.push(BehavioralAlert {
                kind: PatternKind::Overtrading,
                severity: Severity::High,
                metric: stats.quick_entry_pct,
                impact: Some(stats.quick_entry_pnl),
                message: format!(
                    "{:.0}% of trades were opened less than {} minutes after the previous one",
                    stats.quick_entry_pct, self.impulsive_gap_minutes
                ),
            });
        }

        if stats.patient_pnl > 0.0 && stats.quick_duration_pnl < 0.0 {
            alerts.push(BehavioralAlert {
                kind: PatternKind::Impatience,
                severity: Severity::Medium,
                metric: stats.median_duration,
                impact: Some(stats.quick_duration_pnl),
                message: format!(
                    "Trades held at least {:.1} min made {:+.2}, shorter ones lost {:.2}",
                    stats.median_duration, stats.patient_pnl, stats.quick_duration_pnl
                ),
            });
        }

        if stats.max_loss_streak >= LOSS_STREAK_ALERT {
            alerts.push(BehavioralAlert {
                kind: PatternKind::LossStreak,
                severity: Severity::Medium,
                metric: stats.max_loss_streak as f64,
                impact: None,
                message: format!(
                    "A run of {} consecutive losses was recorded",
                    stats.max_loss_streak
                ),
            });
        }

        if stats.pnl_after_3_losses < 0.0 {
            alerts.push(BehavioralAlert {
                kind: PatternKind::PostLossBehavior,
                severity: Severity::High,
                metric: stats.pnl_after_3_losses,
                impact: Some(stats.pnl_after_3_losses),
                message: format!(
                    "Trades taken right after 3 losses lost another {:.2}",
                    stats.pnl_after_3_losses.abs()
                ),
            });
        }

        alerts.sort_by_key(|a| a.severity);
        alerts
    }
}

/// Longest runs of winners (pnl > 0) and losers (pnl < 0); flat trades break both.
pub fn max_streaks(pnls: impl IntoIterator<Item = f64>) -> (u32, u32) {
    let (mut max_win, mut max_loss) = (0, 0);
    let (mut win, mut loss) = (0, 0);
    for pnl in pnls {
        if pnl > 0.0 {
            win += 1;
            loss = 0;
            max_win = max_win.max(win);
        } else if pnl < 0.0 {
            loss += 1;
            win = 0;
            max_loss = max_loss.max(loss);
        } else {
            win = 0;
            loss = 0;
        }
    }
    (max_win, max_loss)
}
