use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::Config;
use crate::core::scoring::ScoredTrade;
use crate::core::sessions::local_date;
use crate::core::stats::{pct, round2};
use crate::models::TiltStatus;

const RECENT_WINDOW: usize = 5;

/// (threshold, deduction) tiers per signal, most severe first. Only the first
/// matching tier of a signal applies.
const REVENGE_TIERS: [(f64, i32); 2] = [(20.0, 25), (10.0, 15)];
const PACE_TIERS: [(f64, i32); 2] = [(15.0, 20), (10.0, 10)];
const IMPULSIVE_TIERS: [(f64, i32); 2] = [(30.0, 20), (15.0, 10)];
const RECENT_LOSS_TIERS: [(usize, i32); 2] = [(4, 15), (3, 8)];

/// Session-level emotional state over a whole sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiltIndex {
    pub score: u8,
    pub status: TiltStatus,
    pub emoji: String,
    pub alerts: Vec<String>,
    pub revenge_pct: f64,
    pub avg_trades_per_day: f64,
    pub impulsive_pct: f64,
    pub recent_losses: usize,
}

impl TiltIndex {
    pub fn neutral() -> Self {
        Self {
            score: 100,
            status: TiltStatus::Neutral,
            emoji: TiltStatus::Neutral.emoji().to_string(),
            alerts: Vec::new(),
            revenge_pct: 0.0,
            avg_trades_per_day: 0.0,
            impulsive_pct: 0.0,
            recent_losses: 0,
        }
    }
}

pub struct TiltCalculator {
    revenge_streak: u32,
    impulsive_gap_minutes: f64,
    timezone: Tz,
}

impl TiltCalculator {
    pub fn new(cfg: &Config) -> Self {
        Self {
            revenge_streak: cfg.revenge_streak,
            impulsive_gap_minutes: cfg.impulsive_gap_minutes,
            timezone: cfg.timezone,
        }
    }

    /// The revenge share reuses the scorer's `loss_streak_before`, where a
    /// flat trade extends a streak; recent losses count strict losses only.
    pub fn evaluate(&self, trades: &[ScoredTrade]) -> TiltIndex {
        if trades.is_empty() {
            return TiltIndex::neutral();
        }
        let n = trades.len();
        let mut score: i32 = 100;
        let mut alerts = Vec::new();

        let revenge = trades
            .iter()
            .filter(|t| t.record.loss_streak_before >= self.revenge_streak)
            .count();
        let revenge_pct = pct(revenge, n);
        match tier(revenge_pct, &REVENGE_TIERS) {
            Some(0) => alerts.push("Revenge trading detected".to_string()),
            Some(_) => alerts.push("Tendency towards revenge trading".to_string()),
            None => {}
        }
        score -= deduction(revenge_pct, &REVENGE_TIERS);

        let avg_trades_per_day = self.average_trades_per_day(trades);
        match tier(avg_trades_per_day, &PACE_TIERS) {
            Some(0) => alerts.push("Severe overtrading".to_string()),
            Some(_) => alerts.push("Tendency towards overtrading".to_string()),
            None => {}
        }
        score -= deduction(avg_trades_per_day, &PACE_TIERS);

        let impulsive = trades
            .iter()
            .filter(|t| {
                t.record
                    .minutes_since_prev
                    .is_some_and(|gap| gap < self.impulsive_gap_minutes)
            })
            .count();
        let impulsive_pct = pct(impulsive, n);
        match tier(impulsive_pct, &IMPULSIVE_TIERS) {
            Some(0) => alerts.push("Too many impulsive trades".to_string()),
            Some(_) => alerts.push("Frequent impulsive trades".to_string()),
            None => {}
        }
        score -= deduction(impulsive_pct, &IMPULSIVE_TIERS);

        let recent_losses = trades
            .iter()
            .rev()
            .take(RECENT_WINDOW)
            .filter(|t| t.record.is_loss())
            .count();
        if let Some(&(_, d)) = RECENT_LOSS_TIERS.iter().find(|(min, _)| recent_losses >= *min) {
            score -= d;
            if recent_losses >= RECENT_LOSS_TIERS[0].0 {
                alerts.push("Recent losing streak".to_string());
            }
        }

        let score = score.clamp(0, 100) as u8;
        let status = TiltStatus::from_score(score);

        TiltIndex {
            score,
            status,
            emoji: status.emoji().to_string(),
            alerts,
            revenge_pct: round2(revenge_pct),
            avg_trades_per_day: round2(avg_trades_per_day),
            impulsive_pct: round2(impulsive_pct),
            recent_losses,
        }
    }

    /// Mean trade count over the days that had at least one close.
    fn average_trades_per_day(&self, trades: &[ScoredTrade]) -> f64 {
        let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
        for t in trades {
            *per_day
                .entry(local_date(t.record.trade.close_time, self.timezone))
                .or_default() += 1;
        }
        if per_day.is_empty() {
            return 0.0;
        }
        trades.len() as f64 / per_day.len() as f64
    }
}

/// Index of the first tier whose threshold is strictly exceeded.
fn tier(value: f64, tiers: &[(f64, i32)]) -> Option<usize> {
    tiers.iter().position(|(threshold, _)| value > *threshold)
}

fn deduction(value: f64, tiers: &[(f64, i32)]) -> i32 {
    tier(value, tiers).map_or(0, |i| tiers[i].1)
}
