use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::core::stats::{self, pct};
use crate::core::store::TradeStore;
use crate::models::{TradeLabel, TradeRecord};

pub const SHORT_DURATION_PENALTY: u8 = 30;
pub const REVENGE_PENALTY: u8 = 20;
pub const IMPULSIVE_PENALTY: u8 = 10;

const MAX_SCORE: u8 = 100;

/// Which penalty rules fired for a trade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalties {
    pub short_duration: bool,
    pub revenge: bool,
    pub impulsive: bool,
}

impl Penalties {
    /// Rules stack without a per-rule cap; the score floor is applied by the caller.
    pub fn total(&self) -> u8 {
        let mut total = 0;
        if self.short_duration {
            total += SHORT_DURATION_PENALTY;
        }
        if self.revenge {
            total += REVENGE_PENALTY;
        }
        if self.impulsive {
            total += IMPULSIVE_PENALTY;
        }
        total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrade {
    #[serde(flatten)]
    pub record: TradeRecord,
    pub discipline_score: u8,
    pub label: TradeLabel,
    pub penalties: Penalties,
    /// Set by the clustering stage.
    pub cluster: Option<usize>,
}

impl ScoredTrade {
    pub fn pnl(&self) -> f64 {
        self.record.pnl()
    }
}

pub struct DisciplineScorer {
    short_duration_quantile: f64,
    min_trades_for_percentile: usize,
    revenge_streak: u32,
    impulsive_gap_minutes: f64,
    destructive_cutoff: u8,
    false_good_cutoff: u8,
}

impl DisciplineScorer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            short_duration_quantile: cfg.short_duration_quantile,
            min_trades_for_percentile: cfg.min_trades_for_percentile,
            revenge_streak: cfg.revenge_streak,
            impulsive_gap_minutes: cfg.impulsive_gap_minutes,
            destructive_cutoff: cfg.destructive_cutoff,
            false_good_cutoff: cfg.false_good_cutoff,
        }
    }

    pub fn score(&self, store: &TradeStore) -> Vec<ScoredTrade> {
        self.score_records(store.records())
    }

    /// Scores every trade from 100 down. Population-relative thresholds are
    /// computed over `records` alone.
    pub fn score_records(&self, records: &[TradeRecord]) -> Vec<ScoredTrade> {
        let short_threshold = self.short_duration_threshold(records);

        let scored: Vec<ScoredTrade> = records
            .iter()
            .map(|r| {
                let penalties = Penalties {
                    short_duration: short_threshold.is_some_and(|t| r.duration_minutes <= t),
                    revenge: r.loss_streak_before >= self.revenge_streak,
                    impulsive: r
                        .minutes_since_prev
                        .is_some_and(|gap| gap < self.impulsive_gap_minutes),
                };
                let discipline_score = MAX_SCORE.saturating_sub(penalties.total());
                ScoredTrade {
                    record: r.clone(),
                    discipline_score,
                    label: self.label(discipline_score, r.is_win),
                    penalties,
                    cluster: None,
                }
            })
            .collect();

        debug!(
            "Scored {} trades (short-duration threshold: {:?})",
            scored.len(),
            short_threshold
        );
        scored
    }

    /// Duration at or below which a trade counts as too short.
    ///
    /// `None` when the sample is too small, or when every trade lasted the
    /// same time so none is shorter than its peers. The second case is a
    /// step: ten equal trades go unpenalized, but one longer trade added to
    /// them puts all ten at the quantile and costs each of them 30.
    pub fn short_duration_threshold(&self, records: &[TradeRecord]) -> Option<f64> {
        if records.len() <= self.min_trades_for_percentile {
            return None;
        }
        let durations: Vec<f64> = records.iter().map(|r| r.duration_minutes).collect();
        let sorted = stats::sorted(&durations);
        if sorted.first() == sorted.last() {
            return None;
        }
        Some(stats::quantile(&durations, self.short_duration_quantile))
    }

    /// First matching rule wins, so destructive always beats false-good.
    pub fn label(&self, score: u8, is_win: bool) -> TradeLabel {
        let rules = [
            (TradeLabel::Destructive, score < self.destructive_cutoff),
            (TradeLabel::FalseGood, is_win && score < self.false_good_cutoff),
        ];
        rules
            .iter()
            .find(|(_, hit)| *hit)
            .map(|(label, _)| *label)
            .unwrap_or(TradeLabel::Healthy)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisciplineSummary {
    pub total_trades: usize,
    pub mean_score: f64,
    pub median_score: f64,
    pub min_score: u8,
    pub max_score: u8,
    pub destructive_count: usize,
    pub false_good_count: usize,
    pub healthy_count: usize,
    pub pct_destructive: f64,
    pub pct_false_good: f64,
    pub pct_healthy: f64,
}

impl DisciplineSummary {
    pub fn from_scored(trades: &[ScoredTrade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }
        let scores: Vec<f64> = trades.iter().map(|t| t.discipline_score as f64).collect();
        let count = |label: TradeLabel| trades.iter().filter(|t| t.label == label).count();
        let destructive_count = count(TradeLabel::Destructive);
        let false_good_count = count(TradeLabel::FalseGood);
        let healthy_count = count(TradeLabel::Healthy);
        let n = trades.len();

        Self {
            total_trades: n,
            mean_score: stats::mean(&scores),
            median_score: stats::median(&scores),
            min_score: trades.iter().map(|t| t.discipline_score).min().unwrap_or(0),
            max_score: trades.iter().map(|t| t.discipline_score).max().unwrap_or(0),
            destructive_count,
            false_good_count,
            healthy_count,
            pct_destructive: pct(destructive_count, n),
            pct_false_good: pct(false_good_count, n),
            pct_healthy: pct(healthy_count, n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{at, default_test_config, make_trade, store_of};
    use chrono::Duration;

    fn scorer() -> DisciplineScorer {
        DisciplineScorer::new(&default_test_config())
    }

    #[test]
    fn uniform_winners_score_full_marks() {
        let base = at(2024, 1, 15, 8, 0);
        let trades: Vec<_> = (0..10)
            .map(|i| make_trade("BTC", base + Duration::minutes(30 * i), 20.0, 5.0))
            .collect();
        let scored = scorer().score(&store_of(trades));
        assert!(scored.iter().all(|t| t.discipline_score == 100));
        assert!(scored.iter().all(|t| t.label == TradeLabel::Healthy));
    }

    #[test]
    fn one_longer_trade_brings_the_duration_penalty_back() {
        let base = at(2024, 1, 15, 8, 0);
        let mut trades: Vec<_> = (0..10)
            .map(|i| make_trade("BTC", base + Duration::minutes(30 * i), 20.0, 5.0))
            .collect();
        let equal = scorer().score(&store_of(trades.clone()));
        assert!(equal.iter().all(|t| !t.penalties.short_duration));

        trades.push(make_trade("BTC", base + Duration::minutes(300), 90.0, 5.0));
        let store = store_of(trades);
        assert_eq!(scorer().short_duration_threshold(store.records()), Some(20.0));
        let scored = scorer().score(&store);
        for t in &scored {
            let expected = if t.record.duration_minutes == 20.0 { 70 } else { 100 };
            assert_eq!(t.discipline_score, expected);
        }
    }

    #[test]
    fn shortest_trades_lose_thirty() {
        let base = at(2024, 1, 15, 8, 0);
        let durations = [1.0, 2.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let trades: Vec<_> = durations
            .iter()
            .enumerate()
            .map(|(i, d)| make_trade("BTC", base + Duration::hours(3 * i as i64), *d, 5.0))
            .collect();
        let scored = scorer().score(&store_of(trades));
        // q20 = 2 + 0.8 * 28 = 24.4
        let penalized: Vec<bool> = scored.iter().map(|t| t.penalties.short_duration).collect();
        assert_eq!(penalized.iter().filter(|p| **p).count(), 2);
        for t in &scored {
            if t.record.duration_minutes <= 2.0 {
                assert_eq!(t.discipline_score, 70);
            } else {
                assert_eq!(t.discipline_score, 100);
            }
        }
    }

    #[test]
    fn percentile_skipped_for_five_or_fewer_trades() {
        let base = at(2024, 1, 15, 8, 0);
        let trades: Vec<_> = [1.0, 50.0, 60.0, 70.0, 80.0]
            .iter()
            .enumerate()
            .map(|(i, d)| make_trade("BTC", base + Duration::hours(3 * i as i64), *d, 5.0))
            .collect();
        let store = store_of(trades);
        assert_eq!(scorer().short_duration_threshold(store.records()), None);
        assert!(scorer().score(&store).iter().all(|t| t.discipline_score == 100));
    }

    #[test]
    fn penalties_stack_and_floor_at_zero() {
        let p = Penalties {
            short_duration: true,
            revenge: true,
            impulsive: true,
        };
        assert_eq!(p.total(), 60);
        assert_eq!(MAX_SCORE.saturating_sub(p.total()), 40);
        assert_eq!(10u8.saturating_sub(p.total()), 0);
    }

    #[test]
    fn destructive_takes_precedence_over_false_good() {
        let s = scorer();
        assert_eq!(s.label(39, true), TradeLabel::Destructive);
        assert_eq!(s.label(39, false), TradeLabel::Destructive);
        assert_eq!(s.label(40, true), TradeLabel::FalseGood);
        assert_eq!(s.label(59, true), TradeLabel::FalseGood);
        assert_eq!(s.label(59, false), TradeLabel::Healthy);
        assert_eq!(s.label(60, true), TradeLabel::Healthy);
    }

    #[test]
    fn rescoring_is_idempotent() {
        let base = at(2024, 1, 15, 8, 0);
        let trades: Vec<_> = [-3.0, -1.0, 4.0, -2.0, -2.0, -2.0, -2.0, -2.0, 9.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, p)| make_trade("BTC", base + Duration::minutes(4 * i as i64), 1.0 + i as f64, *p))
            .collect();
        let store = store_of(trades);
        let s = scorer();
        assert_eq!(s.score(&store), s.score(&store));
    }

    #[test]
    fn summary_counts_exclusive_labels() {
        let base = at(2024, 1, 15, 8, 0);
        // second trade opens 2 minutes after the first: impulsive, 90 and a win -> healthy
        let trades = vec![
            make_trade("BTC", base, 20.0, 5.0),
            make_trade("BTC", base + Duration::minutes(2), 30.0, 5.0),
        ];
        let scored = scorer().score(&store_of(trades));
        let summary = DisciplineSummary::from_scored(&scored);
        assert_eq!(summary.total_trades, 2);
        assert_eq!(summary.min_score, 90);
        assert_eq!(summary.max_score, 100);
        assert_eq!(summary.healthy_count, 2);
        assert_eq!(summary.pct_healthy, 100.0);
        assert_eq!(summary.mean_score, 95.0);
    }

    #[test]
    fn summary_of_nothing_is_zeroed() {
        assert_eq!(DisciplineSummary::from_scored(&[]), DisciplineSummary::default());
        assert!(scorer().score(&store_of(Vec::new())).is_empty());
    }
}
