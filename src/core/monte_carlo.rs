use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::core::rng::stream_rng;
use crate::core::stats;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub final_pnl: f64,
    /// Deepest point of cumulative PnL below its running peak; zero or negative.
    pub max_drawdown: f64,
}

/// Distribution of final PnL and drawdown across reordered trials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub trials: usize,
    pub seed: u64,
    pub mean_final: f64,
    pub median_final: f64,
    pub p05_final: f64,
    pub p95_final: f64,
    pub worst_final: f64,
    pub best_final: f64,
    pub mean_drawdown: f64,
    pub worst_drawdown: f64,
    /// The sequence as actually traded, for comparison.
    pub realized_final: f64,
    pub realized_drawdown: f64,
}

pub struct MonteCarloSimulator {
    trials: usize,
    seed: u64,
}

impl MonteCarloSimulator {
    pub fn new(cfg: &Config) -> Self {
        Self {
            trials: cfg.monte_carlo_trials,
            seed: cfg.seed,
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// One independent permutation per trial, each from its own generator.
    pub fn run_trials(&self, pnls: &[f64]) -> Vec<TrialResult> {
        let mut shuffled = pnls.to_vec();
        (0..self.trials)
            .map(|trial| {
                let mut rng = stream_rng(self.seed, trial as u64);
                shuffled.copy_from_slice(pnls);
                shuffled.shuffle(&mut rng);
                TrialResult {
                    final_pnl: shuffled.iter().sum(),
                    max_drawdown: stats::max_drawdown(&shuffled),
                }
            })
            .collect()
    }

    pub fn simulate(&self, pnls: &[f64]) -> MonteCarloSummary {
        if pnls.is_empty() || self.trials == 0 {
            return MonteCarloSummary {
                trials: self.trials,
                seed: self.seed,
                ..MonteCarloSummary::default()
            };
        }

        let results = self.run_trials(pnls);
        let finals: Vec<f64> = results.iter().map(|r| r.final_pnl).collect();
        let drawdowns: Vec<f64> = results.iter().map(|r| r.max_drawdown).collect();

        let summary = MonteCarloSummary {
            trials: self.trials,
            seed: self.seed,
            mean_final: stats::mean(&finals),
            median_final: stats::median(&finals),
            p05_final: stats::quantile(&finals, 0.05),
            p95_final: stats::quantile(&finals, 0.95),
            worst_final: finals.iter().copied().fold(f64::INFINITY, f64::min),
            best_final: finals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean_drawdown: stats::mean(&drawdowns),
            worst_drawdown: drawdowns.iter().copied().fold(0.0, f64::min),
            realized_final: pnls.iter().sum(),
            realized_drawdown: stats::max_drawdown(pnls),
        };
        info!(
            "Monte Carlo: {} trials, median final {:.2}, worst drawdown {:.2}",
            summary.trials, summary.median_final, summary.worst_drawdown
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;
    use approx::assert_relative_eq;

    fn simulator(trials: usize) -> MonteCarloSimulator {
        MonteCarloSimulator::new(&default_test_config()).with_trials(trials)
    }

    #[test]
    fn final_pnl_is_order_independent() {
        let pnls = [10.0, -4.0, 7.5, -12.0, 3.0, 1.25];
        let s = simulator(200).simulate(&pnls);
        assert_relative_eq!(s.mean_final, 5.75, epsilon = 1e-9);
        assert_relative_eq!(s.worst_final, 5.75, epsilon = 1e-9);
        assert_relative_eq!(s.best_final, 5.75, epsilon = 1e-9);
        assert_relative_eq!(s.p05_final, 5.75, epsilon = 1e-9);
        assert_eq!(s.realized_final, 5.75);
    }

    #[test]
    fn drawdowns_vary_with_order() {
        let pnls = [10.0, -4.0, 7.5, -12.0, 3.0, 1.25, -6.0, 9.0];
        let trials = simulator(300).run_trials(&pnls);
        let first = trials[0].max_drawdown;
        assert!(trials.iter().any(|t| t.max_drawdown != first));
        assert!(trials.iter().all(|t| t.max_drawdown <= 0.0));
    }

    #[test]
    fn worst_drawdown_bounded_by_total_losses() {
        let pnls = [5.0, -3.0, -2.0, 4.0, -1.0];
        let s = simulator(500).simulate(&pnls);
        assert!(s.worst_drawdown >= -6.0);
        assert!(s.worst_drawdown <= s.mean_drawdown);
    }

    #[test]
    fn same_seed_reproduces() {
        let pnls = [1.0, -2.0, 3.0, -4.0, 5.0];
        assert_eq!(simulator(50).run_trials(&pnls), simulator(50).run_trials(&pnls));
    }

    #[test]
    fn realized_drawdown_uses_actual_order() {
        let s = simulator(10).simulate(&[5.0, -2.0, -3.0, 4.0]);
        assert_eq!(s.realized_drawdown, -5.0);
    }

    #[test]
    fn empty_input_gives_zeroed_summary() {
        let s = simulator(100).simulate(&[]);
        assert_eq!(s.trials, 100);
        assert_eq!(s.mean_final, 0.0);
        assert_eq!(s.worst_drawdown, 0.0);
    }
}
