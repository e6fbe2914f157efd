use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Clustering
    pub cluster_count: usize,
    pub cluster_restarts: usize,
    pub cluster_max_iterations: usize,

    // Discipline scoring
    pub short_duration_quantile: f64,
    pub min_trades_for_percentile: usize,
    pub revenge_streak: u32,
    pub impulsive_gap_minutes: f64,
    pub destructive_cutoff: u8,
    pub false_good_cutoff: u8,

    // Robustness
    pub monte_carlo_trials: usize,
    pub seed: u64,

    // Reporting
    pub timezone: Tz,
    pub rolling_window: usize,

    // Logging
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cluster_count: 3,
            cluster_restarts: 10,
            cluster_max_iterations: 300,
            short_duration_quantile: 0.20,
            min_trades_for_percentile: 5,
            revenge_streak: 5,
            impulsive_gap_minutes: 5.0,
            destructive_cutoff: 40,
            false_good_cutoff: 60,
            monte_carlo_trials: 1000,
            seed: 42,
            timezone: chrono_tz::Europe::Zurich,
            rolling_window: 20,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str| std::env::var(key).ok();
        let d = Config::default();

        Config {
            cluster_count: parse_or(env("AUDIT_CLUSTERS"), d.cluster_count),
            cluster_restarts: parse_or(env("AUDIT_CLUSTER_RESTARTS"), d.cluster_restarts),
            cluster_max_iterations: parse_or(env("AUDIT_CLUSTER_MAX_ITER"), d.cluster_max_iterations),
            short_duration_quantile: parse_or(env("AUDIT_SHORT_QUANTILE"), d.short_duration_quantile),
            min_trades_for_percentile: parse_or(
                env("AUDIT_MIN_TRADES_PERCENTILE"),
                d.min_trades_for_percentile,
            ),
            revenge_streak: parse_or(env("AUDIT_REVENGE_STREAK"), d.revenge_streak),
            impulsive_gap_minutes: parse_or(env("AUDIT_IMPULSIVE_GAP_MIN"), d.impulsive_gap_minutes),
            destructive_cutoff: parse_or(env("AUDIT_DESTRUCTIVE_CUTOFF"), d.destructive_cutoff),
            false_good_cutoff: parse_or(env("AUDIT_FALSE_GOOD_CUTOFF"), d.false_good_cutoff),
            monte_carlo_trials: parse_or(env("AUDIT_MC_TRIALS"), d.monte_carlo_trials),
            seed: parse_or(env("AUDIT_SEED"), d.seed),
            timezone: parse_or(env("AUDIT_TIMEZONE"), d.timezone),
            rolling_window: parse_or(env("AUDIT_ROLLING_WINDOW"), d.rolling_window),
            log_level: env("AUDIT_LOG_LEVEL").unwrap_or(d.log_level),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cluster_count == 0 {
            return Err(AuditError::InvalidConfig(
                "cluster_count must be at least 1".into(),
            ));
        }
        if self.cluster_restarts == 0 || self.cluster_max_iterations == 0 {
            return Err(AuditError::InvalidConfig(
                "cluster restarts and iterations must be at least 1".into(),
            ));
        }
        if !(self.short_duration_quantile > 0.0 && self.short_duration_quantile < 1.0) {
            return Err(AuditError::InvalidConfig(format!(
                "short_duration_quantile {} outside (0, 1)",
                self.short_duration_quantile
            )));
        }
        if self.destructive_cutoff > self.false_good_cutoff || self.false_good_cutoff > 100 {
            return Err(AuditError::InvalidConfig(format!(
                "cutoffs must satisfy destructive ({}) <= false-good ({}) <= 100",
                self.destructive_cutoff, self.false_good_cutoff
            )));
        }
        if self.revenge_streak == 0 {
            return Err(AuditError::InvalidConfig(
                "revenge_streak must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.cluster_count, 3);
        assert_eq!(cfg.revenge_streak, 5);
        assert_eq!(cfg.monte_carlo_trials, 1000);
        assert_eq!((cfg.destructive_cutoff, cfg.false_good_cutoff), (40, 60));
    }

    #[test]
    fn rejects_zero_clusters() {
        let cfg = Config {
            cluster_count: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(AuditError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_inverted_cutoffs() {
        let cfg = Config {
            destructive_cutoff: 70,
            false_good_cutoff: 60,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or(Some("7".into()), 3usize), 7);
        assert_eq!(parse_or(Some("seven".into()), 3usize), 3);
        assert_eq!(parse_or::<Tz>(Some("America/New_York".into()), Tz::UTC), chrono_tz::America::New_York);
        assert_eq!(parse_or(None, 0.2f64), 0.2);
    }
}
