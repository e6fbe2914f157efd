use tracing::{info, warn};

use crate::analytics::{by_trade_type, by_type_and_direction, rolling_expectancy, PerformanceStats};
use crate::config::Config;
use crate::core::clustering::{profile_clusters, ClusterModel};
use crate::core::dna::{extract_dna, recommendations};
use crate::core::monte_carlo::MonteCarloSimulator;
use crate::core::patterns::PatternDetector;
use crate::core::scoring::{DisciplineScorer, DisciplineSummary};
use crate::core::store::TradeStore;
use crate::core::tilt::TiltCalculator;
use crate::error::Result;
use crate::models::Trade;

use super::summary::AuditReport;

/// Runs every analysis stage over one trade history.
///
/// Stages run in a fixed order: store, scoring, clustering, then the
/// independent consumers of the clustered sequence.
pub struct Auditor {
    config: Config,
    scorer: DisciplineScorer,
    clusters: ClusterModel,
    patterns: PatternDetector,
    tilt: TiltCalculator,
    monte_carlo: MonteCarloSimulator,
}

impl Auditor {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scorer: DisciplineScorer::new(&config),
            clusters: ClusterModel::new(&config),
            patterns: PatternDetector::new(&config),
            tilt: TiltCalculator::new(&config),
            monte_carlo: MonteCarloSimulator::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self, trades: Vec<Trade>) -> Result<AuditReport> {
        let store = TradeStore::build(trades, self.config.timezone)?;
        self.run_store(&store)
    }

    /// Audits only the given symbols. Sequential features are recomputed
    /// over the subset, so streaks and gaps differ from the full history.
    pub fn run_for_symbols<S: AsRef<str>>(
        &self,
        trades: Vec<Trade>,
        symbols: &[S],
    ) -> Result<AuditReport> {
        let store = TradeStore::build(trades, self.config.timezone)?;
        let subset = store.filter_symbols(symbols)?;
        info!("Filtered {} trades down to {}", store.len(), subset.len());
        self.run_store(&subset)
    }

    pub fn run_store(&self, store: &TradeStore) -> Result<AuditReport> {
        if store.is_empty() {
            warn!("No trades to audit");
        }
        info!("Auditing {} trades", store.len());

        let scored = self.scorer.score(store);
        let discipline = DisciplineSummary::from_scored(&scored);

        let (trades, clustering) = self.clusters.assign(&scored);
        let clusters = profile_clusters(&trades)?;
        let dna = extract_dna(&trades)?;
        let recommendations = dna.as_ref().map(recommendations).unwrap_or_default();

        let behavior = self.patterns.analyze(&trades);
        let alerts = self.patterns.alerts(&behavior);
        let tilt = self.tilt.evaluate(&trades);

        let pnls = store.pnls();
        let monte_carlo = self.monte_carlo.simulate(&pnls);
        let performance = PerformanceStats::from_records(store.records());
        let rolling = rolling_expectancy(&pnls, self.config.rolling_window);
        let trade_types = by_trade_type(store.records());
        let trade_types_by_direction = by_type_and_direction(store.records());

        info!(
            "Audit done: mean discipline {:.1}, {} alerts, tilt {} ({})",
            discipline.mean_score,
            alerts.len(),
            tilt.score,
            tilt.status
        );

        Ok(AuditReport {
            timezone: store.timezone().name().to_string(),
            trades,
            discipline,
            behavior,
            alerts,
            tilt,
            clustering,
            clusters,
            dna,
            recommendations,
            monte_carlo,
            performance,
            rolling_expectancy: rolling,
            trade_types,
            trade_types_by_direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use crate::models::Direction;
    use crate::test_helpers::{default_test_config, trades_from_pnls};

    #[test]
    fn rejects_invalid_config() {
        let cfg = Config {
            cluster_count: 0,
            ..default_test_config()
        };
        assert!(matches!(Auditor::new(cfg), Err(AuditError::InvalidConfig(_))));
    }

    #[test]
    fn empty_history_yields_neutral_report() {
        let report = Auditor::new(default_test_config()).unwrap().run(Vec::new()).unwrap();
        assert!(report.trades.is_empty());
        assert_eq!(report.tilt.score, 100);
        assert!(report.dna.is_none());
        assert!(report.recommendations.is_empty());
        assert!(report.performance.is_none());
        assert_eq!(report.monte_carlo.mean_final, 0.0);
    }

    #[test]
    fn every_trade_is_clustered() {
        let trades = trades_from_pnls(&[5.0, -2.0, 3.0, -1.0, 8.0, -4.0, 2.0], 45);
        let report = Auditor::new(default_test_config()).unwrap().run(trades).unwrap();
        assert_eq!(report.trades.len(), 7);
        assert!(report.trades.iter().all(|t| t.cluster.is_some()));
        assert!(report.dna.is_some());
        assert_eq!(report.timezone, "UTC");
    }

    #[test]
    fn direction_breakdown_covers_every_trade() {
        let mut trades = trades_from_pnls(&[5.0, -2.0, 3.0, -1.0], 45);
        trades[1].direction = Some(Direction::Short);
        let report = Auditor::new(default_test_config()).unwrap().run(trades).unwrap();
        let rows = &report.trade_types_by_direction;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].direction, Some(Direction::Long));
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[1].direction, Some(Direction::Short));
        assert_eq!(rows[1].count, 1);
    }
}
