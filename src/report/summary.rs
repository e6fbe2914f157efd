use serde::{Deserialize, Serialize};

use crate::analytics::{PerformanceStats, TradeTypeStats};
use crate::core::clustering::{ClusterProfile, Clustering};
use crate::core::dna::{Recommendation, TradeDna};
use crate::core::monte_carlo::MonteCarloSummary;
use crate::core::patterns::{BehavioralAlert, BehavioralStats};
use crate::core::scoring::{DisciplineSummary, ScoredTrade};
use crate::core::tilt::TiltIndex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Zone used for hour, day and session bucketing.
    pub timezone: String,
    /// Close-time ordered trades with score, label, cluster and trade type.
    pub trades: Vec<ScoredTrade>,
    pub discipline: DisciplineSummary,
    pub behavior: BehavioralStats,
    /// High severity first.
    pub alerts: Vec<BehavioralAlert>,
    pub tilt: TiltIndex,
    pub clustering: Clustering,
    pub clusters: Vec<ClusterProfile>,
    pub dna: Option<TradeDna>,
    pub recommendations: Vec<Recommendation>,
    pub monte_carlo: MonteCarloSummary,
    pub performance: Option<PerformanceStats>,
    pub rolling_expectancy: Vec<f64>,
    pub trade_types: Vec<TradeTypeStats>,
    /// Same rows split by long and short, empty combinations omitted.
    pub trade_types_by_direction: Vec<TradeTypeStats>,
}

impl AuditReport {
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(70));
        println!("  TRADE AUDIT");
        println!("{}", "=".repeat(70));
        println!("  Trades:      {} (times in {})", self.trades.len(), self.timezone);

        if let Some(p) = &self.performance {
            println!();
            println!("  PERFORMANCE");
            println!("  ───────────────────────────────────");
            println!("  Net PnL:     ${:+.2}", p.net_pnl);
            println!("  Gross PnL:   ${:+.2} (fees ${:.2})", p.gross_pnl, p.total_fees);
            println!("  Win/Loss:    {} / {} ({:.1}%)", p.wins, p.losses, p.win_rate);
            println!("  Avg Win:     ${:.2}", p.avg_win);
            println!("  Avg Loss:    ${:.2}", p.avg_loss);
            println!("  Avg R:R:     {}", p.avg_risk_reward);
            println!("  Profit Factor: {}", p.profit_factor);
            println!("  Expectancy:  ${:+.2} / trade", p.expectancy);
            println!("  Sharpe:      {:.2}", p.sharpe);
            println!("  Max DD:      ${:.2} (avg ${:.2})", p.max_drawdown, p.avg_drawdown);
            println!("  Recovery:    {}", p.recovery_factor);
        }

        let d = &self.discipline;
        println!();
        println!("  DISCIPLINE");
        println!("  ───────────────────────────────────");
        println!(
            "  Score:       mean {:.1} | median {:.1} | min {} | max {}",
            d.mean_score, d.median_score, d.min_score, d.max_score
        );
        println!(
            "  Labels:      destructive {:.1}% | false-good {:.1}% | healthy {:.1}%",
            d.pct_destructive, d.pct_false_good, d.pct_healthy
        );

        println!();
        println!("  TILT");
        println!("  ───────────────────────────────────");
        println!("  {} {}/100 ({})", self.tilt.emoji, self.tilt.score, self.tilt.status);
        for alert in &self.tilt.alerts {
            println!("  - {}", alert);
        }

        if !self.alerts.is_empty() {
            println!();
            println!("  BEHAVIOR");
            println!("  ───────────────────────────────────");
            for alert in &self.alerts {
                println!("  [{}] {}: {}", alert.severity, alert.kind, alert.message);
            }
        }

        if !self.clusters.is_empty() {
            println!();
            println!("  CLUSTERS");
            println!("  ───────────────────────────────────");
            for c in &self.clusters {
                println!("  {}", c.describe());
            }
        }

        if let Some(dna) = &self.dna {
            println!();
            println!("  TRADE DNA (cluster {})", dna.cluster);
            println!("  ───────────────────────────────────");
            println!(
                "  {} trades | PnL ${:+.2} | WR {:.1}% | discipline {:.1}",
                dna.trade_count, dna.total_pnl, dna.win_rate, dna.mean_discipline
            );
            println!(
                "  Median hold {:.1} min | hour {}h | LONG {:.0}% / SHORT {:.0}%",
                dna.median_duration, dna.dominant_hour, dna.pct_long, dna.pct_short
            );
            for rec in &self.recommendations {
                println!("  > {}", rec);
            }
        }

        if !self.trade_types.is_empty() {
            println!();
            println!("  BY TRADE TYPE");
            println!("  ───────────────────────────────────");
            for t in &self.trade_types {
                println!(
                    "  {:>13}: {} trades | WR {:.0}% | PnL ${:+.2} | PF {} | DD ${:.2}",
                    t.trade_type, t.count, t.win_rate, t.net_pnl, t.profit_factor, t.max_drawdown
                );
            }
            for t in &self.trade_types_by_direction {
                let side = t.direction.map_or("-", |d| d.as_str());
                println!(
                    "  {:>13} {:<5}: {} trades | WR {:.0}% | PnL ${:+.2} | PF {}",
                    t.trade_type, side, t.count, t.win_rate, t.net_pnl, t.profit_factor
                );
            }
        }

        let mc = &self.monte_carlo;
        if mc.trials > 0 && !self.trades.is_empty() {
            println!();
            println!("  MONTE CARLO ({} trials, seed {})", mc.trials, mc.seed);
            println!("  ───────────────────────────────────");
            println!(
                "  Final PnL:   p5 ${:+.2} | median ${:+.2} | p95 ${:+.2}",
                mc.p05_final, mc.median_final, mc.p95_final
            );
            println!(
                "  Drawdown:    mean ${:.2} | worst ${:.2} | realized ${:.2}",
                mc.mean_drawdown, mc.worst_drawdown, mc.realized_drawdown
            );
        }

        println!("{}", "=".repeat(70));
    }
}
