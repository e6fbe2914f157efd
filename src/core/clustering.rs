use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::core::rng::stream_rng;
use crate::core::scoring::ScoredTrade;
use crate::core::stats::{self, modes, pct};
use crate::error::{AuditError, Result};
use crate::models::{ClusterLabel, Direction};

pub const FEATURES: [&str; DIMS] = ["duration_minutes", "hour", "pnl", "discipline_score"];
const DIMS: usize = 4;
const CONVERGENCE_TOL: f64 = 1e-10;

type Point = [f64; DIMS];

/// Result of partitioning a scored sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clustering {
    /// Number of non-empty clusters actually produced.
    pub k: usize,
    /// Cluster id per trade, in sequence order. Ids follow first appearance.
    pub assignments: Vec<usize>,
    /// Centroids in standardized feature space, indexed by cluster id.
    pub centroids: Vec<Point>,
    pub inertia: f64,
}

/// Seeded k-means over standardized behavioral features.
pub struct ClusterModel {
    k: usize,
    restarts: usize,
    max_iterations: usize,
    seed: u64,
}

impl ClusterModel {
    pub fn new(cfg: &Config) -> Self {
        Self {
            k: cfg.cluster_count.max(1),
            restarts: cfg.cluster_restarts.max(1),
            max_iterations: cfg.cluster_max_iterations.max(1),
            seed: cfg.seed,
        }
    }

    pub fn fit(&self, trades: &[ScoredTrade]) -> Clustering {
        if trades.is_empty() {
            return Clustering {
                k: 0,
                assignments: Vec::new(),
                centroids: Vec::new(),
                inertia: 0.0,
            };
        }

        let points = standardize(&feature_matrix(trades));
        let k = self.k.min(points.len());
        if k < self.k {
            debug!("Only {} trades; reducing cluster count from {} to {}", points.len(), self.k, k);
        }

        let mut best: Option<(Vec<usize>, Vec<Point>, f64)> = None;
        for restart in 0..self.restarts {
            let mut rng = stream_rng(self.seed, restart as u64);
            let (labels, centroids, inertia) = self.lloyd(&points, k, &mut rng);
            debug!("k-means restart {}: inertia {:.4}", restart, inertia);
            if best.as_ref().map_or(true, |(_, _, b)| inertia < *b) {
                best = Some((labels, centroids, inertia));
            }
        }

        let (labels, centroids, inertia) = best.unwrap_or_default();
        let clustering = relabel(labels, centroids, inertia);
        info!(
            "Clustered {} trades into {} groups (inertia {:.4})",
            trades.len(),
            clustering.k,
            clustering.inertia
        );
        clustering
    }

    /// Returns a copy of the trades carrying their cluster ids.
    pub fn assign(&self, trades: &[ScoredTrade]) -> (Vec<ScoredTrade>, Clustering) {
        let clustering = self.fit(trades);
        let clustered = trades
            .iter()
            .zip(&clustering.assignments)
            .map(|(t, c)| ScoredTrade {
                cluster: Some(*c),
                ..t.clone()
            })
            .collect();
        (clustered, clustering)
    }

    fn lloyd(&self, points: &[Point], k: usize, rng: &mut StdRng) -> (Vec<usize>, Vec<Point>, f64) {
        let mut centroids = kmeans_plus_plus(points, k, rng);
        let mut labels = vec![0usize; points.len()];

        for _ in 0..self.max_iterations {
            for (label, p) in labels.iter_mut().zip(points) {
                *label = nearest(p, &centroids).0;
            }

            let mut sums = vec![[0.0; DIMS]; k];
            let mut counts = vec![0usize; k];
            for (label, p) in labels.iter().zip(points) {
                counts[*label] += 1;
                for d in 0..DIMS {
                    sums[*label][d] += p[d];
                }
            }

            let mut shift = 0.0;
            for c in 0..k {
                // an emptied cluster keeps its previous centroid
                if counts[c] == 0 {
                    continue;
                }
                let mut next = [0.0; DIMS];
                for d in 0..DIMS {
                    next[d] = sums[c][d] / counts[c] as f64;
                }
                shift += sq_dist(&next, &centroids[c]);
                centroids[c] = next;
            }

            if shift <= CONVERGENCE_TOL {
                break;
            }
        }

        let mut inertia = 0.0;
        for (label, p) in labels.iter_mut().zip(points) {
            let (c, d) = nearest(p, &centroids);
            *label = c;
            inertia += d;
        }
        (labels, centroids, inertia)
    }
}

/// Raw features per trade; non-finite entries are replaced with the column median.
fn feature_matrix(trades: &[ScoredTrade]) -> Vec<Point> {
    let mut rows: Vec<Point> = trades
        .iter()
        .map(|t| {
            [
                t.record.duration_minutes,
                t.record.hour as f64,
                t.pnl(),
                t.discipline_score as f64,
            ]
        })
        .collect();

    for d in 0..DIMS {
        let finite: Vec<f64> = rows.iter().map(|r| r[d]).filter(|v| v.is_finite()).collect();
        let fill = stats::median(&finite);
        for r in rows.iter_mut() {
            if !r[d].is_finite() {
                r[d] = fill;
            }
        }
    }
    rows
}

/// Zero mean, unit variance per column over this sequence only. A constant
/// column keeps a unit scale and becomes all zeros.
fn standardize(rows: &[Point]) -> Vec<Point> {
    let mut means = [0.0; DIMS];
    let mut scales = [1.0; DIMS];
    for d in 0..DIMS {
        let col: Vec<f64> = rows.iter().map(|r| r[d]).collect();
        means[d] = stats::mean(&col);
        let sd = stats::population_std(&col);
        if sd > 0.0 {
            scales[d] = sd;
        }
    }
    rows.iter()
        .map(|r| {
            let mut out = [0.0; DIMS];
            for d in 0..DIMS {
                out[d] = (r[d] - means[d]) / scales[d];
            }
            out
        })
        .collect()
}

fn kmeans_plus_plus(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    while centroids.len() < k {
        let weights: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
        let total: f64 = weights.iter().sum();
        let idx = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        } else {
            // every point coincides with a centroid already
            rng.gen_range(0..points.len())
        };
        centroids.push(points[idx]);
    }
    centroids
}

fn sq_dist(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Closest centroid and squared distance; ties go to the lower index.
fn nearest(p: &Point, centroids: &[Point]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = sq_dist(p, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Renumbers clusters by first appearance and drops empty ones.
fn relabel(labels: Vec<usize>, centroids: Vec<Point>, inertia: f64) -> Clustering {
    let mut mapping: Vec<Option<usize>> = vec![None; centroids.len()];
    let mut ordered = Vec::new();
    let assignments = labels
        .into_iter()
        .map(|l| {
            *mapping[l].get_or_insert_with(|| {
                ordered.push(centroids[l]);
                ordered.len() - 1
            })
        })
        .collect();
    Clustering {
        k: ordered.len(),
        assignments,
        centroids: ordered,
        inertia,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub cluster: usize,
    pub trade_count: usize,
    pub total_pnl: f64,
    pub mean_pnl: f64,
    pub median_duration: f64,
    pub mean_duration: f64,
    pub dominant_hour: u32,
    pub mean_discipline: f64,
    pub win_rate: f64,
    /// `None` when long and short are equally frequent.
    pub dominant_direction: Option<Direction>,
    pub label: ClusterLabel,
}

impl ClusterProfile {
    pub fn describe(&self) -> String {
        format!(
            "Cluster {} ({}): {} trades, PnL {:+.2}, median duration {:.1} min, hour {}h, win rate {:.1}%, discipline {:.1}/100",
            self.cluster,
            self.label,
            self.trade_count,
            self.total_pnl,
            self.median_duration,
            self.dominant_hour,
            self.win_rate,
            self.mean_discipline
        )
    }
}

/// Profiles every cluster, sorted by id. Fails if any trade lacks an assignment.
pub fn profile_clusters(trades: &[ScoredTrade]) -> Result<Vec<ClusterProfile>> {
    let groups = group_by_cluster(trades)?;
    Ok(groups
        .into_iter()
        .enumerate()
        .filter(|(_, members)| !members.is_empty())
        .map(|(id, members)| profile(id, &members))
        .collect())
}

pub(crate) fn group_by_cluster(trades: &[ScoredTrade]) -> Result<Vec<Vec<&ScoredTrade>>> {
    let mut groups: Vec<Vec<&ScoredTrade>> = Vec::new();
    for (index, t) in trades.iter().enumerate() {
        let c = t.cluster.ok_or(AuditError::NotClustered { index })?;
        if groups.len() <= c {
            groups.resize_with(c + 1, Vec::new);
        }
        groups[c].push(t);
    }
    Ok(groups)
}

fn profile(cluster: usize, members: &[&ScoredTrade]) -> ClusterProfile {
    let pnls: Vec<f64> = members.iter().map(|t| t.pnl()).collect();
    let durations: Vec<f64> = members.iter().map(|t| t.record.duration_minutes).collect();
    let discipline: Vec<f64> = members.iter().map(|t| t.discipline_score as f64).collect();
    let hours: Vec<u32> = members.iter().map(|t| t.record.hour).collect();
    let wins = members.iter().filter(|t| t.record.is_win).count();

    let total_pnl: f64 = pnls.iter().sum();
    let mean_discipline = stats::mean(&discipline);
    let median_duration = stats::median(&durations);

    ClusterProfile {
        cluster,
        trade_count: members.len(),
        total_pnl,
        mean_pnl: stats::mean(&pnls),
        median_duration,
        mean_duration: stats::mean(&durations),
        dominant_hour: dominant_hour(&hours),
        mean_discipline,
        win_rate: pct(wins, members.len()),
        dominant_direction: unique_mode(members.iter().map(|t| t.record.side)),
        label: label_cluster(total_pnl, mean_discipline, median_duration),
    }
}

pub fn label_cluster(total_pnl: f64, mean_discipline: f64, median_duration: f64) -> ClusterLabel {
    if total_pnl > 0.0 && mean_discipline > 70.0 {
        ClusterLabel::Optimal
    } else if total_pnl < 0.0 && mean_discipline < 50.0 {
        ClusterLabel::Destructive
    } else if median_duration < 10.0 {
        ClusterLabel::RapidScalp
    } else {
        ClusterLabel::Mixed
    }
}

/// Most frequent hour; a tie resolves to the median hour of the group.
pub(crate) fn dominant_hour(hours: &[u32]) -> u32 {
    match modes(hours.iter().copied()).as_slice() {
        [single] => *single,
        _ => {
            let as_f64: Vec<f64> = hours.iter().map(|h| *h as f64).collect();
            stats::median(&as_f64).floor() as u32
        }
    }
}

/// The single most frequent value, or `None` on a tie or empty input.
pub(crate) fn unique_mode<T: Eq + std::hash::Hash + Ord + Copy>(
    values: impl IntoIterator<Item = T>,
) -> Option<T> {
    match modes(values).as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::DisciplineScorer;
    use crate::test_helpers::{at, default_test_config, make_trade, store_of};
    use chrono::Duration;

    /// Two well separated regimes: quick losing scalps around 03h and long
    /// winning holds around 15h.
    fn two_regimes() -> Vec<ScoredTrade> {
        let cfg = default_test_config();
        let mut trades = Vec::new();
        for day in 0..6 {
            let d = at(2024, 1, 15, 3, 0) + Duration::days(day);
            trades.push(make_trade("DOGE", d, 2.0, -8.0));
            trades.push(make_trade("BTC", d + Duration::hours(12), 180.0, 25.0));
        }
        DisciplineScorer::new(&cfg).score(&store_of(trades))
    }

    fn model(k: usize) -> ClusterModel {
        ClusterModel::new(&Config {
            cluster_count: k,
            ..default_test_config()
        })
    }

    #[test]
    fn separates_distinct_regimes() {
        let trades = two_regimes();
        let (clustered, c) = model(2).assign(&trades);
        assert_eq!(c.k, 2);
        for t in &clustered {
            let expected = if t.record.symbol() == "DOGE" { 0 } else { 1 };
            assert_eq!(t.cluster, Some(expected));
        }
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let trades = two_regimes();
        let a = model(3).fit(&trades);
        let b = model(3).fit(&trades);
        assert_eq!(a, b);
    }

    #[test]
    fn cluster_count_reduced_to_trade_count() {
        let trades: Vec<ScoredTrade> = two_regimes().into_iter().take(2).collect();
        let c = model(3).fit(&trades);
        assert_eq!(c.assignments.len(), 2);
        assert!(c.k <= 2);
    }

    #[test]
    fn identical_trades_collapse_to_one_cluster() {
        let one = two_regimes().remove(0);
        let same: Vec<ScoredTrade> = std::iter::repeat(one).take(5).collect();
        let c = model(3).fit(&same);
        assert_eq!(c.k, 1);
        assert!(c.assignments.iter().all(|a| *a == 0));
        assert_eq!(c.inertia, 0.0);
    }

    #[test]
    fn empty_input_gives_empty_clustering() {
        let c = model(3).fit(&[]);
        assert_eq!(c.k, 0);
        assert!(c.assignments.is_empty());
    }

    #[test]
    fn constant_column_standardizes_to_zero() {
        let rows = vec![[1.0, 5.0, 2.0, 100.0], [3.0, 5.0, 4.0, 100.0]];
        let z = standardize(&rows);
        assert_eq!(z[0], [-1.0, 0.0, -1.0, 0.0]);
        assert_eq!(z[1], [1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn profiles_require_assignments() {
        let trades = two_regimes();
        assert_eq!(
            profile_clusters(&trades),
            Err(AuditError::NotClustered { index: 0 })
        );
    }

    #[test]
    fn profiles_and_labels() {
        let (clustered, _) = model(2).assign(&two_regimes());
        let profiles = profile_clusters(&clustered).unwrap();
        assert_eq!(profiles.len(), 2);

        let scalps = &profiles[0];
        assert_eq!(scalps.trade_count, 6);
        assert_eq!(scalps.total_pnl, -48.0);
        assert_eq!(scalps.dominant_hour, 3);
        assert_eq!(scalps.win_rate, 0.0);
        // scalps keep 70 after the duration penalty, too high for destructive
        assert_eq!(scalps.label, ClusterLabel::RapidScalp);

        let holds = &profiles[1];
        assert_eq!(holds.total_pnl, 150.0);
        assert_eq!(holds.dominant_hour, 18);
        assert_eq!(holds.win_rate, 100.0);
        assert_eq!(holds.label, ClusterLabel::Optimal);
    }

    #[test]
    fn label_rules_in_order() {
        assert_eq!(label_cluster(10.0, 80.0, 2.0), ClusterLabel::Optimal);
        assert_eq!(label_cluster(-10.0, 40.0, 2.0), ClusterLabel::Destructive);
        assert_eq!(label_cluster(-10.0, 60.0, 2.0), ClusterLabel::RapidScalp);
        assert_eq!(label_cluster(10.0, 60.0, 30.0), ClusterLabel::Mixed);
    }

    #[test]
    fn hour_tie_resolves_to_median() {
        assert_eq!(dominant_hour(&[9, 9, 14]), 9);
        assert_eq!(dominant_hour(&[8, 10, 12]), 10);
        assert_eq!(dominant_hour(&[8, 8, 11, 11]), 9);
    }

    #[test]
    fn direction_tie_is_none() {
        assert_eq!(unique_mode([Direction::Long, Direction::Short]), None);
        assert_eq!(
            unique_mode([Direction::Long, Direction::Short, Direction::Short]),
            Some(Direction::Short)
        );
    }
}
