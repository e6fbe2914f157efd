//! Small numeric helpers shared by the engine stages.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Quantile with linear interpolation between closest ranks, `q` in [0, 1].
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let s = sorted(values);
    let pos = q.clamp(0.0, 1.0) * (s.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    s[lo] + (s[hi] - s[lo]) * (pos - lo as f64)
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Population standard deviation (n denominator).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Drawdown of each point of the cumulative PnL curve below its running peak.
/// Values are zero or negative.
pub fn drawdown_curve(pnls: &[f64]) -> Vec<f64> {
    let mut cum = 0.0;
    let mut peak = f64::NEG_INFINITY;
    pnls.iter()
        .map(|p| {
            cum += p;
            peak = peak.max(cum);
            cum - peak
        })
        .collect()
}

/// Deepest point of the drawdown curve, 0.0 for an empty or monotone curve.
pub fn max_drawdown(pnls: &[f64]) -> f64 {
    drawdown_curve(pnls).into_iter().fold(0.0, f64::min)
}

/// Values sharing the highest count, in ascending order.
pub fn modes<T: Eq + Hash + Ord + Copy>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut counts: HashMap<T, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let Some(best) = counts.values().copied().max() else {
        return Vec::new();
    };
    let mut out: Vec<T> = counts
        .into_iter()
        .filter(|(_, c)| *c == best)
        .map(|(v, _)| v)
        .collect();
    out.sort();
    out
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        // position 0.2 * 9 = 1.8 -> 2 + 0.8 * (3 - 2)
        assert_relative_eq!(quantile(&v, 0.2), 2.8);
        assert_relative_eq!(median(&v), 5.5);
        assert_relative_eq!(quantile(&[4.0, 1.0, 3.0], 0.5), 3.0);
    }

    #[test]
    fn quantile_of_empty_is_zero() {
        assert_eq!(quantile(&[], 0.2), 0.0);
    }

    #[test]
    fn std_variants() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(population_std(&v), 2.0);
        assert_relative_eq!(sample_std(&v), 2.138_089_935_299_395, epsilon = 1e-12);
        assert_eq!(sample_std(&[3.0]), 0.0);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let pnls = [10.0, -4.0, -3.0, 8.0, -20.0];
        assert_eq!(drawdown_curve(&pnls), vec![0.0, -4.0, -7.0, 0.0, -20.0]);
        assert_eq!(max_drawdown(&pnls), -20.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn drawdown_counts_from_first_trade_when_starting_with_loss() {
        // peak starts at the first cumulative value, not at zero
        assert_eq!(max_drawdown(&[-5.0, -5.0]), -5.0);
    }

    #[test]
    fn modes_returns_ties_sorted() {
        assert_eq!(modes([3u32, 1, 3, 1, 2]), vec![1, 3]);
        assert_eq!(modes([7u32]), vec![7]);
        assert!(modes(Vec::<u32>::new()).is_empty());
    }
}
