use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::clustering::{dominant_hour, group_by_cluster, unique_mode};
use crate::core::scoring::ScoredTrade;
use crate::core::stats::{self, pct};
use crate::error::Result;
use crate::models::{Direction, Session};

const TOP_SYMBOLS: usize = 3;
const DIRECTION_FOCUS_PCT: f64 = 70.0;
const PATIENT_MEDIAN_MINUTES: f64 = 30.0;
const STRONG_DISCIPLINE: f64 = 80.0;
const WEAK_DISCIPLINE: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolCount {
    pub symbol: String,
    pub count: usize,
}

/// Profile of the most profitable behavioral cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDna {
    pub cluster: usize,
    pub trade_count: usize,
    pub total_pnl: f64,
    pub mean_pnl: f64,
    pub median_duration: f64,
    pub mean_duration: f64,
    pub dominant_hour: u32,
    /// `None` on a tie.
    pub dominant_session: Option<Session>,
    /// `None` on a tie.
    pub dominant_direction: Option<Direction>,
    pub pct_long: f64,
    pub pct_short: f64,
    pub mean_discipline: f64,
    pub median_discipline: f64,
    pub win_rate: f64,
    pub top_symbols: Vec<SymbolCount>,
}

/// Picks the cluster with the largest total PnL (lowest id on a tie).
/// Returns `Ok(None)` for an empty sequence and an error when any trade is unclustered.
pub fn extract_dna(trades: &[ScoredTrade]) -> Result<Option<TradeDna>> {
    let groups = group_by_cluster(trades)?;

    let mut best: Option<(usize, f64)> = None;
    for (id, members) in groups.iter().enumerate() {
        if members.is_empty() {
            continue;
        }
        let total: f64 = members.iter().map(|t| t.pnl()).sum();
        if best.map_or(true, |(_, b)| total > b) {
            best = Some((id, total));
        }
    }

    let Some((cluster, total_pnl)) = best else {
        return Ok(None);
    };
    debug!("DNA cluster {} with total PnL {:.2}", cluster, total_pnl);

    let members = &groups[cluster];
    let n = members.len();
    let pnls: Vec<f64> = members.iter().map(|t| t.pnl()).collect();
    let durations: Vec<f64> = members.iter().map(|t| t.record.duration_minutes).collect();
    let discipline: Vec<f64> = members.iter().map(|t| t.discipline_score as f64).collect();
    let hours: Vec<u32> = members.iter().map(|t| t.record.hour).collect();
    let longs = members.iter().filter(|t| t.record.side == Direction::Long).count();
    let wins = members.iter().filter(|t| t.record.is_win).count();

    Ok(Some(TradeDna {
        cluster,
        trade_count: n,
        total_pnl,
        mean_pnl: stats::mean(&pnls),
        median_duration: stats::median(&durations),
        mean_duration: stats::mean(&durations),
        dominant_hour: dominant_hour(&hours),
        dominant_session: unique_mode(members.iter().map(|t| t.record.session)),
        dominant_direction: unique_mode(members.iter().map(|t| t.record.side)),
        pct_long: pct(longs, n),
        pct_short: pct(n - longs, n),
        mean_discipline: stats::mean(&discipline),
        median_discipline: stats::median(&discipline),
        win_rate: pct(wins, n),
        top_symbols: top_symbols(members.iter().map(|t| t.record.symbol())),
    }))
}

/// Most frequent symbols, count descending then name ascending.
fn top_symbols<'a>(symbols: impl Iterator<Item = &'a str>) -> Vec<SymbolCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for s in symbols {
        *counts.entry(s).or_insert(0) += 1;
    }
    let mut ranked: Vec<SymbolCount> = counts
        .into_iter()
        .map(|(symbol, count)| SymbolCount {
            symbol: symbol.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.symbol.cmp(&b.symbol)));
    ranked.truncate(TOP_SYMBOLS);
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    FocusDirection { direction: Direction, pct: f64 },
    PreferTiming { hour: u32, session: Option<Session> },
    HoldLonger { median_minutes: f64 },
    FastTradesWork { median_minutes: f64 },
    KeepDiscipline,
    DisciplineLacking,
    TopSymbols { symbols: Vec<String> },
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::FocusDirection { direction, pct } => write!(
                f,
                "Focus on {} positions: they make up {:.0}% of your best cluster",
                direction, pct
            ),
            Recommendation::PreferTiming { hour, session } => match session {
                Some(s) => write!(f, "Favor trades around {}h ({} session)", hour, s),
                None => write!(f, "Favor trades around {}h (mixed sessions)", hour),
            },
            Recommendation::HoldLonger { median_minutes } => write!(
                f,
                "Your best trades last {:.0} min or more: avoid scalping",
                median_minutes
            ),
            Recommendation::FastTradesWork { median_minutes } => write!(
                f,
                "Your best trades are quick ({:.0} min): short holds work for you",
                median_minutes
            ),
            Recommendation::KeepDiscipline => {
                write!(f, "Your best cluster is highly disciplined: keep it up")
            }
            Recommendation::DisciplineLacking => {
                write!(f, "Even your best trades lack discipline: watch this")
            }
            Recommendation::TopSymbols { symbols } => {
                write!(f, "Most traded in your best cluster: {}", symbols.join(", "))
            }
        }
    }
}

pub fn recommendations(dna: &TradeDna) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if dna.pct_long > DIRECTION_FOCUS_PCT {
        out.push(Recommendation::FocusDirection {
            direction: Direction::Long,
            pct: dna.pct_long,
        });
    } else if dna.pct_short > DIRECTION_FOCUS_PCT {
        out.push(Recommendation::FocusDirection {
            direction: Direction::Short,
            pct: dna.pct_short,
        });
    }

    out.push(Recommendation::PreferTiming {
        hour: dna.dominant_hour,
        session: dna.dominant_session,
    });

    if dna.median_duration > PATIENT_MEDIAN_MINUTES {
        out.push(Recommendation::HoldLonger {
            median_minutes: dna.median_duration,
        });
    } else {
        out.push(Recommendation::FastTradesWork {
            median_minutes: dna.median_duration,
        });
    }

    if dna.mean_discipline > STRONG_DISCIPLINE {
        out.push(Recommendation::KeepDiscipline);
    } else if dna.mean_discipline < WEAK_DISCIPLINE {
        out.push(Recommendation::DisciplineLacking);
    }

    if !dna.top_symbols.is_empty() {
        out.push(Recommendation::TopSymbols {
            symbols: dna.top_symbols.iter().map(|s| s.symbol.clone()).collect(),
        });
    }
    out
}
