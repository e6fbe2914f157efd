use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }

    /// Infers the side of a closed position from its price move and gross result.
    /// A long profits when price rises, a short when it falls.
    pub fn infer(entry_price: f64, exit_price: f64, gross_pnl: f64) -> Self {
        let price_move = exit_price - entry_price;
        if price_move == 0.0 || gross_pnl == 0.0 || price_move.signum() == gross_pnl.signum() {
            Direction::Long
        } else {
            Direction::Short
        }
    }
}

/// Trading session of a close hour, in the analysis timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Session {
    Asia,
    Europe,
    EuropeOverlap,
    Us,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Session {
    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Asia => "Asia",
            Session::Europe => "Europe",
            Session::EuropeOverlap => "Europe-Overlap",
            Session::Us => "US",
        }
    }
}
