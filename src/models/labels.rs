use serde::{Deserialize, Serialize};
use std::fmt;

/// Discipline verdict of a single trade. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeLabel {
    Destructive,
    FalseGood,
    Healthy,
}

impl fmt::Display for TradeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeLabel::Destructive => write!(f, "destructive"),
            TradeLabel::FalseGood => write!(f, "false-good"),
            TradeLabel::Healthy => write!(f, "healthy"),
        }
    }
}

const HIGH_LEVERAGE: f64 = 50.0;
const SCALP_MAX_MINUTES: f64 = 5.0;
const SWING_MIN_MINUTES: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeType {
    Scalp,
    Swing,
    HighLeverage,
    Standard,
}

impl TradeType {
    /// Report order used by the breakdown tables.
    pub const ALL: [TradeType; 4] = [
        TradeType::Swing,
        TradeType::Scalp,
        TradeType::HighLeverage,
        TradeType::Standard,
    ];

    /// Leverage takes priority over duration.
    pub fn classify(duration_minutes: f64, leverage: f64) -> Self {
        if leverage >= HIGH_LEVERAGE {
            TradeType::HighLeverage
        } else if duration_minutes < SCALP_MAX_MINUTES {
            TradeType::Scalp
        } else if duration_minutes > SWING_MIN_MINUTES {
            TradeType::Swing
        } else {
            TradeType::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Scalp => "scalp",
            TradeType::Swing => "swing",
            TradeType::HighLeverage => "high-leverage",
            TradeType::Standard => "standard",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltStatus {
    Neutral,
    Excellent,
    Good,
    Warning,
    Tilt,
}

impl TiltStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => TiltStatus::Excellent,
            60..=79 => TiltStatus::Good,
            40..=59 => TiltStatus::Warning,
            _ => TiltStatus::Tilt,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TiltStatus::Neutral => "⚪",
            TiltStatus::Excellent => "🟢",
            TiltStatus::Good => "🟡",
            TiltStatus::Warning => "🟠",
            TiltStatus::Tilt => "🔴",
        }
    }
}

impl fmt::Display for TiltStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiltStatus::Neutral => write!(f, "neutral"),
            TiltStatus::Excellent => write!(f, "excellent"),
            TiltStatus::Good => write!(f, "good"),
            TiltStatus::Warning => write!(f, "warning"),
            TiltStatus::Tilt => write!(f, "tilt"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterLabel {
    Optimal,
    Destructive,
    RapidScalp,
    Mixed,
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterLabel::Optimal => write!(f, "optimal"),
            ClusterLabel::Destructive => write!(f, "destructive"),
            ClusterLabel::RapidScalp => write!(f, "rapid-scalp"),
            ClusterLabel::Mixed => write!(f, "mixed"),
        }
    }
}
