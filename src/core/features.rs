use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};
use crate::models::TradeRecord;

/// Order-dependent fields of one trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequentialFeatures {
    /// Consecutive non-winning trades immediately before this one.
    pub loss_streak_before: u32,
    /// Minutes between the previous trade's open and this one's. `None` for the first trade.
    pub minutes_since_prev: Option<f64>,
}

/// Single left-to-right pass over a sequence sorted by close time.
///
/// The result depends on the order by construction: the same trades in a
/// different order give different streaks and gaps. A sequence that is not
/// sorted by close time is rejected.
pub fn derive_sequential(records: &[TradeRecord]) -> Result<Vec<SequentialFeatures>> {
    let mut out = Vec::with_capacity(records.len());
    let mut streak = 0u32;
    let mut prev: Option<&TradeRecord> = None;

    for (index, r) in records.iter().enumerate() {
        let minutes_since_prev = match prev {
            Some(p) => {
                if r.trade.close_time < p.trade.close_time {
                    return Err(AuditError::Unordered { index });
                }
                Some((r.trade.open_time - p.trade.open_time).num_milliseconds() as f64 / 60_000.0)
            }
            None => None,
        };

        out.push(SequentialFeatures {
            loss_streak_before: streak,
            minutes_since_prev,
        });

        streak = if r.is_win { 0 } else { streak + 1 };
        prev = Some(r);
    }

    Ok(out)
}
