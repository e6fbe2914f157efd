use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::models::Session;

/// Buckets a local close hour (0-23) into its trading session.
///
/// Asia 01:00-09:00, Europe 09:00-17:00 with the 14:00-17:00 overlap split
/// out, US for the rest of the clock (wraps midnight).
pub fn session_for_hour(hour: u32) -> Session {
    match hour {
        1..=8 => Session::Asia,
        14..=16 => Session::EuropeOverlap,
        9..=13 => Session::Europe,
        _ => Session::Us,
    }
}

/// Calendar date of a timestamp in the analysis timezone.
pub fn local_date(ts: DateTime<Utc>, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::at;

    #[test]
    fn asia_session() {
        assert_eq!(session_for_hour(1), Session::Asia);
        assert_eq!(session_for_hour(8), Session::Asia);
    }

    #[test]
    fn europe_sessions() {
        assert_eq!(session_for_hour(9), Session::Europe);
        assert_eq!(session_for_hour(13), Session::Europe);
        assert_eq!(session_for_hour(14), Session::EuropeOverlap);
        assert_eq!(session_for_hour(16), Session::EuropeOverlap);
    }

    #[test]
    fn us_session_wraps_midnight() {
        assert_eq!(session_for_hour(17), Session::Us);
        assert_eq!(session_for_hour(23), Session::Us);
        assert_eq!(session_for_hour(0), Session::Us);
    }

    #[test]
    fn local_date_crosses_midnight_in_zurich() {
        // 23:30 UTC on the 15th is already the 16th in Zurich (UTC+1 in January)
        let ts = at(2024, 1, 15, 23, 30);
        assert_eq!(local_date(ts, Tz::UTC), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(
            local_date(ts, chrono_tz::Europe::Zurich),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
    }
}
