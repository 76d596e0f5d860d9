//! Reporting window resolution.

use chrono::{DateTime, Duration, Utc};

/// Named reporting windows accepted by the dashboards.
///
/// Unknown tokens resolve to the 30-day default so a mistyped query
/// parameter degrades to a sensible report instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportingPeriod {
    SevenDays,
    #[default]
    ThirtyDays,
    NinetyDays,
    OneYear,
}

impl ReportingPeriod {
    /// Parse a period token, falling back to the default for unknown input.
    pub fn parse(token: &str) -> Self {
        match token {
            "7_days" => ReportingPeriod::SevenDays,
            "30_days" => ReportingPeriod::ThirtyDays,
            "90_days" => ReportingPeriod::NinetyDays,
            "1_year" => ReportingPeriod::OneYear,
            _ => ReportingPeriod::default(),
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ReportingPeriod::SevenDays => "7_days",
            ReportingPeriod::ThirtyDays => "30_days",
            ReportingPeriod::NinetyDays => "90_days",
            ReportingPeriod::OneYear => "1_year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportingPeriod::SevenDays => "Last 7 days",
            ReportingPeriod::ThirtyDays => "Last 30 days",
            ReportingPeriod::NinetyDays => "Last 90 days",
            ReportingPeriod::OneYear => "Last year",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            ReportingPeriod::SevenDays => 7,
            ReportingPeriod::ThirtyDays => 30,
            ReportingPeriod::NinetyDays => 90,
            ReportingPeriod::OneYear => 365,
        }
    }

    /// Window start measured back from `now`.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

/// Clamp a free-form day count to the supported report windows.
/// Anything outside the menu resolves to 30 days.
pub fn resolve_range_days(days: i64) -> i64 {
    match days {
        7 | 30 | 90 | 365 => days,
        _ => 30,
    }
}

/// Start of the calendar-day window covering the trailing `days` days,
/// today included. Truncated to midnight UTC so day grouping lines up
/// with `DATE()` bucketing in the store.
pub fn day_window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let first_day = now.date_naive() - Duration::days(days - 1);
    let midnight = first_day.and_hms_opt(0, 0, 0).unwrap();
    DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_known_tokens() {
        assert_eq!(ReportingPeriod::parse("7_days"), ReportingPeriod::SevenDays);
        assert_eq!(
            ReportingPeriod::parse("30_days"),
            ReportingPeriod::ThirtyDays
        );
        assert_eq!(
            ReportingPeriod::parse("90_days"),
            ReportingPeriod::NinetyDays
        );
        assert_eq!(ReportingPeriod::parse("1_year"), ReportingPeriod::OneYear);
    }

    #[test]
    fn test_parse_unknown_token_falls_back_to_thirty_days() {
        assert_eq!(ReportingPeriod::parse("banana"), ReportingPeriod::ThirtyDays);
        assert_eq!(ReportingPeriod::parse(""), ReportingPeriod::ThirtyDays);
        assert_eq!(ReportingPeriod::parse("7 days"), ReportingPeriod::ThirtyDays);
    }

    #[test]
    fn test_token_round_trips() {
        for period in [
            ReportingPeriod::SevenDays,
            ReportingPeriod::ThirtyDays,
            ReportingPeriod::NinetyDays,
            ReportingPeriod::OneYear,
        ] {
            assert_eq!(ReportingPeriod::parse(period.token()), period);
        }
    }

    #[test]
    fn test_resolve_range_days_menu() {
        assert_eq!(resolve_range_days(7), 7);
        assert_eq!(resolve_range_days(30), 30);
        assert_eq!(resolve_range_days(90), 90);
        assert_eq!(resolve_range_days(365), 365);
    }

    #[test]
    fn test_resolve_range_days_out_of_menu_falls_back() {
        assert_eq!(resolve_range_days(14), 30);
        assert_eq!(resolve_range_days(0), 30);
        assert_eq!(resolve_range_days(-5), 30);
        assert_eq!(resolve_range_days(1000), 30);
    }

    #[test]
    fn test_start_subtracts_full_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap();
        assert_eq!(
            ReportingPeriod::SevenDays.start(now),
            Utc.with_ymd_and_hms(2024, 3, 8, 12, 30, 0).unwrap()
        );
        assert_eq!(
            ReportingPeriod::OneYear.start(now),
            Utc.with_ymd_and_hms(2023, 3, 16, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_day_window_start_truncates_to_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 45, 10).unwrap();
        let start = day_window_start(now, 7);
        // Seven calendar days ending today: Mar 9 through Mar 15.
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_window_start_single_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 45, 10).unwrap();
        let start = day_window_start(now, 1);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }
}
