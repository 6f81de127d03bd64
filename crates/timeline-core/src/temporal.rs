//! Named date ranges evaluated against the local calendar.
//!
//! Boundaries are computed from an explicit `now` so callers (and tests) can
//! pin the wall clock. The store's convenience methods pass `Local::now()`.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// DATE RANGE
// =============================================================================

/// Date range used to filter entries and to title reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    /// No restriction.
    #[default]
    All,
    /// The current local calendar day.
    Today,
    /// Since local midnight on Monday of the current week.
    ThisWeek,
    /// Since local midnight on the first of the current month.
    ThisMonth,
    /// Between two instants, inclusive on both ends.
    Custom {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl DateRange {
    /// Localised display name, used as the report title prefix.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::All => "全部",
            Self::Today => "今天",
            Self::ThisWeek => "本周",
            Self::ThisMonth => "本月",
            Self::Custom { .. } => "自定义",
        }
    }

    /// Whether an entry created at `created` falls inside this range, with the
    /// wall clock pinned at `now`.
    pub fn contains_at(&self, created: DateTime<Utc>, now: DateTime<Local>) -> bool {
        match self {
            Self::All => true,
            Self::Today => created.with_timezone(&Local).date_naive() == now.date_naive(),
            Self::Custom { start, end } => created >= *start && created <= *end,
            Self::ThisWeek | Self::ThisMonth => match range_start(self, now) {
                Some(start) => created >= start,
                None => true,
            },
        }
    }

    /// Whether `created` falls inside this range right now.
    pub fn contains(&self, created: DateTime<Utc>) -> bool {
        self.contains_at(created, Local::now())
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for DateRange {
    type Err = String;

    /// Parses the named ranges. Custom ranges carry instants and are built
    /// directly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" | "this_week" => Ok(Self::ThisWeek),
            "month" | "this_month" => Ok(Self::ThisMonth),
            _ => Err(format!("Invalid date range: {}", s)),
        }
    }
}

// =============================================================================
// BOUNDARIES
// =============================================================================

/// Inclusive lower bound of a range as seen at `now`.
///
/// `All` has no bound. `Custom` returns its own start.
pub fn range_start(range: &DateRange, now: DateTime<Local>) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    match range {
        DateRange::All => None,
        DateRange::Today => Some(local_midnight(today, now)),
        DateRange::ThisWeek => {
            let days_from_monday = i64::from(today.weekday().num_days_from_monday());
            let monday = today - chrono::Duration::days(days_from_monday);
            Some(local_midnight(monday, now))
        }
        DateRange::ThisMonth => {
            let first = today.with_day(1).unwrap_or(today);
            Some(local_midnight(first, now))
        }
        DateRange::Custom { start, .. } => Some(*start),
    }
}

/// Start of `date` in the local zone.
///
/// When midnight does not exist locally (a DST gap), the offset in effect at
/// `now` is used instead.
fn local_midnight(date: NaiveDate, now: DateTime<Local>) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => (naive - chrono::Duration::seconds(i64::from(now.offset().local_minus_utc())))
            .and_utc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        local(y, m, d, h, min).with_timezone(&Utc)
    }

    #[test]
    fn test_display_names() {
        assert_eq!(DateRange::All.display_name(), "全部");
        assert_eq!(DateRange::Today.display_name(), "今天");
        assert_eq!(DateRange::ThisWeek.display_name(), "本周");
        assert_eq!(DateRange::ThisMonth.display_name(), "本月");
        let now = Utc::now();
        assert_eq!(
            DateRange::Custom { start: now, end: now }.to_string(),
            "自定义"
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("today".parse::<DateRange>().unwrap(), DateRange::Today);
        assert_eq!("WEEK".parse::<DateRange>().unwrap(), DateRange::ThisWeek);
        assert_eq!("this_month".parse::<DateRange>().unwrap(), DateRange::ThisMonth);
        assert_eq!("all".parse::<DateRange>().unwrap(), DateRange::All);
        assert!("yesterday".parse::<DateRange>().is_err());
    }

    #[test]
    fn test_today() {
        let now = local(2025, 6, 18, 15, 0);
        assert!(DateRange::Today.contains_at(utc(2025, 6, 18, 0, 0), now));
        assert!(DateRange::Today.contains_at(utc(2025, 6, 18, 23, 59), now));
        assert!(!DateRange::Today.contains_at(utc(2025, 6, 17, 23, 59), now));
    }

    #[test]
    fn test_this_week_starts_monday() {
        // 2025-06-18 is a Wednesday.
        let now = local(2025, 6, 18, 15, 0);
        assert_eq!(
            range_start(&DateRange::ThisWeek, now),
            Some(utc(2025, 6, 16, 0, 0))
        );
        assert!(DateRange::ThisWeek.contains_at(utc(2025, 6, 16, 0, 0), now));
        assert!(!DateRange::ThisWeek.contains_at(utc(2025, 6, 15, 23, 59), now));
    }

    #[test]
    fn test_this_week_on_sunday() {
        let now = local(2025, 6, 22, 10, 0);
        assert_eq!(
            range_start(&DateRange::ThisWeek, now),
            Some(utc(2025, 6, 16, 0, 0))
        );
    }

    #[test]
    fn test_this_month() {
        let now = local(2025, 6, 18, 15, 0);
        assert!(DateRange::ThisMonth.contains_at(utc(2025, 6, 1, 0, 0), now));
        assert!(!DateRange::ThisMonth.contains_at(utc(2025, 5, 31, 23, 59), now));
    }

    #[test]
    fn test_custom_inclusive_both_ends() {
        let start = Utc::now() - Duration::days(3);
        let end = Utc::now() - Duration::days(1);
        let range = DateRange::Custom { start, end };
        let now = Local::now();
        assert!(range.contains_at(start, now));
        assert!(range.contains_at(end, now));
        assert!(!range.contains_at(end + Duration::seconds(1), now));
        assert!(!range.contains_at(start - Duration::seconds(1), now));
    }

    #[test]
    fn test_all_has_no_bound() {
        assert_eq!(range_start(&DateRange::All, Local::now()), None);
        assert!(DateRange::All.contains(utc(1999, 1, 1, 0, 0)));
    }
}
