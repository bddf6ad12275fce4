//! Barn plan scheduling window

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolved start/end of a barn plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWindow {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl PlanWindow {
    /// Resolve the window of a plan.
    ///
    /// Daily plans always cover one whole calendar day: the day of
    /// `start_date` when given, otherwise `today`. Any `end_date` supplied
    /// for a daily plan is ignored. Other plans need both dates and the
    /// start must come before the end.
    pub fn resolve(
        is_daily_plan: bool,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        today: NaiveDate,
    ) -> Result<Self, &'static str> {
        if is_daily_plan {
            let day = start_date.map(|d| d.date_naive()).unwrap_or(today);
            return Ok(Self::whole_day(day));
        }

        let (start_date, end_date) = match (start_date, end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err("Start date and end date are required for non-daily plans"),
        };

        if start_date >= end_date {
            return Err("Start date must be before end date");
        }

        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// 00:00:00 to 23:59:59 of the given day
    pub fn whole_day(day: NaiveDate) -> Self {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        Self {
            start_date: day.and_time(NaiveTime::MIN).and_utc(),
            end_date: day.and_time(end_of_day).and_utc(),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start_date && instant <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_plan_defaults_to_today() {
        let today = day(2024, 3, 15);
        let window = PlanWindow::resolve(true, None, None, today).unwrap();

        assert_eq!(window.start_date, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(window.end_date, Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_daily_plan_uses_day_of_start_date() {
        let start = Utc.with_ymd_and_hms(2024, 5, 2, 14, 30, 0).unwrap();
        let ignored_end = start + Duration::days(10);
        let window = PlanWindow::resolve(true, Some(start), Some(ignored_end), day(2024, 1, 1)).unwrap();

        assert_eq!(window, PlanWindow::whole_day(day(2024, 5, 2)));
    }

    #[test]
    fn test_ranged_plan_requires_both_dates() {
        let start = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        assert!(PlanWindow::resolve(false, Some(start), None, day(2024, 5, 1)).is_err());
        assert!(PlanWindow::resolve(false, None, Some(start), day(2024, 5, 1)).is_err());
    }

    #[test]
    fn test_ranged_plan_rejects_inverted_window() {
        let start = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let end = start - Duration::hours(1);
        assert!(PlanWindow::resolve(false, Some(start), Some(end), day(2024, 5, 1)).is_err());
        assert!(PlanWindow::resolve(false, Some(start), Some(start), day(2024, 5, 1)).is_err());
    }

    #[test]
    fn test_ranged_plan_keeps_dates() {
        let start = Utc.with_ymd_and_hms(2024, 5, 2, 6, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 9, 18, 0, 0).unwrap();
        let window = PlanWindow::resolve(false, Some(start), Some(end), day(2024, 5, 1)).unwrap();

        assert_eq!(window.start_date, start);
        assert_eq!(window.end_date, end);
        assert!(window.contains(Utc.with_ymd_and_hms(2024, 5, 5, 0, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap()));
    }
}
