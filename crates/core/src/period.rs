use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month, the aggregation granularity of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl MonthKey {
    /// Returns `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(MonthKey { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// Full month name followed by the year, e.g. `July 2024`.
    pub fn label(self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    pub fn month_name(self) -> &'static str {
        MONTH_NAMES[self.month as usize - 1]
    }

    /// Months since year 0, so that consecutive months differ by one.
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_ordinal(ordinal: i64) -> Self {
        MonthKey {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    /// Shifts by `months`, negative values moving into the past.
    pub fn offset(self, months: i64) -> Self {
        Self::from_ordinal(self.ordinal() + months)
    }

    pub fn pred(self) -> Self {
        self.offset(-1)
    }

    pub fn succ(self) -> Self {
        self.offset(1)
    }

    /// Number of months from `self` to `later`; negative if `later` is earlier.
    pub fn months_until(self, later: MonthKey) -> i64 {
        later.ordinal() - self.ordinal()
    }
}

/// Inclusive range of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: MonthKey,
    pub end: MonthKey,
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

impl MonthRange {
    /// Builds a range, swapping the bounds if given in reverse order.
    pub fn new(start: MonthKey, end: MonthKey) -> Self {
        if start <= end {
            MonthRange { start, end }
        } else {
            MonthRange { start: end, end: start }
        }
    }

    pub fn single(month: MonthKey) -> Self {
        MonthRange { start: month, end: month }
    }

    pub fn contains(self, month: MonthKey) -> bool {
        month >= self.start && month <= self.end
    }

    pub fn month_count(self) -> i64 {
        self.start.months_until(self.end) + 1
    }

    pub fn is_single_month(self) -> bool {
        self.start == self.end
    }

    /// Human phrase used in answers: `in July 2024` or `from May 2024 to July 2024`.
    pub fn describe(self) -> String {
        if self.is_single_month() {
            format!("in {}", self.start.label())
        } else {
            format!("from {} to {}", self.start.label(), self.end.label())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk(y: i32, m: u32) -> MonthKey {
        MonthKey::new(y, m).unwrap()
    }

    #[test]
    fn new_rejects_invalid_month() {
        assert!(MonthKey::new(2024, 0).is_none());
        assert!(MonthKey::new(2024, 13).is_none());
        assert!(MonthKey::new(2024, 12).is_some());
    }

    #[test]
    fn from_date_and_display() {
        let key = MonthKey::from_date(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        assert_eq!(key, mk(2024, 7));
        assert_eq!(key.to_string(), "2024-07");
        assert_eq!(key.label(), "July 2024");
        assert_eq!(mk(2023, 1).month_name(), "January");
    }

    #[test]
    fn ordering_is_chronological() {
        assert!(mk(2023, 12) < mk(2024, 1));
        assert!(mk(2024, 2) < mk(2024, 10));
    }

    #[test]
    fn offset_crosses_year_boundaries() {
        assert_eq!(mk(2024, 1).pred(), mk(2023, 12));
        assert_eq!(mk(2023, 12).succ(), mk(2024, 1));
        assert_eq!(mk(2024, 3).offset(-14), mk(2023, 1));
        assert_eq!(mk(2024, 3).offset(10), mk(2025, 1));
    }

    #[test]
    fn months_until_counts_calendar_months() {
        assert_eq!(mk(2024, 5).months_until(mk(2024, 7)), 2);
        assert_eq!(mk(2023, 11).months_until(mk(2024, 2)), 3);
        assert_eq!(mk(2024, 2).months_until(mk(2023, 11)), -3);
    }

    #[test]
    fn range_new_orders_bounds() {
        let r = MonthRange::new(mk(2024, 7), mk(2024, 5));
        assert_eq!(r.start, mk(2024, 5));
        assert_eq!(r.end, mk(2024, 7));
        assert_eq!(r.month_count(), 3);
    }

    #[test]
    fn range_contains_is_inclusive() {
        let r = MonthRange::new(mk(2024, 5), mk(2024, 7));
        assert!(r.contains(mk(2024, 5)));
        assert!(r.contains(mk(2024, 7)));
        assert!(!r.contains(mk(2024, 4)));
        assert!(!r.contains(mk(2024, 8)));
    }

    #[test]
    fn range_describe() {
        assert_eq!(MonthRange::single(mk(2024, 7)).describe(), "in July 2024");
        assert_eq!(
            MonthRange::new(mk(2024, 5), mk(2024, 7)).describe(),
            "from May 2024 to July 2024"
        );
        assert_eq!(MonthRange::new(mk(2024, 5), mk(2024, 7)).to_string(), "2024-05 to 2024-07");
    }
}
