//! Calendar Decomposition

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Meteorological season of a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Season for a calendar month (1-12)
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

/// Season one-hot columns. Autumn has no column and leaves all three unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonFlags {
    pub spring: bool,
    pub summer: bool,
    pub winter: bool,
}

impl From<Season> for SeasonFlags {
    fn from(season: Season) -> Self {
        Self {
            spring: season == Season::Spring,
            summer: season == Season::Summer,
            winter: season == Season::Winter,
        }
    }
}

/// Month-name one-hot columns. April is the reference category and has no
/// column, so an April timestamp leaves every flag unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthFlags {
    pub aug: bool,
    pub dec: bool,
    pub feb: bool,
    pub jan: bool,
    pub jul: bool,
    pub jun: bool,
    pub mar: bool,
    pub may: bool,
    pub nov: bool,
    pub oct: bool,
    pub sep: bool,
}

impl MonthFlags {
    /// One-hot flags for a calendar month (1-12)
    pub fn from_month(month: u32) -> Self {
        let mut flags = Self::default();
        match month {
            1 => flags.jan = true,
            2 => flags.feb = true,
            3 => flags.mar = true,
            5 => flags.may = true,
            6 => flags.jun = true,
            7 => flags.jul = true,
            8 => flags.aug = true,
            9 => flags.sep = true,
            10 => flags.oct = true,
            11 => flags.nov = true,
            12 => flags.dec = true,
            _ => {}
        }
        flags
    }

    /// Flags in schema column order (Aug, Dec, Feb, Jan, Jul, Jun, Mar, May, Nov, Oct, Sep)
    pub fn as_array(&self) -> [bool; 11] {
        [
            self.aug, self.dec, self.feb, self.jan, self.jul, self.jun, self.mar, self.may,
            self.nov, self.oct, self.sep,
        ]
    }

    /// Number of flags set
    pub fn count_set(&self) -> usize {
        self.as_array().iter().filter(|f| **f).count()
    }
}

/// Calendar fields derived from a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    /// Hour of day (0-23)
    pub hour: u32,
    /// Day of week, Monday = 0 ... Sunday = 6
    pub dayofweek: u32,
    /// Quarter (1-4)
    pub quarter: u32,
    /// Month (1-12)
    pub month: u32,
    pub year: i32,
    /// Day of year (1-366)
    pub dayofyear: u32,
    /// Day of month (1-31)
    pub dayofmonth: u32,
    /// ISO 8601 week number
    pub weekofyear: u32,
}

impl CalendarFeatures {
    /// Decompose a timestamp
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        let month = dt.month();
        Self {
            hour: dt.hour(),
            dayofweek: dt.weekday().num_days_from_monday(),
            quarter: (month - 1) / 3 + 1,
            month,
            year: dt.year(),
            dayofyear: dt.ordinal(),
            dayofmonth: dt.day(),
            weekofyear: dt.iso_week().week(),
        }
    }

    /// Saturday or Sunday
    pub fn is_weekend(&self) -> bool {
        self.dayofweek >= 5
    }

    pub fn season(&self) -> Season {
        Season::from_month(self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_timestamp;
    use proptest::prelude::*;

    fn calendar(raw: &str) -> CalendarFeatures {
        CalendarFeatures::from_datetime(&parse_timestamp(raw).unwrap())
    }

    #[test]
    fn test_monday_in_january() {
        let cal = calendar("2024-01-15 08:30");
        assert_eq!(cal.dayofweek, 0);
        assert_eq!(cal.quarter, 1);
        assert_eq!(cal.month, 1);
        assert_eq!(cal.year, 2024);
        assert_eq!(cal.dayofyear, 15);
        assert_eq!(cal.dayofmonth, 15);
        assert_eq!(cal.weekofyear, 3);
        assert_eq!(cal.hour, 8);
        assert!(!cal.is_weekend());
    }

    #[test]
    fn test_weekend_boundaries() {
        // 2024-01-13 is a Saturday, 2024-01-14 a Sunday, 2024-01-17 a Wednesday
        assert!(calendar("2024-01-13 12:00").is_weekend());
        assert!(calendar("2024-01-14 12:00").is_weekend());
        assert!(!calendar("2024-01-17 12:00").is_weekend());
        assert!(!calendar("2024-01-12 23:59").is_weekend());
    }

    #[test]
    fn test_iso_week_at_year_boundary() {
        // 2021-01-01 belongs to ISO week 53 of 2020
        assert_eq!(calendar("2021-01-01 00:00").weekofyear, 53);
        assert_eq!(calendar("2024-12-31 00:00").dayofyear, 366);
    }

    #[test]
    fn test_autumn_has_no_season_flag() {
        for month in 9..=11 {
            assert_eq!(SeasonFlags::from(Season::from_month(month)), SeasonFlags::default());
        }
    }

    #[test]
    fn test_april_is_reference_month() {
        assert_eq!(MonthFlags::from_month(4).count_set(), 0);
        assert!(MonthFlags::from_month(1).jan);
    }

    proptest! {
        #[test]
        fn prop_season_flags(month in 1u32..=12) {
            let flags = SeasonFlags::from(Season::from_month(month));
            prop_assert_eq!(flags.spring, (3..=5).contains(&month));
            prop_assert_eq!(flags.summer, (6..=8).contains(&month));
            prop_assert_eq!(flags.winter, month == 12 || month <= 2);
        }

        #[test]
        fn prop_month_one_hot(month in 1u32..=12) {
            let expected = if month == 4 { 0 } else { 1 };
            prop_assert_eq!(MonthFlags::from_month(month).count_set(), expected);
        }

        #[test]
        fn prop_quarter_matches_month(month in 1u32..=12, day in 1u32..=28) {
            let raw = format!("2023-{:02}-{:02} 00:00", month, day);
            let cal = calendar(&raw);
            prop_assert_eq!(cal.quarter, (month + 2) / 3);
        }
    }
}
