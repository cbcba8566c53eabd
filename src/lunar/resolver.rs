//! Resolution of lunar (month, day) pairs to solar dates.

use crate::error::BirthdayError;
use crate::lunar::leap_month::LeapMonthTable;
use chrono::NaiveDate;
use log::debug;

/// Highest lunar day number; no lunar month is longer.
pub const MAX_LUNAR_DAY: u8 = 30;

/// A lunisolar-to-Gregorian conversion capability.
///
/// `ordinal_month` counts months of the lunisolar year in order, so in a year with a leap
/// month it runs to 13. Returns `None` when the day does not exist in that month.
pub trait LunarConverter {
    fn to_solar(&self, lunar_year: i32, ordinal_month: u8, day: u8) -> Option<NaiveDate>;
}

impl<C: LunarConverter + ?Sized> LunarConverter for &C {
    fn to_solar(&self, lunar_year: i32, ordinal_month: u8, day: u8) -> Option<NaiveDate> {
        (**self).to_solar(lunar_year, ordinal_month, day)
    }
}

/// Result of resolving one lunar date in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLunarDate {
    pub solar: NaiveDate,
    /// Lunar day actually used, at most the requested day
    pub lunar_day: u8,
    pub adjusted: bool,
}

/// Converts lunar birthdays to solar dates, year by year.
#[derive(Debug, Clone)]
pub struct LunarResolver<C> {
    table: LeapMonthTable,
    converter: C,
}

impl<C: LunarConverter> LunarResolver<C> {
    pub fn new(table: LeapMonthTable, converter: C) -> Self {
        Self { table, converter }
    }

    pub fn table(&self) -> &LeapMonthTable {
        &self.table
    }

    /// Ordinal position of the regular (non-leap) `month` in `year`.
    ///
    /// Months after the year's leap month are shifted by one.
    pub fn ordinal_month(&self, year: i32, month: u8) -> u8 {
        match self.table.leap_month_of(year) {
            Some(leap) if month > leap => month + 1,
            _ => month,
        }
    }

    /// Resolve lunar `month`/`day` of `year` to a solar date.
    ///
    /// When the day does not exist in that year's month, the closest earlier day is used.
    /// The search is bounded by the day number itself and fails with
    /// [`BirthdayError::DateAdjustmentExhausted`] once it would drop below day 1.
    ///
    /// Years outside the leap-month table's coverage fail with
    /// [`BirthdayError::LeapTableOutOfRange`], since the ordinal month cannot be known there.
    pub fn resolve(
        &self,
        subject: &str,
        year: i32,
        month: u8,
        day: u8,
    ) -> Result<ResolvedLunarDate, BirthdayError> {
        let exhausted = || BirthdayError::DateAdjustmentExhausted {
            subject: subject.to_string(),
            year,
            month,
            day,
        };
        if !(1..=12).contains(&month) {
            return Err(exhausted());
        }
        if !self.table.covers(year) {
            return Err(BirthdayError::LeapTableOutOfRange {
                subject: subject.to_string(),
                year,
                coverage: self.table.coverage(),
            });
        }

        let ordinal = self.ordinal_month(year, month);
        let start = day.min(MAX_LUNAR_DAY);
        for candidate in (1..=start).rev() {
            if let Some(solar) = self.converter.to_solar(year, ordinal, candidate) {
                if candidate != day {
                    debug!(
                        "Adjusted lunar {:02}-{:02} to day {} for {} in {}",
                        month, day, candidate, subject, year
                    );
                }
                return Ok(ResolvedLunarDate { solar, lunar_day: candidate, adjusted: candidate != day });
            }
        }
        Err(exhausted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::cell::Cell;

    /// Lunar calendar where every year starts on solar Feb 1, months alternate 30/29 days,
    /// and the first month is 29 days long in odd years.
    struct FakeCalendar {
        calls: Cell<u32>,
    }

    impl FakeCalendar {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }

        fn month_length(year: i32, ordinal_month: u8) -> u8 {
            if ordinal_month == 1 && year % 2 != 0 {
                29
            } else if ordinal_month % 2 == 0 {
                29
            } else {
                30
            }
        }
    }

    impl LunarConverter for FakeCalendar {
        fn to_solar(&self, year: i32, ordinal_month: u8, day: u8) -> Option<NaiveDate> {
            self.calls.set(self.calls.get() + 1);
            if !(1..=13).contains(&ordinal_month) || day == 0 || day > Self::month_length(year, ordinal_month) {
                return None;
            }
            let offset: i64 = (1..ordinal_month).map(|m| i64::from(Self::month_length(year, m))).sum::<i64>()
                + i64::from(day - 1);
            NaiveDate::from_ymd_opt(year, 2, 1).map(|start| start + Duration::days(offset))
        }
    }

    struct NeverValid;

    impl LunarConverter for NeverValid {
        fn to_solar(&self, _: i32, _: u8, _: u8) -> Option<NaiveDate> {
            None
        }
    }

    fn table() -> LeapMonthTable {
        LeapMonthTable::parse("1900年 闰八月，2025年 闰六月，2099年 闰二月").unwrap()
    }

    #[test]
    fn test_existing_day_is_not_adjusted() {
        let resolver = LunarResolver::new(table(), FakeCalendar::new());
        let resolved = resolver.resolve("Alice", 2024, 1, 15).unwrap();
        assert_eq!(resolved.solar, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert_eq!(resolved.lunar_day, 15);
        assert!(!resolved.adjusted);
    }

    #[test]
    fn test_missing_thirtieth_moves_to_previous_day() {
        let resolver = LunarResolver::new(table(), FakeCalendar::new());
        let resolved = resolver.resolve("Alice", 2025, 1, 30).unwrap();
        assert_eq!(resolved.lunar_day, 29);
        assert!(resolved.adjusted);
        assert_eq!(resolved.solar, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_months_after_leap_month_shift_ordinal() {
        let resolver = LunarResolver::new(table(), FakeCalendar::new());
        assert_eq!(resolver.ordinal_month(2025, 6), 6);
        assert_eq!(resolver.ordinal_month(2025, 7), 8);
        assert_eq!(resolver.ordinal_month(2024, 7), 7);
    }

    #[test]
    fn test_exhausted_search_reports_subject_and_date() {
        let resolver = LunarResolver::new(table(), NeverValid);
        let err = resolver.resolve("Bob", 2024, 3, 30).unwrap_err();
        assert_eq!(
            err,
            BirthdayError::DateAdjustmentExhausted { subject: "Bob".to_string(), year: 2024, month: 3, day: 30 }
        );
    }

    #[test]
    fn test_invalid_month_fails_without_conversion() {
        let calendar = FakeCalendar::new();
        let resolver = LunarResolver::new(table(), &calendar);
        assert!(resolver.resolve("Bob", 2024, 13, 1).is_err());
        assert_eq!(calendar.calls.get(), 0);
    }

    #[test]
    fn test_year_beyond_table_is_refused() {
        let calendar = FakeCalendar::new();
        let resolver = LunarResolver::new(LeapMonthTable::parse("2023年 闰二月，2025年 闰六月").unwrap(), &calendar);
        assert!(resolver.resolve("Bob", 2024, 8, 1).is_ok());
        assert_eq!(
            resolver.resolve("Bob", 2026, 8, 1),
            Err(BirthdayError::LeapTableOutOfRange { subject: "Bob".to_string(), year: 2026, coverage: Some((2023, 2025)) })
        );
        calendar.calls.set(0);
        assert!(resolver.resolve("Bob", 2022, 8, 1).is_err());
        assert_eq!(calendar.calls.get(), 0);
    }

    #[test]
    fn test_retries_are_bounded_over_a_century() {
        let calendar = FakeCalendar::new();
        let resolver = LunarResolver::new(table(), &calendar);
        for year in 1950..2050 {
            for month in 1..=12u8 {
                for day in 1..=MAX_LUNAR_DAY {
                    calendar.calls.set(0);
                    let resolved = resolver.resolve("probe", year, month, day).unwrap();
                    assert!(resolved.lunar_day <= day);
                    assert!(calendar.calls.get() <= 30, "{} calls for {}-{}-{}", calendar.calls.get(), year, month, day);
                }
            }
        }
    }

    #[test]
    fn test_day_above_thirty_is_clamped_before_search() {
        let calendar = FakeCalendar::new();
        let resolver = LunarResolver::new(table(), &calendar);
        let resolved = resolver.resolve("Alice", 2024, 1, 31).unwrap();
        assert_eq!(resolved.lunar_day, 30);
        assert!(resolved.adjusted);
    }
}
