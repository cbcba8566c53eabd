//! Chinese calendar conversion backed by ICU4X compiled data.

use crate::lunar::resolver::LunarConverter;
use chrono::NaiveDate;
use icu_calendar::chinese::Chinese;
use icu_calendar::Date;
use std::sync::Arc;

/// Offset between the Gregorian year and ICU's extended Chinese year (2023 is 4660).
const CHINESE_YEAR_OFFSET: i32 = 2637;

/// [`LunarConverter`] using the ICU4X Chinese calendar.
#[derive(Debug, Clone)]
pub struct IcuLunarConverter {
    calendar: Arc<Chinese>,
}

impl IcuLunarConverter {
    pub fn new() -> Self {
        Self { calendar: Arc::new(Chinese::new()) }
    }

    fn first_day(&self, lunar_year: i32, ordinal_month: u8) -> Option<Date<Arc<Chinese>>> {
        Date::try_new_chinese_date_with_calendar(
            lunar_year + CHINESE_YEAR_OFFSET,
            ordinal_month,
            1,
            Arc::clone(&self.calendar),
        )
        .ok()
    }

    /// The regular month that `lunar_year`'s leap month follows, according to ICU.
    pub fn leap_month(&self, lunar_year: i32) -> Option<u8> {
        let months = self.first_day(lunar_year, 1)?.months_in_year();
        (1..=months)
            .filter_map(|ordinal| self.first_day(lunar_year, ordinal))
            .find_map(|date| match date.month().code.parsed() {
                Some((month, true)) => Some(month),
                _ => None,
            })
    }
}

impl Default for IcuLunarConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl LunarConverter for IcuLunarConverter {
    fn to_solar(&self, lunar_year: i32, ordinal_month: u8, day: u8) -> Option<NaiveDate> {
        let date = Date::try_new_chinese_date_with_calendar(
            lunar_year + CHINESE_YEAR_OFFSET,
            ordinal_month,
            day,
            Arc::clone(&self.calendar),
        )
        .ok()?;
        let iso = date.to_iso();
        NaiveDate::from_ymd_opt(iso.year().number, iso.month().ordinal, iso.day_of_month().0)
    }
}
