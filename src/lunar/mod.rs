//! Lunar calendar support: the leap-month table and the lunar-to-solar resolver.

mod icu;
mod leap_month;
mod resolver;

pub use icu::IcuLunarConverter;
pub use leap_month::{month_number, LeapMonthTable, BUNDLED_LEAP_MONTHS, ENTRY_DELIMITER};
pub use resolver::{LunarConverter, LunarResolver, ResolvedLunarDate, MAX_LUNAR_DAY};
