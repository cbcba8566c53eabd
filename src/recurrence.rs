//! Expansion of date records into one occurrence per target year.

use crate::error::BirthdayError;
use crate::lunar::{LunarConverter, LunarResolver};
use crate::records::{DateRecord, EventKind, PersonRecord};
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::ops::Range;

/// Half-open range of target years `[start, start + count)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    count: u32,
}

impl YearRange {
    pub fn new(start: i32, count: u32) -> Self {
        Self { start, count }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn years(&self) -> Range<i32> {
        let end = i64::from(self.start) + i64::from(self.count);
        self.start..i32::try_from(end).unwrap_or(i32::MAX)
    }
}

/// Lazily pair a record with every year of `range`, in ascending order.
///
/// The returned iterator is `Clone`, so the sequence can be restarted without re-reading
/// the record.
pub fn recurrences(
    record: &DateRecord,
    range: YearRange,
) -> impl Iterator<Item = (i32, &DateRecord)> + Clone + '_ {
    range.years().map(move |year| (year, record))
}

/// One concrete, year-specific materialization of a date record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOccurrence {
    pub subject_name: String,
    pub addressed_name: String,
    pub solar_date: NaiveDate,
    pub age: Option<u32>,
    pub kind: EventKind,
    pub label: Option<String>,
    /// Whether the calendar day had to move because it does not exist in the target year
    pub adjusted: bool,
}

/// Age (or anniversary count) in `target_year`, omitted when the origin is unknown or later.
pub fn age_in(target_year: i32, origin_year: Option<i32>) -> Option<u32> {
    origin_year.and_then(|origin| u32::try_from(target_year - origin).ok())
}

/// Resolve one `(year, record)` pair into a solar occurrence.
///
/// `inherited_year` is the per-person origin year that undated lunar birthdays fall back to.
pub fn resolve_occurrence<C: LunarConverter>(
    person: &PersonRecord,
    record: &DateRecord,
    target_year: i32,
    inherited_year: Option<i32>,
    resolver: &LunarResolver<C>,
) -> Result<ResolvedOccurrence, BirthdayError> {
    let subject = person.display_name.as_str();
    let date = record.date();

    let (solar_date, adjusted, origin_year, label) = match record {
        DateRecord::SolarBirthday(date) => {
            let (solar, adjusted) = solar_date_in(subject, target_year, date.month(), date.day())?;
            (solar, adjusted, date.year(), None)
        }
        DateRecord::LunarBirthday(date) => {
            let resolved = resolver.resolve(subject, target_year, date.month(), date.day())?;
            (resolved.solar, resolved.adjusted, date.year().or(inherited_year), None)
        }
        DateRecord::Anniversary { label, date } => {
            let (solar, adjusted) = solar_date_in(subject, target_year, date.month(), date.day())?;
            (solar, adjusted, date.year(), Some(label.trim().to_string()))
        }
    };

    debug!(
        "Resolved {:?} {:02}-{:02} for {} in {} to {}",
        record.kind(),
        date.month(),
        date.day(),
        subject,
        target_year,
        solar_date
    );

    Ok(ResolvedOccurrence {
        subject_name: subject.to_string(),
        addressed_name: person.addressed_name().to_string(),
        solar_date,
        age: age_in(target_year, origin_year),
        kind: record.kind(),
        label,
        adjusted,
    })
}

/// Fixed solar month/day in `year`; a day past the end of the month moves back to its last day.
fn solar_date_in(subject: &str, year: i32, month: u8, day: u8) -> Result<(NaiveDate, bool), BirthdayError> {
    (1..=u32::from(day))
        .rev()
        .find_map(|candidate| NaiveDate::from_ymd_opt(year, u32::from(month), candidate))
        .map(|solar| (solar, solar.day() != u32::from(day)))
        .ok_or_else(|| BirthdayError::InvalidRecordDate {
            subject: subject.to_string(),
            month: u32::from(month),
            day: u32::from(day),
        })
}
