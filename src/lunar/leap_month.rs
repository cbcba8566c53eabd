//! Leap-month table construction.
//
// Source data is a flat list of "<year>年 闰<month>" entries separated by full-width commas.
// The table maps every lunar month (1-12) to the ascending list of years in which that
// month is followed by a leap month.

use crate::error::BirthdayError;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Bundled leap-month data covering 1900-2050
pub const BUNDLED_LEAP_MONTHS: &str = include_str!("../../data/lunar_leap_month.txt");

/// Delimiter between entries on one line
pub const ENTRY_DELIMITER: char = '，';

const MONTH_NAMES: [(&str, u8); 12] = [
    ("正月", 1),
    ("二月", 2),
    ("三月", 3),
    ("四月", 4),
    ("五月", 5),
    ("六月", 6),
    ("七月", 7),
    ("八月", 8),
    ("九月", 9),
    ("十月", 10),
    ("冬月", 11),
    ("腊月", 12),
];

static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,4})\s*年\s*闰\s*(\S+)$").expect("leap month entry pattern is valid")
});

/// Map a traditional month name to its number
pub fn month_number(name: &str) -> Option<u8> {
    MONTH_NAMES.iter().find(|(month_name, _)| *month_name == name).map(|(_, number)| *number)
}

/// Immutable mapping from lunar month to the years in which it is a leap month.
///
/// The table only speaks for the years between its first and last listed leap year; outside
/// that span a year without an entry may still have a leap month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeapMonthTable {
    months: BTreeMap<u8, Vec<i32>>,
    coverage: Option<(i32, i32)>,
}

impl LeapMonthTable {
    /// Build the table from source lines.
    ///
    /// Empty lines are skipped. Any entry that does not parse, or names a month outside the
    /// twelve traditional names, aborts construction.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, BirthdayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut collected: BTreeMap<u8, BTreeSet<i32>> =
            (1..=12).map(|month| (month, BTreeSet::new())).collect();

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            for entry in line.split(ENTRY_DELIMITER) {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                let (year, month) = parse_entry(entry).ok_or_else(|| {
                    BirthdayError::MalformedLeapMonthEntry { line: index + 1, entry: entry.to_string() }
                })?;
                collected.entry(month).or_default().insert(year);
            }
        }

        let months: BTreeMap<u8, Vec<i32>> =
            collected.into_iter().map(|(month, years)| (month, years.into_iter().collect())).collect();
        let first = months.values().filter_map(|years| years.first()).min().copied();
        let last = months.values().filter_map(|years| years.last()).max().copied();
        let coverage = first.zip(last);
        debug!(
            "Built leap month table with {} leap years covering {:?}",
            months.values().map(Vec::len).sum::<usize>(),
            coverage
        );
        Ok(Self { months, coverage })
    }

    /// Parse a whole text document.
    pub fn parse(text: &str) -> Result<Self, BirthdayError> {
        Self::from_lines(text.lines())
    }

    /// Table built from the data shipped with the crate.
    pub fn bundled() -> Result<Self, BirthdayError> {
        Self::parse(BUNDLED_LEAP_MONTHS)
    }

    /// Sorted years in which `month` is a leap month. Empty for months outside 1-12.
    pub fn years_for(&self, month: u8) -> &[i32] {
        self.months.get(&month).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The leap month of `year`, if the table lists one.
    pub fn leap_month_of(&self, year: i32) -> Option<u8> {
        self.months
            .iter()
            .find(|(_, years)| years.binary_search(&year).is_ok())
            .map(|(month, _)| *month)
    }

    /// First and last year the table speaks for; `None` for an empty table.
    pub fn coverage(&self) -> Option<(i32, i32)> {
        self.coverage
    }

    /// Whether `year` lies within [`coverage`](Self::coverage).
    pub fn covers(&self, year: i32) -> bool {
        self.coverage.is_some_and(|(first, last)| (first..=last).contains(&year))
    }

    /// Iterate over all twelve months in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[i32])> {
        self.months.iter().map(|(month, years)| (*month, years.as_slice()))
    }

    /// Number of distinct years that contain a leap month.
    pub fn leap_year_count(&self) -> usize {
        self.months.values().flatten().collect::<BTreeSet<_>>().len()
    }

    /// Pretty JSON keyed by month number, keeping the Chinese text unescaped.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.months)
    }
}

fn parse_entry(entry: &str) -> Option<(i32, u8)> {
    let captures = ENTRY_RE.captures(entry)?;
    let year = captures[1].parse::<i32>().ok()?;
    let month = month_number(&captures[2])?;
    Some((year, month))
}
