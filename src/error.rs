//! Error types shared across the calendar pipeline.

use chrono::NaiveDate;

/// Custom error type for birthday calendar operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BirthdayError {
    #[error("Malformed leap month entry '{entry}' on line {line}")]
    MalformedLeapMonthEntry { line: usize, entry: String },

    #[error(
        "Lunar date adjustment failed for {subject}: no valid day at or before lunar {month:02}-{day:02} in {year}"
    )]
    DateAdjustmentExhausted { subject: String, year: i32, month: u8, day: u8 },

    #[error("Lunar year {year} for {subject} is outside the leap month table ({})", describe_coverage(.coverage))]
    LeapTableOutOfRange { subject: String, year: i32, coverage: Option<(i32, i32)> },

    #[error("Record for '{subject}' is missing required field '{field}'")]
    MissingRequiredField { subject: String, field: &'static str },

    #[error("Record for '{subject}' has an invalid date: month {month}, day {day}")]
    InvalidRecordDate { subject: String, month: u32, day: u32 },

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local time {date} does not exist in timezone {timezone}")]
    InvalidLocalTime { date: NaiveDate, timezone: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BirthdayError {
    /// The subject a per-record error belongs to, if any.
    pub fn subject(&self) -> Option<&str> {
        match self {
            BirthdayError::DateAdjustmentExhausted { subject, .. }
            | BirthdayError::LeapTableOutOfRange { subject, .. }
            | BirthdayError::MissingRequiredField { subject, .. }
            | BirthdayError::InvalidRecordDate { subject, .. } => Some(subject),
            _ => None,
        }
    }
}

fn describe_coverage(coverage: &Option<(i32, i32)>) -> String {
    match coverage {
        Some((first, last)) => format!("covers {}-{}", first, last),
        None => "table is empty".to_string(),
    }
}
