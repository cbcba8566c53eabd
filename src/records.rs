//! Domain model for people and the dates attached to them.

use crate::error::BirthdayError;

/// Identity of the person a set of dates belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub display_name: String,
    pub preferred_nickname: Option<String>,
}

impl PersonRecord {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self { display_name: display_name.into(), preferred_nickname: None }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.preferred_nickname = Some(nickname.into());
        self
    }

    /// Name used to address the person in event descriptions.
    pub fn addressed_name(&self) -> &str {
        self.preferred_nickname.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(&self.display_name)
    }
}

/// A month/day pair with an optional origin year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordDate {
    month: u8,
    day: u8,
    year: Option<i32>,
}

impl RecordDate {
    /// Validate `month` in 1-12 and `day` in 1-31.
    pub fn new(subject: &str, month: u32, day: u32, year: Option<i32>) -> Result<Self, BirthdayError> {
        let invalid = || BirthdayError::InvalidRecordDate { subject: subject.to_string(), month, day };
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(invalid());
        }
        let month = u8::try_from(month).map_err(|_| invalid())?;
        let day = u8::try_from(day).map_err(|_| invalid())?;
        Ok(Self { month, day, year })
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

/// One recurring date attached to a person
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRecord {
    SolarBirthday(RecordDate),
    LunarBirthday(RecordDate),
    Anniversary { label: String, date: RecordDate },
}

impl DateRecord {
    pub fn date(&self) -> &RecordDate {
        match self {
            DateRecord::SolarBirthday(date) | DateRecord::LunarBirthday(date) => date,
            DateRecord::Anniversary { date, .. } => date,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            DateRecord::SolarBirthday(_) => EventKind::SolarBirthday,
            DateRecord::LunarBirthday(_) => EventKind::LunarBirthday,
            DateRecord::Anniversary { .. } => EventKind::Anniversary,
        }
    }
}

/// What an occurrence celebrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SolarBirthday,
    LunarBirthday,
    Anniversary,
}

impl EventKind {
    /// Suffix that keeps identifiers of different kinds apart
    pub fn uid_tag(self) -> &'static str {
        match self {
            EventKind::SolarBirthday => "gregorian-birthday",
            EventKind::LunarBirthday => "lunar-birthday",
            EventKind::Anniversary => "anniversary",
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            EventKind::SolarBirthday | EventKind::LunarBirthday => "BIRTHDAY",
            EventKind::Anniversary => "ANNIVERSARY",
        }
    }
}

/// A person together with every dated record found for them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedPerson {
    pub person: PersonRecord,
    pub dates: Vec<DateRecord>,
}

impl DatedPerson {
    /// Origin year inherited by undated lunar birthdays: the year of the first solar birthday.
    pub fn companion_birth_year(&self) -> Option<i32> {
        self.dates.iter().find_map(|record| match record {
            DateRecord::SolarBirthday(date) => date.year(),
            _ => None,
        })
    }
}
