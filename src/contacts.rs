//! Contact directory input.
//
// Contacts arrive in the shape of the People API `connections` listing. Fetching them
// (and the credentials needed to do so) happens outside this crate; `ContactSource` is the
// seam a fetcher plugs into. A JSON export on disk is supported out of the box.

use crate::error::BirthdayError;
use crate::records::{DateRecord, DatedPerson, PersonRecord, RecordDate};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Maximum accepted size of a contacts export (10MB)
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Placeholder subject for contacts without a display name
pub const UNNAMED_SUBJECT: &str = "<unnamed>";

/// Delimiter separating an anniversary label from the rest of the event type
pub const LABEL_DELIMITER: char = '#';

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub names: Vec<ContactName>,
    #[serde(default)]
    pub nicknames: Vec<ContactNickname>,
    #[serde(default)]
    pub birthdays: Vec<ContactBirthday>,
    #[serde(default)]
    pub events: Vec<ContactEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactName {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactNickname {
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBirthday {
    pub date: Option<ContactDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEvent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<ContactDate>,
}

/// Partial date; a year of 0 means "no year", as in the People API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

/// Which kind of dated record an event type describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventClass {
    LunarBirthday,
    Anniversary { label: String },
}

/// Classify a free-text event type, case-insensitively.
pub fn classify_event_type(kind: &str) -> Option<EventClass> {
    let lowered = kind.to_lowercase();
    if lowered.contains("农历生日") || lowered.contains("lunar birthday") {
        Some(EventClass::LunarBirthday)
    } else if lowered.contains("周年纪念日") || lowered.contains("anniversary") {
        let label = kind.split(LABEL_DELIMITER).next().unwrap_or_default().trim().to_string();
        Some(EventClass::Anniversary { label })
    } else {
        None
    }
}

impl Contact {
    pub fn display_name(&self) -> Option<&str> {
        self.names
            .first()
            .and_then(|name| name.display_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn has_birthday_or_event(&self) -> bool {
        !self.birthdays.is_empty() || !self.events.is_empty()
    }

    /// Convert to the domain model.
    ///
    /// Only the first birthday is used. Events whose type is neither a lunar birthday nor an
    /// anniversary are skipped.
    pub fn to_dated_person(&self) -> Result<DatedPerson, BirthdayError> {
        let name = self.display_name().ok_or_else(|| BirthdayError::MissingRequiredField {
            subject: UNNAMED_SUBJECT.to_string(),
            field: "displayName",
        })?;
        let mut person = PersonRecord::new(name);
        if let Some(nickname) = self.nicknames.first().and_then(|n| n.value.as_deref()) {
            person = person.with_nickname(nickname);
        }

        let mut dates = Vec::new();
        if let Some(birthday) = self.birthdays.first() {
            dates.push(DateRecord::SolarBirthday(record_date(name, birthday.date.as_ref())?));
        }
        for event in &self.events {
            let kind = event.kind.as_deref().unwrap_or_default();
            match classify_event_type(kind) {
                Some(EventClass::LunarBirthday) => {
                    dates.push(DateRecord::LunarBirthday(record_date(name, event.date.as_ref())?));
                }
                Some(EventClass::Anniversary { label }) => {
                    let date = record_date(name, event.date.as_ref())?;
                    dates.push(DateRecord::Anniversary { label, date });
                }
                None => debug!("Skipping event type '{}' for {}", kind, name),
            }
        }

        Ok(DatedPerson { person, dates })
    }
}

fn record_date(subject: &str, date: Option<&ContactDate>) -> Result<RecordDate, BirthdayError> {
    let missing = |field| BirthdayError::MissingRequiredField { subject: subject.to_string(), field };
    let date = date.ok_or_else(|| missing("date"))?;
    let month = date.month.filter(|m| *m != 0).ok_or_else(|| missing("month"))?;
    let day = date.day.filter(|d| *d != 0).ok_or_else(|| missing("day"))?;
    RecordDate::new(subject, month, day, date.year.filter(|y| *y != 0))
}

/// Anything able to hand over the contacts that carry date-like fields.
pub trait ContactSource {
    fn fetch_dated_contacts(&self) -> Result<Vec<Contact>>;
}

impl ContactSource for Vec<Contact> {
    fn fetch_dated_contacts(&self) -> Result<Vec<Contact>> {
        Ok(self.iter().filter(|c| c.has_birthday_or_event()).cloned().collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContactListing {
    Connections {
        #[serde(default)]
        connections: Vec<Contact>,
    },
    Bare(Vec<Contact>),
}

/// Parse a JSON export: either a bare array or a `{ "connections": [...] }` listing.
pub fn parse_contacts(json: &str) -> Result<Vec<Contact>> {
    let listing: ContactListing = serde_json::from_str(json).context("Failed to parse contacts JSON")?;
    Ok(match listing {
        ContactListing::Connections { connections } => connections,
        ContactListing::Bare(contacts) => contacts,
    })
}

/// Contacts read from a JSON export on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContactSource for JsonFileSource {
    fn fetch_dated_contacts(&self) -> Result<Vec<Contact>> {
        let metadata = fs::metadata(&self.path)
            .with_context(|| format!("Failed to read contacts file {}", self.path.display()))?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(anyhow!("Contacts file {} exceeds size limit", self.path.display()));
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read contacts file {}", self.path.display()))?;
        let contacts = parse_contacts(&content)?.fetch_dated_contacts()?;
        info!("Loaded {} contacts with dates from {}", contacts.len(), self.path.display());
        Ok(contacts)
    }
}
