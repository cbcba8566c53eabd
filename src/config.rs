use crate::calendar::{default_reminder_time, EventOptions, DEFAULT_CALENDAR_NAME, DEFAULT_PRODUCT_ID};
use crate::error::BirthdayError;
use crate::pipeline::PipelineOptions;
use crate::recurrence::YearRange;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveTime, Utc};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound on how many years one run may generate
pub const MAX_YEARS_TO_CREATE: u32 = 100;

const REMINDER_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub name: String,
    pub product_id: String,
    pub namespace: String,
    pub years_to_create: u32,
    pub current_year: Option<i32>,
    pub timezone: Option<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CALENDAR_NAME.to_string(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            namespace: "finn".to_string(),
            years_to_create: 5,
            current_year: None,
            timezone: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub time: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self { enabled: true, time: default_reminder_time().format(REMINDER_TIME_FORMAT).to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub contacts: PathBuf,
    pub output: PathBuf,
    pub leap_months: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            contacts: PathBuf::from("contacts.json"),
            output: PathBuf::from("birthdays.ics"),
            leap_months: None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), BirthdayError> {
        if !(1..=MAX_YEARS_TO_CREATE).contains(&self.calendar.years_to_create) {
            return Err(BirthdayError::InvalidConfig(format!(
                "years_to_create must be between 1 and {}, got {}",
                MAX_YEARS_TO_CREATE, self.calendar.years_to_create
            )));
        }
        if self.calendar.namespace.trim().is_empty() {
            return Err(BirthdayError::InvalidConfig("namespace must not be empty".to_string()));
        }
        self.timezone()?;
        self.reminder_time()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Option<Tz>, BirthdayError> {
        self.calendar
            .timezone
            .as_deref()
            .map(|name| name.parse::<Tz>().map_err(|_| BirthdayError::InvalidTimezone(name.to_string())))
            .transpose()
    }

    /// Reminder time, or `None` when reminders are disabled
    pub fn reminder_time(&self) -> Result<Option<NaiveTime>, BirthdayError> {
        if !self.reminder.enabled {
            return Ok(None);
        }
        NaiveTime::parse_from_str(self.reminder.time.trim(), REMINDER_TIME_FORMAT)
            .map(Some)
            .map_err(|_| BirthdayError::InvalidConfig(format!("invalid reminder time '{}'", self.reminder.time)))
    }

    /// Resolve into pipeline options for a run stamped at `now`.
    pub fn pipeline_options(&self, now: DateTime<Utc>) -> Result<PipelineOptions, BirthdayError> {
        self.validate()?;
        let start_year = self.calendar.current_year.unwrap_or_else(|| now.year());
        let mut event = EventOptions::new(self.calendar.namespace.trim(), now);
        if let Some(tz) = self.timezone()? {
            event = event.zoned(tz);
        }
        if let Some(at) = self.reminder_time()? {
            event = event.with_reminder(at);
        }
        Ok(PipelineOptions {
            years: YearRange::new(start_year, self.calendar.years_to_create),
            event,
            product_id: self.calendar.product_id.clone(),
            calendar_name: self.calendar.name.clone(),
        })
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "finn", "birthday-calendar")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
